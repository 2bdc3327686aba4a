// SPDX-License-Identifier: Apache-2.0

//! Evaluation of a gate DAG under an input assignment, and support
//! enumeration.
//!
//! `eval` is the reference semantics the BDD engine must reproduce; the
//! enumerative BUILD strategy and the test suite drive every assignment
//! through it.

use std::collections::HashSet;

use crate::model::{GateKind, GateRef, Model};

/// Evaluates `gate` under `inputs`, indexed by declared INPUT position
/// (`inputs[i]` is the value of `model.inputs[i]`).
///
/// N-ary gates fold their operands left-to-right with the pointwise
/// operator. An `Unknown` gate evaluates to false.
pub fn eval(model: &Model, gate: GateRef, inputs: &[bool]) -> bool {
    assert_eq!(
        inputs.len(),
        model.inputs.len(),
        "assignment length {} does not match declared input count {}",
        inputs.len(),
        model.inputs.len()
    );
    eval_gate(model, gate, inputs)
}

fn eval_gate(model: &Model, gate: GateRef, inputs: &[bool]) -> bool {
    let g = model.get(gate);
    match g.kind {
        GateKind::Input => {
            let position = model
                .input_position(gate)
                .expect("input gate missing from the declared input list");
            inputs[position]
        }
        GateKind::Output => eval_gate(model, g.operands[0], inputs),
        GateKind::Not => !eval_gate(model, g.operands[0], inputs),
        GateKind::And | GateKind::Or | GateKind::Nand | GateKind::Nor | GateKind::Xor => {
            let op = g.kind.bool_op().unwrap();
            assert!(!g.operands.is_empty(), "gate '{}' has no operands", g.name);
            let mut value = eval_gate(model, g.operands[0], inputs);
            for &operand in &g.operands[1..] {
                value = op.apply(value, eval_gate(model, operand, inputs));
            }
            value
        }
        GateKind::Unknown => false,
    }
}

/// Returns the INPUT gates reachable from `gate`, each exactly once, in
/// declared-input-list order (not discovery order). This ordering is the
/// variable order of any BDD built for `gate`.
pub fn support(model: &Model, gate: GateRef) -> Vec<GateRef> {
    let mut reachable: HashSet<GateRef> = HashSet::new();
    let mut visited: HashSet<GateRef> = HashSet::new();
    let mut worklist = vec![gate];
    while let Some(current) = worklist.pop() {
        if !visited.insert(current) {
            continue;
        }
        let g = model.get(current);
        if g.kind == GateKind::Input {
            reachable.insert(current);
        }
        for &operand in &g.operands {
            worklist.push(operand);
        }
    }
    model
        .inputs
        .iter()
        .copied()
        .filter(|input| reachable.contains(input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_parser::parse_model;

    const GATES: &str = "
        MODULE gates
        INPUT a, b, c ;
        OUTPUT o ;
        STRUCTURE
          o = out(top);
          top = or(n1, x1);
          n1 = nand(a, b);
          x1 = xor(b, c);
        ENDMODULE
    ";

    #[test]
    fn test_eval_all_kinds() {
        let model = parse_model(GATES).unwrap();
        let o = model.outputs[0];
        // nand(a, b) | xor(b, c)
        assert!(eval(&model, o, &[false, false, false]));
        assert!(eval(&model, o, &[true, true, false]));
        assert!(!eval(&model, o, &[true, true, true]));
    }

    #[test]
    fn test_eval_matches_truth_table() {
        let model = parse_model(GATES).unwrap();
        let o = model.outputs[0];
        for bits in 0..8u32 {
            let a = bits & 1 != 0;
            let b = bits & 2 != 0;
            let c = bits & 4 != 0;
            let expected = !(a && b) || (b != c);
            assert_eq!(eval(&model, o, &[a, b, c]), expected, "bits = {:03b}", bits);
        }
    }

    #[test]
    fn test_nary_fold_is_left_to_right() {
        let text = "
            MODULE m
            INPUT a, b, c ;
            OUTPUT o ;
            STRUCTURE
              o = out(g);
              g = nand(a, b, c);
            ENDMODULE
        ";
        let model = parse_model(text).unwrap();
        let o = model.outputs[0];
        // nand folds as nand(nand(a, b), c), not as !(a && b && c).
        assert_eq!(eval(&model, o, &[true, true, true]), true);
        assert_eq!(eval(&model, o, &[false, false, true]), false);
    }

    #[test]
    fn test_unknown_gate_evaluates_false() {
        let text = "MODULE m INPUT a; OUTPUT o; STRUCTURE o = out(g); g = or(a, ghost); ENDMODULE";
        let model = parse_model(text).unwrap();
        let o = model.outputs[0];
        assert_eq!(eval(&model, o, &[false]), false);
        assert_eq!(eval(&model, o, &[true]), true);
    }

    #[test]
    fn test_support_in_declared_order() {
        let text = "
            MODULE m
            INPUT a, b, c, d ;
            OUTPUT o ;
            STRUCTURE
              o = out(g);
              g = and(x, y);
              x = or(d, c);
              y = not(a);
            ENDMODULE
        ";
        let model = parse_model(text).unwrap();
        let sup = support(&model, model.outputs[0]);
        let names: Vec<&str> = sup.iter().map(|r| model.get(*r).name.as_str()).collect();
        // b is unreachable; the rest come back in declared order, not the
        // d, c, a discovery order.
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_support_dedupes_shared_inputs() {
        let text = "
            MODULE m
            INPUT a, b ;
            OUTPUT o ;
            STRUCTURE
              o = out(g);
              g = or(x, y);
              x = and(a, b);
              y = and(a, b);
            ENDMODULE
        ";
        let model = parse_model(text).unwrap();
        let sup = support(&model, model.outputs[0]);
        assert_eq!(sup.len(), 2);
    }
}
