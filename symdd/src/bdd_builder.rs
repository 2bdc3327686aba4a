// SPDX-License-Identifier: Apache-2.0

//! ROBDD construction for one output gate of a circuit model.
//!
//! The builder owns the node arena and the unique table, so the ROBDD
//! invariants hold within one builder: no node has equal successors (MK
//! collapses them), structurally equal nodes share one arena slot, and
//! variables strictly increase along every root-to-terminal path.
//!
//! Two build strategies exist. The symbolic one composes the function from
//! the circuit structure through APPLY and never enumerates assignments; it
//! is the default. The enumerative one sweeps all `2^n` assignments through
//! the model evaluator and exists as the reference oracle for small
//! circuits.

use std::collections::HashMap;

use crate::bdd::{BddNode, BddRef};
use crate::model::{BoolOp, GateKind, GateRef, Model};
use crate::model_sim;
use crate::unique_table::{cantor_triple, UniqueTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStrategy {
    /// Shannon-compose the circuit through APPLY. Scales with BDD size.
    Symbolic,
    /// Evaluate every assignment. Exponential in the support size; only
    /// usable on small circuits.
    Enumerative,
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub strategy: BuildStrategy,
}

impl BuildOptions {
    pub fn symbolic() -> Self {
        Self {
            strategy: BuildStrategy::Symbolic,
        }
    }

    pub fn enumerative() -> Self {
        Self {
            strategy: BuildStrategy::Enumerative,
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::symbolic()
    }
}

pub struct RobddBuilder<'a> {
    model: &'a Model,
    output: GateRef,
    options: BuildOptions,
    /// Support of `output` in declared-input order; position i is variable
    /// i + 1.
    support: Vec<GateRef>,
    var_of_gate: HashMap<GateRef, usize>,
    nodes: Vec<BddNode>,
    unique: UniqueTable<(usize, usize, usize)>,
    apply_cache: HashMap<(BoolOp, BddRef, BddRef), BddRef>,
    not_cache: HashMap<BddRef, BddRef>,
    gate_cache: HashMap<GateRef, BddRef>,
}

impl<'a> RobddBuilder<'a> {
    pub fn new(model: &'a Model, output: GateRef, options: BuildOptions) -> Self {
        let support = model_sim::support(model, output);
        let var_of_gate = support
            .iter()
            .enumerate()
            .map(|(i, gate)| (*gate, i + 1))
            .collect();
        let sentinel = support.len() + 1;
        Self {
            model,
            output,
            options,
            support,
            var_of_gate,
            nodes: vec![BddNode::terminal(sentinel), BddNode::terminal(sentinel)],
            unique: UniqueTable::new(),
            apply_cache: HashMap::new(),
            not_cache: HashMap::new(),
            gate_cache: HashMap::new(),
        }
    }

    /// Builds the ROBDD for the builder's output gate using the configured
    /// strategy.
    pub fn build(&mut self) -> BddRef {
        self.build_with(self.options.strategy)
    }

    /// Builds the ROBDD for the builder's output gate with an explicit
    /// strategy. Both strategies share the builder's arena and unique
    /// table, so Boolean-equivalent builds return the same node.
    pub fn build_with(&mut self, strategy: BuildStrategy) -> BddRef {
        match strategy {
            BuildStrategy::Symbolic => self.build_gate(self.output),
            BuildStrategy::Enumerative => {
                let mut values = vec![false; self.support.len()];
                self.build_enumerative(1, &mut values)
            }
        }
    }

    /// Returns the node for `(variable, low, high)`, reusing an existing one
    /// when the successors coincide or the unique table already has the key.
    pub fn mk(&mut self, variable: usize, low: BddRef, high: BddRef) -> BddRef {
        if low == high {
            return low;
        }
        debug_assert!(
            variable < self.variable(low) && variable < self.variable(high),
            "mk: variable {} does not precede successors ({}, {})",
            variable,
            self.variable(low),
            self.variable(high)
        );
        let key = (variable, low.id, high.id);
        let hash = cantor_triple(variable as u64, low.id as u64, high.id as u64);
        if let Some(id) = self.unique.lookup(hash, &key) {
            return BddRef { id };
        }
        let id = self.nodes.len();
        self.nodes.push(BddNode {
            variable,
            low: Some(low),
            high: Some(high),
        });
        self.unique.insert(hash, key, id);
        BddRef { id }
    }

    /// Symbolically builds the ROBDD of any gate over this builder's
    /// variable order. Every INPUT reachable from `gate` must be in the
    /// builder's support.
    pub fn build_gate(&mut self, gate: GateRef) -> BddRef {
        if let Some(&cached) = self.gate_cache.get(&gate) {
            return cached;
        }
        let model = self.model;
        let g = model.get(gate);
        let result = match g.kind {
            GateKind::Input => {
                let variable = *self.var_of_gate.get(&gate).unwrap_or_else(|| {
                    panic!(
                        "input '{}' is outside this builder's support",
                        model.get(gate).name
                    )
                });
                self.mk(variable, BddRef::FALSE, BddRef::TRUE)
            }
            GateKind::Output => self.build_gate(g.operands[0]),
            GateKind::Not => {
                let x = self.build_gate(g.operands[0]);
                self.not(x)
            }
            GateKind::And | GateKind::Or | GateKind::Nand | GateKind::Nor | GateKind::Xor => {
                let op = g.kind.bool_op().unwrap();
                assert!(!g.operands.is_empty(), "gate '{}' has no operands", g.name);
                let mut acc = self.build_gate(g.operands[0]);
                for &operand in &g.operands[1..] {
                    let rhs = self.build_gate(operand);
                    acc = self.apply(op, acc, rhs);
                }
                acc
            }
            GateKind::Unknown => BddRef::FALSE,
        };
        self.gate_cache.insert(gate, result);
        result
    }

    fn build_enumerative(&mut self, variable: usize, values: &mut Vec<bool>) -> BddRef {
        if variable > self.support.len() {
            let mut inputs = vec![false; self.model.inputs.len()];
            for (i, &gate) in self.support.iter().enumerate() {
                let position = self
                    .model
                    .input_position(gate)
                    .expect("support gate missing from the declared input list");
                inputs[position] = values[i];
            }
            if model_sim::eval(self.model, self.output, &inputs) {
                BddRef::TRUE
            } else {
                BddRef::FALSE
            }
        } else {
            values[variable - 1] = false;
            let low = self.build_enumerative(variable + 1, values);
            values[variable - 1] = true;
            let high = self.build_enumerative(variable + 1, values);
            self.mk(variable, low, high)
        }
    }

    /// APPLY: the ROBDD of `op(f_x, f_y)`.
    pub fn apply(&mut self, op: BoolOp, x: BddRef, y: BddRef) -> BddRef {
        if x.is_terminal() && y.is_terminal() {
            return Self::terminal(op.apply(x.is_true(), y.is_true()));
        }
        if let Some(&cached) = self.apply_cache.get(&(op, x, y)) {
            return cached;
        }
        let variable = self.variable(x).min(self.variable(y));
        let (x_low, x_high) = self.cofactors(x, variable);
        let (y_low, y_high) = self.cofactors(y, variable);
        let low = self.apply(op, x_low, y_low);
        let high = self.apply(op, x_high, y_high);
        let result = self.mk(variable, low, high);
        self.apply_cache.insert((op, x, y), result);
        result
    }

    /// The ROBDD of the complement of `x`.
    pub fn not(&mut self, x: BddRef) -> BddRef {
        if x.is_terminal() {
            return Self::terminal(!x.is_true());
        }
        if let Some(&cached) = self.not_cache.get(&x) {
            return cached;
        }
        let (low, high) = self.successors(x);
        let variable = self.variable(x);
        let new_low = self.not(low);
        let new_high = self.not(high);
        let result = self.mk(variable, new_low, new_high);
        self.not_cache.insert(x, result);
        result
    }

    /// Follows edges according to `inputs` (indexed by support position,
    /// i.e. variable order) down to a terminal.
    pub fn evaluate(&self, root: BddRef, inputs: &[bool]) -> bool {
        assert_eq!(
            inputs.len(),
            self.support.len(),
            "assignment length {} does not match support size {}",
            inputs.len(),
            self.support.len()
        );
        let mut current = root;
        while !current.is_terminal() {
            let node = &self.nodes[current.id];
            let taken = if inputs[node.variable - 1] {
                node.high
            } else {
                node.low
            };
            current = taken.expect("interior node missing a successor");
        }
        current.is_true()
    }

    fn terminal(value: bool) -> BddRef {
        if value {
            BddRef::TRUE
        } else {
            BddRef::FALSE
        }
    }

    fn cofactors(&self, x: BddRef, variable: usize) -> (BddRef, BddRef) {
        if self.variable(x) == variable {
            self.successors(x)
        } else {
            (x, x)
        }
    }

    fn successors(&self, x: BddRef) -> (BddRef, BddRef) {
        let node = &self.nodes[x.id];
        (
            node.low.expect("interior node missing low successor"),
            node.high.expect("interior node missing high successor"),
        )
    }

    pub fn get(&self, x: BddRef) -> &BddNode {
        &self.nodes[x.id]
    }

    pub fn variable(&self, x: BddRef) -> usize {
        self.nodes[x.id].variable
    }

    /// Name of the INPUT gate deciding `variable` (1-based).
    pub fn input_name(&self, variable: usize) -> &str {
        &self.model.get(self.support[variable - 1]).name
    }

    pub fn support(&self) -> &[GateRef] {
        &self.support
    }

    /// Total nodes in the arena, terminals included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn unique_table_collisions(&self) -> usize {
        self.unique.collisions()
    }
}

/// Builds the ROBDD for the `output_index`-th declared output of `model`.
pub fn build_bdd(
    model: &Model,
    output_index: usize,
    options: BuildOptions,
) -> (RobddBuilder<'_>, BddRef) {
    assert!(
        output_index < model.outputs.len(),
        "output index {} out of range: model '{}' has {} outputs",
        output_index,
        model.name,
        model.outputs.len()
    );
    let mut builder = RobddBuilder::new(model, model.outputs[output_index], options);
    let root = builder.build();
    log::info!(
        "built ROBDD for output {} of '{}': {} nodes over {} variables, {} unique-table collisions",
        output_index,
        model.name,
        builder.node_count(),
        builder.support().len(),
        builder.unique_table_collisions()
    );
    (builder, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_parser::parse_model;

    const AND2: &str = "
        MODULE and2
        INPUT a, b ;
        OUTPUT o ;
        STRUCTURE
          o = out(g);
          g = and(a, b);
        ENDMODULE
    ";

    #[test]
    fn test_mk_collapses_equal_successors() {
        let model = parse_model(AND2).unwrap();
        let mut builder =
            RobddBuilder::new(&model, model.outputs[0], BuildOptions::symbolic());
        let x = builder.mk(1, BddRef::FALSE, BddRef::TRUE);
        assert_eq!(builder.mk(2, x, x), x);
    }

    #[test]
    fn test_mk_shares_structurally_equal_nodes() {
        let model = parse_model(AND2).unwrap();
        let mut builder =
            RobddBuilder::new(&model, model.outputs[0], BuildOptions::symbolic());
        let first = builder.mk(1, BddRef::FALSE, BddRef::TRUE);
        let second = builder.mk(1, BddRef::FALSE, BddRef::TRUE);
        assert_eq!(first, second);
        assert_eq!(builder.node_count(), 3);
    }

    #[test]
    fn test_and2_bdd_shape() {
        let model = parse_model(AND2).unwrap();
        let (builder, root) = build_bdd(&model, 0, BuildOptions::symbolic());
        // Three interior nodes in the arena: the single-variable BDDs for a
        // and b, plus the conjunction root. Reachable from the root: the
        // root decides a, its low branch is the false terminal, its high
        // branch decides b.
        assert_eq!(builder.node_count(), 5);
        assert_eq!(builder.variable(root), 1);
        let node = builder.get(root);
        assert_eq!(node.low, Some(BddRef::FALSE));
        let high = node.high.unwrap();
        assert_eq!(builder.variable(high), 2);
        let high_node = builder.get(high);
        assert_eq!(high_node.low, Some(BddRef::FALSE));
        assert_eq!(high_node.high, Some(BddRef::TRUE));
    }

    #[test]
    fn test_terminal_sentinel_exceeds_variables() {
        let model = parse_model(AND2).unwrap();
        let (builder, _) = build_bdd(&model, 0, BuildOptions::symbolic());
        assert_eq!(builder.variable(BddRef::FALSE), 3);
        assert_eq!(builder.variable(BddRef::TRUE), 3);
    }

    #[test]
    fn test_evaluate_follows_assignment() {
        let model = parse_model(AND2).unwrap();
        let (builder, root) = build_bdd(&model, 0, BuildOptions::symbolic());
        assert!(!builder.evaluate(root, &[false, false]));
        assert!(!builder.evaluate(root, &[true, false]));
        assert!(!builder.evaluate(root, &[false, true]));
        assert!(builder.evaluate(root, &[true, true]));
    }

    #[test]
    fn test_enumerative_matches_symbolic_in_one_arena() {
        let model = parse_model(AND2).unwrap();
        let mut builder =
            RobddBuilder::new(&model, model.outputs[0], BuildOptions::symbolic());
        let symbolic = builder.build_with(BuildStrategy::Symbolic);
        let enumerative = builder.build_with(BuildStrategy::Enumerative);
        // Equivalent builds over one unique table land on the same node.
        assert_eq!(symbolic, enumerative);
    }

    #[test]
    fn test_unknown_gate_builds_false() {
        let text = "MODULE m INPUT a; OUTPUT o; STRUCTURE o = out(g); g = and(a, ghost); ENDMODULE";
        let model = parse_model(text).unwrap();
        let (_, root) = build_bdd(&model, 0, BuildOptions::symbolic());
        assert_eq!(root, BddRef::FALSE);
    }

    #[test]
    #[should_panic(expected = "output index 3 out of range")]
    fn test_output_index_out_of_range_panics() {
        let model = parse_model(AND2).unwrap();
        let _ = build_bdd(&model, 3, BuildOptions::symbolic());
    }
}
