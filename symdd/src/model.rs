// SPDX-License-Identifier: Apache-2.0

//! Gate DAG produced by the circuit parser.
//!
//! Gates live in an arena owned by the [`Model`]; [`GateRef`] is an index
//! into it. The declared INPUT order is significant: it fixes the variable
//! order of every BDD built over the model.

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct GateRef {
    pub id: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    Input,
    Output,
    Not,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    /// A gate that was referenced but never defined by a STRUCTURE
    /// statement. Evaluates to false and has no operands.
    Unknown,
}

impl GateKind {
    pub fn from_keyword(keyword: &str) -> Option<GateKind> {
        match keyword {
            "in" => Some(GateKind::Input),
            "out" => Some(GateKind::Output),
            "not" => Some(GateKind::Not),
            "and" => Some(GateKind::And),
            "or" => Some(GateKind::Or),
            "nand" => Some(GateKind::Nand),
            "nor" => Some(GateKind::Nor),
            "xor" => Some(GateKind::Xor),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            GateKind::Input => "in",
            GateKind::Output => "out",
            GateKind::Not => "not",
            GateKind::And => "and",
            GateKind::Or => "or",
            GateKind::Nand => "nand",
            GateKind::Nor => "nor",
            GateKind::Xor => "xor",
            GateKind::Unknown => "?",
        }
    }

    /// The pointwise Boolean operator for an n-ary gate kind; `None` for the
    /// structural kinds.
    pub fn bool_op(self) -> Option<BoolOp> {
        match self {
            GateKind::And => Some(BoolOp::And),
            GateKind::Or => Some(BoolOp::Or),
            GateKind::Nand => Some(BoolOp::Nand),
            GateKind::Nor => Some(BoolOp::Nor),
            GateKind::Xor => Some(BoolOp::Xor),
            _ => None,
        }
    }
}

/// Two-argument Boolean operator, folded left-to-right over n-ary gates and
/// handed to the BDD engine's APPLY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
    Nand,
    Nor,
    Xor,
}

impl BoolOp {
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BoolOp::And => a && b,
            BoolOp::Or => a || b,
            BoolOp::Nand => !(a && b),
            BoolOp::Nor => !(a || b),
            BoolOp::Xor => a != b,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    pub name: String,
    pub kind: GateKind,
    /// Fan-in, in statement order. Length 1 for OUTPUT/NOT, >= 1 for the
    /// n-ary kinds, 0 for INPUT and Unknown.
    pub operands: Vec<GateRef>,
}

#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub gates: Vec<Gate>,
    /// INPUT gates in declared order. This order is the BDD variable order.
    pub inputs: Vec<GateRef>,
    /// OUTPUT gates in declared order.
    pub outputs: Vec<GateRef>,
    by_name: HashMap<String, GateRef>,
    input_position: HashMap<GateRef, usize>,
}

impl Model {
    pub fn new(name: String) -> Self {
        Self {
            name,
            gates: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            by_name: HashMap::new(),
            input_position: HashMap::new(),
        }
    }

    pub fn get(&self, gate: GateRef) -> &Gate {
        &self.gates[gate.id]
    }

    pub fn gate_named(&self, name: &str) -> Option<GateRef> {
        self.by_name.get(name).copied()
    }

    /// Returns the existing gate with `name`, or allocates an `Unknown`
    /// placeholder to be completed by a later defining statement.
    pub fn gate_or_placeholder(&mut self, name: &str) -> GateRef {
        if let Some(existing) = self.by_name.get(name) {
            return *existing;
        }
        let gate = GateRef {
            id: self.gates.len(),
        };
        self.gates.push(Gate {
            name: name.to_string(),
            kind: GateKind::Unknown,
            operands: Vec::new(),
        });
        self.by_name.insert(name.to_string(), gate);
        gate
    }

    /// Registers `gate` as the next declared INPUT.
    pub fn declare_input(&mut self, gate: GateRef) {
        self.gates[gate.id].kind = GateKind::Input;
        self.input_position.insert(gate, self.inputs.len());
        self.inputs.push(gate);
    }

    /// Registers `gate` as the next declared OUTPUT.
    pub fn declare_output(&mut self, gate: GateRef) {
        self.gates[gate.id].kind = GateKind::Output;
        self.outputs.push(gate);
    }

    /// Position of an INPUT gate in the declared input list.
    pub fn input_position(&self, gate: GateRef) -> Option<usize> {
        self.input_position.get(&gate).copied()
    }

    /// Returns (topological order, None) if the gate graph is acyclic, or
    /// (partial order, Some(not_visited_ids)) if a cycle is detected.
    /// Children come before their users in the returned order.
    pub fn topo_order_and_cycle_check(&self) -> (Vec<GateRef>, Option<Vec<usize>>) {
        let gate_count = self.gates.len();
        let mut indegree = vec![0usize; gate_count];
        let mut users: Vec<Vec<usize>> = vec![Vec::new(); gate_count];
        for (i, gate) in self.gates.iter().enumerate() {
            indegree[i] = gate.operands.len();
            for operand in &gate.operands {
                users[operand.id].push(i);
            }
        }
        let mut queue: VecDeque<usize> = VecDeque::new();
        for i in 0..gate_count {
            if indegree[i] == 0 {
                queue.push_back(i);
            }
        }
        let mut topo: Vec<GateRef> = Vec::with_capacity(gate_count);
        while let Some(id) = queue.pop_front() {
            topo.push(GateRef { id });
            for &user in &users[id] {
                indegree[user] -= 1;
                if indegree[user] == 0 {
                    queue.push_back(user);
                }
            }
        }
        if topo.len() != gate_count {
            let not_visited: Vec<usize> = (0..gate_count)
                .filter(|id| !topo.iter().any(|r| r.id == *id))
                .collect();
            (topo, Some(not_visited))
        } else {
            (topo, None)
        }
    }
}
