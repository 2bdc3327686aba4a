// SPDX-License-Identifier: Apache-2.0

//! Deterministic binary tree automata.
//!
//! A state has two optional successors (edge 0 and edge 1) and a final
//! flag; a run accepts iff it reaches a final state. States live in an
//! arena owned by the [`TreeAutomaton`]; the automaton left with no root
//! (after total pruning) accepts nothing.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct StateRef {
    pub id: usize,
}

#[derive(Debug, Clone)]
pub struct State {
    /// Debug label; product states concatenate their parents' labels.
    pub name: String,
    pub edge: [Option<StateRef>; 2],
    pub is_final: bool,
}

#[derive(Debug, Clone)]
pub struct TreeAutomaton {
    pub states: Vec<State>,
    pub root: Option<StateRef>,
}

impl TreeAutomaton {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            root: None,
        }
    }

    /// Appends a state. Successors must already exist, which forces the
    /// bottom-up construction order the minimizer also relies on.
    pub fn add_state(
        &mut self,
        name: &str,
        edge0: Option<StateRef>,
        edge1: Option<StateRef>,
        is_final: bool,
    ) -> StateRef {
        for edge in [edge0, edge1].into_iter().flatten() {
            debug_assert!(
                edge.id < self.states.len(),
                "add_state: successor {} out of bounds (states.len() = {})",
                edge.id,
                self.states.len()
            );
        }
        let state = StateRef {
            id: self.states.len(),
        };
        self.states.push(State {
            name: name.to_string(),
            edge: [edge0, edge1],
            is_final,
        });
        state
    }

    pub fn set_root(&mut self, root: StateRef) {
        debug_assert!(root.id < self.states.len());
        self.root = Some(root);
    }

    pub fn get(&self, state: StateRef) -> &State {
        &self.states[state.id]
    }

    /// Finality of an optional state; an absent state is not final.
    pub fn is_final(&self, state: Option<StateRef>) -> bool {
        state.map_or(false, |s| self.get(s).is_final)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// States reachable from the root in BFS discovery order (edge 0 before
    /// edge 1). The root comes first.
    pub fn bfs_order(&self) -> Vec<StateRef> {
        let mut order = Vec::new();
        let Some(root) = self.root else {
            return order;
        };
        let mut seen: HashSet<StateRef> = HashSet::new();
        let mut queue: VecDeque<StateRef> = VecDeque::new();
        seen.insert(root);
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for edge in self.get(current).edge.into_iter().flatten() {
                if seen.insert(edge) {
                    queue.push_back(edge);
                }
            }
        }
        order
    }

    /// Structural equivalence by recursive edge-and-finality match. Names
    /// do not participate.
    pub fn structural_eq(&self, other: &TreeAutomaton) -> bool {
        fn eq_from(
            a: &TreeAutomaton,
            b: &TreeAutomaton,
            x: Option<StateRef>,
            y: Option<StateRef>,
            seen: &mut HashSet<(usize, usize)>,
        ) -> bool {
            match (x, y) {
                (None, None) => true,
                (Some(x), Some(y)) => {
                    if !seen.insert((x.id, y.id)) {
                        return true;
                    }
                    let sx = a.get(x);
                    let sy = b.get(y);
                    sx.is_final == sy.is_final
                        && eq_from(a, b, sx.edge[0], sy.edge[0], seen)
                        && eq_from(a, b, sx.edge[1], sy.edge[1], seen)
                }
                _ => false,
            }
        }
        let mut seen = HashSet::new();
        eq_from(self, other, self.root, other.root, &mut seen)
    }

    /// BFS level dump for diagnostics: one line per level, states printed
    /// as `name(low,high)` with a `final` marker.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let Some(root) = self.root else {
            return "<empty>".to_string();
        };
        let mut seen: HashSet<StateRef> = HashSet::new();
        let mut queue: VecDeque<(StateRef, usize)> = VecDeque::new();
        seen.insert(root);
        queue.push_back((root, 0));
        let mut previous_level = 0;
        while let Some((current, level)) = queue.pop_front() {
            if level != previous_level {
                previous_level = level;
                out.push('\n');
            }
            let state = self.get(current);
            let edge0_name = state.edge[0].map_or("", |e| self.get(e).name.as_str());
            let edge1_name = state.edge[1].map_or("", |e| self.get(e).name.as_str());
            if state.is_final {
                out.push_str("final ");
            }
            out.push_str(&format!(
                "{}({},{}) ",
                state.name, edge0_name, edge1_name
            ));
            for edge in state.edge.into_iter().flatten() {
                if seen.insert(edge) {
                    queue.push_back((edge, level + 1));
                }
            }
        }
        out
    }
}

impl Default for TreeAutomaton {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Chain root -0-> mid -0-> leaf(final).
    fn chain() -> TreeAutomaton {
        let mut a = TreeAutomaton::new();
        let leaf = a.add_state("leaf", None, None, true);
        let mid = a.add_state("mid", Some(leaf), None, false);
        let root = a.add_state("root", Some(mid), None, false);
        a.set_root(root);
        a
    }

    #[test]
    fn test_bfs_order_root_first() {
        let a = chain();
        let order = a.bfs_order();
        let names: Vec<&str> = order.iter().map(|r| a.get(*r).name.as_str()).collect();
        assert_eq!(names, vec!["root", "mid", "leaf"]);
    }

    #[test]
    fn test_structural_eq_ignores_names() {
        let a = chain();
        let mut b = TreeAutomaton::new();
        let x = b.add_state("x", None, None, true);
        let y = b.add_state("y", Some(x), None, false);
        let z = b.add_state("z", Some(y), None, false);
        b.set_root(z);
        assert!(a.structural_eq(&b));
    }

    #[test]
    fn test_structural_eq_distinguishes_finality() {
        let a = chain();
        let mut b = TreeAutomaton::new();
        let x = b.add_state("x", None, None, false);
        let y = b.add_state("y", Some(x), None, false);
        let z = b.add_state("z", Some(y), None, false);
        b.set_root(z);
        assert!(!a.structural_eq(&b));
    }

    #[test]
    fn test_structural_eq_distinguishes_edge_index() {
        let a = chain();
        let mut b = TreeAutomaton::new();
        let x = b.add_state("x", None, None, true);
        let y = b.add_state("y", None, Some(x), false);
        let z = b.add_state("z", Some(y), None, false);
        b.set_root(z);
        assert!(!a.structural_eq(&b));
    }

    #[test]
    fn test_empty_automata_are_equal() {
        assert!(TreeAutomaton::new().structural_eq(&TreeAutomaton::new()));
        assert!(!TreeAutomaton::new().structural_eq(&chain()));
    }

    #[test]
    fn test_dump_marks_final_states() {
        let a = chain();
        let dump = a.dump();
        assert!(dump.contains("root(mid,)"));
        assert!(dump.contains("final leaf(,)"));
    }
}
