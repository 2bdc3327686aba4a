// SPDX-License-Identifier: Apache-2.0

//! Bottom-up automaton minimization by equivalence-class hash-consing.
//!
//! The reachable states are walked back to front (children before parents,
//! which the BFS-from-root order guarantees for product output). Each
//! state's successors are first canonicalized through the representatives
//! already chosen, then the `(edge0, edge1, final)` key is probed in a
//! fresh unique table: a hit joins the existing equivalence class, a miss
//! founds a new one. A state whose canonical successors are both absent and
//! that is not final is dead and gets no representative, which removes it
//! from every parent and lets dead chains unravel all the way to the root.
//!
//! After canonicalization a state whose two successors coincide is replaced
//! by that successor, the automaton analogue of the ROBDD MK rule.

use crate::automaton::{StateRef, TreeAutomaton};
use crate::product::{both, component_key, either, product};
use crate::unique_table::{cantor_triple, UniqueTable};

/// Returns the minimized equivalent of `aut`. The result has no root when
/// every state of `aut` is dead.
pub fn minimize(aut: &TreeAutomaton) -> TreeAutomaton {
    let Some(root) = aut.root else {
        return TreeAutomaton::new();
    };
    let order = aut.bfs_order();
    let mut out = TreeAutomaton::new();
    let mut table: UniqueTable<(u64, u64, bool)> = UniqueTable::new();
    let mut min_equiv: Vec<Option<StateRef>> = vec![None; aut.states.len()];

    for &original in order.iter().rev() {
        let state = aut.get(original);
        let edge0 = state.edge[0].and_then(|e| min_equiv[e.id]);
        let edge1 = state.edge[1].and_then(|e| min_equiv[e.id]);

        // Dead state: nothing reachable and not accepting. Leaving it
        // without a representative erases it from every parent.
        if edge0.is_none() && edge1.is_none() && !state.is_final {
            continue;
        }

        let key = (component_key(edge0), component_key(edge1), state.is_final);
        let hash = cantor_triple(state.is_final as u64, key.0, key.1);
        let mut representative = match table.lookup(hash, &key) {
            Some(id) => StateRef { id },
            None => {
                let created = out.add_state(&state.name, edge0, edge1, state.is_final);
                table.insert(hash, key, created.id);
                created
            }
        };

        // Redundant branch: both successors agree, so the state decides
        // nothing and its successor stands in for it.
        if let (Some(low), Some(high)) = (edge0, edge1) {
            if low == high {
                representative = low;
            }
        }

        min_equiv[original.id] = Some(representative);
    }

    out.root = min_equiv[root.id];
    log::debug!(
        "minimized {} reachable states into {} classes ({} table collisions)",
        order.len(),
        table.len(),
        table.collisions()
    );
    out
}

/// Minimized conjunction: accepts where both automata accept.
pub fn and(a: &TreeAutomaton, b: &TreeAutomaton) -> TreeAutomaton {
    minimize(&product(a, b, both, both))
}

/// Minimized disjunction: accepts where either automaton accepts.
pub fn or(a: &TreeAutomaton, b: &TreeAutomaton) -> TreeAutomaton {
    minimize(&product(a, b, either, either))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_chain_unravels_to_empty() {
        // q1 -0-> q2 with q2 non-final and successor-free: pruning q2
        // leaves q1 dead as well, removing the whole automaton.
        let mut a = TreeAutomaton::new();
        let q2 = a.add_state("q2", None, None, false);
        let q1 = a.add_state("q1", Some(q2), None, false);
        a.set_root(q1);
        let m = minimize(&a);
        assert!(m.is_empty());
    }

    #[test]
    fn test_final_leaf_survives() {
        let mut a = TreeAutomaton::new();
        let q2 = a.add_state("q2", None, None, true);
        let q1 = a.add_state("q1", Some(q2), None, false);
        a.set_root(q1);
        let m = minimize(&a);
        let root = m.root.expect("root survives");
        assert!(!m.get(root).is_final);
        assert!(m.is_final(m.get(root).edge[0]));
    }

    #[test]
    fn test_isomorphic_siblings_share_a_class() {
        // Two structurally identical subtrees under the root.
        let mut a = TreeAutomaton::new();
        let f1 = a.add_state("f1", None, None, true);
        let f2 = a.add_state("f2", None, None, true);
        let s1 = a.add_state("s1", Some(f1), None, false);
        let s2 = a.add_state("s2", Some(f2), None, false);
        let root = a.add_state("root", Some(s1), Some(s2), false);
        a.set_root(root);
        let m = minimize(&a);
        // s1/s2 merge into one class, then the root's equal successors
        // collapse it into that class.
        assert!(m.structural_eq(&{
            let mut expected = TreeAutomaton::new();
            let f = expected.add_state("f", None, None, true);
            let s = expected.add_state("s", Some(f), None, false);
            expected.set_root(s);
            expected
        }));
    }

    #[test]
    fn test_unreachable_states_are_ignored() {
        let mut a = TreeAutomaton::new();
        let f = a.add_state("f", None, None, true);
        let root = a.add_state("root", Some(f), None, false);
        let _orphan = a.add_state("orphan", Some(f), Some(f), true);
        a.set_root(root);
        let m = minimize(&a);
        let mut expected = TreeAutomaton::new();
        let ef = expected.add_state("f", None, None, true);
        let er = expected.add_state("root", Some(ef), None, false);
        expected.set_root(er);
        assert!(m.structural_eq(&expected));
    }

    #[test]
    fn test_minimize_empty_is_empty() {
        let m = minimize(&TreeAutomaton::new());
        assert!(m.is_empty());
    }
}
