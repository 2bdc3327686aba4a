// SPDX-License-Identifier: Apache-2.0

//! Breadth-first product of two deterministic binary tree automata.
//!
//! Product states are pairs of component states. Two combinators drive the
//! construction: `op` decides from component presence whether a successor
//! pair exists in the product, and `fin` decides the product state's
//! finality from the components' final flags (an absent component is not
//! final). Conjunction uses AND for both; disjunction uses OR, which admits
//! half-present pairs.
//!
//! The returned automaton's state vector is in BFS-from-root insertion
//! order; the minimizer depends on that order to process children before
//! parents when walking it back to front.

use std::collections::VecDeque;

use crate::automaton::{StateRef, TreeAutomaton};
use crate::unique_table::{cantor_pair, UniqueTable};

/// Combines two component-presence or component-finality flags.
pub type PairCombiner = fn(bool, bool) -> bool;

pub fn both(a: bool, b: bool) -> bool {
    a && b
}

pub fn either(a: bool, b: bool) -> bool {
    a || b
}

type Pair = (Option<StateRef>, Option<StateRef>);

/// Id of an optional state in table keys; ⊥ takes the reserved sentinel 0
/// and real states shift up by one.
pub(crate) fn component_key(state: Option<StateRef>) -> u64 {
    match state {
        None => 0,
        Some(s) => s.id as u64 + 1,
    }
}

fn component_name<'a>(aut: &'a TreeAutomaton, state: Option<StateRef>) -> &'a str {
    state.map_or("", |s| aut.get(s).name.as_str())
}

fn pair_name(a: &TreeAutomaton, b: &TreeAutomaton, pair: Pair) -> String {
    format!("{}{}", component_name(a, pair.0), component_name(b, pair.1))
}

/// Builds the product automaton of `a` and `b`. Both inputs must be rooted.
pub fn product(
    a: &TreeAutomaton,
    b: &TreeAutomaton,
    op: PairCombiner,
    fin: PairCombiner,
) -> TreeAutomaton {
    let root_a = a.root.expect("product: left automaton has no root");
    let root_b = b.root.expect("product: right automaton has no root");

    let mut out = TreeAutomaton::new();
    let mut tuples: UniqueTable<(u64, u64)> = UniqueTable::new();
    let mut queue: VecDeque<(StateRef, Pair)> = VecDeque::new();

    let root_pair: Pair = (Some(root_a), Some(root_b));
    let root = out.add_state(
        &pair_name(a, b, root_pair),
        None,
        None,
        fin(a.is_final(Some(root_a)), b.is_final(Some(root_b))),
    );
    let root_key = (component_key(root_pair.0), component_key(root_pair.1));
    tuples.insert(cantor_pair(root_key.0, root_key.1), root_key, root.id);
    queue.push_back((root, root_pair));

    while let Some((state, (pair_a, pair_b))) = queue.pop_front() {
        for i in 0..2 {
            let succ_a = pair_a.and_then(|s| a.get(s).edge[i]);
            let succ_b = pair_b.and_then(|s| b.get(s).edge[i]);
            if !op(succ_a.is_some(), succ_b.is_some()) {
                continue;
            }
            let key = (component_key(succ_a), component_key(succ_b));
            let hash = cantor_pair(key.0, key.1);
            let successor = match tuples.lookup(hash, &key) {
                Some(id) => StateRef { id },
                None => {
                    let s = out.add_state(
                        &pair_name(a, b, (succ_a, succ_b)),
                        None,
                        None,
                        fin(a.is_final(succ_a), b.is_final(succ_b)),
                    );
                    tuples.insert(hash, key, s.id);
                    queue.push_back((s, (succ_a, succ_b)));
                    s
                }
            };
            out.states[state.id].edge[i] = Some(successor);
        }
    }

    out.set_root(root);
    log::debug!(
        "product of {} x {} states: {} product states",
        a.states.len(),
        b.states.len(),
        out.states.len()
    );
    out
}
