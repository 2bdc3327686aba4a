// SPDX-License-Identifier: Apache-2.0

//! Symbolic engine over two-successor node graphs: canonical ROBDD
//! construction for parsed gate circuits, and product/minimization of
//! deterministic binary tree automata. Both sides hash-cons their nodes
//! through the same chained unique-table discipline.

pub mod automaton;
pub mod bdd;
pub mod bdd_builder;
pub mod emit_viz;
pub mod minimize;
pub mod model;
pub mod model_parser;
pub mod model_sim;
pub mod product;
pub mod unique_table;
