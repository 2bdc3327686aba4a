// SPDX-License-Identifier: Apache-2.0

//! Emits the JavaScript fragment consumed by the HTML graph page: one
//! `g.addEdge(parent, child, { label : "0"|"1" })` call per BDD edge.
//!
//! Interior nodes are identified as `<input-name>_<node-id>`; the terminals
//! are the literals `true` and `false`. Shared subgraphs are emitted once.

use std::collections::HashSet;

use crate::bdd::BddRef;
use crate::bdd_builder::RobddBuilder;

/// Renders the graph rooted at `root` as `g.addEdge(...)` lines. A terminal
/// root renders as the empty fragment (a graph with no edges).
pub fn emit_graph_js(builder: &RobddBuilder, root: BddRef) -> String {
    let mut out = String::new();
    let mut visited: HashSet<BddRef> = HashSet::new();
    emit_node(builder, root, &mut visited, &mut out);
    out
}

fn node_identifier(builder: &RobddBuilder, node: BddRef) -> String {
    if node.is_false() {
        "false".to_string()
    } else if node.is_true() {
        "true".to_string()
    } else {
        format!("{}_{}", builder.input_name(builder.variable(node)), node.id)
    }
}

fn emit_node(
    builder: &RobddBuilder,
    node: BddRef,
    visited: &mut HashSet<BddRef>,
    out: &mut String,
) {
    if node.is_terminal() || !visited.insert(node) {
        return;
    }
    let identifier = node_identifier(builder, node);
    let low = builder.get(node).low.expect("interior node missing low successor");
    let high = builder
        .get(node)
        .high
        .expect("interior node missing high successor");
    out.push_str(&format!(
        "g.addEdge(\"{}\", \"{}\", {{ label : \"0\" }});\n",
        identifier,
        node_identifier(builder, low)
    ));
    out.push_str(&format!(
        "g.addEdge(\"{}\", \"{}\", {{ label : \"1\" }});\n",
        identifier,
        node_identifier(builder, high)
    ));
    emit_node(builder, low, visited, out);
    emit_node(builder, high, visited, out);
}
