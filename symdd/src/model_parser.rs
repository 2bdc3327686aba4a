// SPDX-License-Identifier: Apache-2.0

//! Parser for the textual circuit description:
//!
//! ```text
//! MODULE adder
//! INPUT a, b ;
//! OUTPUT o ;
//! STRUCTURE
//!   o = out(g);
//!   g = and(a, b);
//! ENDMODULE
//! ```
//!
//! Whitespace is insignificant, statements are separated by `;`, and gate
//! kinds are lowercase. Gates may be referenced before their defining
//! statement; a placeholder is completed when the definition arrives.

use std::collections::HashSet;

use crate::model::{GateKind, GateRef, Model};

#[derive(Debug)]
pub struct ParseError {
    msg: String,
}

impl ParseError {
    fn new(msg: String) -> Self {
        Self { msg }
    }

    fn new_with_pos(msg: String, input: &str, pos: usize) -> Self {
        let mut line = 1usize;
        let mut col = 1usize;
        for ch in input[..pos].chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Self {
            msg: format!("{} at line {}, column {}", msg, line, col),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ParseError: {}", self.msg)
    }
}

impl std::error::Error for ParseError {}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn drop_ws(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn try_drop(&mut self, tok: &str) -> bool {
        self.drop_ws();
        if self.rest().starts_with(tok) {
            self.pos += tok.len();
            true
        } else {
            false
        }
    }

    fn err(&self, msg: &str) -> ParseError {
        ParseError::new_with_pos(msg.to_string(), self.input, self.pos)
    }

    fn drop_or_error(&mut self, tok: &str) -> Result<(), ParseError> {
        if self.try_drop(tok) {
            Ok(())
        } else {
            Err(self.err(&format!(
                "expected '{}' got '{}...'",
                tok,
                &self.rest()[..self.rest().len().min(tok.len())]
            )))
        }
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        self.drop_ws();
        let mut result = String::new();
        match self.rest().chars().next() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                result.push(c);
                self.pos += c.len_utf8();
            }
            Some(c) => return Err(self.err(&format!("expected identifier start, got '{}'", c))),
            None => return Err(self.err("unexpected eof")),
        }
        while let Some(c) = self.rest().chars().next() {
            if c.is_alphanumeric() || c == '_' {
                result.push(c);
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok(result)
    }

    /// Comma-separated identifiers up to (and consuming) `terminator`.
    fn parse_name_list(&mut self, terminator: &str) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        loop {
            names.push(self.parse_identifier()?);
            if self.try_drop(terminator) {
                break;
            }
            self.drop_or_error(",")?;
        }
        Ok(names)
    }

    fn at_eof(&mut self) -> bool {
        self.drop_ws();
        self.pos >= self.input.len()
    }
}

/// Parses a circuit description and validates the resulting gate graph.
pub fn parse_model(text: &str) -> Result<Model, ParseError> {
    let mut p = Parser::new(text);
    p.drop_or_error("MODULE")?;
    let mut model = Model::new(p.parse_identifier()?);

    p.drop_or_error("INPUT")?;
    for name in p.parse_name_list(";")? {
        if model.gate_named(&name).is_some() {
            return Err(ParseError::new(format!("duplicate input '{}'", name)));
        }
        let gate = model.gate_or_placeholder(&name);
        model.declare_input(gate);
    }

    p.drop_or_error("OUTPUT")?;
    for name in p.parse_name_list(";")? {
        if model.gate_named(&name).is_some() {
            return Err(ParseError::new(format!("duplicate output '{}'", name)));
        }
        let gate = model.gate_or_placeholder(&name);
        model.declare_output(gate);
    }

    p.drop_or_error("STRUCTURE")?;
    let mut defined: HashSet<String> = HashSet::new();
    loop {
        if p.try_drop("ENDMODULE") {
            break;
        }
        if p.at_eof() {
            return Err(p.err("expected statement or 'ENDMODULE'"));
        }
        let name = p.parse_identifier()?;
        p.drop_or_error("=")?;
        let keyword = p.parse_identifier()?;
        let kind = GateKind::from_keyword(&keyword)
            .ok_or_else(|| p.err(&format!("unknown gate kind '{}'", keyword)))?;
        p.drop_or_error("(")?;
        let mut operands = Vec::new();
        if !p.try_drop(")") {
            loop {
                let operand_name = p.parse_identifier()?;
                operands.push(model.gate_or_placeholder(&operand_name));
                if p.try_drop(")") {
                    break;
                }
                p.drop_or_error(",")?;
            }
        }
        p.drop_or_error(";")?;

        if !defined.insert(name.clone()) {
            return Err(ParseError::new(format!("gate '{}' defined twice", name)));
        }
        let gate = model.gate_or_placeholder(&name);
        model.gates[gate.id].kind = kind;
        model.gates[gate.id].operands = operands;
    }

    if !p.at_eof() {
        return Err(p.err("trailing text after 'ENDMODULE'"));
    }

    validate(&model)?;
    Ok(model)
}

/// Checks the invariants the engine assumes: INPUT gates are declared,
/// declared gates keep their role, fan-in arities match the kinds, and the
/// graph is acyclic.
fn validate(model: &Model) -> Result<(), ParseError> {
    for (id, gate) in model.gates.iter().enumerate() {
        let gate_ref = GateRef { id };
        match gate.kind {
            GateKind::Input => {
                if model.input_position(gate_ref).is_none() {
                    return Err(ParseError::new(format!(
                        "input '{}' is not in the INPUT list",
                        gate.name
                    )));
                }
                if !gate.operands.is_empty() {
                    return Err(ParseError::new(format!(
                        "input '{}' must not have operands",
                        gate.name
                    )));
                }
            }
            GateKind::Output | GateKind::Not => {
                if gate.operands.len() != 1 {
                    return Err(ParseError::new(format!(
                        "gate '{}' ({}) needs exactly one operand, has {}",
                        gate.name,
                        gate.kind.keyword(),
                        gate.operands.len()
                    )));
                }
            }
            GateKind::And | GateKind::Or | GateKind::Nand | GateKind::Nor | GateKind::Xor => {
                if gate.operands.is_empty() {
                    return Err(ParseError::new(format!(
                        "gate '{}' ({}) needs at least one operand",
                        gate.name,
                        gate.kind.keyword()
                    )));
                }
            }
            GateKind::Unknown => {}
        }
    }
    for &input in &model.inputs {
        if model.get(input).kind != GateKind::Input {
            return Err(ParseError::new(format!(
                "input '{}' redefined as {}",
                model.get(input).name,
                model.get(input).kind.keyword()
            )));
        }
    }
    let (_, cycle) = model.topo_order_and_cycle_check();
    if let Some(not_visited) = cycle {
        let names: Vec<&str> = not_visited
            .iter()
            .map(|id| model.gates[*id].name.as_str())
            .collect();
        return Err(ParseError::new(format!(
            "gate graph has a cycle through: {}",
            names.join(", ")
        )));
    }
    Ok(())
}
