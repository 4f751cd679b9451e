//! XML loader: turns an IPPcode23 source document into a [`Program`].
//!
//! Only two error classes leave this module: `XmlFormat` (31) when the
//! document is not well-formed XML at all, and `XmlStructure` (32) for
//! everything a well-formed document can still get wrong — root element,
//! unknown opcodes, bad orders, malformed operands. The engine itself
//! assumes a validated program.

use std::str::FromStr;

use roxmltree::{Document, Node};

use crate::exceptions::{exc_err_fmt, exc_err_static, exc_fmt, exc_static, ExcKind, RunResult};
use crate::program::{Arg, ArgSpec, FrameKind, Instruction, Opcode, Program, VarRef};
use crate::value::{Value, ValueKind};

/// Characters allowed in identifiers (variable names and labels) besides
/// ASCII alphanumerics.
const IDENT_SPECIALS: &[char] = &['_', '-', '$', '&', '%', '*', '!', '?'];

pub(crate) fn parse_program(source: &str) -> RunResult<Program> {
    let document = Document::parse(source)
        .map_err(|err| exc_fmt!(ExcKind::XmlFormat; "source is not well-formed XML: {err}"))?;
    let root = document.root_element();
    if root.tag_name().name() != "program" {
        return exc_err_fmt!(ExcKind::XmlStructure;
            "root element must be <program>, found <{}>", root.tag_name().name());
    }
    match root.attribute("language") {
        Some(language) if language.trim().eq_ignore_ascii_case("IPPcode23") => {}
        Some(language) => {
            return exc_err_fmt!(ExcKind::XmlStructure; "unsupported language {language:?}")
        }
        None => return exc_err_static!(ExcKind::XmlStructure; "<program> is missing the language attribute"),
    }

    let mut instructions = Vec::new();
    for node in root.children() {
        if node.is_element() {
            instructions.push(parse_instruction(node)?);
        } else if node.is_text() && !node.text().unwrap_or("").trim().is_empty() {
            return exc_err_static!(ExcKind::XmlStructure; "stray text inside <program>");
        }
    }

    instructions.sort_by_key(|instruction| instruction.order);
    if let Some(pair) = instructions.windows(2).find(|pair| pair[0].order == pair[1].order) {
        return exc_err_fmt!(ExcKind::XmlStructure; "order {} is used more than once", pair[0].order);
    }

    Program::new(instructions)
}

fn parse_instruction(node: Node<'_, '_>) -> RunResult<Instruction> {
    if node.tag_name().name() != "instruction" {
        return exc_err_fmt!(ExcKind::XmlStructure;
            "unexpected element <{}> inside <program>", node.tag_name().name());
    }

    let order_text = node
        .attribute("order")
        .ok_or_else(|| exc_static!(ExcKind::XmlStructure; "instruction is missing the order attribute"))?;
    let order = order_text
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|order| *order > 0)
        .ok_or_else(|| exc_fmt!(ExcKind::XmlStructure; "invalid instruction order {order_text:?}"))?;

    let opcode_text = node
        .attribute("opcode")
        .ok_or_else(|| exc_static!(ExcKind::XmlStructure; "instruction is missing the opcode attribute"))?;
    let opcode = Opcode::from_str(&opcode_text.trim().to_ascii_uppercase())
        .map_err(|_| exc_fmt!(ExcKind::XmlStructure; "unknown opcode {opcode_text:?}"))?;

    let signature = opcode.signature();
    let mut slots: Vec<Option<Arg>> = vec![None; signature.len()];
    for child in node.children().filter(|child| child.is_element()) {
        let name = child.tag_name().name();
        let position = name
            .strip_prefix("arg")
            .and_then(|digits| digits.parse::<usize>().ok())
            .filter(|position| (1..=3).contains(position))
            .ok_or_else(|| exc_fmt!(ExcKind::XmlStructure; "unexpected element <{name}> in {opcode}"))?;
        if position > signature.len() {
            return exc_err_fmt!(ExcKind::XmlStructure;
                "{opcode} takes {} argument(s), got <arg{position}>", signature.len());
        }
        let slot = &mut slots[position - 1];
        if slot.is_some() {
            return exc_err_fmt!(ExcKind::XmlStructure; "<arg{position}> appears more than once in {opcode}");
        }
        *slot = Some(parse_arg(child)?);
    }

    let args = match slots.into_iter().collect::<Option<Vec<_>>>() {
        Some(args) => args,
        None => {
            return exc_err_fmt!(ExcKind::XmlStructure;
                "{opcode} takes {} argument(s)", signature.len())
        }
    };

    for (position, (arg, spec)) in args.iter().zip(signature).enumerate() {
        let admissible = match spec {
            ArgSpec::Symb => matches!(arg.spec(), ArgSpec::Var | ArgSpec::Symb),
            other => arg.spec() == *other,
        };
        if !admissible {
            return exc_err_fmt!(ExcKind::XmlStructure;
                "{opcode} does not accept {} as argument {}", arg.describe(), position + 1);
        }
    }

    Ok(Instruction { opcode, order, args })
}

fn parse_arg(node: Node<'_, '_>) -> RunResult<Arg> {
    let kind = node
        .attribute("type")
        .ok_or_else(|| exc_static!(ExcKind::XmlStructure; "argument is missing the type attribute"))?;
    let text = node.text().unwrap_or("");
    match kind {
        "var" => parse_var(text.trim()).map(Arg::Var),
        "label" => {
            let label = text.trim();
            if !is_identifier(label) {
                return exc_err_fmt!(ExcKind::XmlStructure; "invalid label {label:?}");
            }
            Ok(Arg::Label(label.to_owned()))
        }
        "type" => {
            let name = text.trim();
            ValueKind::from_str(name)
                .map(Arg::Type)
                .map_err(|_| exc_fmt!(ExcKind::XmlStructure; "invalid type name {name:?}"))
        }
        _ => match ValueKind::from_str(kind) {
            // string literals keep their text verbatim, everything else is
            // insensitive to surrounding whitespace
            Ok(ValueKind::String) => Value::parse_literal(ValueKind::String, text).map(Arg::Literal),
            Ok(value_kind) => Value::parse_literal(value_kind, text.trim()).map(Arg::Literal),
            Err(_) => exc_err_fmt!(ExcKind::XmlStructure; "unknown argument type {kind:?}"),
        },
    }
}

fn parse_var(text: &str) -> RunResult<VarRef> {
    let Some((frame, name)) = text.split_once('@') else {
        return exc_err_fmt!(ExcKind::XmlStructure; "invalid variable reference {text:?}");
    };
    let frame = FrameKind::from_str(frame)
        .map_err(|_| exc_fmt!(ExcKind::XmlStructure; "unknown frame in variable reference {text:?}"))?;
    if !is_identifier(name) {
        return exc_err_fmt!(ExcKind::XmlStructure; "invalid variable name {name:?}");
    }
    Ok(VarRef {
        frame,
        name: name.to_owned(),
    })
}

/// Variable names and labels: alphanumerics and `_ - $ & % * ! ?`, not
/// starting with a digit.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    (first.is_ascii_alphabetic() || IDENT_SPECIALS.contains(&first))
        && chars.all(|c| c.is_ascii_alphanumeric() || IDENT_SPECIALS.contains(&c))
}
