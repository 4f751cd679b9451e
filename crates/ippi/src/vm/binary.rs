//! Arithmetic, comparison, and logical instruction bodies.

use std::cmp::Ordering;

use super::Vm;
use crate::exceptions::{exc_err_fmt, exc_err_static, ExcKind, RunResult};
use crate::io::{InputReader, PrintWriter};
use crate::program::{Instruction, Opcode};
use crate::value::Value;

impl<I: InputReader, P: PrintWriter> Vm<'_, I, P> {
    pub(super) fn arithmetic(&mut self, instruction: &Instruction) -> RunResult<()> {
        let left = self.resolve_value(&instruction.args[1])?;
        let right = self.resolve_value(&instruction.args[2])?;
        let (Value::Int(a), Value::Int(b)) = (&left, &right) else {
            return exc_err_fmt!(ExcKind::OperandType;
                "unsupported operand type(s) for {}: '{}' and '{}'",
                instruction.opcode, left.kind_str(), right.kind_str());
        };
        let result = match instruction.opcode {
            Opcode::Add => a.wrapping_add(*b),
            Opcode::Sub => a.wrapping_sub(*b),
            Opcode::Mul => a.wrapping_mul(*b),
            Opcode::IDiv => {
                if *b == 0 {
                    return exc_err_static!(ExcKind::OperandValue; "division by zero");
                }
                floor_div(*a, *b)
            }
            other => panic!("{other} dispatched as arithmetic"),
        };
        self.memory.write(instruction.var(0), Value::Int(result))
    }

    pub(super) fn comparison(&mut self, instruction: &Instruction) -> RunResult<()> {
        let left = self.resolve_value(&instruction.args[1])?;
        let right = self.resolve_value(&instruction.args[2])?;
        let result = match instruction.opcode {
            Opcode::Eq => values_equal(&left, &right)?,
            Opcode::Lt => ordering(instruction.opcode, &left, &right)? == Ordering::Less,
            Opcode::Gt => ordering(instruction.opcode, &left, &right)? == Ordering::Greater,
            other => panic!("{other} dispatched as comparison"),
        };
        self.memory.write(instruction.var(0), Value::Bool(result))
    }

    pub(super) fn logic(&mut self, instruction: &Instruction) -> RunResult<()> {
        let left = self.resolve_value(&instruction.args[1])?;
        let right = self.resolve_value(&instruction.args[2])?;
        let (Value::Bool(a), Value::Bool(b)) = (&left, &right) else {
            return exc_err_fmt!(ExcKind::OperandType;
                "unsupported operand type(s) for {}: '{}' and '{}'",
                instruction.opcode, left.kind_str(), right.kind_str());
        };
        let result = match instruction.opcode {
            Opcode::And => *a && *b,
            Opcode::Or => *a || *b,
            other => panic!("{other} dispatched as logic"),
        };
        self.memory.write(instruction.var(0), Value::Bool(result))
    }

    pub(super) fn negate(&mut self, instruction: &Instruction) -> RunResult<()> {
        let value = self.resolve_value(&instruction.args[1])?;
        let Value::Bool(operand) = value else {
            return exc_err_fmt!(ExcKind::OperandType; "NOT requires bool, got '{}'", value.kind_str());
        };
        self.memory.write(instruction.var(0), Value::Bool(!operand))
    }
}

/// `EQ` typing rules: operands of the same kind compare by value; `nil` is
/// equal only to `nil` and unequal to everything else. Mixing any other two
/// kinds is an operand type error.
pub(super) fn values_equal(left: &Value, right: &Value) -> RunResult<bool> {
    match (left, right) {
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Nil, _) | (_, Value::Nil) => Ok(false),
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        _ => exc_err_fmt!(ExcKind::OperandType;
            "cannot compare '{}' with '{}'", left.kind_str(), right.kind_str()),
    }
}

/// `LT`/`GT` ordering: `false < true` for booleans, code-point lexicographic
/// for strings. `nil` does not order against anything.
fn ordering(opcode: Opcode, left: &Value, right: &Value) -> RunResult<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => exc_err_fmt!(ExcKind::OperandType;
            "unsupported operand type(s) for {opcode}: '{}' and '{}'", left.kind_str(), right.kind_str()),
    }
}

/// Floored integer division, rounding the quotient toward negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && (a < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}
