//! String instruction bodies and the int/char conversions.
//!
//! Strings are addressed by 0-based code point index; every out-of-range
//! access is a `StringError`. The text was already escape-decoded at load
//! time, so indices count Unicode code points, not bytes.

use super::Vm;
use crate::exceptions::{exc_err_fmt, exc_err_static, exc_fmt, ExcKind, RunResult};
use crate::io::{InputReader, PrintWriter};
use crate::program::Instruction;
use crate::value::Value;

impl<I: InputReader, P: PrintWriter> Vm<'_, I, P> {
    pub(super) fn concat(&mut self, instruction: &Instruction) -> RunResult<()> {
        let left = self.resolve_value(&instruction.args[1])?;
        let right = self.resolve_value(&instruction.args[2])?;
        match (left, right) {
            (Value::Str(mut a), Value::Str(b)) => {
                a.push_str(&b);
                self.memory.write(instruction.var(0), Value::Str(a))
            }
            (a, b) => exc_err_fmt!(ExcKind::OperandType;
                "can only concatenate strings, got '{}' and '{}'", a.kind_str(), b.kind_str()),
        }
    }

    pub(super) fn strlen(&mut self, instruction: &Instruction) -> RunResult<()> {
        let text = self.resolve_str(&instruction.args[1])?;
        let length = text.chars().count() as i64;
        self.memory.write(instruction.var(0), Value::Int(length))
    }

    pub(super) fn getchar(&mut self, instruction: &Instruction) -> RunResult<()> {
        let text = self.resolve_str(&instruction.args[1])?;
        let index = self.resolve_int(&instruction.args[2])?;
        let c = char_at(&text, index)?;
        self.memory.write(instruction.var(0), Value::Str(c.to_string()))
    }

    /// `SETCHAR` mutates the target variable in place: its character at the
    /// given index is replaced with the first character of the replacement
    /// string.
    pub(super) fn setchar(&mut self, instruction: &Instruction) -> RunResult<()> {
        let var = instruction.var(0);
        let target = match self.memory.read(var)? {
            Value::Str(text) => text.clone(),
            Value::Uninit => {
                return exc_err_fmt!(ExcKind::MissingValue; "variable {var} has no value")
            }
            other => {
                return exc_err_fmt!(ExcKind::OperandType;
                    "SETCHAR target must be string, got '{}'", other.kind_str())
            }
        };
        let index = self.resolve_int(&instruction.args[1])?;
        let replacement = self.resolve_str(&instruction.args[2])?;
        let Some(replacement_char) = replacement.chars().next() else {
            return exc_err_static!(ExcKind::StringError; "SETCHAR replacement string is empty");
        };
        char_at(&target, index)?;
        let position = index as usize;
        let rebuilt: String = target
            .chars()
            .enumerate()
            .map(|(i, c)| if i == position { replacement_char } else { c })
            .collect();
        self.memory.write(var, Value::Str(rebuilt))
    }

    pub(super) fn int2char(&mut self, instruction: &Instruction) -> RunResult<()> {
        let code = self.resolve_int(&instruction.args[1])?;
        let c = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| exc_fmt!(ExcKind::StringError; "{code} is not a valid Unicode code point"))?;
        self.memory.write(instruction.var(0), Value::Str(c.to_string()))
    }

    pub(super) fn stri2int(&mut self, instruction: &Instruction) -> RunResult<()> {
        let text = self.resolve_str(&instruction.args[1])?;
        let index = self.resolve_int(&instruction.args[2])?;
        let c = char_at(&text, index)?;
        self.memory
            .write(instruction.var(0), Value::Int(i64::from(u32::from(c))))
    }
}

/// The code point at a 0-based index, `StringError` outside the string.
fn char_at(text: &str, index: i64) -> RunResult<char> {
    usize::try_from(index)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .ok_or_else(|| {
            exc_fmt!(ExcKind::StringError;
                "index {index} is out of range for a string of length {}", text.chars().count())
        })
}
