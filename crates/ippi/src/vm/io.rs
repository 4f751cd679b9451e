//! `READ`, `WRITE`, and the debug instructions.

use std::borrow::Cow;

use super::Vm;
use crate::exceptions::RunResult;
use crate::io::{InputReader, PrintWriter};
use crate::program::Instruction;
use crate::value::{parse_int, Value, ValueKind};

impl<I: InputReader, P: PrintWriter> Vm<'_, I, P> {
    pub(super) fn write(&mut self, instruction: &Instruction) -> RunResult<()> {
        let value = self.resolve_value(&instruction.args[0])?;
        self.print.stdout_write(Cow::Owned(value.to_string()));
        Ok(())
    }

    /// `READ` never fails at run time: end of input and unparseable lines
    /// both store `Nil`.
    pub(super) fn read(&mut self, instruction: &Instruction) -> RunResult<()> {
        let kind = instruction.type_tag(1);
        let value = match self.input.read_line() {
            None => Value::Nil,
            Some(line) => parse_input(kind, &line),
        };
        self.memory.write(instruction.var(0), value)
    }

    pub(super) fn dprint(&mut self, instruction: &Instruction) -> RunResult<()> {
        let value = self.resolve_value(&instruction.args[0])?;
        self.print.stderr_write(Cow::Owned(format!("{value}\n")));
        Ok(())
    }

    /// `BREAK` dumps the engine state to the error stream and continues.
    pub(super) fn break_dump(&mut self, instruction: &Instruction) {
        let mut dump = format!(
            "BREAK at order {} (pc {}, {} instruction(s) executed)\n",
            instruction.order, self.pc, self.executed
        );
        dump.push_str(&self.memory.to_string());
        self.print.stderr_write(Cow::Owned(dump));
    }
}

/// Parses one input line per the `READ` type argument.
///
/// Integers accept the same radixes as int literals; booleans read a
/// case-insensitive `true` and treat every other line as false; strings are
/// taken verbatim. A line that does not parse becomes `Nil`, as does a
/// `nil` type tag (nothing ever parses as nil).
fn parse_input(kind: ValueKind, line: &str) -> Value {
    match kind {
        ValueKind::Int => parse_int(line.trim()).map_or(Value::Nil, Value::Int),
        ValueKind::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        ValueKind::String => Value::Str(line.to_owned()),
        ValueKind::Nil => Value::Nil,
    }
}
