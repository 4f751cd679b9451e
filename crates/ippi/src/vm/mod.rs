//! The fetch/execute loop and the per-instruction semantics.
//!
//! The VM owns the single [`Memory`] instance of the run and drives the
//! program counter: fetch `program[pc]`, increment, execute. Control-flow
//! instructions overwrite the counter and that write is final for the step.
//! Execution ends when the counter runs past the last instruction or `EXIT`
//! is executed.

mod binary;
mod io;
mod strings;

use crate::exceptions::{exc_err_fmt, ExcKind, RunResult};
use crate::io::{InputReader, PrintWriter};
use crate::memory::Memory;
use crate::program::{Arg, Instruction, Opcode, Program};
use crate::value::Value;

/// What an instruction body tells the loop to do next.
enum Flow {
    /// Fall through to whatever the counter points at now.
    Continue,
    /// Terminate the whole run with this exit code.
    Exit(u8),
}

pub(crate) struct Vm<'a, I: InputReader, P: PrintWriter> {
    program: &'a Program,
    memory: Memory,
    /// Index of the next instruction to execute.
    pc: usize,
    /// Instructions executed so far, reported by `BREAK`.
    executed: u64,
    input: &'a mut I,
    print: &'a mut P,
}

impl<'a, I: InputReader, P: PrintWriter> Vm<'a, I, P> {
    pub(crate) fn new(program: &'a Program, input: &'a mut I, print: &'a mut P) -> Self {
        Self {
            program,
            memory: Memory::new(),
            pc: 0,
            executed: 0,
            input,
            print,
        }
    }

    /// Runs the program to completion and returns its exit code.
    pub(crate) fn run(mut self) -> RunResult<u8> {
        let program = self.program;
        while let Some(instruction) = program.get(self.pc) {
            self.pc += 1;
            self.executed += 1;
            match self.execute(instruction) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit(code)) => return Ok(code),
                Err(err) => return Err(err.with_instruction(instruction.opcode, instruction.order)),
            }
        }
        Ok(0)
    }

    fn execute(&mut self, instruction: &Instruction) -> RunResult<Flow> {
        match instruction.opcode {
            Opcode::Move => {
                let value = self.resolve_value(&instruction.args[1])?;
                self.memory.write(instruction.var(0), value)?;
            }
            Opcode::CreateFrame => self.memory.create_frame(),
            Opcode::PushFrame => self.memory.push_frame()?,
            Opcode::PopFrame => self.memory.pop_frame()?,
            Opcode::DefVar => self.memory.define(instruction.var(0))?,
            Opcode::Call => {
                let target = self.program.lookup_label(instruction.label(0))?;
                self.memory.push_call(self.pc);
                self.pc = target;
            }
            Opcode::Return => self.pc = self.memory.pop_call()?,
            Opcode::Pushs => {
                let value = self.resolve_value(&instruction.args[0])?;
                self.memory.push_value(value);
            }
            Opcode::Pops => {
                let value = self.memory.pop_value()?;
                self.memory.write(instruction.var(0), value)?;
            }
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::IDiv => self.arithmetic(instruction)?,
            Opcode::Lt | Opcode::Gt | Opcode::Eq => self.comparison(instruction)?,
            Opcode::And | Opcode::Or => self.logic(instruction)?,
            Opcode::Not => self.negate(instruction)?,
            Opcode::Int2Char => self.int2char(instruction)?,
            Opcode::Stri2Int => self.stri2int(instruction)?,
            Opcode::Read => self.read(instruction)?,
            Opcode::Write => self.write(instruction)?,
            Opcode::Concat => self.concat(instruction)?,
            Opcode::Strlen => self.strlen(instruction)?,
            Opcode::GetChar => self.getchar(instruction)?,
            Opcode::SetChar => self.setchar(instruction)?,
            Opcode::Type => self.type_of(instruction)?,
            // labels were indexed before the run started
            Opcode::Label => {}
            Opcode::Jump => self.pc = self.program.lookup_label(instruction.label(0))?,
            Opcode::JumpIfEq | Opcode::JumpIfNeq => self.jump_conditional(instruction)?,
            Opcode::Exit => return self.exit(instruction),
            Opcode::DPrint => self.dprint(instruction)?,
            Opcode::Break => self.break_dump(instruction),
        }
        Ok(Flow::Continue)
    }

    /// Resolves an argument to its current value. A variable may still hold
    /// `Uninit`; only `TYPE` goes through this directly, everything else
    /// uses [`Self::resolve_value`].
    fn resolve(&self, arg: &Arg) -> RunResult<Value> {
        match arg {
            Arg::Var(var) => self.memory.read(var).cloned(),
            Arg::Literal(value) => Ok(value.clone()),
            Arg::Type(kind) => Ok(Value::Str(kind.to_string())),
            Arg::Label(name) => panic!("label {name:?} resolved as a value - loader bug"),
        }
    }

    /// Resolves an argument, rejecting uninitialized variables.
    fn resolve_value(&self, arg: &Arg) -> RunResult<Value> {
        match arg {
            Arg::Var(var) => {
                let value = self.memory.read(var)?;
                if matches!(value, Value::Uninit) {
                    return exc_err_fmt!(ExcKind::MissingValue; "variable {var} has no value");
                }
                Ok(value.clone())
            }
            other => self.resolve(other),
        }
    }

    /// The string value of an argument, `OperandType` otherwise.
    fn resolve_str(&self, arg: &Arg) -> RunResult<String> {
        let value = self.resolve_value(arg)?;
        match value {
            Value::Str(text) => Ok(text),
            other => exc_err_fmt!(ExcKind::OperandType; "expected string, got {}", other.kind_str()),
        }
    }

    /// The integer value of an argument, `OperandType` otherwise.
    fn resolve_int(&self, arg: &Arg) -> RunResult<i64> {
        let value = self.resolve_value(arg)?;
        match value {
            Value::Int(int) => Ok(int),
            other => exc_err_fmt!(ExcKind::OperandType; "expected int, got {}", other.kind_str()),
        }
    }

    fn jump_conditional(&mut self, instruction: &Instruction) -> RunResult<()> {
        // the target must exist even when the branch is not taken
        let target = self.program.lookup_label(instruction.label(0))?;
        let left = self.resolve_value(&instruction.args[1])?;
        let right = self.resolve_value(&instruction.args[2])?;
        let equal = binary::values_equal(&left, &right)?;
        if equal == (instruction.opcode == Opcode::JumpIfEq) {
            self.pc = target;
        }
        Ok(())
    }

    /// `TYPE` is total: an uninitialized operand yields the empty string
    /// instead of `MissingValue`.
    fn type_of(&mut self, instruction: &Instruction) -> RunResult<()> {
        let value = self.resolve(&instruction.args[1])?;
        let name = value.kind().map_or("", <&'static str>::from);
        self.memory.write(instruction.var(0), Value::Str(name.to_owned()))
    }

    fn exit(&mut self, instruction: &Instruction) -> RunResult<Flow> {
        let value = self.resolve_value(&instruction.args[0])?;
        match value {
            Value::Int(code @ 0..=49) => Ok(Flow::Exit(code as u8)),
            Value::Int(code) => {
                exc_err_fmt!(ExcKind::OperandValue; "exit code must be between 0 and 49, got {code}")
            }
            other => exc_err_fmt!(ExcKind::OperandType; "exit code must be int, got {}", other.kind_str()),
        }
    }
}
