use std::fmt;

use ahash::AHashMap;

use crate::exceptions::{exc_err_fmt, exc_err_static, exc_fmt, exc_static, ExcKind, RunResult};
use crate::program::{FrameKind, VarRef};
use crate::value::Value;

/// A single frame: variable name mapped to its current value.
#[derive(Debug, Default)]
pub struct Frame(AHashMap<String, Value>);

impl Frame {
    fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Variable names and values, sorted by name for deterministic dumps.
    fn sorted_vars(&self) -> Vec<(&str, &Value)> {
        let mut vars: Vec<_> = self.0.iter().map(|(name, value)| (name.as_str(), value)).collect();
        vars.sort_unstable_by_key(|(name, _)| *name);
        vars
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.sorted_vars().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={}", value.literal_form())?;
        }
        f.write_str("}")
    }
}

/// Complete execution state of one program run.
///
/// Owns the global frame, the optional temporary frame, the frame stack
/// (whose top is the active local frame), the data stack, and the call
/// stack. Exactly one instance exists per run; the VM constructs it and
/// threads it explicitly, there is no process-wide state.
///
/// `PUSHFRAME` moves ownership of TF onto the frame stack and leaves TF
/// absent; `POPFRAME` moves the top frame back into TF, discarding any
/// frame TF held before.
#[derive(Debug, Default)]
pub struct Memory {
    global: Frame,
    temporary: Option<Frame>,
    frames: Vec<Frame>,
    data: Vec<Value>,
    calls: Vec<usize>,
}

impl Memory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The active frame for `kind`. LF and TF may be absent.
    fn frame(&self, kind: FrameKind) -> RunResult<&Frame> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self
                .frames
                .last()
                .ok_or_else(|| exc_static!(ExcKind::FrameAbsent; "the local frame stack is empty")),
            FrameKind::Temporary => self
                .temporary
                .as_ref()
                .ok_or_else(|| exc_static!(ExcKind::FrameAbsent; "no temporary frame has been created")),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> RunResult<&mut Frame> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self
                .frames
                .last_mut()
                .ok_or_else(|| exc_static!(ExcKind::FrameAbsent; "the local frame stack is empty")),
            FrameKind::Temporary => self
                .temporary
                .as_mut()
                .ok_or_else(|| exc_static!(ExcKind::FrameAbsent; "no temporary frame has been created")),
        }
    }

    /// Adds an uninitialized slot for `DEFVAR`.
    pub(crate) fn define(&mut self, var: &VarRef) -> RunResult<()> {
        let frame = self.frame_mut(var.frame)?;
        if frame.0.contains_key(&var.name) {
            return exc_err_fmt!(ExcKind::Semantic; "variable {var} is already defined");
        }
        frame.0.insert(var.name.clone(), Value::Uninit);
        Ok(())
    }

    /// The slot's current value. The result may be `Uninit`; callers that
    /// need an actual value reject that themselves.
    pub(crate) fn read(&self, var: &VarRef) -> RunResult<&Value> {
        self.frame(var.frame)?
            .get(&var.name)
            .ok_or_else(|| exc_fmt!(ExcKind::UndefVariable; "variable {var} is not defined"))
    }

    /// Replaces the slot's value. The slot must already exist.
    pub(crate) fn write(&mut self, var: &VarRef, value: Value) -> RunResult<()> {
        let slot = self
            .frame_mut(var.frame)?
            .get_mut(&var.name)
            .ok_or_else(|| exc_fmt!(ExcKind::UndefVariable; "variable {var} is not defined"))?;
        *slot = value;
        Ok(())
    }

    /// `CREATEFRAME`: replaces TF with a fresh empty frame.
    pub(crate) fn create_frame(&mut self) {
        self.temporary = Some(Frame::default());
    }

    /// `PUSHFRAME`: TF becomes the new top of the frame stack (the active LF)
    /// and is left absent.
    pub(crate) fn push_frame(&mut self) -> RunResult<()> {
        match self.temporary.take() {
            Some(frame) => {
                self.frames.push(frame);
                Ok(())
            }
            None => exc_err_static!(ExcKind::FrameAbsent; "PUSHFRAME without a temporary frame"),
        }
    }

    /// `POPFRAME`: the top of the frame stack becomes TF.
    pub(crate) fn pop_frame(&mut self) -> RunResult<()> {
        match self.frames.pop() {
            Some(frame) => {
                self.temporary = Some(frame);
                Ok(())
            }
            None => exc_err_static!(ExcKind::FrameAbsent; "POPFRAME with an empty frame stack"),
        }
    }

    pub(crate) fn push_value(&mut self, value: Value) {
        self.data.push(value);
    }

    pub(crate) fn pop_value(&mut self) -> RunResult<Value> {
        self.data
            .pop()
            .ok_or_else(|| exc_static!(ExcKind::MissingValue; "the data stack is empty"))
    }

    pub(crate) fn push_call(&mut self, return_pc: usize) {
        self.calls.push(return_pc);
    }

    pub(crate) fn pop_call(&mut self) -> RunResult<usize> {
        self.calls
            .pop()
            .ok_or_else(|| exc_static!(ExcKind::MissingValue; "the call stack is empty"))
    }
}

/// The `BREAK` state dump.
impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "global frame: {}", self.global)?;
        match &self.temporary {
            Some(frame) => writeln!(f, "temporary frame: {frame}")?,
            None => writeln!(f, "temporary frame: none")?,
        }
        match self.frames.last() {
            Some(frame) => writeln!(f, "local frame: {frame} (stack depth {})", self.frames.len())?,
            None => writeln!(f, "local frame: none")?,
        }
        writeln!(f, "data stack: {} value(s)", self.data.len())?;
        writeln!(f, "call stack: {} return address(es)", self.calls.len())
    }
}
