use std::borrow::Cow;
use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::program::Opcode;

/// Error classes the interpreter diagnoses.
///
/// Uses strum derives for automatic `Display` and `Into<&'static str>`
/// implementations. Each class is tied to the process exit code the run
/// terminates with; nothing is recovered locally, the first error aborts
/// execution and surfaces its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ExcKind {
    /// Command line flags that make no sense together or at all.
    Usage,
    /// A `--source` or `--input` file that cannot be opened or read.
    InputFile,
    /// The source document is not well-formed XML.
    XmlFormat,
    /// Well-formed XML that does not encode an IPPcode23 program:
    /// unknown opcode, bad order, bad operand literal.
    XmlStructure,
    /// Duplicate label, redefined variable, jump to an unknown label.
    Semantic,
    /// An operand resolved to a value of the wrong kind.
    OperandType,
    /// Access to a variable never defined in its frame.
    UndefVariable,
    /// LF or TF accessed while absent.
    FrameAbsent,
    /// Pop from an empty stack, or a read of an uninitialized variable.
    MissingValue,
    /// A value of the right kind outside its allowed range.
    OperandValue,
    /// String indexing outside the string.
    StringError,
}

impl ExcKind {
    /// The process exit code this error class terminates with.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Usage => 10,
            Self::InputFile => 11,
            Self::XmlFormat => 31,
            Self::XmlStructure => 32,
            Self::Semantic => 52,
            Self::OperandType => 53,
            Self::UndefVariable => 54,
            Self::FrameAbsent => 55,
            Self::MissingValue => 56,
            Self::OperandValue => 57,
            Self::StringError => 58,
        }
    }
}

/// A diagnosed failure.
///
/// Instruction bodies construct errors with just a kind and a message; the
/// dispatch loop attaches the opcode and source order of the instruction that
/// failed, so diagnostics can point back into the program.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ExcKind,
    message: Cow<'static, str>,
    instruction: Option<(Opcode, u32)>,
}

impl Error {
    #[must_use]
    pub fn new(kind: ExcKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            instruction: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ExcKind {
        self.kind
    }

    /// The process exit code this error terminates with.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    /// The opcode and order of the failing instruction, once attached.
    #[must_use]
    pub fn instruction(&self) -> Option<(Opcode, u32)> {
        self.instruction
    }

    /// Attaches the failing instruction. The innermost attachment wins.
    pub(crate) fn with_instruction(mut self, opcode: Opcode, order: u32) -> Self {
        if self.instruction.is_none() {
            self.instruction = Some((opcode, order));
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((opcode, order)) = self.instruction {
            write!(f, "{opcode} (order {order}): ")?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

pub type RunResult<T> = Result<T, Error>;

macro_rules! exc_static {
    ($kind:expr; $msg:expr) => {
        crate::exceptions::Error::new($kind, $msg)
    };
}
pub(crate) use exc_static;

macro_rules! exc_fmt {
    ($kind:expr; $($fmt_args:tt)*) => {
        crate::exceptions::Error::new($kind, format!($($fmt_args)*))
    };
}
pub(crate) use exc_fmt;

macro_rules! exc_err_static {
    ($kind:expr; $msg:expr) => {
        Err(crate::exceptions::exc_static!($kind; $msg))
    };
}
pub(crate) use exc_err_static;

macro_rules! exc_err_fmt {
    ($kind:expr; $($fmt_args:tt)*) => {
        Err(crate::exceptions::exc_fmt!($kind; $($fmt_args)*))
    };
}
pub(crate) use exc_err_fmt;
