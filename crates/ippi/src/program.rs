use std::fmt;

use ahash::AHashMap;

use strum::{Display, EnumString, IntoStaticStr};

use crate::exceptions::{exc_err_fmt, exc_fmt, ExcKind, RunResult};
use crate::value::{Value, ValueKind};

/// The IPPcode23 opcode set.
///
/// The string forms are the uppercase spellings used in the XML (`MOVE`,
/// `CREATEFRAME`, ...); source opcodes are matched case-insensitively by
/// normalizing to uppercase before `from_str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Opcode {
    Move,
    CreateFrame,
    PushFrame,
    PopFrame,
    DefVar,
    Call,
    Return,
    Pushs,
    Pops,
    Add,
    Sub,
    Mul,
    IDiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    Int2Char,
    Stri2Int,
    Read,
    Write,
    Concat,
    Strlen,
    GetChar,
    SetChar,
    Type,
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    Exit,
    DPrint,
    Break,
}

/// Category of argument an opcode position admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgSpec {
    /// A variable reference.
    Var,
    /// Anything that resolves to a value: a variable reference or a literal.
    Symb,
    /// A label name.
    Label,
    /// One of the kind names `int`, `bool`, `string`, `nil`.
    Type,
}

impl Opcode {
    /// Admissible argument categories by position. The loader checks every
    /// instruction against this table before the program can run.
    pub(crate) fn signature(self) -> &'static [ArgSpec] {
        use ArgSpec::{Label, Symb, Type, Var};
        match self {
            Self::CreateFrame | Self::PushFrame | Self::PopFrame | Self::Return | Self::Break => &[],
            Self::DefVar | Self::Pops => &[Var],
            Self::Pushs | Self::Write | Self::DPrint | Self::Exit => &[Symb],
            Self::Call | Self::Label | Self::Jump => &[Label],
            Self::Move | Self::Not | Self::Int2Char | Self::Strlen | Self::Type => &[Var, Symb],
            Self::Read => &[Var, Type],
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::IDiv
            | Self::Lt
            | Self::Gt
            | Self::Eq
            | Self::And
            | Self::Or
            | Self::Stri2Int
            | Self::Concat
            | Self::GetChar
            | Self::SetChar => &[Var, Symb, Symb],
            Self::JumpIfEq | Self::JumpIfNeq => &[Label, Symb, Symb],
        }
    }
}

/// Frame role a variable reference names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum FrameKind {
    #[strum(serialize = "GF")]
    Global,
    #[strum(serialize = "LF")]
    Local,
    #[strum(serialize = "TF")]
    Temporary,
}

/// A `FRAME@name` variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarRef {
    pub frame: FrameKind,
    pub name: String,
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// A parsed instruction argument.
///
/// Literals are parsed once at load time; variable references resolve at use
/// time through the memory. A `label` is a symbol and never resolves to a
/// value; a `type` resolves to its kind name.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Var(VarRef),
    Literal(Value),
    Label(String),
    Type(ValueKind),
}

impl Arg {
    pub(crate) fn spec(&self) -> ArgSpec {
        match self {
            Self::Var(_) => ArgSpec::Var,
            Self::Literal(_) => ArgSpec::Symb,
            Self::Label(_) => ArgSpec::Label,
            Self::Type(_) => ArgSpec::Type,
        }
    }

    /// Short description for loader diagnostics.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Var(_) => "a variable",
            Self::Literal(_) => "a literal",
            Self::Label(_) => "a label",
            Self::Type(_) => "a type name",
        }
    }
}

/// One instruction: normalized opcode, 1-based source order, arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub order: u32,
    pub args: Vec<Arg>,
}

impl Instruction {
    /// The variable reference at `idx`. The loader has already matched the
    /// signature, so a mismatch here is a loader bug.
    pub(crate) fn var(&self, idx: usize) -> &VarRef {
        match &self.args[idx] {
            Arg::Var(var) => var,
            other => panic!("{} argument {idx} is {other:?}, not a variable - loader bug", self.opcode),
        }
    }

    /// The label name at `idx`. See [`Instruction::var`].
    pub(crate) fn label(&self, idx: usize) -> &str {
        match &self.args[idx] {
            Arg::Label(name) => name,
            other => panic!("{} argument {idx} is {other:?}, not a label - loader bug", self.opcode),
        }
    }

    /// The type tag at `idx`. See [`Instruction::var`].
    pub(crate) fn type_tag(&self, idx: usize) -> ValueKind {
        match &self.args[idx] {
            Arg::Type(kind) => *kind,
            other => panic!("{} argument {idx} is {other:?}, not a type - loader bug", self.opcode),
        }
    }
}

/// A validated program: instructions in execution order plus the label table.
#[derive(Debug)]
pub struct Program {
    instructions: Vec<Instruction>,
    labels: AHashMap<String, usize>,
}

impl Program {
    /// Freezes the instruction list and indexes every `LABEL` definition.
    ///
    /// This is the one-shot preprocessing pass: it runs before any
    /// instruction can execute, and the table is read-only afterwards.
    /// Duplicate labels are rejected here.
    pub(crate) fn new(instructions: Vec<Instruction>) -> RunResult<Self> {
        let mut labels = AHashMap::new();
        for (index, instruction) in instructions.iter().enumerate() {
            if instruction.opcode == Opcode::Label {
                let name = instruction.label(0);
                if labels.insert(name.to_owned(), index).is_some() {
                    return exc_err_fmt!(ExcKind::Semantic; "label {name:?} is defined more than once");
                }
            }
        }
        Ok(Self { instructions, labels })
    }

    pub(crate) fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The label table: name and the instruction index it is bound to.
    pub fn labels(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(name, index)| (name.as_str(), *index))
    }

    /// The instruction index a label is bound to.
    pub(crate) fn lookup_label(&self, name: &str) -> RunResult<usize> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| exc_fmt!(ExcKind::Semantic; "label {name:?} is not defined"))
    }
}
