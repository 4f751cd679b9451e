use std::io;

use crate::exceptions::RunResult;
use crate::io::{BufInput, InputReader, PrintWriter, StdPrint};
use crate::parse::parse_program;
use crate::program::Program;
use crate::vm::Vm;

/// A loaded and validated IPPcode23 program, ready to execute.
///
/// Construction performs everything that can fail statically: XML parsing,
/// structural validation, operand literal parsing, and label preprocessing.
/// [`IppRun::run`] can then only fail with runtime errors, and may be called
/// repeatedly; every call executes against a fresh memory.
#[derive(Debug)]
pub struct IppRun {
    program: Program,
}

impl IppRun {
    /// Parses and validates an IPPcode23 XML document.
    ///
    /// # Errors
    /// `XmlFormat` (31) when the document is not well-formed XML,
    /// `XmlStructure` (32) for structural and lexical faults, `Semantic`
    /// (52) for duplicate labels.
    pub fn new(source: &str) -> RunResult<Self> {
        Ok(Self {
            program: parse_program(source)?,
        })
    }

    /// Executes the program and returns its exit code: 0 after running past
    /// the last instruction, or the `EXIT` operand.
    ///
    /// # Errors
    /// Any runtime error from the taxonomy (52-58), carrying the opcode and
    /// order of the failing instruction.
    pub fn run(&self, input: &mut impl InputReader, print: &mut impl PrintWriter) -> RunResult<u8> {
        Vm::new(&self.program, input, print).run()
    }

    /// Executes against the process streams.
    pub fn run_stdio(&self) -> RunResult<u8> {
        let stdin = io::stdin();
        let mut input = BufInput::new(stdin.lock());
        self.run(&mut input, &mut StdPrint)
    }

    /// The loaded program, for inspection.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }
}
