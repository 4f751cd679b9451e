//! An interpreter for IPPcode23, a three-address instruction language
//! serialized as XML.
//!
//! A program is loaded and validated once with [`IppRun::new`], then
//! executed against a frame-based memory and a data stack. Output streams
//! and runtime input are abstracted behind [`PrintWriter`] and
//! [`InputReader`], so interpreted programs can run against the process
//! streams or be captured entirely in memory:
//!
//! ```
//! use ippi::{CollectStringPrint, IppRun, NoInput};
//!
//! let source = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode23">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">Hello</arg1>
//!   </instruction>
//! </program>"#;
//!
//! let run = IppRun::new(source).unwrap();
//! let mut print = CollectStringPrint::new();
//! let code = run.run(&mut NoInput, &mut print).unwrap();
//! assert_eq!(print.output(), "Hello");
//! assert_eq!(code, 0);
//! ```
//!
//! Every diagnosable failure maps to a fixed process exit code through
//! [`Error::exit_code`]; see [`ExcKind`] for the taxonomy.

mod exceptions;
mod io;
mod memory;
mod parse;
mod program;
mod run;
mod value;
mod vm;

pub use crate::{
    exceptions::{Error, ExcKind, RunResult},
    io::{BufInput, CollectStringPrint, InputReader, LinesInput, NoInput, NoPrint, PrintWriter, StdPrint},
    program::{FrameKind, Opcode, Program, VarRef},
    run::IppRun,
    value::{Value, ValueKind},
};
