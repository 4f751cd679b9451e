use std::borrow::Cow;
use std::io::BufRead;

/// Trait for handling the output streams of an interpreted program.
///
/// `WRITE` goes to the stdout channel, `DPRINT` and `BREAK` to the stderr
/// channel. Implement this to capture or redirect output; the default
/// implementation [`StdPrint`] writes to the process streams.
pub trait PrintWriter {
    /// Called once per `WRITE` with the rendered value.
    ///
    /// No separator or newline is added; programs control line endings
    /// through `\010` escapes in their string literals.
    fn stdout_write(&mut self, output: Cow<'_, str>);

    /// Called with diagnostic text from `DPRINT` and `BREAK`.
    fn stderr_write(&mut self, output: Cow<'_, str>);
}

/// Default `PrintWriter` that writes to stdout and stderr.
#[derive(Debug)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) {
        print!("{output}");
    }

    fn stderr_write(&mut self, output: Cow<'_, str>) {
        eprint!("{output}");
    }
}

/// A `PrintWriter` that collects both channels into strings.
///
/// Useful for testing or capturing program output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint {
    stdout: String,
    stderr: String,
}

impl CollectStringPrint {
    /// Creates a new empty `CollectStringPrint`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected `WRITE` output.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.stdout
    }

    /// The collected `DPRINT`/`BREAK` output.
    #[must_use]
    pub fn diagnostics(&self) -> &str {
        &self.stderr
    }

    /// Consumes the writer and returns the collected `WRITE` output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.stdout
    }
}

impl PrintWriter for CollectStringPrint {
    fn stdout_write(&mut self, output: Cow<'_, str>) {
        self.stdout.push_str(&output);
    }

    fn stderr_write(&mut self, output: Cow<'_, str>) {
        self.stderr.push_str(&output);
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn stdout_write(&mut self, _output: Cow<'_, str>) {}

    fn stderr_write(&mut self, _output: Cow<'_, str>) {}
}

/// Trait supplying input lines to the `READ` instruction.
pub trait InputReader {
    /// The next input line without its terminator, or `None` at end of
    /// input.
    fn read_line(&mut self) -> Option<String>;
}

/// Reads lines from any buffered reader: a locked stdin, a file.
#[derive(Debug)]
pub struct BufInput<R: BufRead>(R);

impl<R: BufRead> BufInput<R> {
    pub fn new(reader: R) -> Self {
        Self(reader)
    }
}

impl<R: BufRead> InputReader for BufInput<R> {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.0.read_line(&mut line) {
            // a read error ends the input stream the same way EOF does
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

/// Input lines taken from a fixed string, for tests and embedding.
#[derive(Debug)]
pub struct LinesInput {
    lines: std::vec::IntoIter<String>,
}

impl LinesInput {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_owned).collect();
        Self {
            lines: lines.into_iter(),
        }
    }
}

impl InputReader for LinesInput {
    fn read_line(&mut self) -> Option<String> {
        self.lines.next()
    }
}

/// Input that is always at end of file.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputReader for NoInput {
    fn read_line(&mut self) -> Option<String> {
        None
    }
}
