use std::io::{self, Read};
use std::process::ExitCode;
use std::{env, fs};

use ippi::{BufInput, IppRun, StdPrint};

const USAGE: &str = "\
usage: ippi [--source=FILE] [--input=FILE]

Interprets an IPPcode23 XML program.

  --source=FILE  path to the XML program (stdin when omitted)
  --input=FILE   path to the runtime input for READ (stdin when omitted)
  --help         print this message and exit
";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut source_path: Option<String> = None;
    let mut input_path: Option<String> = None;
    let mut help = false;

    for arg in &args {
        if arg == "--help" {
            help = true;
        } else if let Some(path) = arg.strip_prefix("--source=") {
            source_path = Some(path.to_owned());
        } else if let Some(path) = arg.strip_prefix("--input=") {
            input_path = Some(path.to_owned());
        } else {
            eprintln!("error 10: unknown argument {arg:?}");
            eprint!("{USAGE}");
            return ExitCode::from(10);
        }
    }

    if help {
        if args.len() > 1 {
            eprintln!("error 10: --help cannot be combined with other arguments");
            return ExitCode::from(10);
        }
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let source = match read_source(source_path.as_deref()) {
        Ok(source) => source,
        Err(message) => {
            eprintln!("error 11: {message}");
            return ExitCode::from(11);
        }
    };

    let run = match IppRun::new(&source) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("error {}: {err}", err.exit_code());
            return ExitCode::from(err.exit_code());
        }
    };

    let outcome = match input_path.as_deref() {
        Some(path) => match fs::File::open(path) {
            Ok(file) => run.run(&mut BufInput::new(io::BufReader::new(file)), &mut StdPrint),
            Err(err) => {
                eprintln!("error 11: cannot open input file {path:?}: {err}");
                return ExitCode::from(11);
            }
        },
        None => {
            let stdin = io::stdin();
            run.run(&mut BufInput::new(stdin.lock()), &mut StdPrint)
        }
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error {}: {err}", err.exit_code());
            ExitCode::from(err.exit_code())
        }
    }
}

fn read_source(path: Option<&str>) -> Result<String, String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).map_err(|err| format!("cannot read source file {path:?}: {err}"))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|err| format!("cannot read source from stdin: {err}"))?;
            Ok(source)
        }
    }
}
