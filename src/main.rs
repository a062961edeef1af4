use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as ReplResult};

use horizon::{parse, tokenize, Interpreter, Value};

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let outcome = if args.len() < 2 {
        run_repl().map_err(|err| format!("Error: {err}"))
    } else {
        run_script(&args[1])
    };
    if let Err(msg) = outcome {
        eprintln!("{msg}");
        std::process::exit(1);
    }
}

fn run_script(filename: &str) -> Result<(), String> {
    let source = std::fs::read_to_string(filename)
        .map_err(|_| format!("{filename} not found. No such file or directory."))?;
    let mut interpreter = Interpreter::new();
    let result = interpreter
        .run(&source)
        .map_err(|err| format!("Error: {err}"))?;
    println!("{result}");
    Ok(())
}

fn run_repl() -> ReplResult<()> {
    let mut rl = DefaultEditor::new()?;
    let mut interpreter = Interpreter::new();
    let mut debug = false;
    println!("Horizon interpreter v{}", env!("CARGO_PKG_VERSION"));
    loop {
        let readline = rl.readline("> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                match line {
                    "exit" => break,
                    "debug" => {
                        debug = !debug;
                        println!("debug output {}", if debug { "on" } else { "off" });
                    }
                    _ => match evaluate_line(&mut interpreter, line, debug) {
                        Ok(value) => println!("{value}"),
                        Err(err) => println!("Error: {err}"),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

fn evaluate_line(interpreter: &mut Interpreter, line: &str, debug: bool) -> horizon::Result<Value> {
    let tokens = tokenize(line)?;
    let program = parse(&tokens)?;
    if debug {
        for token in tokens.iter() {
            println!("{token}");
        }
        println!("{program:?}");
    }
    interpreter.evaluate(&program)
}
