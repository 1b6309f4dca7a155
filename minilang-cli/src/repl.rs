//! The interactive REPL: accumulates input until brace-depth returns to
//! zero, then executes, auto-printing the value of a trailing expression
//! statement. Also recognizes a handful of single-line meta-commands before
//! falling back to MiniLang evaluation.

use std::io::{self, Write as _};

use minilang::{Engine, Value};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const BANNER: &str = concat!(
    "MiniLang v",
    env!("CARGO_PKG_VERSION"),
    "\nA tree-walking interpreter for the MiniLang scripting language.\n",
    "Type 'help' for commands, 'exit' or Ctrl+D to quit.\n"
);

const HELP_TEXT: &str = "
Available commands:
  help          - Show this help message
  exit, quit    - Exit the interpreter
  clear         - Clear the screen
  tokens <code> - Show tokens for the given code
  ast <code>    - Show AST for the given code
  run <file>    - Run a MiniLang file

Example usage:
  >>> let x = 10
  >>> print(x * 2)
  20
  >>> func greet(name) { print(\"Hello, \" + name) }
  >>> greet(\"World\")
  Hello, World
";

fn print_version() {
    println!("MiniLang {VERSION}");
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        Err(_) => None,
    }
}

fn brace_balance(line: &str) -> i32 {
    line.chars().filter(|&c| c == '{').count() as i32 - line.chars().filter(|&c| c == '}').count() as i32
}

/// Runs the REPL loop on standard input/output until EOF, `exit`, or `quit`.
pub fn run() {
    println!("{BANNER}");

    let engine = Engine::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut brace_count = 0i32;

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };
        let Some(line) = read_line(prompt) else {
            println!("\nGoodbye!");
            break;
        };

        if buffer.is_empty() {
            let stripped = line.trim();
            match stripped {
                "exit" | "quit" => {
                    println!("Goodbye!");
                    break;
                }
                "help" => {
                    println!("{HELP_TEXT}");
                    continue;
                }
                "clear" => {
                    print!("\x1B[2J\x1B[1;1H");
                    let _ = io::stdout().flush();
                    continue;
                }
                "version" => {
                    print_version();
                    continue;
                }
                _ => {}
            }
            if let Some(code) = stripped.strip_prefix("tokens ") {
                if let Err(e) = crate::run::show_tokens(code) {
                    println!("Lexer Error: {e}");
                }
                continue;
            }
            if let Some(code) = stripped.strip_prefix("ast ") {
                if let Err(e) = crate::run::show_ast(code) {
                    println!("{e}");
                }
                continue;
            }
            if let Some(path) = stripped.strip_prefix("run ") {
                if let Err(e) = crate::run::run_file(path.trim(), false) {
                    println!("{e}");
                }
                continue;
            }
        }

        buffer.push(line.clone());
        brace_count += brace_balance(&line);

        if brace_count > 0 {
            continue;
        }

        let code = buffer.join("\n");
        buffer.clear();
        brace_count = 0;

        if code.trim().is_empty() {
            continue;
        }

        match minilang::parse(&code) {
            Ok(program) => match engine.run(&program) {
                Ok(value) => {
                    if !matches!(value, Value::Null) {
                        println!("{value}");
                    }
                }
                Err(e) => println!("Runtime Error: {e}"),
            },
            Err(e) => println!("Parse Error: {e}"),
        }
    }
}
