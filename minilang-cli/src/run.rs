//! Non-interactive CLI surfaces: running a file or an inline code string,
//! and the `-t`/`-a` debug printers.

use minilang::{parse, print_ast, tokenize, Engine};

use crate::error::{CliError, Result};

/// Prints every token of `code`, one per line.
pub fn show_tokens(code: &str) -> Result<()> {
    let tokens = tokenize(code)?;
    println!("\nTokens:");
    for token in &tokens {
        println!("  {token}");
    }
    println!();
    Ok(())
}

/// Prints the pretty-printed AST of `code`.
pub fn show_ast(code: &str) -> Result<()> {
    let program = parse(code)?;
    println!("\nAST:");
    println!("{}", print_ast(&program));
    Ok(())
}

/// Runs `code` to completion with a fresh engine.
pub fn run_code(code: &str) -> Result<()> {
    let engine = Engine::new();
    engine.eval(code)?;
    Ok(())
}

/// Runs the contents of `path`, optionally printing the first 20 tokens and
/// the AST before executing (spec §6: `-d/--debug`).
pub fn run_file(path: &str, debug: bool) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .map_err(|source| CliError::ReadSource { path: path.to_string(), source })?;

    if debug {
        println!("\n=== Running: {path} ===\n");
    }

    let tokens = tokenize(&source)?;

    if debug {
        println!("Tokens:");
        for token in tokens.iter().take(20) {
            println!("  {token}");
        }
        if tokens.len() > 20 {
            println!("  ... and {} more tokens", tokens.len() - 20);
        }
        println!();
    }

    let (program, errors) = minilang::Parser::new(tokens).parse();
    if let Some(first) = errors.into_iter().next() {
        return Err(first.into());
    }

    if debug {
        println!("AST:");
        println!("{}", print_ast(&program));
        println!("\n=== Output ===\n");
    }

    let engine = Engine::new();
    engine.run(&program)?;
    Ok(())
}
