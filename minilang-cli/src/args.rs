use clap::Parser;

/// MiniLang - a small tree-walking scripting language.
///
/// With no arguments, starts an interactive REPL. With `FILE`, runs that
/// source file. The `-t`/`-a`/`-c` flags run an inline code string through
/// just the tokenizer, the parser, or the full evaluator.
#[derive(Parser, Debug)]
#[command(name = "minilang")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A tree-walking interpreter for the MiniLang scripting language", long_about = None)]
pub struct Cli {
    /// Source file to run.
    pub file: Option<String>,

    /// Print the first 20 tokens and the AST before running FILE.
    #[arg(short, long)]
    pub debug: bool,

    /// Print tokens for an inline code string instead of running anything.
    #[arg(short, long, value_name = "CODE")]
    pub tokens: Option<String>,

    /// Print the AST for an inline code string instead of running anything.
    #[arg(short, long, value_name = "CODE")]
    pub ast: Option<String>,

    /// Run an inline code string instead of FILE.
    #[arg(short = 'c', long, value_name = "CODE")]
    pub code: Option<String>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
