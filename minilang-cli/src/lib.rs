pub mod args;
pub mod error;
pub mod repl;
pub mod run;

pub use args::Cli;
pub use error::{CliError, Result};
