//! Error handling for the `minilang` CLI.

use thiserror::Error;

/// Errors the CLI layer can produce on top of the library's own lex/parse/
/// runtime error kinds.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("could not read '{path}': {source}")]
    ReadSource { path: String, #[source] source: std::io::Error },

    #[error("lex error: {0}")]
    Lex(#[from] minilang::LexError),

    #[error("parse error: {0}")]
    Parse(#[from] minilang::ParseError),

    #[error("runtime error: {0}")]
    Eval(#[from] minilang::EvalError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_source_error_includes_the_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CliError::ReadSource { path: "missing.ml".to_string(), source: io_err };
        assert!(err.to_string().contains("missing.ml"));
    }
}
