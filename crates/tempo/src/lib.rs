//! Front end for the Tempo templating language: a small curly-brace host
//! language extended with markup tags, `@` attributes and `\{expr}` string
//! interpolation. The crate parses source into an AST, checks where the
//! templating constructs may appear, and can serialize the tree back to
//! source text. Errors are collected as diagnostics, never returned early;
//! every entry point yields a best-effort result plus the full list.

use std::fs;
use std::path::Path;

use thiserror::Error;

pub mod diagnostics;
mod printer;
mod scanner;
pub mod syntax;
mod token;

mod analyzer;

pub use analyzer::analyze;
pub use printer::print_source;
pub use syntax::parse_source;

use diagnostics::FileDiagnostic;
use syntax::SourceFile;

#[derive(Debug, Error)]
pub enum TempoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Read a file from disk and parse it. Syntax problems are reported through
/// the diagnostics list; only filesystem failures surface as errors.
pub fn load_source(path: &Path) -> Result<(SourceFile, Vec<FileDiagnostic>), TempoError> {
    if !path.is_file() {
        return Err(TempoError::InvalidPath(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_source(path, &content))
}

/// Parse and analyze in one step, with the diagnostics of both phases in
/// source order per phase.
pub fn check_source(path: &Path, content: &str) -> (SourceFile, Vec<FileDiagnostic>) {
    let (file, mut diagnostics) = parse_source(path, content);
    diagnostics.extend(analyze(&file));
    (file, diagnostics)
}
