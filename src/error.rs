//! Structured parse errors (spec §7).
//!
//! Every error the parser can raise boils down to one [`ParserError`]
//! carrying an [`ErrorKind`] tag, a human-readable message, and (once
//! [`crate::driver::parse`] has bound it to a source file) a resolved
//! [`SourcePos`]. Errors raised deep inside a grammar rule only know
//! their byte offset into the current file's token stream; the driver
//! stamps the file path and resolves line/column right before
//! returning the error to the caller, exactly as it resolves forward
//! references only after every file has been scanned (see
//! `driver::parse`).

use std::path::{Path, PathBuf};

use crate::lexer::Token;

/// The taxonomy from spec §7; every public failure mode uses exactly
/// one of these, not a one-off message-only variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    UnknownSymbol,
    DuplicateSymbol,
    MissingRequirement,
    BadInitialState,
    InvalidSubtype,
    ReservedName,
    IndexOutOfRange,
    Io,
}

/// Resolved file position, attached once a raw byte offset is known to
/// belong to a specific source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.render())]
pub struct ParserError {
    pub kind: ErrorKind,
    pub message: String,
    /// Byte offset into the current file's source text; meaningful
    /// only until [`ParserError::with_position`] resolves it.
    pub offset: usize,
    pub pos: Option<SourcePos>,
}

impl ParserError {
    fn render(&self) -> String {
        match &self.pos {
            Some(pos) => format!("{pos}: {:?}: {}", self.kind, self.message),
            None => format!("{:?}: {}", self.kind, self.message),
        }
    }

    fn new(kind: ErrorKind, message: impl Into<String>, offset: usize) -> Self {
        Self { kind, message: message.into(), offset, pos: None }
    }

    pub fn lexical(message: impl Into<String>, offset: usize) -> Self {
        Self::new(ErrorKind::Lexical, message, offset)
    }

    pub fn syntax(message: impl Into<String>, offset: usize) -> Self {
        Self::new(ErrorKind::Syntax, message, offset)
    }

    pub fn unknown_symbol(name: &str) -> Self {
        Self::new(ErrorKind::UnknownSymbol, format!("unknown symbol `{name}`"), 0)
    }

    pub fn unknown_symbol_at(name: &str, offset: usize) -> Self {
        Self::new(ErrorKind::UnknownSymbol, format!("unknown symbol `{name}`"), offset)
    }

    pub fn duplicate_symbol(name: &str) -> Self {
        Self::new(ErrorKind::DuplicateSymbol, format!("duplicate symbol `{name}`"), 0)
    }

    pub fn duplicate_symbol_at(name: &str, offset: usize) -> Self {
        Self::new(ErrorKind::DuplicateSymbol, format!("duplicate symbol `{name}`"), offset)
    }

    pub fn missing_requirement(construct: &str, requirement: &str, offset: usize) -> Self {
        Self::new(
            ErrorKind::MissingRequirement,
            format!("`{construct}` requires requirement `:{requirement}`"),
            offset,
        )
    }

    pub fn bad_initial_state(message: impl Into<String>, offset: usize) -> Self {
        Self::new(ErrorKind::BadInitialState, message, offset)
    }

    pub fn invalid_subtype(message: impl Into<String>, offset: usize) -> Self {
        Self::new(ErrorKind::InvalidSubtype, message, offset)
    }

    pub fn reserved_name(message: impl Into<String>, offset: usize) -> Self {
        Self::new(ErrorKind::ReservedName, message, offset)
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfRange, format!("index {index} out of range (len {len})"), 0)
    }

    pub fn io(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Io, format!("{}: {message}", path.display()), 0)
    }

    pub fn expected_token(expected: Token, found: Option<Token>, input: &crate::lexer::TokenStream) -> Self {
        let message = match found {
            Some(found) => format!("expected {expected}, found {found}"),
            None => format!("expected {expected}, found end of input"),
        };
        Self::syntax(message, input.offset())
    }

    pub fn expected(description: &str, input: &crate::lexer::TokenStream) -> Self {
        let message = match input.peek() {
            Some(found) => format!("expected {description}, found {found}"),
            None => format!("expected {description}, found end of input"),
        };
        Self::syntax(message, input.offset())
    }

    /// Resolves `offset` against `source` and stamps `file`, turning an
    /// offset-only error raised deep in a grammar rule into the
    /// file/line/column-carrying error the driver hands back to
    /// callers.
    pub fn with_position(mut self, file: &Path, source: &str) -> Self {
        let (line, column) = resolve_line_column(source, self.offset);
        self.pos = Some(SourcePos { file: file.to_path_buf(), line, column });
        self
    }
}

fn resolve_line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut column = 1;
    for ch in source[..offset].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

impl<'a> nom::error::ParseError<crate::lexer::TokenStream<'a>> for ParserError {
    fn from_error_kind(input: crate::lexer::TokenStream<'a>, kind: nom::error::ErrorKind) -> Self {
        ParserError::syntax(format!("{kind:?}"), input.offset())
    }

    fn append(_input: crate::lexer::TokenStream<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<ParserError>> for ParserError {
    fn from(err: nom::Err<ParserError>) -> Self {
        match err {
            nom::Err::Incomplete(_) => ParserError::syntax("incomplete input", 0),
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_multiline_offsets() {
        let source = "abc\ndef\nghi";
        assert_eq!(resolve_line_column(source, 0), (1, 1));
        assert_eq!(resolve_line_column(source, 4), (2, 1));
        assert_eq!(resolve_line_column(source, 9), (3, 2));
    }

    #[test]
    fn with_position_stamps_file_and_line() {
        let err = ParserError::syntax("boom", 4).with_position(Path::new("d.pddl"), "abc\ndef");
        let pos = err.pos.unwrap();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.file, PathBuf::from("d.pddl"));
    }
}
