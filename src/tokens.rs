//! Leaf-level token parsers (spec C13, the innermost grammar rules).
//!
//! These mirror the teacher's `id`/`var`/`integer`/`float` functions:
//! thin `nom`-compatible wrappers around a single token match. Every
//! higher-level grammar rule in `parser::*` is built out of these plus
//! `Token`'s own `nom::Parser` impl (`Token::OpenParen`, `Token::And`,
//! ... can be used directly as parsers).

use nom::IResult;

use crate::domain::expr::Number;
use crate::error::ParserError;
use crate::lexer::{Token, TokenStream};

/// Parses a plain identifier (not a `?`-prefixed variable).
pub fn id(i: TokenStream) -> IResult<TokenStream, String, ParserError> {
    match i.peek() {
        Some(Token::Id(s)) => Ok((i.advance(), s)),
        _ => Err(nom::Err::Error(ParserError::expected("an identifier", &i))),
    }
}

/// Parses a `?`-prefixed variable, returning its name with the `?`
/// stripped (spec C4: "the `?` is not stored").
pub fn var(i: TokenStream) -> IResult<TokenStream, String, ParserError> {
    match i.peek() {
        Some(Token::Var(s)) => Ok((i.advance(), s)),
        _ => Err(nom::Err::Error(ParserError::expected("a variable", &i))),
    }
}

pub fn float(i: TokenStream) -> IResult<TokenStream, f64, ParserError> {
    match i.peek() {
        Some(Token::Float(f)) => Ok((i.advance(), f)),
        _ => Err(nom::Err::Error(ParserError::expected("a floating point literal", &i))),
    }
}

pub fn integer(i: TokenStream) -> IResult<TokenStream, i64, ParserError> {
    match i.peek() {
        Some(Token::Int(n)) => Ok((i.advance(), n)),
        _ => Err(nom::Err::Error(ParserError::expected("an integer literal", &i))),
    }
}

/// Parses either flavor of numeric literal into the tagged [`Number`]
/// the rest of the AST uses (spec §4.6: "Integer and float share a
/// single Number type with a tag distinguishing integral from
/// floating").
pub fn number(i: TokenStream) -> IResult<TokenStream, Number, ParserError> {
    match i.peek() {
        Some(Token::Float(f)) => Ok((i.advance(), Number::Real(f))),
        Some(Token::Int(n)) => Ok((i.advance(), Number::Int(n))),
        _ => Err(nom::Err::Error(ParserError::expected("a number", &i))),
    }
}
