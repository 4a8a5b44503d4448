//! Grammar and semantic actions (spec C13).
//!
//! Leaf tokens are matched with `nom`-compatible parsers
//! ([`crate::tokens`], [`crate::lexer::Token`]'s own `nom::Parser`
//! impl); everything context-sensitive — scoping, requirement gating,
//! duplicate-name rejection — is hand-written recursive descent over
//! plain `Result`, not threaded through `nom::IResult`. A
//! `Rc<RefCell<_>>` parser state shared through `nom`'s `alt`/`many0`
//! would not roll back on an abandoned alternative, silently
//! corrupting the symbol tables of whichever branch lost; hand-written
//! control flow sidesteps that entirely.

pub mod domain;
pub mod effect;
pub mod expr;
pub mod formula;
pub mod operator;
pub mod problem;
pub mod requirements;
pub mod types;

use std::collections::HashMap;

use log::trace;

use crate::error::ParserError;
use crate::lexer::{Token, TokenStream};

/// The variables bound at each lexical nesting level a grammar rule is
/// currently inside (an operator's parameters, then zero or more
/// nested `forall`/`exists`/`:vars` scopes). Looked up innermost-first.
#[derive(Debug, Default)]
pub struct Scope {
    frames: Vec<HashMap<String, String>>,
}

impl Scope {
    pub fn new() -> Self {
        Self { frames: vec![HashMap::new()] }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "global frame must never be popped");
    }

    /// Binds `name: type_name` in the innermost frame. Rejects a name
    /// already bound in *any* active frame (spec: parameter lists
    /// reject duplicates, and PDDL does not allow a nested quantifier
    /// to shadow an outer parameter of the same name).
    pub fn bind(&mut self, name: &str, type_name: &str, offset: usize) -> Result<(), ParserError> {
        let key = crate::ident::normalize(name);
        if self.frames.iter().any(|f| f.contains_key(&key)) {
            return Err(ParserError::duplicate_symbol_at(name, offset));
        }
        self.frames.last_mut().expect("global frame present").insert(key, crate::ident::normalize(type_name));
        Ok(())
    }

    pub fn resolve(&self, name: &str, offset: usize) -> Result<&str, ParserError> {
        let key = crate::ident::normalize(name);
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.get(&key))
            .map(String::as_str)
            .ok_or_else(|| ParserError::unknown_symbol_at(name, offset))
    }
}

/// Skips one balanced `(...)` form, counting nested parens. Used to
/// scan past sections a caller doesn't care about yet (the driver's
/// forward-reference pre-pass looks only for `:domain` inside a
/// problem file, skipping everything else).
pub fn skip_balanced(i: TokenStream) -> Result<TokenStream, ParserError> {
    let mut i = expect(i, Token::OpenParen)?;
    let mut depth = 1usize;
    while depth > 0 {
        match i.peek() {
            Some(Token::OpenParen) => {
                depth += 1;
                i = i.advance();
            },
            Some(Token::CloseParen) => {
                depth -= 1;
                i = i.advance();
            },
            Some(_) => i = i.advance(),
            None => return Err(ParserError::syntax("unexpected end of input while skipping a form", i.offset())),
        }
    }
    Ok(i)
}

pub fn expect(i: TokenStream, tok: Token) -> Result<TokenStream, ParserError> {
    match i.peek() {
        Some(t) if t == tok => Ok(i.advance()),
        other => Err(ParserError::expected_token(tok, other, &i)),
    }
}

/// Whether the next token is `tok`, without consuming it.
pub fn at<'a>(i: &TokenStream<'a>, tok: &Token) -> bool {
    i.peek().as_ref() == Some(tok)
}

pub fn expect_id(i: TokenStream) -> Result<(TokenStream, String), ParserError> {
    crate::tokens::id(i).map_err(ParserError::from)
}

pub fn expect_var(i: TokenStream) -> Result<(TokenStream, String), ParserError> {
    crate::tokens::var(i).map_err(ParserError::from)
}

pub fn expect_number(i: TokenStream) -> Result<(TokenStream, crate::domain::Number), ParserError> {
    crate::tokens::number(i).map_err(ParserError::from)
}

pub fn trace_rule(rule: &str, i: &TokenStream) {
    trace!("{rule} @ {} next={:?}", i.offset(), i.peek());
}

/// Parses a single term: a `?`-variable (resolved against `scope`, so
/// an unbound variable is a parse-time `UnknownSymbol`) or a bare
/// identifier, taken on faith as an object/constant name (objects
/// declared later in the same problem, or in a domain's `:constants`,
/// are resolved by the caller once the whole file is available).
pub fn parse_term<'a>(i: TokenStream<'a>, scope: &Scope) -> Result<(TokenStream<'a>, crate::domain::Term), ParserError> {
    let offset = i.offset();
    if let Ok((next, name)) = expect_var(i.clone()) {
        scope.resolve(&name, offset)?;
        return Ok((next, crate::domain::Term::variable(&name)));
    }
    let (next, name) = expect_id(i)?;
    Ok((next, crate::domain::Term::object(&name)))
}

pub fn parse_term_list<'a>(
    mut i: TokenStream<'a>,
    scope: &Scope,
) -> Result<(TokenStream<'a>, Vec<crate::domain::Term>), ParserError> {
    let mut terms = Vec::new();
    while !at(&i, &Token::CloseParen) {
        let (next, term) = parse_term(i, scope)?;
        terms.push(term);
        i = next;
    }
    Ok((i, terms))
}

/// An identifier, or one of the three reserved words that lex as their
/// own keyword token rather than `Id` despite naming ordinary
/// functions (`total-time`, `total-cost`, `is-violated`).
fn expect_name(i: TokenStream) -> Result<(TokenStream, String), ParserError> {
    match i.peek() {
        Some(Token::TotalTime) => Ok((i.advance(), "total-time".to_string())),
        Some(Token::TotalCost) => Ok((i.advance(), "total-cost".to_string())),
        Some(Token::IsViolated) => Ok((i.advance(), "is-violated".to_string())),
        _ => expect_id(i),
    }
}

/// Parses a class-qualified or plain name: `class.name` or `name`
/// (spec's class-qualified function/predicate application supplement).
/// The `class.name` shape needs `:modules`; a bare `name` never does.
pub fn parse_qualified_name<'a>(
    i: TokenStream<'a>,
    requirements: &crate::domain::Requirements,
) -> Result<(TokenStream<'a>, (Option<String>, String)), ParserError> {
    let offset = i.offset();
    let (i, first) = expect_name(i)?;
    if at(&i, &Token::Dot) {
        requirements.require(crate::domain::Requirement::Modules, "class-qualified name", offset)?;
        let i = expect(i, Token::Dot)?;
        let (i, second) = expect_name(i)?;
        Ok((i, (Some(first), second)))
    } else {
        Ok((i, (None, first)))
    }
}

/// One group inside a typed list: the untyped names seen before a `-`,
/// and the type(s) that group was declared against. An `either` group
/// carries more than one type name; a bare trailing group (no `-` at
/// all) carries none, leaving the caller to apply its own default.
#[derive(Debug, Clone)]
pub struct TypedGroup {
    pub names: Vec<String>,
    pub types: Vec<String>,
}

/// Parses the shared `name* (- (either type+ | type) name*)*` shape
/// used by `:types`, `:constants`, `:objects`, and every parameter
/// list (spec §4.6's typed-list aggregation pattern), reading names
/// with `read_name`. Stops at the first token that is neither a name
/// nor a `-`.
pub fn parse_typed_list<'a>(
    mut i: TokenStream<'a>,
    read_name: fn(TokenStream<'a>) -> Result<(TokenStream<'a>, String), ParserError>,
    requirements: &crate::domain::Requirements,
) -> Result<(TokenStream<'a>, Vec<TypedGroup>), ParserError> {
    let mut groups = Vec::new();
    let mut pending = Vec::new();
    loop {
        match read_name(i.clone()) {
            Ok((next, name)) => {
                pending.push(name);
                i = next;
                continue;
            },
            Err(_) => {},
        }
        if at(&i, &Token::Dash) {
            let offset = i.offset();
            requirements.require(crate::domain::Requirement::Typing, "typed parameter", offset)?;
            i = expect(i, Token::Dash)?;
            let types = if at(&i, &Token::OpenParen) {
                i = expect(i, Token::OpenParen)?;
                i = expect(i, Token::Either)?;
                let mut alts = Vec::new();
                loop {
                    match expect_id(i.clone()) {
                        Ok((next, name)) => {
                            alts.push(name);
                            i = next;
                        },
                        Err(_) => break,
                    }
                }
                i = expect(i, Token::CloseParen)?;
                alts
            } else {
                let (next, ty) = expect_id(i)?;
                i = next;
                vec![ty]
            };
            groups.push(TypedGroup { names: std::mem::take(&mut pending), types });
            continue;
        }
        break;
    }
    if !pending.is_empty() {
        groups.push(TypedGroup { names: pending, types: Vec::new() });
    }
    Ok((i, groups))
}
