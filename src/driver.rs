//! Top-level entry point: reads a set of files, classifies each as a
//! domain or a problem, and resolves forward references between them
//! (spec §5).
//!
//! Domains and problems may be listed in any order and spread across
//! any number of files — a problem can reference a domain defined in
//! a file earlier in the list, later in the list, or not given to this
//! call at all (an error). This is why domains are parsed in a first
//! pass and problems in a second: a problem's `:init`/`:goal` can only
//! be walked once its domain's predicate/function signatures exist to
//! validate against.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, info};

use crate::containers::SymbolTable;
use crate::domain::Domain;
use crate::error::ParserError;
use crate::ident::Named;
use crate::lexer::{Token, TokenStream};
use crate::parser::domain::parse_domain;
use crate::parser::problem::{parse_problem, peek_domain_name};
use crate::problem::Problem;

/// Every domain and problem successfully parsed from one call to
/// [`parse`].
#[derive(Debug)]
pub struct ParsedModel {
    domains: SymbolTable<Rc<Domain>>,
    problems: SymbolTable<Rc<Problem>>,
}

impl Named for Rc<Domain> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }
}

impl Named for Rc<Problem> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }
}

impl ParsedModel {
    pub fn domains(&self) -> &SymbolTable<Rc<Domain>> {
        &self.domains
    }

    pub fn problems(&self) -> &SymbolTable<Rc<Problem>> {
        &self.problems
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormKind {
    Domain,
    Problem,
}

fn classify(source: &str) -> Result<FormKind, ParserError> {
    let tokens = TokenStream::new(source).peek_n(4);
    match tokens.as_slice() {
        [Token::OpenParen, Token::Define, Token::OpenParen, Token::DomainHead] => Ok(FormKind::Domain),
        [Token::OpenParen, Token::Define, Token::OpenParen, Token::ProblemHead] => Ok(FormKind::Problem),
        _ => Err(ParserError::syntax("expected (define (domain ...)) or (define (problem ...))", 0)),
    }
}

/// Parses every file in `paths`, logging each file's path and form
/// kind when `debug_logs` is set (spec's per-file debug tracing).
/// Returns every domain and problem found, with problems holding a
/// resolved `Rc<Domain>` to whichever domain their `:domain` clause
/// names.
pub fn parse(paths: &[PathBuf], debug_logs: bool) -> Result<ParsedModel, ParserError> {
    let mut domain_sources = Vec::new();
    let mut problem_sources = Vec::new();

    for path in paths {
        let source = std::fs::read_to_string(path).map_err(|e| ParserError::io(path, e))?;
        let kind = classify(&source).map_err(|e| e.with_position(path, &source))?;
        if debug_logs {
            debug!("{}: classified as {kind:?}", path.display());
        }
        match kind {
            FormKind::Domain => domain_sources.push((path.clone(), source)),
            FormKind::Problem => problem_sources.push((path.clone(), source)),
        }
    }

    let mut domains = SymbolTable::new();
    for (path, source) in &domain_sources {
        info!("parsing domain {}", path.display());
        let domain = parse_domain(source).map_err(|e| e.with_position(path, source))?;
        domains
            .add(Rc::new(domain))
            .map_err(|e| e.with_position(path, source))?;
    }

    let mut problems = SymbolTable::new();
    for (path, source) in &problem_sources {
        let domain_name = peek_domain_name(source).map_err(|e| e.with_position(path, source))?;
        let domain = domains
            .get(&domain_name)
            .map_err(|_| ParserError::unknown_symbol(&domain_name).with_position(path, source))?;
        info!("parsing problem {}", path.display());
        let problem = parse_problem(source, Rc::clone(domain)).map_err(|e| e.with_position(path, source))?;
        problems
            .add(Rc::new(problem))
            .map_err(|e| e.with_position(path, source))?;
    }

    Ok(ParsedModel { domains, problems })
}

/// Convenience wrapper for a single-file call site (a domain and its
/// problem bundled in one path, or either alone).
pub fn parse_file(path: &Path, debug_logs: bool) -> Result<ParsedModel, ParserError> {
    parse(std::slice::from_ref(&path.to_path_buf()), debug_logs)
}
