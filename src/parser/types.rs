//! `(:types ...)` and the shared typed-list shapes it reuses (spec C3).

use crate::domain::{Requirements, TypingGraph};
use crate::error::ParserError;
use crate::lexer::{Token, TokenStream};

use super::{expect, expect_id, parse_typed_list, trace_rule};

/// Parses `(:types name* (- (either t+ | t) name*)*)`, declaring every
/// name in `graph` and wiring supertype edges. An `either` group
/// registers the name as a subtype of every alternative (spec's
/// either-type supplement approximated as multi-parent membership in
/// the same DAG `add_supertype` already maintains). The caller has
/// already checked `:typing` is set before entering `:types` at all,
/// so `requirements` here is only threaded through for the shared
/// typed-list parser's own (redundant, but harmless) check.
pub fn parse_types<'a>(i: TokenStream<'a>, graph: &mut TypingGraph, requirements: &Requirements) -> Result<TokenStream<'a>, ParserError> {
    trace_rule("types", &i);
    let offset = i.offset();
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Types)?;
    let (mut i, groups) = parse_typed_list(i, expect_id, requirements)?;
    for group in groups {
        if group.types.is_empty() {
            for name in &group.names {
                graph.declare_default_object(name);
            }
        } else {
            for name in &group.names {
                for ty in &group.types {
                    graph.add_supertype(name, ty, offset)?;
                }
            }
        }
    }
    i = expect(i, Token::CloseParen)?;
    Ok(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typing_reqs() -> Requirements {
        let mut reqs = Requirements::new();
        reqs.insert(crate::domain::Requirement::Typing);
        reqs
    }

    #[test]
    fn untyped_trailing_group_defaults_to_object() {
        let mut g = TypingGraph::new();
        let rest = parse_types(TokenStream::new("(:types foo bar)"), &mut g, &typing_reqs()).unwrap();
        assert!(rest.is_empty());
        assert!(g.is_subtype("foo", "object"));
        assert!(g.is_subtype("bar", "object"));
    }

    #[test]
    fn either_group_adds_edges_to_every_alternative() {
        let mut g = TypingGraph::new();
        parse_types(TokenStream::new("(:types hybrid - (either truck plane))"), &mut g, &typing_reqs()).unwrap();
        assert!(g.is_subtype("hybrid", "truck"));
        assert!(g.is_subtype("hybrid", "plane"));
    }
}
