//! `(:requirements ...)` (spec C12).

use crate::domain::{Requirement, Requirements};
use crate::error::ParserError;
use crate::lexer::{Token, TokenStream};

use super::{expect, trace_rule};

fn requirement_for(tok: &Token) -> Option<Requirement> {
    use Requirement::*;
    Some(match tok {
        Token::ReqStrips => Strips,
        Token::ReqTyping => Typing,
        Token::ReqNegativePreconditions => NegativePreconditions,
        Token::ReqDisjunctivePreconditions => DisjunctivePreconditions,
        Token::ReqEquality => Equality,
        Token::ReqExistentialPreconditions => ExistentialPreconditions,
        Token::ReqUniversalPreconditions => UniversalPreconditions,
        Token::ReqQuantifiedPreconditions => QuantifiedPreconditions,
        Token::ReqConditionalEffects => ConditionalEffects,
        Token::ReqFluents => Fluents,
        Token::ReqNumericFluents => NumericFluents,
        Token::ReqObjectFluents => ObjectFluents,
        Token::ReqAdl => Adl,
        Token::ReqDurativeActions | Token::ReqTime => DurativeActions,
        Token::ReqDurationInequalities => DurationInequalities,
        Token::ReqContinuousEffects => ContinuousEffects,
        Token::ReqDerivedPredicates => DerivedPredicates,
        Token::ReqTimedInitialLiterals => TimedInitialLiterals,
        Token::ReqPreferences => Preferences,
        Token::ReqActionCosts => ActionCosts,
        Token::ReqModules => Modules,
        _ => return None,
    })
}

/// Parses `(:requirements :flag...)`. The block is optional at the
/// call site (spec's Open Question decision: an absent block behaves
/// as `(:requirements :strips)`), so this only runs once the caller
/// has confirmed a `:requirements` token is next.
pub fn parse_requirements(i: TokenStream) -> Result<(TokenStream, Requirements), ParserError> {
    trace_rule("requirements", &i);
    let mut i = expect(i, Token::OpenParen)?;
    i = expect(i, Token::Requirements)?;
    let mut reqs = Requirements::empty();
    loop {
        match i.peek() {
            Some(tok) => {
                if let Some(req) = requirement_for(&tok) {
                    reqs.insert(req);
                    i = i.advance();
                } else if tok == Token::Constraints {
                    // `:constraints` doubles as a requirement flag and a
                    // section keyword; as a requirement it unlocks
                    // `(:constraints ...)` in a domain or problem body.
                    reqs.insert(Requirement::Constraints);
                    i = i.advance();
                } else {
                    break;
                }
            },
            None => break,
        }
    }
    let i = expect(i, Token::CloseParen)?;
    Ok((i, reqs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_closes_implications() {
        let (_, reqs) = parse_requirements(TokenStream::new("(:requirements :adl)")).unwrap();
        assert!(reqs.contains(Requirement::Strips));
        assert!(reqs.contains(Requirement::ConditionalEffects));
    }
}
