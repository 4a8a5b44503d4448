//! Tokenizer for PDDL+ concrete syntax (spec C13, tokenization half).
//!
//! Whitespace and `;`-to-end-of-line comments are skipped uniformly
//! between tokens by `logos`, matching spec §4.6. Keyword tokens are
//! given explicit `priority` so they win over the generic identifier
//! regex on an exact match (`and` lexes as [`Token::And`], not
//! `Token::Id("and".into())`) — without it `logos` cannot disambiguate
//! a keyword from an identical-length identifier match.

use derive_more::Display;
use logos::Logos;
use nom::InputLength;

use crate::error::ParserError;

#[derive(Debug, Display, Clone, PartialEq, Logos)]
pub enum Token {
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("-")]
    Dash,
    #[token(".")]
    Dot,
    #[token("+")]
    Plus,
    #[token("*")]
    Times,
    #[token("/")]
    Divide,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    EqSign,

    #[token("#t")]
    TimeVar,
    #[token("?duration", priority = 20)]
    DurationVar,

    #[token("define")]
    Define,
    #[token("domain")]
    DomainHead,
    #[token("problem")]
    ProblemHead,
    #[token(":domain")]
    DomainRef,

    #[token(":requirements")]
    Requirements,
    #[token(":types")]
    Types,
    #[token(":constants")]
    Constants,
    #[token(":predicates")]
    Predicates,
    #[token(":functions")]
    Functions,
    #[token(":classes")]
    Classes,
    #[token(":constraints")]
    Constraints,
    #[token(":derived")]
    Derived,
    #[token(":action")]
    Action,
    #[token(":durative-action")]
    DurativeAction,
    #[token(":event")]
    Event,
    #[token(":process")]
    Process,
    #[token(":parameters")]
    Parameters,
    #[token(":precondition")]
    Precondition,
    #[token(":condition")]
    Condition,
    #[token(":effect")]
    Effect,
    #[token(":duration")]
    Duration,
    #[token(":objects")]
    Objects,
    #[token(":init")]
    Init,
    #[token(":goal")]
    Goal,
    #[token(":metric")]
    Metric,

    // Requirement flags (spec C12). `:constraints` is shared with the
    // section keyword above.
    #[token(":strips")]
    ReqStrips,
    #[token(":typing")]
    ReqTyping,
    #[token(":negative-preconditions")]
    ReqNegativePreconditions,
    #[token(":disjunctive-preconditions")]
    ReqDisjunctivePreconditions,
    #[token(":equality")]
    ReqEquality,
    #[token(":existential-preconditions")]
    ReqExistentialPreconditions,
    #[token(":universal-preconditions")]
    ReqUniversalPreconditions,
    #[token(":quantified-preconditions")]
    ReqQuantifiedPreconditions,
    #[token(":conditional-effects")]
    ReqConditionalEffects,
    #[token(":fluents")]
    ReqFluents,
    #[token(":numeric-fluents")]
    ReqNumericFluents,
    #[token(":object-fluents")]
    ReqObjectFluents,
    #[token(":durative-actions")]
    ReqDurativeActions,
    #[token(":time")]
    ReqTime,
    #[token(":action-costs")]
    ReqActionCosts,
    #[token(":modules")]
    ReqModules,
    #[token(":adl")]
    ReqAdl,
    #[token(":duration-inequalities")]
    ReqDurationInequalities,
    #[token(":continuous-effects")]
    ReqContinuousEffects,
    #[token(":derived-predicates")]
    ReqDerivedPredicates,
    #[token(":timed-initial-literals")]
    ReqTimedInitialLiterals,
    #[token(":preferences")]
    ReqPreferences,

    // Formula / effect / expression keywords. These are bare words and
    // collide in length with `Id`, hence the explicit priority.
    #[token("and", priority = 20)]
    And,
    #[token("or", priority = 20)]
    Or,
    #[token("not", priority = 20)]
    Not,
    #[token("imply", priority = 20)]
    Imply,
    #[token("forall", priority = 20)]
    Forall,
    #[token("exists", priority = 20)]
    Exists,
    #[token("either", priority = 20)]
    Either,
    #[token("preference", priority = 20)]
    Preference,
    #[token("at", priority = 20)]
    At,
    #[token("start", priority = 20)]
    Start,
    #[token("end", priority = 20)]
    End,
    #[token("over", priority = 20)]
    Over,
    #[token("all", priority = 20)]
    All,
    #[token("always", priority = 20)]
    Always,
    #[token("sometime", priority = 20)]
    Sometime,
    #[token("at-most-once", priority = 20)]
    AtMostOnce,
    #[token("within", priority = 20)]
    Within,
    #[token("hold-after", priority = 20)]
    HoldAfter,
    #[token("hold-during", priority = 20)]
    HoldDuring,
    #[token("sometime-after", priority = 20)]
    SometimeAfter,
    #[token("sometime-before", priority = 20)]
    SometimeBefore,
    #[token("always-within", priority = 20)]
    AlwaysWithin,
    #[token("assign", priority = 20)]
    Assign,
    #[token("increase", priority = 20)]
    Increase,
    #[token("decrease", priority = 20)]
    Decrease,
    #[token("scale-up", priority = 20)]
    ScaleUp,
    #[token("scale-down", priority = 20)]
    ScaleDown,
    #[token("oneof", priority = 20)]
    Oneof,
    #[token("when", priority = 20)]
    When,
    #[token("minimize", priority = 20)]
    Minimize,
    #[token("maximize", priority = 20)]
    Maximize,
    #[token("total-time", priority = 20)]
    TotalTime,
    #[token("total-cost", priority = 20)]
    TotalCost,
    #[token("is-violated", priority = 20)]
    IsViolated,

    // PDDL identifier: `[A-Za-z_][-A-Za-z0-9_]*` per spec §4.6.
    #[regex(r"[A-Za-z_][-A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Id(String),

    // Variable: `?` followed by an identifier.
    #[regex(r"\?[A-Za-z_][-A-Za-z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Var(String),

    // Float: `[-]?(0|[1-9][0-9]*)\.[0-9]+`.
    #[regex(r"-?(0|[1-9][0-9]*)\.[0-9]+", |lex| lex.slice().parse().ok())]
    Float(f64),

    // Integer: `0` or `[-]?[1-9][0-9]*`.
    #[regex(r"-?(0|[1-9][0-9]*)", |lex| lex.slice().parse().ok())]
    Int(i64),

    #[regex(r";[^\n]*", logos::skip)]
    Comment,

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Error,
}

/// A cloneable cursor over a token stream, usable as `nom` input.
///
/// Cloning re-clones the underlying `logos::Lexer`, which is cheap (a
/// source `&str` reference plus a byte offset) — `nom`'s `alt`/`many0`
/// combinators clone the input on every alternative they try, so this
/// must stay cheap.
pub struct TokenStream<'a> {
    lexer: logos::Lexer<'a, Token>,
}

impl Clone for TokenStream<'_> {
    fn clone(&self) -> Self {
        Self { lexer: self.lexer.clone() }
    }
}

impl<'a> TokenStream<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { lexer: Token::lexer(input) }
    }

    pub fn source(&self) -> &'a str {
        self.lexer.source()
    }

    /// Byte offset of the next unconsumed token, for error reporting.
    pub fn offset(&self) -> usize {
        self.lexer.span().end
    }

    pub fn len(&self) -> usize {
        self.lexer.source().len() - self.lexer.span().end
    }

    pub fn is_empty(&self) -> bool {
        self.peek().is_none()
    }

    pub fn peek(&self) -> Option<Token> {
        self.lexer.clone().next().and_then(|t| t.ok())
    }

    /// Peek the next `n` tokens without consuming, for debug traces.
    pub fn peek_n(&self, n: usize) -> Vec<Token> {
        let mut iter = self.lexer.clone();
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match iter.next() {
                Some(Ok(t)) => out.push(t),
                _ => break,
            }
        }
        out
    }

    pub fn advance(mut self) -> Self {
        self.lexer.next();
        self
    }
}

impl std::fmt::Debug for TokenStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenStream(@{})", self.offset())
    }
}

impl<'a> From<&'a str> for TokenStream<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s)
    }
}

impl InputLength for TokenStream<'_> {
    fn input_len(&self) -> usize {
        self.len()
    }
}

impl<'a> nom::Parser<TokenStream<'a>, Token, ParserError> for Token {
    fn parse(&mut self, input: TokenStream<'a>) -> nom::IResult<TokenStream<'a>, Token, ParserError> {
        match input.peek() {
            Some(t) if t == *self => {
                let tok = t;
                Ok((input.advance(), tok))
            },
            other => Err(nom::Err::Error(ParserError::expected_token(self.clone(), other, &input))),
        }
    }
}
