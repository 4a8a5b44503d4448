#![allow(
    clippy::missing_errors_doc,
    clippy::use_self,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod containers;
pub mod domain;
pub mod driver;
pub mod error;
pub mod ident;
pub mod lexer;
pub mod parser;
pub mod problem;
pub mod tokens;

pub use driver::{parse, ParsedModel};
pub use error::ParserError;
