mod dice;
mod engine;
mod lex;
mod modifier;
mod narrative;
mod parse;

use crate::{lex::Lexer, Expression};

/// Parses and builds an expression with the default lexer.
fn build(input: &str) -> Expression {
	Expression::build(input, Lexer::default().parse(input).unwrap()).unwrap()
}
