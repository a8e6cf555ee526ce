//! Reordering of infix tokens into postfix, so that expressions can be evaluated with a stack.

use crate::lex::{Token, TokenKind};

/// Error that can occur while reordering tokens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
	/// Parentheses don't pair up.
	#[error("mismatched parentheses")]
	MismatchedParens,
}

/// Reorders tokens from infix to postfix with the shunting-yard algorithm.
///
/// `+` and `-` bind loosest, then `*` and `/`, then `^` (which groups from the right). Parentheses are removed;
/// dice directly after a closing parenthesis whose count was omitted (`(1d4)d6`) are marked as
/// [parened](Token::parened), so that their roll count comes from the group's value.
///
/// # Errors
/// If the parentheses don't pair up, an error variant is returned.
///
/// # Examples
/// ```
/// use astragal::{lex::Lexer, reduce::reduce};
///
/// let tokens = reduce(Lexer::default().tokenize("2 ^ 3 ^ 2")?)?;
/// let values = tokens.iter().map(|token| token.value.as_str()).collect::<Vec<_>>();
/// assert_eq!(values, ["2", "3", "2", "^", "^"]);
/// # Ok::<(), astragal::Error>(())
/// ```
pub fn reduce(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
	let mut output = Vec::with_capacity(tokens.len());
	let mut operators: Vec<Token> = Vec::new();
	let mut tokens = tokens.into_iter().peekable();

	while let Some(token) = tokens.next() {
		match token.kind {
			TokenKind::Math(op) => {
				while let Some(top) = operators.last().and_then(Token::math_op) {
					let pops = top.precedence() > op.precedence()
						|| (top.precedence() == op.precedence() && !op.is_right_associative());
					if !pops {
						break;
					}
					output.extend(operators.pop());
				}
				operators.push(token);
			}
			TokenKind::LeftParen => operators.push(token),
			TokenKind::RightParen => {
				loop {
					match operators.pop() {
						Some(top) if top.kind == TokenKind::LeftParen => break,
						Some(top) => output.push(top),
						None => return Err(ParseError::MismatchedParens),
					}
				}

				if let Some(next) = tokens.peek_mut() {
					if next.kind.is_dice() && next.value.starts_with('d') {
						next.parened = true;
					}
				}
			}
			_ => output.push(token),
		}
	}

	while let Some(top) = operators.pop() {
		if top.kind == TokenKind::LeftParen {
			return Err(ParseError::MismatchedParens);
		}
		output.push(top);
	}

	Ok(output)
}
