use std::{collections::HashMap, sync::Arc};

use crate::{
	dice::condition::ComparisonOp,
	engine::Error,
	lex::{Defaults, LexError, Lexer, MathOp, TokenKind},
	reduce::ParseError,
};

fn values(input: &str) -> Vec<(TokenKind, String)> {
	Lexer::default()
		.tokenize(input)
		.unwrap()
		.into_iter()
		.map(|token| (token.kind, token.value))
		.collect()
}

#[test]
fn bare_d_uses_defaults() {
	assert_eq!(values("d"), [(TokenKind::Dice, "1d100".to_owned())]);
	assert_eq!(values("3d"), [(TokenKind::Dice, "3d100".to_owned())]);
	assert_eq!(values("d20"), [(TokenKind::Dice, "1d20".to_owned())]);
}

#[test]
fn custom_defaults() {
	let mut lexer = Lexer::new(Defaults { roll: 2, face: 20 });
	assert_eq!(lexer.tokenize("d").unwrap()[0].value, "2d20");

	lexer.set_default_face(6);
	lexer.set_default_roll(4);
	assert_eq!(lexer.tokenize("d").unwrap()[0].value, "4d6");
}

#[test]
fn percentile_faces() {
	assert_eq!(values("2d%"), [(TokenKind::Dice, "2d%".to_owned())]);
	assert_eq!(values("2d66%"), [(TokenKind::Percent, "2d66%".to_owned())]);
}

#[test]
fn fudge_and_stunt() {
	assert_eq!(values("4dF"), [(TokenKind::Fudge, "4dF".to_owned())]);
	assert_eq!(values("1dS"), [(TokenKind::Stunt, "1dS".to_owned())]);
}

#[test]
fn face_lists_and_ranges() {
	assert_eq!(values("2d[1,3,5]"), [(TokenKind::Dice, "2d[1,3,5]".to_owned())]);
	assert_eq!(values("d[2-5]"), [(TokenKind::Dice, "1d[2-5]".to_owned())]);
}

#[test]
fn keep_high_binds_to_dice() {
	assert_eq!(
		values("1d6kh3"),
		[
			(TokenKind::Dice, "1d6".to_owned()),
			(TokenKind::KeepHigh, "3".to_owned())
		]
	);
	assert_eq!(values("1d6k")[1], (TokenKind::KeepHigh, String::new()));
	assert_eq!(values("4d6k2")[1], (TokenKind::KeepHigh, "2".to_owned()));
}

#[test]
fn modifier_values() {
	assert_eq!(values("4d6kl2")[1], (TokenKind::KeepLow, "2".to_owned()));
	assert_eq!(values("4d6dh1")[1], (TokenKind::DropHigh, "1".to_owned()));
	assert_eq!(values("4d6dl1")[1], (TokenKind::DropLow, "1".to_owned()));
	assert_eq!(values("5d6!!i")[1], (TokenKind::ExplodeCombine, "100".to_owned()));
	assert_eq!(values("5d6!3")[1], (TokenKind::Explode, "3".to_owned()));
	assert_eq!(values("5d6!")[1], (TokenKind::Explode, String::new()));
	assert_eq!(values("5d6ri")[1], (TokenKind::Reroll, "100".to_owned()));
	assert_eq!(values("5d6u")[1], (TokenKind::Unique, "u".to_owned()));
	assert_eq!(values("5d6s")[1], (TokenKind::Sort, "sa".to_owned()));
	assert_eq!(values("5d6sd")[1], (TokenKind::Sort, "sd".to_owned()));
}

#[test]
fn sign_folding() {
	let lexer = Lexer::default();
	assert_eq!(lexer.tokenize("1d20 ----2").unwrap(), lexer.tokenize("1d20 + 2").unwrap());
	assert_eq!(
		lexer.tokenize("1d20 -++---+-+--++17").unwrap(),
		lexer.tokenize("1d20-17").unwrap()
	);
}

#[test]
fn unary_minus_merges_into_dice() {
	let tokens = Lexer::default().tokenize("-2d6").unwrap();
	assert_eq!(tokens.len(), 1);
	assert_eq!(tokens[0].value, "-2d6");
	assert_eq!(tokens[0].text, "-2d6");

	assert_eq!(values("2*-3")[2], (TokenKind::Dice, "-3".to_owned()));
	assert_eq!(values("+4"), [(TokenKind::Dice, "4".to_owned())]);
}

#[test]
fn unary_minus_before_group() {
	assert_eq!(
		values("-(1d4)"),
		[
			(TokenKind::Dice, "-1".to_owned()),
			(TokenKind::Math(MathOp::Mul), "*".to_owned()),
			(TokenKind::LeftParen, "(".to_owned()),
			(TokenKind::Dice, "1d4".to_owned()),
			(TokenKind::RightParen, ")".to_owned()),
		]
	);
}

#[test]
fn dice_after_group_keep_omitted_count() {
	let tokens = Lexer::default().parse("(1d4)d6").unwrap();
	assert_eq!(tokens.len(), 2);
	assert_eq!(tokens[1].value, "d6");
	assert!(tokens[1].parened);
	assert!(!tokens[0].parened);
}

#[test]
fn conditions_attach_to_previous_token() {
	let tokens = Lexer::default().tokenize("4d6>=5").unwrap();
	assert_eq!(tokens.len(), 1);
	assert_eq!(tokens[0].conditions.len(), 1);
	assert_eq!(tokens[0].conditions[0].operator, ComparisonOp::Ge);
	assert_eq!(tokens[0].conditions[0].comparer, "5");

	let tokens = Lexer::default().tokenize("1d6!>4").unwrap();
	assert_eq!(tokens.len(), 2);
	assert!(tokens[0].conditions.is_empty());
	assert_eq!(tokens[1].conditions[0].operator, ComparisonOp::Gt);
}

#[test]
fn multiple_conditions() {
	let tokens = Lexer::default().tokenize("4d6>=5-=1").unwrap();
	let operators = tokens[0]
		.conditions
		.iter()
		.map(|condition| condition.operator)
		.collect::<Vec<_>>();
	assert_eq!(operators, [ComparisonOp::Ge, ComparisonOp::Negate]);
}

#[test]
fn dice_comparers_are_tokenized() {
	let tokens = Lexer::default().tokenize("2d6>=1d4").unwrap();
	let condition = &tokens[0].conditions[0];
	assert_eq!(condition.comparer, "1d4");
	assert_eq!(condition.tokens.len(), 1);
	assert_eq!(condition.tokens[0].value, "1d4");
}

#[test]
fn lookups() {
	assert_eq!(values("[[Note^block-id]]")[0].0, TokenKind::Table);
	assert_eq!(
		values("1d4+1[[Note^block-id]]"),
		[(TokenKind::Table, "1d4+1[[Note^block-id]]".to_owned())]
	);
	assert_eq!(values("[[Note]]|line")[0].0, TokenKind::Line);
	assert_eq!(values("4d[[Note]]")[0].0, TokenKind::Section);
	assert_eq!(values("#monsters|-")[0].0, TokenKind::Tag);
	assert_eq!(values("dv(#monsters)")[0].0, TokenKind::Dataview);
}

#[test]
fn narrative_pools() {
	assert_eq!(values("2g1y3p"), [(TokenKind::Narrative, "2g1y3p".to_owned())]);
	assert_eq!(values("2a 1P"), [(TokenKind::Narrative, "2g1y".to_owned())]);
	assert_eq!(values("3d8sd")[0], (TokenKind::Dice, "3d8".to_owned()));
}

#[test]
fn fields() {
	let fields = HashMap::from([("str".to_owned(), 3.0)]);
	let lexer = Lexer::default().with_fields(Arc::new(fields));
	let tokens = lexer.tokenize("1d20 + str").unwrap();
	assert_eq!(tokens[2].value, "3");
	assert_eq!(tokens[2].text, "str");

	assert_eq!(
		Lexer::default().tokenize("1d20 + str"),
		Err(LexError::UnknownField {
			offset: 7,
			name: "str".to_owned()
		})
	);
}

#[test]
fn unexpected_input() {
	assert_eq!(
		Lexer::default().tokenize("1d6 $"),
		Err(LexError::Unexpected {
			offset: 4,
			found: "$".to_owned()
		})
	);
}

#[test]
fn invalid_dice() {
	let err = Lexer::default().tokenize("1d0").unwrap_err();
	assert!(matches!(err, LexError::InvalidDice { offset: 0, .. }));
	assert_eq!(err.span(), 0..3);
}

#[test]
fn mismatched_parens() {
	assert_eq!(
		Lexer::default().parse("(1d6+2"),
		Err(Error::Parse(ParseError::MismatchedParens))
	);
}
