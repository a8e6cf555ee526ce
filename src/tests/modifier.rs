use super::build;
use crate::{
	dice::{
		modifier::{Modifier, SortOrder, UNBOUNDED},
		roller::{Iter as IterRoller, Max as MaxRoller, Val as ValRoller},
		Mark,
	},
	lex::{Token, TokenKind},
};

#[test]
fn keep_high() {
	let mut expr = build("4d6kh3");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([1, 2, 3, 4])).unwrap(), 9.0);
	assert_eq!(expr.display(), "[1d, 2, 3, 4]");
}

#[test]
fn keep_low() {
	let mut expr = build("4d6kl2");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([4, 1, 3, 2])).unwrap(), 3.0);
	assert_eq!(expr.display(), "[4d, 1, 3d, 2]");
}

#[test]
fn drop_high_and_low() {
	let mut expr = build("4d6dh1");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([1, 2, 3, 4])).unwrap(), 6.0);

	let mut expr = build("4d6dl1");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([5, 1, 4, 2])).unwrap(), 11.0);
}

#[test]
fn drop_counts_come_from_the_rolled_dice() {
	let mut expr = build("(2d6)d8dl1");
	assert_eq!(expr.roll_sync(&mut ValRoller(3)).unwrap(), 15.0);
	assert_eq!(expr.display(), "([3, 3])[3, 3, 3, 3, 3, 3d]");
	assert_eq!(expr.max(), Some(40.0));

	let mut expr = build("(2d6)d8dh1");
	assert_eq!(expr.roll_sync(&mut ValRoller(3)).unwrap(), 15.0);

	let mut expr = build("(1d6)d8dl2");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([4, 8, 1, 5, 2])).unwrap(), 13.0);
	assert_eq!(expr.display(), "([4])[8, 1d, 5, 2d]");
}

#[test]
fn keep_never_drops_the_only_result() {
	let mut expr = build("1d6kl0");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([4])).unwrap(), 4.0);

	let mut expr = build("1d6dl1");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([4])).unwrap(), 4.0);
	assert_eq!(expr.display(), "[4]");
}

#[test]
fn keep_ties_keep_display_order() {
	let mut expr = build("3d6kh1");
	expr.roll_sync(&mut IterRoller::new([5, 5, 2])).unwrap();
	assert_eq!(expr.display(), "[5, 5d, 2d]");
}

#[test]
fn explode() {
	let mut expr = build("1d6!");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([6, 6, 3])).unwrap(), 15.0);
	assert_eq!(expr.display(), "[6!, 6!, 3]");

	let exploded = expr.dice()[0]
		.results
		.iter()
		.filter(|entry| entry.has(Mark::Exploded))
		.count();
	assert_eq!(exploded, 2);
}

#[test]
fn explode_with_cap() {
	let mut expr = build("2d6!1");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([6, 2, 6])).unwrap(), 14.0);
	assert_eq!(expr.display(), "[6!, 6, 2]");
}

#[test]
fn explode_with_condition() {
	let mut expr = build("2d6!>4");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([5, 2, 3])).unwrap(), 10.0);
	assert_eq!(expr.display(), "[5!, 3, 2]");
}

#[test]
fn explode_combine() {
	let mut expr = build("1d6!!");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([6, 6, 2])).unwrap(), 14.0);
	assert_eq!(expr.display(), "[14!]");
}

#[test]
fn reroll() {
	let mut expr = build("2d6r");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([1, 5, 1])).unwrap(), 6.0);
	assert_eq!(expr.display(), "[1r, 5]");

	let mut expr = build("2d6ri");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([1, 5, 1, 1, 4])).unwrap(), 9.0);
	assert_eq!(expr.display(), "[4r, 5]");
}

#[test]
fn reroll_with_condition() {
	let mut expr = build("3d6r<3");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([1, 2, 5, 6, 4])).unwrap(), 15.0);
	assert_eq!(expr.display(), "[6r, 4r, 5]");
}

#[test]
fn sort() {
	let mut expr = build("4d6sd");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([2, 5, 3, 6])).unwrap(), 16.0);
	assert_eq!(expr.display(), "[6, 5, 3, 2]");

	let mut expr = build("4d6s");
	expr.roll_sync(&mut IterRoller::new([2, 5, 3, 6])).unwrap();
	assert_eq!(expr.display(), "[2, 3, 5, 6]");
}

#[test]
fn last_sort_wins() {
	let mut expr = build("3d6sasd");
	expr.roll_sync(&mut IterRoller::new([2, 5, 3])).unwrap();
	assert_eq!(expr.display(), "[5, 3, 2]");
}

#[test]
fn unique() {
	let mut expr = build("3d6u");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([2, 2, 5, 4])).unwrap(), 11.0);
	assert_eq!(expr.display(), "[2, 4u, 5]");
}

#[test]
fn unique_needs_enough_faces() {
	let mut expr = build("3d2u");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([1, 1, 2])).unwrap(), 4.0);
	assert_eq!(expr.display(), "[1, 1, 2]");
}

#[test]
fn keep_applies_after_explode() {
	let mut expr = build("2d6kh1!");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([6, 2, 4])).unwrap(), 6.0);
	assert_eq!(expr.display(), "[6!, 4d, 2d]");
}

#[test]
fn bounds_account_for_keep() {
	let mut expr = build("4d6kh3 + 2");
	expr.roll_sync(&mut MaxRoller).unwrap();
	assert_eq!(expr.max(), Some(20.0));
	assert_eq!(expr.min(), Some(5.0));
	assert!(expr.is_max());
}

#[test]
fn from_token_defaults() {
	let token = |kind, value: &str| Token::new(kind, value, value);

	assert_eq!(
		Modifier::from_token(&token(TokenKind::KeepHigh, "")).unwrap(),
		Modifier::KeepHigh(1)
	);
	assert_eq!(
		Modifier::from_token(&token(TokenKind::DropLow, "1")).unwrap(),
		Modifier::DropLow(1)
	);
	assert_eq!(
		Modifier::from_token(&token(TokenKind::DropHigh, "6")).unwrap(),
		Modifier::DropHigh(6)
	);
	assert_eq!(Modifier::DropLow(1).kept(4), Some(3));
	assert_eq!(Modifier::DropHigh(6).kept(4), Some(0));
	assert_eq!(
		Modifier::from_token(&token(TokenKind::Explode, "")).unwrap(),
		Modifier::Explode {
			times: UNBOUNDED,
			conditionals: Vec::new()
		}
	);
	assert_eq!(
		Modifier::from_token(&token(TokenKind::Reroll, "")).unwrap(),
		Modifier::Reroll {
			times: 1,
			conditionals: Vec::new()
		}
	);
	assert_eq!(
		Modifier::from_token(&token(TokenKind::Sort, "sd")).unwrap(),
		Modifier::Sort(SortOrder::Descending)
	);
}

#[test]
fn modifier_display() {
	let mut expr = build("4d6!ikh3");
	expr.roll_sync(&mut IterRoller::new([1, 2, 3, 4])).unwrap();
	assert_eq!(expr.dice()[0].modifiers.to_string(), "!ikh3");

	assert_eq!(build("4d6dl1").dice()[0].modifiers.to_string(), "dl1");
}
