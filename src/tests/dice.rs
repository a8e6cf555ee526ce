use super::build;
use crate::{
	dice::{
		condition::{check_condition, ComparisonOp, Conditional},
		roller::{Iter as IterRoller, Max as MaxRoller, Val as ValRoller},
		DieKind, Faces, Mark, ResultEntry, ResultMap,
	},
	lex::{Lexer, Token, TokenKind},
	parse::DiceSpec,
	Die,
};

fn die(spec: &str) -> Die {
	Die::from_spec(&spec.parse::<DiceSpec>().unwrap(), spec)
}

#[test]
fn plain_dice_stay_in_range() {
	let mut d20 = die("100d20");
	d20.roll_sync(&mut crate::dice::roller::FastRand::default());
	assert_eq!(d20.results.len(), 100);
	assert!(d20.results.iter().all(|entry| (1..=20).contains(&entry.value)));
}

#[test]
fn max_roller_rolls_highest_faces() {
	let mut dice = die("3d8");
	dice.roll_sync(&mut MaxRoller);
	assert_eq!(dice.result(), 24.0);
	assert_eq!(dice.result(), dice.max_possible());
}

#[test]
fn negative_count_negates_total() {
	let mut dice = die("-2d6");
	assert_eq!(dice.rolls, 2);
	assert_eq!(dice.multiplier, -1);
	dice.roll_sync(&mut IterRoller::new([3, 4]));
	assert_eq!(dice.result(), -7.0);
	assert_eq!(dice.max_possible(), -2.0);
	assert_eq!(dice.min_possible(), -12.0);
}

#[test]
fn fudge_dice() {
	let mut dice = die("4dF");
	dice.roll_sync(&mut IterRoller::new([-1, 0, 1, 1]));
	assert_eq!(dice.result(), 1.0);
	assert_eq!(dice.shape.min_face(), -1);
	assert_eq!(dice.shape.max_face(), 1);
}

#[test]
fn listed_faces_are_picked_by_index() {
	let mut dice = die("1d[2,4,8]");
	dice.roll_sync(&mut ValRoller(2));
	assert_eq!(dice.result(), 8.0);
}

#[test]
fn range_faces_are_inclusive() {
	let dice = die("1d[3-7]");
	assert_eq!(dice.shape.faces, Faces::Range { min: 3, max: 7 });
	assert_eq!(dice.shape.average(), 5.0);
	assert_eq!(dice.shape.distinct_faces(), 5);
}

#[test]
fn huge_dice_are_stored_as_bounds() {
	let mut dice = die("1d10000000000");
	assert_eq!(dice.shape.faces, Faces::Range { min: 1, max: 10_000_000_000 });
	assert_eq!(dice.shape.distinct_faces(), 10_000_000_000);
	assert_eq!(dice.shape.average(), 5_000_000_000.5);
	assert!(dice.shape.can_render());

	dice.roll_sync(&mut MaxRoller);
	assert_eq!(dice.result(), 1e10);

	let mut expr = build("2d50000000u + 1");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([7, 7, 9])).unwrap(), 17.0);
	assert_eq!(expr.max(), Some(100_000_001.0));
}

#[test]
fn percentile_composite() {
	let mut dice = die("1d66%");
	assert_eq!(dice.shape.kind, DieKind::PercentComposite(vec![6, 6]));
	assert_eq!(dice.shape.max_face(), 66);
	assert_eq!(dice.shape.min_face(), 11);

	dice.roll_sync(&mut IterRoller::new([3, 5]));
	assert_eq!(dice.result(), 35.0);
	assert_eq!(dice.display(), "3,5");
}

#[test]
fn percentile_composite_zero_digit() {
	let dice = die("1d60%");
	assert_eq!(dice.shape.min_face(), 10);
	assert_eq!(dice.shape.max_face(), 69);
	assert_eq!(dice.shape.distinct_faces(), 60);
}

#[test]
fn stunt_dice() {
	let mut dice = die("1dS");
	assert_eq!(dice.rolls, 3);

	dice.roll_sync(&mut IterRoller::new([3, 3, 5]));
	assert_eq!(dice.result(), 11.0);
	assert_eq!(dice.stunt_points(), Some(5));
	assert_eq!(dice.display(), "[3, 3], [5]S");

	dice.roll_sync(&mut IterRoller::new([1, 2, 5]));
	assert_eq!(dice.stunt_points(), None);
	assert_eq!(dice.display(), "[1, 2], [5]");
}

#[test]
fn render_eligibility() {
	assert!(die("1d6").shape.can_render());
	assert!(die("1dF").shape.can_render());
	assert!(die("1d%").shape.can_render());
	assert!(!die("1d[2,4,8]").shape.can_render());
	assert!(!die("1d[2-5]").shape.can_render());
}

#[test]
fn static_dice_skip_modifiers() {
	let mut expr = build("3kh1");
	assert_eq!(expr.warnings().len(), 1);
	assert_eq!(expr.roll_sync(&mut MaxRoller).unwrap(), 3.0);
}

#[test]
fn non_dice_tokens_are_rejected() {
	let token = Token::new(TokenKind::KeepHigh, "3", "kh3");
	assert!(Die::from_token(&token).is_err());

	let mut dice = die("2d6");
	let token = Token::new(TokenKind::Dice, "2d6", "2d6");
	assert!(dice.attach(&token).is_err());
}

#[test]
fn success_counting() {
	let mut expr = build("4d6>=5");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([5, 2, 6, 1])).unwrap(), 2.0);
	assert_eq!(expr.display(), "[5*, 2, 6*, 1]>=5");
}

#[test]
fn negated_successes() {
	let mut expr = build("4d6>=5-=1");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([5, 1, 3, 6])).unwrap(), 1.0);

	let entries = expr.dice()[0].results.iter().cloned().collect::<Vec<_>>();
	assert!(entries[1].has(Mark::Negated));
	assert_eq!(entries[1].value, -1);
	assert!(!entries[2].usable);
}

#[test]
fn dice_comparers_are_rolled_for_every_check() {
	let mut expr = build("2d6>=1d4");
	assert_eq!(expr.roll_sync(&mut IterRoller::new([5, 2, 3, 3])).unwrap(), 1.0);
	assert_eq!(expr.display(), "[5*, 2]>=3");
}

#[test]
fn conditions_with_unresolvable_comparers_are_skipped() {
	let tokens = Lexer::default().parse("1d4").unwrap();
	let mut conditions = vec![
		Conditional::new(ComparisonOp::Eq, "nope", Vec::new(), "=nope"),
		Conditional::new(ComparisonOp::Le, "1d4", tokens, "<=1d4"),
	];

	assert!(check_condition(2, &mut conditions, &mut IterRoller::new([3])));
	assert_eq!(conditions[0].resolved.map(f64::is_nan), Some(true));
	assert_eq!(conditions[1].resolved, Some(3.0));
	assert!(!check_condition(4, &mut conditions, &mut IterRoller::new([3])));
	assert!(!check_condition(4, &mut [], &mut MaxRoller));
}

#[test]
fn negate_never_matches_directly() {
	assert!(!ComparisonOp::Negate.check(1.0, 1.0));
	assert!(ComparisonOp::Ne.check(1.0, 2.0));
}

#[test]
fn result_map_keeps_insertion_order_separate() {
	let mut results = [4, 1, 3].into_iter().map(ResultEntry::new).collect::<ResultMap>();
	let inserted = results.insert_after(0, ResultEntry::new(6));
	assert_eq!(inserted, 1);
	assert_eq!(results.iter().map(|entry| entry.value).collect::<Vec<_>>(), [4, 6, 1, 3]);

	assert_eq!(results.ranked(true), [1, 0, 3, 2]);
	results.sort(false);
	assert_eq!(results.iter().map(|entry| entry.value).collect::<Vec<_>>(), [1, 3, 4, 6]);

	results.get_mut(0).unwrap().drop();
	assert_eq!(results.sum(), 13);
}

#[test]
fn marks_are_a_set_in_first_applied_order() {
	let mut entry = ResultEntry::new(6);
	entry.mark(Mark::Exploded);
	entry.mark(Mark::Rerolled);
	entry.mark(Mark::Exploded);
	assert_eq!(entry.marks, [Mark::Exploded, Mark::Rerolled]);
	assert_eq!(entry.to_string(), "6!r");
}
