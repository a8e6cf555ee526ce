use crate::{
	dice::roller::{Iter as IterRoller, Max as MaxRoller},
	narrative::{count_pool, normalize, NarrativeFace, NarrativeResult, NarrativeRoll},
};

#[test]
fn symbols() {
	assert_eq!(NarrativeFace::from_symbol("A"), Some(NarrativeFace::Ability));
	assert_eq!(NarrativeFace::from_symbol("pro"), Some(NarrativeFace::Proficiency));
	assert_eq!(NarrativeFace::from_symbol("boo"), Some(NarrativeFace::Boost));
	assert_eq!(NarrativeFace::from_symbol("C"), Some(NarrativeFace::Challenge));
	assert_eq!(NarrativeFace::from_symbol("diff"), Some(NarrativeFace::Difficulty));
	assert_eq!(NarrativeFace::from_symbol("sb"), Some(NarrativeFace::Setback));
	assert_eq!(NarrativeFace::from_symbol("p"), Some(NarrativeFace::Difficulty));
	assert_eq!(NarrativeFace::from_symbol("P"), Some(NarrativeFace::Proficiency));
}

#[test]
fn pools_are_counted_in_canonical_order() {
	assert_eq!(
		count_pool("3p 2g pro"),
		Some(vec![
			(NarrativeFace::Ability, 2),
			(NarrativeFace::Proficiency, 1),
			(NarrativeFace::Difficulty, 3),
		])
	);
	assert_eq!(count_pool("2g2g"), Some(vec![(NarrativeFace::Ability, 4)]));
	assert_eq!(count_pool("3w"), None);
}

#[test]
fn normalized_pools() {
	assert_eq!(normalize("2a 1P").as_deref(), Some("2g1y"));
	assert_eq!(normalize("blk diff A").as_deref(), Some("1g1p1s"));
}

#[test]
fn opposing_symbols_cancel() {
	let mut roll = NarrativeRoll::new("1y1r").unwrap();
	let result = roll.roll_sync(&mut IterRoller::new([11, 9]));
	assert_eq!(
		result,
		NarrativeResult {
			success: 0,
			advantage: -2,
			triumph: 1
		}
	);
	assert_eq!(result.to_string(), "2 threat 1 triumph");
	assert_eq!(roll.to_string(), "2 threat 1 triumph");
}

#[test]
fn setback_and_boost() {
	let mut roll = NarrativeRoll::new("1b1s").unwrap();
	let result = roll.roll_sync(&mut IterRoller::new([4, 3]));
	assert_eq!(result.to_string(), "1 adv");
}

#[test]
fn blank_results_display_nothing() {
	let mut roll = NarrativeRoll::new("1b").unwrap();
	assert_eq!(roll.to_string(), "1b");
	assert_eq!(roll.roll_sync(&mut IterRoller::new([1])), NarrativeResult::default());
	assert_eq!(roll.to_string(), "");
}

#[test]
fn every_die_rolls_its_own_faces() {
	let mut roll = NarrativeRoll::new("1g1y1b1r1p1s").unwrap();
	roll.roll_sync(&mut MaxRoller);
	let values = roll
		.dice
		.iter()
		.flat_map(|die| die.results.iter().map(|entry| entry.value))
		.collect::<Vec<_>>();
	assert_eq!(values, [8, 12, 6, 12, 8, 6]);
}
