use std::sync::Arc;

use crate::{
	dice::roller::{Iter as IterRoller, Val as ValRoller},
	engine::{Error, Outcome},
	lex::LexError,
	lookup::{Dispatch, LookupValue, RollerHandle},
	narrative::NarrativeResult,
	Engine, Rollable,
};

/// Dispatch that resolves table lookups to a fixed row.
#[derive(Debug)]
struct Tables;

#[derive(Debug)]
struct Row(String);

impl RollerHandle for Row {
	fn roll(&mut self) -> LookupValue {
		LookupValue::Text(self.0.clone())
	}
}

impl Dispatch for Tables {
	fn get_roller(&self, expr: &str, source: &str) -> Option<Box<dyn RollerHandle>> {
		expr.contains("[[Loot^")
			.then(|| Box::new(Row(format!("gold from {source}"))) as Box<dyn RollerHandle>)
	}
}

#[test]
fn dice_expressions() {
	let engine = Engine::default();
	let mut rollable = engine.roller("4d6kh3 + 2", "").unwrap();
	assert_eq!(
		rollable.roll_sync(&mut IterRoller::new([1, 5, 3, 6])).unwrap(),
		Outcome::Number(16.0)
	);

	let Rollable::Dice(expr) = rollable else {
		panic!("expected dice");
	};
	assert_eq!(expr.display(), "[1d, 5, 3, 6] + 2");
}

#[test]
fn narrative_pools() {
	let engine = Engine::default();
	let mut rollable = engine.roller("1g 1b", "").unwrap();
	assert!(matches!(rollable, Rollable::Narrative(..)));
	assert_eq!(
		rollable.roll_sync(&mut IterRoller::new([4, 3])).unwrap(),
		Outcome::Narrative(NarrativeResult {
			success: 3,
			advantage: 0,
			triumph: 0
		})
	);
}

#[test]
fn lookups_go_through_the_dispatch() {
	let engine = Engine::default().with_dispatch(Arc::new(Tables));
	let mut rollable = engine.roller("[[Loot^table]]", "notes/dungeon.md").unwrap();
	let outcome = rollable.roll_sync(&mut ValRoller(1)).unwrap();
	assert_eq!(outcome, Outcome::Lookup(LookupValue::Text("gold from notes/dungeon.md".to_owned())));
	assert_eq!(outcome.to_string(), "gold from notes/dungeon.md");

	assert_eq!(
		engine.roller("[[Spells^table]]", "").unwrap_err(),
		Error::NoRoller("[[Spells^table]]".to_owned())
	);
}

#[test]
fn lookups_without_a_dispatch() {
	assert!(matches!(
		Engine::default().roller("#monsters", ""),
		Err(Error::NoRoller(..))
	));
}

#[test]
fn invalid_input() {
	let engine = Engine::default();
	assert!(matches!(
		engine.roller("1d6 $", ""),
		Err(Error::Lex(LexError::Unexpected { offset: 4, .. }))
	));
	assert!(matches!(engine.roller("(1d6", ""), Err(Error::Parse(..))));
	assert!(matches!(engine.roller("kh3", ""), Err(Error::Build(..))));
}

#[test]
fn lexer_defaults_can_change() {
	let mut engine = Engine::default();
	engine.lexer_mut().set_default_face(6);
	assert_eq!(engine.lexer().defaults().face, 6);

	let mut rollable = engine.roller("2d", "").unwrap();
	assert_eq!(rollable.roll_sync(&mut ValRoller(6)).unwrap(), Outcome::Number(12.0));
}
