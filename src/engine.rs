//! Top-level entry point: turns any supported input into something that can be rolled.

use core::fmt;
use std::sync::Arc;

use crate::{
	dice::roller::Roller,
	expr::{BuildError, Expression, RollError},
	lex::{LexError, Lexer, TokenKind},
	lookup::{Dispatch, LookupValue, RollerHandle},
	narrative::{NarrativeResult, NarrativeRoll},
	parse,
	reduce::{reduce, ParseError},
	settings::Settings,
};

/// Anything an [`Engine`] can produce from an input.
#[non_exhaustive]
pub enum Rollable {
	/// A dice expression
	Dice(Expression),

	/// A narrative dice pool
	Narrative(NarrativeRoll),

	/// A lookup resolved by an external sub-roller
	External(Box<dyn RollerHandle>),
}

impl Rollable {
	/// Rolls with an RNG.
	///
	/// # Errors
	/// If a dice expression fails to roll, an error variant is returned.
	pub fn roll_sync(&mut self, roller: &mut impl Roller) -> Result<Outcome, Error> {
		Ok(match self {
			Self::Dice(expr) => Outcome::Number(expr.roll_sync(roller)?),
			Self::Narrative(pool) => Outcome::Narrative(pool.roll_sync(roller)),
			Self::External(handle) => Outcome::Lookup(handle.roll()),
		})
	}
}

impl fmt::Debug for Rollable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Dice(expr) => f.debug_tuple("Dice").field(expr).finish(),
			Self::Narrative(pool) => f.debug_tuple("Narrative").field(pool).finish(),
			Self::External(..) => f.debug_tuple("External").finish_non_exhaustive(),
		}
	}
}

/// Result of rolling a [`Rollable`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Outcome {
	/// Total of a dice expression
	Number(f64),

	/// Symbols of a narrative pool
	Narrative(NarrativeResult),

	/// Value of a lookup
	Lookup(LookupValue),
}

impl fmt::Display for Outcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(number) => write!(f, "{number}"),
			Self::Narrative(result) => write!(f, "{result}"),
			Self::Lookup(value) => write!(f, "{value}"),
		}
	}
}

/// Dispatches inputs to the right kind of roller: dice expressions, narrative pools, or lookups handled by an
/// external [`Dispatch`].
///
/// # Examples
/// ```
/// use astragal::{dice::roller::Val as ValRoller, engine::Outcome, Engine, Rollable};
///
/// let engine = Engine::default();
/// let mut rollable = engine.roller("2d6 + 3", "")?;
/// assert!(matches!(rollable, Rollable::Dice(..)));
/// assert_eq!(rollable.roll_sync(&mut ValRoller(4))?, Outcome::Number(11.0));
///
/// assert!(matches!(engine.roller("2g1p", "")?, Rollable::Narrative(..)));
/// assert!(engine.roller("[[Note^table]]", "").is_err());
/// # Ok::<(), astragal::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct Engine {
	/// Lexer for every input
	lexer: Lexer,

	/// Sub-roller dispatch for lookups
	dispatch: Option<Arc<dyn Dispatch>>,
}

impl Engine {
	/// Creates an engine with a lexer.
	#[must_use]
	pub fn new(lexer: Lexer) -> Self {
		Self { lexer, dispatch: None }
	}

	/// Creates an engine with the lexer defaults from settings.
	#[must_use]
	pub fn from_settings(settings: &Settings) -> Self {
		Self::new(Lexer::from_settings(settings))
	}

	/// Sets the dispatch used for lookups.
	#[must_use]
	pub fn with_dispatch(mut self, dispatch: Arc<dyn Dispatch>) -> Self {
		self.dispatch = Some(dispatch);
		self
	}

	/// Lexer used for every input.
	#[must_use]
	pub const fn lexer(&self) -> &Lexer {
		&self.lexer
	}

	/// Lexer used for every input, mutably (e.g. to change its defaults).
	pub fn lexer_mut(&mut self) -> &mut Lexer {
		&mut self.lexer
	}

	/// Creates a roller for an input. `source` is the path of the note the input came from, passed along to the
	/// dispatch for lookups.
	///
	/// # Errors
	/// If the input can't be tokenized, reduced or built, or it contains a lookup that no dispatch resolves, an error
	/// variant is returned.
	pub fn roller(&self, input: &str, source: &str) -> Result<Rollable, Error> {
		let tokens = self.lexer.tokenize(input).inspect_err(|err| {
			log::warn!("Invalid formula {input:?}: {err}");
		})?;

		if let [token] = tokens.as_slice() {
			if token.kind == TokenKind::Narrative {
				return NarrativeRoll::new(&token.value)
					.map(Rollable::Narrative)
					.ok_or_else(|| Error::NoRoller(input.to_owned()));
			}
		}

		if tokens.iter().any(|token| token.kind.is_lookup()) {
			log::debug!("Dispatching lookup {input:?} from {source:?}");
			return self
				.dispatch
				.as_ref()
				.and_then(|dispatch| dispatch.get_roller(input, source))
				.map(Rollable::External)
				.ok_or_else(|| Error::NoRoller(input.to_owned()));
		}

		Ok(Rollable::Dice(Expression::build(input, reduce(tokens)?)?))
	}
}

impl fmt::Debug for Engine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Engine")
			.field("lexer", &self.lexer)
			.field("dispatch", &self.dispatch.is_some())
			.finish()
	}
}

/// Any error that can occur while turning input into a roll result
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// Tokenizing failed.
	#[error(transparent)]
	Lex(#[from] LexError),

	/// Reducing the tokens failed.
	#[error(transparent)]
	Parse(#[from] ParseError),

	/// Building the expression failed.
	#[error(transparent)]
	Build(#[from] BuildError),

	/// Rolling failed.
	#[error(transparent)]
	Roll(#[from] RollError),

	/// A dice literal couldn't be parsed.
	#[error("invalid dice: {0}")]
	Dice(#[from] parse::Error),

	/// Nothing can roll the input.
	#[error("no roller available for {0:?}")]
	NoRoller(String),
}
