//! Dice modifiers and the engine that applies them to rolled results.

use core::fmt;

use super::{
	condition::{check_condition, Conditional},
	source::Source,
	Error, Mark, ResultMap, Shape,
};
use crate::lex::{Token, TokenKind};

/// Iteration cap used by the `i` sentinel (`!i`, `ri`) and by explosions without an explicit cap.
pub const UNBOUNDED: u32 = 100;

/// Maximum number of rounds spent rerolling duplicates for [`Modifier::Unique`].
pub const UNIQUE_ATTEMPTS: u32 = 100;

/// Order in which [`Modifier::Sort`] arranges results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "There are only two directions")]
pub enum SortOrder {
	/// Lowest first (`s`, `sa`)
	Ascending,

	/// Highest first (`sd`)
	Descending,
}

/// Routines that manipulate a die's results after it has been rolled.
///
/// Dropping the lowest N is keeping the highest `rolls - N`, so drop modifiers share their type with the keep
/// modifier they stand for. The number kept is only worked out when the die rolls, once its roll count is known.
///
/// # Examples
/// ```
/// use astragal::{dice::roller::Iter as IterRoller, lex::Lexer, Expression};
///
/// let mut expr = Expression::build("4d6dl1", Lexer::default().parse("4d6dl1")?)?;
/// assert_eq!(expr.roll_sync(&mut IterRoller::new([5, 1, 4, 2]))?, 11.0);
/// assert_eq!(expr.display(), "[5, 1d, 4, 2]");
/// # Ok::<(), astragal::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Modifier {
	/// Keeps only the highest x results, dropping the rest (`khx`, `kx`).
	KeepHigh(u32),

	/// Keeps only the lowest x results, dropping the rest (`klx`).
	KeepLow(u32),

	/// Drops the lowest x of the rolled dice by keeping the highest of the rest (`dlx`).
	DropLow(u32),

	/// Drops the highest x of the rolled dice by keeping the lowest of the rest (`dhx`).
	DropHigh(u32),

	/// Inserts an additional roll after each result that meets the conditions (`!`).
	Explode {
		/// Maximum number of additional rolls per original result
		times: u32,

		/// Conditions results must meet to explode. When empty, results must equal the highest face.
		conditionals: Vec<Conditional>,
	},

	/// Adds additional rolls into each result that meets the conditions, instead of inserting them (`!!`).
	ExplodeCombine {
		/// Maximum number of further rolls after the first one
		times: u32,

		/// Conditions results must meet to explode. When empty, results must equal the highest face.
		conditionals: Vec<Conditional>,
	},

	/// Rerolls every result that meets the conditions, in rounds (`r`).
	Reroll {
		/// Maximum number of rounds
		times: u32,

		/// Conditions results must meet to be rerolled. When empty, results must equal the lowest face.
		conditionals: Vec<Conditional>,
	},

	/// Reorders the results by value (`s`, `sa`, `sd`).
	Sort(SortOrder),

	/// Rerolls duplicate results until every result is different (`u`).
	Unique,
}

/// Discriminant of a [`Modifier`], used to keep at most one modifier of each type on a die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Mirrors Modifier")]
pub enum ModifierType {
	/// [`Modifier::KeepHigh`] and [`Modifier::DropLow`]
	KeepHigh,

	/// [`Modifier::KeepLow`] and [`Modifier::DropHigh`]
	KeepLow,

	/// [`Modifier::Explode`]
	Explode,

	/// [`Modifier::ExplodeCombine`]
	ExplodeCombine,

	/// [`Modifier::Reroll`]
	Reroll,

	/// [`Modifier::Sort`]
	Sort,

	/// [`Modifier::Unique`]
	Unique,
}

impl Modifier {
	/// Creates a modifier from a modifier token.
	///
	/// # Errors
	/// If the token isn't a modifier token, an error variant is returned.
	pub fn from_token(token: &Token) -> Result<Self, Error> {
		let count = token.value.parse::<u32>().ok();
		let nonzero = count.filter(|&count| count > 0);

		Ok(match token.kind {
			TokenKind::KeepHigh => Self::KeepHigh(count.unwrap_or(1)),
			TokenKind::KeepLow => Self::KeepLow(count.unwrap_or(1)),
			TokenKind::DropLow => Self::DropLow(count.unwrap_or(1)),
			TokenKind::DropHigh => Self::DropHigh(count.unwrap_or(1)),
			TokenKind::Explode => Self::Explode {
				times: nonzero.unwrap_or(UNBOUNDED),
				conditionals: token.conditions.clone(),
			},
			TokenKind::ExplodeCombine => Self::ExplodeCombine {
				times: nonzero.unwrap_or(UNBOUNDED),
				conditionals: token.conditions.clone(),
			},
			TokenKind::Reroll => Self::Reroll {
				times: nonzero.unwrap_or(1),
				conditionals: token.conditions.clone(),
			},
			TokenKind::Sort if token.value == "sd" => Self::Sort(SortOrder::Descending),
			TokenKind::Sort => Self::Sort(SortOrder::Ascending),
			TokenKind::Unique => Self::Unique,
			kind => return Err(Error::NotModifier(kind)),
		})
	}

	/// Type of the modifier.
	#[must_use]
	pub const fn kind(&self) -> ModifierType {
		match self {
			Self::KeepHigh(..) | Self::DropLow(..) => ModifierType::KeepHigh,
			Self::KeepLow(..) | Self::DropHigh(..) => ModifierType::KeepLow,
			Self::Explode { .. } => ModifierType::Explode,
			Self::ExplodeCombine { .. } => ModifierType::ExplodeCombine,
			Self::Reroll { .. } => ModifierType::Reroll,
			Self::Sort(..) => ModifierType::Sort,
			Self::Unique => ModifierType::Unique,
		}
	}

	/// Conditions the modifier checks results against.
	#[must_use]
	pub fn conditionals(&self) -> &[Conditional] {
		match self {
			Self::Explode { conditionals, .. }
			| Self::ExplodeCombine { conditionals, .. }
			| Self::Reroll { conditionals, .. } => conditionals,
			_ => &[],
		}
	}

	pub(crate) fn conditionals_mut(&mut self) -> &mut [Conditional] {
		match self {
			Self::Explode { conditionals, .. }
			| Self::ExplodeCombine { conditionals, .. }
			| Self::Reroll { conditionals, .. } => conditionals,
			_ => &mut [],
		}
	}

	/// Number of results a keep or drop modifier keeps out of `rolls` dice. `None` for every other modifier.
	#[must_use]
	pub const fn kept(&self, rolls: u32) -> Option<u32> {
		match self {
			Self::KeepHigh(count) | Self::KeepLow(count) => Some(*count),
			Self::DropLow(count) | Self::DropHigh(count) => Some(rolls.saturating_sub(*count)),
			_ => None,
		}
	}

	/// Applies the modifier to the results of `rolls` dice, acquiring any new values it needs from the source.
	pub(crate) async fn apply(
		&mut self,
		shape: &Shape,
		results: &mut ResultMap,
		rolls: u32,
		source: &mut Source<'_>,
	) {
		let kept = self.kept(rolls).unwrap_or(rolls);
		match self {
			Self::KeepHigh(..) | Self::DropLow(..) => apply_keep(results, kept, true),
			Self::KeepLow(..) | Self::DropHigh(..) => apply_keep(results, kept, false),
			Self::Explode { times, conditionals } => {
				apply_explode(shape, results, source, *times, conditionals).await;
			}
			Self::ExplodeCombine { times, conditionals } => {
				apply_explode_combine(shape, results, source, *times, conditionals).await;
			}
			Self::Reroll { times, conditionals } => {
				apply_reroll(shape, results, source, *times, conditionals).await;
			}
			Self::Sort(order) => results.sort(*order == SortOrder::Descending),
			Self::Unique => apply_unique(shape, results, source).await,
		}
	}
}

/// Checks a value against a modifier's conditionals, or against a default face when it has none.
fn triggers(value: i64, conditionals: &mut [Conditional], default: i64, source: &mut Source<'_>) -> bool {
	if conditionals.is_empty() {
		value == default
	} else {
		check_condition(value, conditionals, source.rng())
	}
}

/// Positions of every result that currently triggers.
fn triggering(results: &ResultMap, conditionals: &mut [Conditional], default: i64, source: &mut Source<'_>) -> Vec<usize> {
	(0..results.len())
		.filter(|&position| {
			results
				.get(position)
				.is_some_and(|entry| triggers(entry.value, conditionals, default, source))
		})
		.collect()
}

fn apply_keep(results: &mut ResultMap, count: u32, highest: bool) {
	// The only result is never dropped
	if results.len() <= 1 {
		return;
	}

	let count = usize::try_from(count).unwrap_or(usize::MAX);
	for position in results.ranked(highest).into_iter().skip(count) {
		if let Some(entry) = results.get_mut(position) {
			entry.drop();
		}
	}
}

async fn apply_explode(
	shape: &Shape,
	results: &mut ResultMap,
	source: &mut Source<'_>,
	times: u32,
	conditionals: &mut [Conditional],
) {
	let max = shape.max_face();
	let triggered = triggering(results, conditionals, max, source);

	// Every insertion shifts the positions of the results after it
	let mut inserted = 0;
	for original in triggered {
		let mut position = original + inserted;
		for _ in 0..times {
			if let Some(entry) = results.get_mut(position) {
				entry.mark(Mark::Exploded);
			}

			let entry = shape.acquire(source).await;
			let value = entry.value;
			position = results.insert_after(position, entry);
			inserted += 1;

			if !triggers(value, conditionals, max, source) {
				break;
			}
		}
	}
}

async fn apply_explode_combine(
	shape: &Shape,
	results: &mut ResultMap,
	source: &mut Source<'_>,
	times: u32,
	conditionals: &mut [Conditional],
) {
	let max = shape.max_face();
	for position in triggering(results, conditionals, max, source) {
		let mut rolled = shape.acquire(source).await.value;
		let mut total = rolled;
		let mut iterations = 0;
		while iterations < times && triggers(rolled, conditionals, max, source) {
			rolled = shape.acquire(source).await.value;
			total = total.saturating_add(rolled);
			iterations += 1;
		}

		if let Some(entry) = results.get_mut(position) {
			entry.value = entry.value.saturating_add(total);
			entry.display = entry.value.to_string();
			entry.mark(Mark::Exploded);
		}
	}
}

async fn apply_reroll(
	shape: &Shape,
	results: &mut ResultMap,
	source: &mut Source<'_>,
	times: u32,
	conditionals: &mut [Conditional],
) {
	let min = shape.min_face();
	let mut pending = triggering(results, conditionals, min, source);

	let mut rounds = 0;
	while rounds < times && !pending.is_empty() {
		for &position in &pending {
			let rerolled = shape.acquire(source).await;
			if let Some(entry) = results.get_mut(position) {
				entry.replace(rerolled);
				entry.mark(Mark::Rerolled);
			}
		}

		pending.retain(|&position| {
			results
				.get(position)
				.is_some_and(|entry| triggers(entry.value, conditionals, min, source))
		});
		rounds += 1;
	}
}

async fn apply_unique(shape: &Shape, results: &mut ResultMap, source: &mut Source<'_>) {
	// Uniqueness is impossible with fewer faces than results
	if shape.distinct_faces() < results.len() {
		return;
	}

	let mut attempts = 0;
	while attempts < UNIQUE_ATTEMPTS && has_duplicates(results) {
		for position in 0..results.len() {
			let Some(value) = results.get(position).map(|entry| entry.value) else {
				continue;
			};
			let duplicate = (0..results.len())
				.find(|&other| other != position && results.get(other).is_some_and(|entry| entry.value == value));

			if let Some(duplicate) = duplicate {
				let rerolled = shape.acquire(source).await;
				if let Some(entry) = results.get_mut(duplicate) {
					entry.replace(rerolled);
					entry.mark(Mark::Unique);
				}
			}
		}
		attempts += 1;
	}
}

fn has_duplicates(results: &ResultMap) -> bool {
	let mut values = results.iter().map(|entry| entry.value).collect::<Vec<_>>();
	values.sort_unstable();
	values.windows(2).any(|pair| pair[0] == pair[1])
}

impl fmt::Display for Modifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let times = |times: u32| {
			if times == UNBOUNDED {
				"i".to_owned()
			} else {
				times.to_string()
			}
		};
		let conditions = |conditionals: &[Conditional]| {
			conditionals
				.iter()
				.map(ToString::to_string)
				.collect::<String>()
		};

		match self {
			Self::KeepHigh(count) => write!(f, "kh{count}"),
			Self::KeepLow(count) => write!(f, "kl{count}"),
			Self::DropLow(count) => write!(f, "dl{count}"),
			Self::DropHigh(count) => write!(f, "dh{count}"),
			Self::Explode { times: t, conditionals } => write!(f, "!{}{}", times(*t), conditions(conditionals)),
			Self::ExplodeCombine { times: t, conditionals } => {
				write!(f, "!!{}{}", times(*t), conditions(conditionals))
			}
			Self::Reroll { times: t, conditionals } => write!(f, "r{}{}", times(*t), conditions(conditionals)),
			Self::Sort(SortOrder::Ascending) => write!(f, "sa"),
			Self::Sort(SortOrder::Descending) => write!(f, "sd"),
			Self::Unique => write!(f, "u"),
		}
	}
}

/// The modifiers attached to a die, at most one of each [`ModifierType`]. Setting a modifier of a type that is
/// already present replaces it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers(Vec<Modifier>);

impl Modifiers {
	/// Adds a modifier, replacing any modifier of the same type.
	pub fn set(&mut self, modifier: Modifier) {
		match self.0.iter_mut().find(|existing| existing.kind() == modifier.kind()) {
			Some(existing) => *existing = modifier,
			None => self.0.push(modifier),
		}
	}

	/// Gets the modifier of a type.
	#[must_use]
	pub fn get(&self, kind: ModifierType) -> Option<&Modifier> {
		self.0.iter().find(|modifier| modifier.kind() == kind)
	}

	/// Number of results out of `rolls` dice that count after keep and drop modifiers.
	#[must_use]
	pub fn kept(&self, rolls: u32) -> u32 {
		[ModifierType::KeepHigh, ModifierType::KeepLow]
			.into_iter()
			.filter_map(|kind| self.get(kind).and_then(|modifier| modifier.kept(rolls)))
			.fold(rolls, u32::min)
	}

	/// Iterates over the modifiers in the order they were added.
	pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
		self.0.iter()
	}

	pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Modifier> {
		self.0.iter_mut()
	}

	/// Whether there are no modifiers.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the modifiers in the order they are applied: everything but keep modifiers in the order they
	/// were added, then keep-high, then keep-low. Keeping last stops dropped results from being exploded.
	pub(crate) fn in_application_order(&mut self) -> impl Iterator<Item = &mut Modifier> {
		let mut ordered = self.0.iter_mut().collect::<Vec<_>>();
		ordered.sort_by_key(|modifier| match modifier.kind() {
			ModifierType::KeepHigh => 1,
			ModifierType::KeepLow => 2,
			_ => 0,
		});
		ordered.into_iter()
	}
}

impl fmt::Display for Modifiers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.iter().try_for_each(|modifier| write!(f, "{modifier}"))
	}
}
