//! All functionality for creating dice, rolling them, and working with their results.
//!
//! This is the home of the dice "primitives". Dice are normally built from tokens as part of an
//! [`Expression`](crate::expr::Expression), which owns them and folds their results together.

pub mod condition;
pub mod modifier;
pub mod roller;
pub(crate) mod source;

use core::fmt;

use serde::{Deserialize, Serialize};

use self::{
	condition::{ComparisonOp, Conditional},
	modifier::Modifiers,
	source::Source,
};
pub use self::{modifier::Modifier, roller::Roller};
use crate::{
	expr::Describe,
	lex::{Token, TokenKind},
	narrative::NarrativeFace,
	parse::{DiceSpec, FaceSpec},
};

/// Converts a face value for floating-point arithmetic.
#[inline]
#[expect(clippy::cast_precision_loss, reason = "Face values never come close to 2^52")]
pub(crate) const fn to_f64(value: i64) -> f64 {
	value as f64
}

/// Kind of a die, deciding how its values are acquired, displayed and totalled.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DieKind {
	/// A plain number that is never rolled (also the result of folding two values together)
	Static(f64),

	/// Regular dice, rolling one of their possibilities
	Standard,

	/// Fudge dice (`-1, 0, 1`)
	Fudge,

	/// Two d6 and a stunt d6, earning stunt points when any two match
	Stunt,

	/// Percentile composite: one sub-die per digit, concatenated into a single value
	PercentComposite(Vec<u8>),

	/// One colour of narrative dice
	Narrative(NarrativeFace),
}

/// Face values a die can land on.
///
/// Contiguous faces are only stored as their bounds, so huge dice (`1d10000000000`) cost nothing to build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Faces {
	/// No faces of its own (static dice and percentile composites)
	None,

	/// Every value between the bounds, inclusive
	Range {
		/// Lowest face
		min: i64,

		/// Highest face
		max: i64,
	},

	/// Explicitly listed faces, in the order they were given
	List(Vec<i64>),
}

impl Faces {
	/// Creates a range of faces, normalizing reversed bounds.
	#[must_use]
	pub fn range(from: i64, to: i64) -> Self {
		Self::Range {
			min: from.min(to),
			max: from.max(to),
		}
	}

	/// Lowest face.
	#[must_use]
	pub fn min(&self) -> Option<i64> {
		match self {
			Self::None => None,
			Self::Range { min, .. } => Some(*min),
			Self::List(faces) => faces.iter().copied().min(),
		}
	}

	/// Highest face.
	#[must_use]
	pub fn max(&self) -> Option<i64> {
		match self {
			Self::None => None,
			Self::Range { max, .. } => Some(*max),
			Self::List(faces) => faces.iter().copied().max(),
		}
	}

	/// Number of distinct face values.
	#[must_use]
	pub fn distinct(&self) -> usize {
		match self {
			Self::None => 0,
			Self::Range { min, max } => {
				usize::try_from(i128::from(*max) - i128::from(*min) + 1).unwrap_or(usize::MAX)
			}
			Self::List(faces) => {
				let mut faces = faces.clone();
				faces.sort_unstable();
				faces.dedup();
				faces.len()
			}
		}
	}

	/// Mean face value.
	#[must_use]
	pub fn average(&self) -> Option<f64> {
		match self {
			Self::None => None,
			Self::Range { min, max } => Some((to_f64(*min) + to_f64(*max)) / 2.0),
			Self::List(faces) if faces.is_empty() => None,
			Self::List(faces) => {
				let sum = faces.iter().fold(0_i64, |sum, &face| sum.saturating_add(face));
				Some(to_f64(sum) / to_f64(i64::try_from(faces.len()).unwrap_or(i64::MAX)))
			}
		}
	}

	/// Whether the faces are contiguous and start at one, as on a physical die.
	#[must_use]
	pub fn is_numbered(&self) -> bool {
		match self {
			Self::None => false,
			Self::Range { min, .. } => *min == 1,
			Self::List(faces) => faces.first() == Some(&1) && roller::is_contiguous(faces),
		}
	}

	/// Picks a face with an RNG.
	pub fn pick(&self, rng: &mut dyn Roller) -> i64 {
		match self {
			Self::None => 0,
			Self::Range { min, max } => rng.uniform(*min, *max),
			Self::List(faces) => rng.pick(faces),
		}
	}
}

/// The faces of a die and how to acquire values from them.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Shape {
	/// Kind of die
	pub kind: DieKind,

	/// Every face value the die can land on
	pub faces: Faces,
}

impl Shape {
	/// Creates the shape described by a face specifier.
	#[must_use]
	pub fn from_faces(faces: &FaceSpec) -> Self {
		let kind = match faces {
			FaceSpec::Fudge => DieKind::Fudge,
			FaceSpec::Stunt => DieKind::Stunt,
			FaceSpec::Composite(digits) => DieKind::PercentComposite(digits.clone()),
			_ => DieKind::Standard,
		};

		Self {
			kind,
			faces: faces.possibilities(),
		}
	}

	/// Highest face value.
	#[must_use]
	pub fn max_face(&self) -> i64 {
		match &self.kind {
			DieKind::Static(..) => 0,
			DieKind::PercentComposite(digits) => concat_digits(digits.iter().map(|&digit| digit_faces(digit).1)),
			_ => self.faces.max().unwrap_or(0),
		}
	}

	/// Lowest face value.
	#[must_use]
	pub fn min_face(&self) -> i64 {
		match &self.kind {
			DieKind::Static(..) => 0,
			DieKind::PercentComposite(digits) => concat_digits(digits.iter().map(|&digit| digit_faces(digit).0)),
			_ => self.faces.min().unwrap_or(0),
		}
	}

	/// Number of distinct values the die can produce.
	#[must_use]
	pub fn distinct_faces(&self) -> usize {
		match &self.kind {
			DieKind::Static(..) => 1,
			DieKind::PercentComposite(digits) => digits
				.iter()
				.map(|&digit| {
					let (min, max) = digit_faces(digit);
					usize::try_from(max - min + 1).unwrap_or(1)
				})
				.product(),
			_ => self.faces.distinct(),
		}
	}

	/// Whether a render backend can produce values for this die. Only contiguous faces starting at one (plus fudge
	/// dice) can be rendered; anything else is generated with the RNG even for rendered rolls.
	#[must_use]
	pub fn can_render(&self) -> bool {
		match &self.kind {
			DieKind::Static(..) => false,
			DieKind::Fudge | DieKind::Stunt | DieKind::PercentComposite(..) | DieKind::Narrative(..) => true,
			DieKind::Standard => self.faces.is_numbered(),
		}
	}

	/// Acquires a new value for the die, either from the render backend or the RNG.
	pub(crate) async fn acquire(&self, source: &mut Source<'_>) -> ResultEntry {
		#[cfg(feature = "render")]
		if let Source::Render { rng, backend } = source {
			if self.can_render() {
				if let Some(entry) = self.acquire_rendered(*backend, &mut **rng).await {
					return entry;
				}
			}
		}

		self.acquire_sync(source.rng())
	}

	/// Generates a new value for the die with an RNG.
	pub fn acquire_sync(&self, rng: &mut dyn Roller) -> ResultEntry {
		match &self.kind {
			DieKind::PercentComposite(digits) => {
				let rolled = digits
					.iter()
					.map(|&digit| {
						let (min, max) = digit_faces(digit);
						rng.uniform(min, max)
					})
					.collect::<Vec<_>>();
				composite_entry(&rolled)
			}
			_ => ResultEntry::new(self.faces.pick(rng)),
		}
	}

	#[cfg(feature = "render")]
	async fn acquire_rendered(
		&self,
		backend: &dyn crate::render::RenderBackend,
		rng: &mut dyn Roller,
	) -> Option<ResultEntry> {
		use crate::render::{combine_values, RenderRequest};

		if let DieKind::PercentComposite(digits) = &self.kind {
			let mut rolled = Vec::with_capacity(digits.len());
			for &digit in digits {
				let (min, max) = digit_faces(digit);
				let sides = if digit == 0 { 10 } else { i64::from(digit) };
				let values = backend.resolve_die(&RenderRequest::standard(sides)).await;
				rolled.push(match values.first() {
					Some(10) if digit == 0 => 0,
					Some(&value) => value,
					None => rng.uniform(min, max),
				});
			}
			return Some(composite_entry(&rolled));
		}

		let values = backend.resolve_die(&RenderRequest::for_shape(self)).await;
		combine_values(&values, self.max_face()).map(ResultEntry::new)
	}

	/// Mean face value.
	#[must_use]
	pub fn average(&self) -> f64 {
		match &self.kind {
			DieKind::Static(value) => *value,
			_ => self
				.faces
				.average()
				.unwrap_or_else(|| (to_f64(self.min_face()) + to_f64(self.max_face())) / 2.0),
		}
	}
}

/// Range of faces a percentile composite's digit sub-die rolls. A `0` digit rolls `0..=9`.
const fn digit_faces(digit: u8) -> (i64, i64) {
	if digit == 0 {
		(0, 9)
	} else {
		(1, digit as i64)
	}
}

/// Concatenates decimal digits into a single value.
fn concat_digits(digits: impl IntoIterator<Item = i64>) -> i64 {
	digits
		.into_iter()
		.fold(0_i64, |acc, digit| acc.saturating_mul(10).saturating_add(digit))
}

/// Builds the result entry for a rolled percentile composite, displayed as its comma-separated digits.
fn composite_entry(digits: &[i64]) -> ResultEntry {
	ResultEntry::with_display(
		concat_digits(digits.iter().copied()),
		digits.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
	)
}

/// Mark left on a [`ResultEntry`] by whatever changed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change")]
pub enum Mark {
	/// Dropped by keep/drop modifiers (`d`)
	#[serde(rename = "d")]
	Dropped,

	/// Triggered an explosion (`!`)
	#[serde(rename = "!")]
	Exploded,

	/// Rerolled (`r`)
	#[serde(rename = "r")]
	Rerolled,

	/// Rerolled to make results unique (`u`)
	#[serde(rename = "u")]
	Unique,

	/// Counted as a success (`*`)
	#[serde(rename = "*")]
	Success,

	/// Counted as a negative success (`-`)
	#[serde(rename = "-")]
	Negated,
}

impl Mark {
	/// Symbol displayed after the entry's value.
	#[must_use]
	pub const fn symbol(&self) -> char {
		match self {
			Self::Dropped => 'd',
			Self::Exploded => '!',
			Self::Rerolled => 'r',
			Self::Unique => 'u',
			Self::Success => '*',
			Self::Negated => '-',
		}
	}
}

impl fmt::Display for Mark {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// A single rolled value of a die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ResultEntry {
	/// Value that counts towards the total
	pub value: i64,

	/// Value as displayed
	pub display: String,

	/// Whether the value counts towards the total
	pub usable: bool,

	/// Marks left by modifiers, in the order they were first applied
	pub marks: Vec<Mark>,
}

impl ResultEntry {
	/// Creates a new usable entry that displays its value.
	#[must_use]
	pub fn new(value: i64) -> Self {
		Self::with_display(value, value.to_string())
	}

	/// Creates a new usable entry with a custom display.
	#[must_use]
	pub fn with_display(value: i64, display: impl Into<String>) -> Self {
		Self {
			value,
			display: display.into(),
			usable: true,
			marks: Vec::new(),
		}
	}

	/// Adds a mark, unless the entry already has it.
	pub fn mark(&mut self, mark: Mark) {
		if !self.marks.contains(&mark) {
			self.marks.push(mark);
		}
	}

	/// Checks whether the entry has a mark.
	#[must_use]
	pub fn has(&self, mark: Mark) -> bool {
		self.marks.contains(&mark)
	}

	/// Stops the value from counting towards the total and marks it as dropped.
	pub fn drop(&mut self) {
		self.usable = false;
		self.mark(Mark::Dropped);
	}

	/// Replaces the value (and its display) with that of a newly-acquired entry.
	pub fn replace(&mut self, with: ResultEntry) {
		self.value = with.value;
		self.display = with.display;
	}
}

impl fmt::Display for ResultEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.display)?;
		self.marks.iter().try_for_each(|mark| write!(f, "{mark}"))
	}
}

/// Rolled entries of a die, in display order.
///
/// Entries are stored append-only; a separate order decides how they are displayed, so that inserting an entry
/// in the middle (as explosions do) or sorting never moves existing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMap {
	/// Every entry ever added
	entries: Vec<ResultEntry>,

	/// Indices into `entries`, in display order
	order: Vec<usize>,
}

impl ResultMap {
	/// Creates an empty result map.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			entries: Vec::new(),
			order: Vec::new(),
		}
	}

	/// Number of entries.
	#[must_use]
	#[inline]
	pub fn len(&self) -> usize {
		self.order.len()
	}

	/// Whether there are no entries.
	#[must_use]
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Removes all entries.
	pub fn clear(&mut self) {
		self.entries.clear();
		self.order.clear();
	}

	/// Adds an entry at the end, returning its position.
	pub fn push(&mut self, entry: ResultEntry) -> usize {
		self.order.push(self.entries.len());
		self.entries.push(entry);
		self.order.len() - 1
	}

	/// Inserts an entry directly after the given position, returning the new entry's position.
	pub fn insert_after(&mut self, position: usize, entry: ResultEntry) -> usize {
		let position = (position + 1).min(self.order.len());
		self.order.insert(position, self.entries.len());
		self.entries.push(entry);
		position
	}

	/// Gets the entry at a position.
	#[must_use]
	pub fn get(&self, position: usize) -> Option<&ResultEntry> {
		self.order.get(position).and_then(|&index| self.entries.get(index))
	}

	/// Gets the entry at a position mutably.
	pub fn get_mut(&mut self, position: usize) -> Option<&mut ResultEntry> {
		self.order.get(position).and_then(|&index| self.entries.get_mut(index))
	}

	/// Iterates over the entries in display order.
	pub fn iter(&self) -> impl Iterator<Item = &ResultEntry> + '_ {
		self.order.iter().filter_map(|&index| self.entries.get(index))
	}

	/// Runs a function on every entry in display order.
	pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut ResultEntry)) {
		for &index in &self.order {
			if let Some(entry) = self.entries.get_mut(index) {
				f(entry);
			}
		}
	}

	/// Positions of all entries, ordered by value (ties keep their display order).
	#[must_use]
	pub fn ranked(&self, descending: bool) -> Vec<usize> {
		let value = |position: usize| self.get(position).map_or(0, |entry| entry.value);
		let mut positions = (0..self.len()).collect::<Vec<_>>();
		if descending {
			positions.sort_by(|&a, &b| value(b).cmp(&value(a)));
		} else {
			positions.sort_by_key(|&position| value(position));
		}
		positions
	}

	/// Reorders the entries by value.
	pub fn sort(&mut self, descending: bool) {
		self.order = self
			.ranked(descending)
			.into_iter()
			.filter_map(|position| self.order.get(position).copied())
			.collect();
	}

	/// Sum of all usable values.
	#[must_use]
	pub fn sum(&self) -> i64 {
		self.iter()
			.filter(|entry| entry.usable)
			.fold(0_i64, |sum, entry| sum.saturating_add(entry.value))
	}
}

impl FromIterator<ResultEntry> for ResultMap {
	fn from_iter<T: IntoIterator<Item = ResultEntry>>(iter: T) -> Self {
		let entries = iter.into_iter().collect::<Vec<_>>();
		Self {
			order: (0..entries.len()).collect(),
			entries,
		}
	}
}

/// One dice token's complete roll state: its faces, count, modifiers, conditions and results.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Die {
	/// Faces of the die
	pub shape: Shape,

	/// Number of dice rolled
	pub rolls: u32,

	/// `-1` for negative roll counts, otherwise `1`
	pub multiplier: i64,

	/// Modifiers applied after rolling
	pub modifiers: Modifiers,

	/// Conditions that turn the roll into a success count
	pub conditions: Vec<Conditional>,

	/// Rolled entries
	pub results: ResultMap,

	/// Whether the roll count comes from the value before it (`(2d6)d8`)
	pub parened: bool,

	/// Source text of the dice token
	pub text: String,

	/// Source text of every modifier and condition attached to the die, in order
	pub suffix: Vec<String>,
}

impl Die {
	/// Creates a die from a dice literal.
	///
	/// # Examples
	/// ```
	/// use astragal::{dice::roller::Iter as IterRoller, parse::DiceSpec, Die};
	///
	/// let mut die = Die::from_spec(&"-2d6".parse::<DiceSpec>()?, "-2d6");
	/// die.roll_sync(&mut IterRoller::new([3, 4]));
	/// assert_eq!(die.result(), -7.0);
	/// # Ok::<(), astragal::parse::Error>(())
	/// ```
	#[must_use]
	pub fn from_spec(spec: &DiceSpec, text: impl Into<String>) -> Self {
		let shape = Shape::from_faces(&spec.faces);
		let count = spec.count.unwrap_or(1);
		let rolls = match shape.kind {
			DieKind::Stunt => 3,
			_ => u32::try_from(count.unsigned_abs()).unwrap_or(u32::MAX).max(1),
		};

		Self {
			shape,
			rolls,
			multiplier: if count < 0 { -1 } else { 1 },
			modifiers: Modifiers::default(),
			conditions: Vec::new(),
			results: ResultMap::new(),
			parened: false,
			text: text.into(),
			suffix: Vec::new(),
		}
	}

	/// Creates a static die that always has the given value.
	#[must_use]
	pub fn fixed(value: f64) -> Self {
		Self {
			shape: Shape {
				kind: DieKind::Static(value),
				faces: Faces::None,
			},
			rolls: 1,
			multiplier: 1,
			modifiers: Modifiers::default(),
			conditions: Vec::new(),
			results: ResultMap::new(),
			parened: false,
			text: value.to_string(),
			suffix: Vec::new(),
		}
	}

	/// Creates a die of narrative dice of one colour.
	#[must_use]
	pub fn narrative(face: NarrativeFace, amount: u32) -> Self {
		Self {
			shape: Shape {
				kind: DieKind::Narrative(face),
				faces: Faces::range(1, face.sides()),
			},
			rolls: amount,
			multiplier: 1,
			modifiers: Modifiers::default(),
			conditions: Vec::new(),
			results: ResultMap::new(),
			parened: false,
			text: format!("{amount}{}", face.letter()),
			suffix: Vec::new(),
		}
	}

	/// Creates a die from a dice-kind token, including the conditions attached to it.
	///
	/// # Errors
	/// If the token isn't a dice-kind token, or it is a plain number that isn't numeric, an error variant is
	/// returned.
	pub fn from_token(token: &Token) -> Result<Self, Error> {
		if !token.kind.is_dice() {
			return Err(Error::NotDice(token.value.clone()));
		}

		let mut die = match &token.dice {
			Some(spec) => Self::from_spec(spec, token.text.clone()),
			None => {
				let value = token
					.value
					.trim()
					.parse::<f64>()
					.map_err(|_| Error::InvalidNumber(token.value.clone()))?;
				let mut die = Self::fixed(value);
				die.text.clone_from(&token.text);
				die
			}
		};

		die.parened = token.parened;
		if !token.conditions.is_empty() {
			if die.is_static() {
				log::warn!("Ignoring conditions on static value {}", token.value);
			} else {
				die.conditions.clone_from(&token.conditions);
			}
			die.suffix
				.extend(token.conditions.iter().map(|condition| condition.text.clone()));
		}

		Ok(die)
	}

	/// Every condition on the die: its own, then those of its modifiers in the order they were added.
	pub fn conditionals(&self) -> impl Iterator<Item = &Conditional> + '_ {
		self.conditions
			.iter()
			.chain(self.modifiers.iter().flat_map(Modifier::conditionals))
	}

	pub(crate) fn conditionals_mut(&mut self) -> impl Iterator<Item = &mut Conditional> + '_ {
		self.conditions
			.iter_mut()
			.chain(self.modifiers.iter_mut().flat_map(Modifier::conditionals_mut))
	}

	/// Whether the die is a plain number that is never rolled.
	#[must_use]
	#[inline]
	pub const fn is_static(&self) -> bool {
		matches!(self.shape.kind, DieKind::Static(..))
	}

	/// Attaches a modifier token to the die. Static dice don't take modifiers, so the modifier is skipped and a
	/// warning is returned instead.
	///
	/// # Errors
	/// If the token isn't a modifier token, an error variant is returned.
	pub fn attach(&mut self, token: &Token) -> Result<Option<Warning>, Error> {
		let modifier = Modifier::from_token(token)?;
		self.suffix.push(token.text.clone());
		self.suffix
			.extend(token.conditions.iter().map(|condition| condition.text.clone()));

		if self.is_static() {
			let warning = Warning::ModifierOnStatic {
				modifier: token.text.clone(),
				value: self.text.clone(),
			};
			log::warn!("{warning}");
			return Ok(Some(warning));
		}

		self.modifiers.set(modifier);
		Ok(None)
	}

	/// Sets the number of dice to roll from a value, as for dice following a parenthesised group. At least one die is
	/// always rolled.
	pub fn set_rolls(&mut self, value: f64) {
		#[expect(clippy::cast_possible_truncation, reason = "Roll counts are clamped to the u32 range")]
		let count = value.trunc().clamp(-f64::from(u32::MAX), f64::from(u32::MAX)) as i64;
		self.multiplier = if count < 0 { -1 } else { 1 };
		self.rolls = u32::try_from(count.unsigned_abs()).unwrap_or(u32::MAX).max(1);
	}

	/// Rolls the die with an RNG, applying all of its modifiers and conditions.
	pub fn roll_sync(&mut self, roller: &mut impl Roller) {
		let mut source = Source::Rng(roller);
		if source::now(self.roll(&mut source)).is_none() {
			log::error!("Synchronous roll of {} suspended", self.text);
		}
	}

	/// Rolls the die, then applies its modifiers (all but keep-high/low in order, then keep-high, then keep-low)
	/// and finally its conditions.
	pub(crate) async fn roll(&mut self, source: &mut Source<'_>) {
		if self.is_static() {
			return;
		}

		self.results.clear();
		for _ in 0..self.rolls {
			let entry = self.shape.acquire(source).await;
			self.results.push(entry);
		}

		let Self {
			shape,
			rolls,
			modifiers,
			results,
			..
		} = self;
		for modifier in modifiers.in_application_order() {
			modifier.apply(shape, results, *rolls, source).await;
		}

		self.apply_conditions(source.rng());
		log::debug!("Rolled {}: {}", self.text, self.display());
	}

	/// Counts successes against the die's own conditions: matching entries become 1 and are marked with `*`,
	/// everything else stops counting. Entries equal to a negate condition's comparer become -1 instead.
	fn apply_conditions(&mut self, rng: &mut dyn Roller) {
		if self.conditions.is_empty() {
			return;
		}

		let negate = self
			.conditions
			.iter_mut()
			.find(|condition| condition.operator == ComparisonOp::Negate)
			.map(|condition| condition.resolve(rng));

		let conditions = &mut self.conditions;
		self.results.for_each_mut(|entry| {
			if negate.is_some_and(|negate| to_f64(entry.value) == negate) {
				entry.value = -1;
				entry.mark(Mark::Negated);
			} else if condition::check_condition(entry.value, conditions, rng) {
				entry.value = 1;
				entry.mark(Mark::Success);
			} else {
				entry.usable = false;
			}
		});
	}

	/// Total of the die, with the multiplier applied.
	#[must_use]
	pub fn result(&self) -> f64 {
		match self.shape.kind {
			DieKind::Static(value) => value,
			_ => to_f64(self.multiplier.saturating_mul(self.results.sum())),
		}
	}

	/// Stunt points earned by a stunt die: the stunt die's value when any two of its three dice match.
	#[must_use]
	pub fn stunt_points(&self) -> Option<i64> {
		if self.shape.kind != DieKind::Stunt {
			return None;
		}

		let values = self.results.iter().map(|entry| entry.value).collect::<Vec<_>>();
		let &[first, second, stunt] = values.as_slice() else {
			return None;
		};
		(first == second || first == stunt || second == stunt).then_some(stunt)
	}

	/// Highest total the die can produce, accounting for keep modifiers and the multiplier.
	#[must_use]
	pub fn max_possible(&self) -> f64 {
		if let DieKind::Static(value) = self.shape.kind {
			return value;
		}

		let kept = i64::from(self.kept_rolls());
		if self.multiplier < 0 {
			-to_f64(self.shape.min_face().saturating_mul(kept))
		} else {
			to_f64(self.shape.max_face().saturating_mul(kept))
		}
	}

	/// Lowest total the die can produce, accounting for keep modifiers and the multiplier.
	#[must_use]
	pub fn min_possible(&self) -> f64 {
		if let DieKind::Static(value) = self.shape.kind {
			return value;
		}

		let kept = i64::from(self.kept_rolls());
		if self.multiplier < 0 {
			-to_f64(self.shape.max_face().saturating_mul(kept))
		} else {
			to_f64(self.shape.min_face().saturating_mul(kept))
		}
	}

	/// Number of rolls that count towards the total after keep modifiers.
	fn kept_rolls(&self) -> u32 {
		self.modifiers.kept(self.rolls)
	}

	/// Expected total of the die, ignoring modifiers. `None` for dice that can't be averaged.
	#[must_use]
	pub fn average(&self) -> Option<f64> {
		match self.shape.kind {
			DieKind::Static(value) => Some(value),
			DieKind::Stunt | DieKind::PercentComposite(..) => None,
			_ => Some(to_f64(self.multiplier) * f64::from(self.rolls) * self.shape.average()),
		}
	}

	/// Display of the rolled die, such as `[1d, 2, 3, 4]`.
	#[must_use]
	pub fn display(&self) -> String {
		self.describe(None)
	}
}

impl Describe for Die {
	fn describe(&self, list_limit: Option<usize>) -> String {
		if self.is_static() {
			return self.result().to_string();
		}

		let sign = if self.multiplier < 0 { "-" } else { "" };
		let body = match &self.shape.kind {
			DieKind::PercentComposite(..) => self
				.results
				.iter()
				.map(ToString::to_string)
				.collect::<Vec<_>>()
				.join("|"),
			DieKind::Stunt => {
				let pair = join_entries(&self.results.iter().take(2).collect::<Vec<_>>(), None);
				let stunt = self
					.results
					.get(2)
					.map(ToString::to_string)
					.unwrap_or_default();
				let doubled = if self.stunt_points().is_some() { "S" } else { "" };
				format!("[{pair}], [{stunt}]{doubled}")
			}
			_ => format!("[{}]", join_entries(&self.results.iter().collect::<Vec<_>>(), list_limit)),
		};

		let conditions = self
			.conditions
			.iter()
			.map(ToString::to_string)
			.collect::<String>();
		format!("{sign}{body}{conditions}")
	}
}

/// Lists entries separated by commas, truncating the list after a limit.
fn join_entries(entries: &[&ResultEntry], list_limit: Option<usize>) -> String {
	let list_limit = list_limit.unwrap_or(usize::MAX);
	let truncated = entries.len().saturating_sub(list_limit);

	format!(
		"{}{}",
		entries
			.iter()
			.take(list_limit)
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(", "),
		if truncated > 0 {
			format!(", {truncated} more...")
		} else {
			String::new()
		}
	)
}

impl fmt::Display for Die {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// A non-fatal problem encountered while building dice.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Warning {
	/// A modifier was attached to a plain number and skipped.
	ModifierOnStatic {
		/// Source text of the modifier
		modifier: String,

		/// Source text of the number
		value: String,
	},
}

impl fmt::Display for Warning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ModifierOnStatic { modifier, value } => {
				write!(f, "modifier {modifier} can't be applied to the static value {value}")
			}
		}
	}
}

/// Error that can occur while creating dice or attaching modifiers to them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// A token that isn't dice was used to create a die.
	#[error("{0} is not a dice token")]
	NotDice(String),

	/// A plain number token isn't numeric.
	#[error("{0} is not a number")]
	InvalidNumber(String),

	/// A token that isn't a modifier was attached to a die.
	#[error("{0:?} is not a modifier")]
	NotModifier(TokenKind),
}
