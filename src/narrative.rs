//! Narrative (Genesys) dice pools, such as `2g1y3p`, which produce successes, advantages and triumphs rather than a
//! number.

use core::{
	fmt,
	ops::{AddAssign, Neg},
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dice::{roller::Roller, source::Source, Die, DieKind};

/// Colour of narrative die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[expect(clippy::exhaustive_enums, reason = "The dice set is fixed")]
pub enum NarrativeFace {
	/// Green d8 (`g`, `a`, `A`)
	Ability,

	/// Yellow d12 (`y`, `P`, `pro`)
	Proficiency,

	/// Blue d6 (`b`, `B`, `boo`)
	Boost,

	/// Red d12 (`r`, `c`, `C`)
	Challenge,

	/// Purple d8 (`p`, `d`, `D`, `diff`)
	Difficulty,

	/// Black d6 (`s`, `S`, `k`, `blk`, `sb`)
	Setback,
}

impl NarrativeFace {
	/// Every colour, in canonical order.
	pub const ALL: [Self; 6] = [
		Self::Ability,
		Self::Proficiency,
		Self::Boost,
		Self::Challenge,
		Self::Difficulty,
		Self::Setback,
	];

	/// Number of sides of the die.
	#[must_use]
	pub const fn sides(&self) -> i64 {
		match self {
			Self::Boost | Self::Setback => 6,
			Self::Ability | Self::Difficulty => 8,
			Self::Proficiency | Self::Challenge => 12,
		}
	}

	/// Canonical colour letter.
	#[must_use]
	pub const fn letter(&self) -> char {
		match self {
			Self::Ability => 'g',
			Self::Proficiency => 'y',
			Self::Boost => 'b',
			Self::Challenge => 'r',
			Self::Difficulty => 'p',
			Self::Setback => 's',
		}
	}

	/// Finds the colour for a colour letter or abbreviation. Lowercase single letters are colours, uppercase ones
	/// are abbreviations (`P` is proficiency while `p` is purple difficulty).
	///
	/// # Examples
	/// ```
	/// use astragal::narrative::NarrativeFace;
	///
	/// assert_eq!(NarrativeFace::from_symbol("p"), Some(NarrativeFace::Difficulty));
	/// assert_eq!(NarrativeFace::from_symbol("P"), Some(NarrativeFace::Proficiency));
	/// assert_eq!(NarrativeFace::from_symbol("blk"), Some(NarrativeFace::Setback));
	/// assert_eq!(NarrativeFace::from_symbol("w"), None);
	/// ```
	#[must_use]
	pub fn from_symbol(symbol: &str) -> Option<Self> {
		Some(match symbol {
			"g" | "G" | "a" | "A" => Self::Ability,
			"y" | "Y" | "P" | "pro" => Self::Proficiency,
			"b" | "B" | "boo" => Self::Boost,
			"r" | "R" | "c" | "C" => Self::Challenge,
			"p" | "d" | "D" | "diff" => Self::Difficulty,
			"s" | "S" | "k" | "K" | "blk" | "sb" => Self::Setback,
			_ => return None,
		})
	}

	/// Symbols rolled on a face of the die.
	#[must_use]
	pub fn face_result(&self, value: i64) -> NarrativeResult {
		let (success, advantage, triumph) = match self {
			Self::Boost => match value {
				3 => (1, 0, 0),
				4 => (1, 1, 0),
				5 => (0, 2, 0),
				6 => (0, 1, 0),
				_ => (0, 0, 0),
			},
			Self::Setback => match value {
				3 | 4 => (-1, 0, 0),
				5 | 6 => (0, -1, 0),
				_ => (0, 0, 0),
			},
			Self::Ability => match value {
				2 | 3 => (1, 0, 0),
				4 => (2, 0, 0),
				5 | 6 => (0, 1, 0),
				7 => (1, 1, 0),
				8 => (0, 2, 0),
				_ => (0, 0, 0),
			},
			Self::Difficulty => match value {
				2 => (-1, 0, 0),
				3 => (-2, 0, 0),
				4..=6 => (0, -1, 0),
				7 => (0, -2, 0),
				8 => (-1, -1, 0),
				_ => (0, 0, 0),
			},
			Self::Proficiency | Self::Challenge => match value {
				11 => (0, 0, 1),
				9 | 10 => (0, 2, 0),
				5..=8 => (1, 1, 0),
				4 => (0, 1, 0),
				2 | 3 => (2, 0, 0),
				0 | 1 => (1, 0, 0),
				_ => (0, 0, 0),
			},
		};

		let result = NarrativeResult {
			success,
			advantage,
			triumph,
		};
		match self {
			Self::Challenge => -result,
			_ => result,
		}
	}
}

/// Summed outcome of a narrative pool. Negative values are the opposing symbols: failures, threats and despairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[expect(clippy::exhaustive_structs, reason = "The symbol set is fixed")]
pub struct NarrativeResult {
	/// Successes, or failures when negative
	pub success: i64,

	/// Advantages, or threats when negative
	pub advantage: i64,

	/// Triumphs, or despairs when negative
	pub triumph: i64,
}

impl AddAssign for NarrativeResult {
	fn add_assign(&mut self, rhs: Self) {
		self.success += rhs.success;
		self.advantage += rhs.advantage;
		self.triumph += rhs.triumph;
	}
}

impl Neg for NarrativeResult {
	type Output = Self;

	fn neg(self) -> Self::Output {
		Self {
			success: -self.success,
			advantage: -self.advantage,
			triumph: -self.triumph,
		}
	}
}

impl fmt::Display for NarrativeResult {
	/// Formats the result like `2 success 1 threat`, leaving out anything that cancelled out.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts = [
			(self.success, "success", "failure"),
			(self.advantage, "adv", "threat"),
			(self.triumph, "triumph", "despair"),
		]
		.into_iter()
		.filter(|(count, ..)| *count != 0)
		.map(|(count, positive, negative)| {
			format!("{} {}", count.abs(), if count > 0 { positive } else { negative })
		})
		.collect::<Vec<_>>();

		f.write_str(&parts.join(" "))
	}
}

/// One group of a pool (`2g`, `pro`, `1 sb`).
static GROUP: Lazy<Regex> = Lazy::new(|| {
	#[expect(clippy::expect_used, reason = "The pattern is constant and covered by tests")]
	Regex::new(r"(\d*)(pro|boo|blk|sb|diff|[A-Za-z])").expect("narrative pattern should be valid")
});

/// Counts the dice of every colour in a pool, in canonical order. Unknown letters (such as `w` for white force dice)
/// are ignored. Returns `None` when the pool has no dice.
#[must_use]
pub fn count_pool(pool: &str) -> Option<Vec<(NarrativeFace, u32)>> {
	let mut counts = [0_u32; NarrativeFace::ALL.len()];
	for captures in GROUP.captures_iter(pool) {
		let Some(face) = captures.get(2).and_then(|symbol| NarrativeFace::from_symbol(symbol.as_str())) else {
			continue;
		};
		let amount = captures
			.get(1)
			.map(|digits| digits.as_str())
			.filter(|digits| !digits.is_empty())
			.map_or(Some(1), |digits| digits.parse::<u32>().ok())?;

		if let Some(index) = NarrativeFace::ALL.iter().position(|&known| known == face) {
			counts[index] = counts[index].saturating_add(amount);
		}
	}

	let pool = NarrativeFace::ALL
		.into_iter()
		.zip(counts)
		.filter(|&(_, amount)| amount > 0)
		.collect::<Vec<_>>();
	(!pool.is_empty()).then_some(pool)
}

/// Normalizes a pool to its canonical colour form, e.g. `2a 1P` into `2g1y`.
#[must_use]
pub fn normalize(pool: &str) -> Option<String> {
	count_pool(pool).map(|pool| {
		pool.into_iter()
			.map(|(face, amount)| format!("{amount}{}", face.letter()))
			.collect()
	})
}

/// A rollable narrative pool: one die per colour present.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct NarrativeRoll {
	/// Pool as written
	pub text: String,

	/// Dice of each colour in the pool
	pub dice: Vec<Die>,

	/// Outcome of the latest roll
	pub result: Option<NarrativeResult>,
}

impl NarrativeRoll {
	/// Creates a roll from a pool, such as `2g1y3p`. Returns `None` when the pool has no dice.
	///
	/// # Examples
	/// ```
	/// use astragal::{dice::roller::Iter as IterRoller, narrative::NarrativeRoll};
	///
	/// // Ability 2 (success), ability 8 (two advantages), difficulty 4 (threat)
	/// let mut roll = NarrativeRoll::new("2g1p").unwrap();
	/// let result = roll.roll_sync(&mut IterRoller::new([2, 8, 4]));
	/// assert_eq!(result.to_string(), "1 success 1 adv");
	/// ```
	#[must_use]
	pub fn new(pool: &str) -> Option<Self> {
		Some(Self {
			text: pool.to_owned(),
			dice: count_pool(pool)?
				.into_iter()
				.map(|(face, amount)| Die::narrative(face, amount))
				.collect(),
			result: None,
		})
	}

	/// Rolls every die in the pool with an RNG and sums their symbols.
	pub fn roll_sync(&mut self, roller: &mut impl Roller) -> NarrativeResult {
		for die in &mut self.dice {
			die.roll_sync(&mut *roller);
		}
		self.total()
	}

	/// Rolls every die in the pool from a source and sums their symbols.
	pub(crate) async fn roll(&mut self, source: &mut Source<'_>) -> NarrativeResult {
		for die in &mut self.dice {
			die.roll(source).await;
		}
		self.total()
	}

	/// Rolls every die in the pool through a render backend and sums their symbols.
	#[cfg(feature = "render")]
	pub async fn roll_rendered(
		&mut self,
		roller: &mut impl Roller,
		backend: &dyn crate::render::RenderBackend,
	) -> NarrativeResult {
		let mut source = Source::Render { rng: roller, backend };
		self.roll(&mut source).await
	}

	/// Sums the symbols of the latest roll and remembers the outcome.
	fn total(&mut self) -> NarrativeResult {
		let mut total = NarrativeResult::default();
		for die in &self.dice {
			let &DieKind::Narrative(face) = &die.shape.kind else {
				continue;
			};
			for entry in die.results.iter() {
				total += face.face_result(entry.value);
			}
		}

		log::debug!("Rolled narrative pool {}: {total}", self.text);
		self.result = Some(total);
		total
	}
}

impl fmt::Display for NarrativeRoll {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.result {
			Some(result) => write!(f, "{result}"),
			None => f.write_str(&self.text),
		}
	}
}
