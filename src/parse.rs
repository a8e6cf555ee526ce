//! Parser for the dice literals found in dice tokens, such as `3d6`, `d%`, `2d[1,3,5]`, `4d[2-5]`, `dF` or `1d66%`.
//!
//! The [lexer](crate::lex) decides *where* a dice literal is; this module decides what it means.

use core::{fmt, str::FromStr};

use chumsky::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dice::Faces;

/// A parsed dice literal: an optional roll count and the faces to roll.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[expect(clippy::exhaustive_structs, reason = "Unlikely to change")]
pub struct DiceSpec {
	/// Number of dice to roll. Negative counts negate the total. `None` when the count was omitted and no default
	/// was applied (a die following a parenthesised group).
	pub count: Option<i64>,

	/// Faces the dice have
	pub faces: FaceSpec,
}

impl DiceSpec {
	/// Fills in an omitted count with a default.
	#[must_use]
	pub fn with_default_count(mut self, count: i64) -> Self {
		self.count.get_or_insert(count);
		self
	}
}

impl fmt::Display for DiceSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(count) = self.count {
			write!(f, "{count}")?;
		}
		write!(f, "d{}", self.faces)
	}
}

impl FromStr for DiceSpec {
	type Err = Error;

	/// Parses a dice literal. An omitted face specifier is left as [`FaceSpec::Omitted`].
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		dice().parse(s).into_result().map_err(|errs| Error {
			details: errs.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
		})
	}
}

/// Face specifier of a dice literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FaceSpec {
	/// No face specifier was given (`3d`); the lexer replaces this with its default face count.
	Omitted,

	/// Faces `1..=n` (`d6`). Negative counts give `n..=-1`.
	Sides(i64),

	/// Percentile faces `1..=100` (`d%`)
	Percent,

	/// Fudge faces `-1, 0, 1` (`dF`)
	Fudge,

	/// Stunt dice: two d6 plus a stunt d6 (`dS`)
	Stunt,

	/// Explicitly listed faces (`d[1,3,5]`)
	List(Vec<i64>),

	/// Inclusive range of faces (`d[2-5]`)
	Range(i64, i64),

	/// Percentile composite: one die per digit of the given face, concatenated (`d66%`)
	Composite(Vec<u8>),
}

impl FaceSpec {
	/// Face values a die with this specifier can land on. Only listed faces are stored one by one.
	#[must_use]
	pub fn possibilities(&self) -> Faces {
		match self {
			Self::Omitted | Self::Composite(..) => Faces::None,
			Self::Sides(sides) if *sides < 0 => Faces::range(*sides, -1),
			Self::Sides(sides) => Faces::range(1, *sides),
			Self::Percent => Faces::range(1, 100),
			Self::Fudge => Faces::range(-1, 1),
			Self::Stunt => Faces::range(1, 6),
			Self::List(faces) => Faces::List(faces.clone()),
			Self::Range(from, to) => Faces::range(*from, *to),
		}
	}
}

impl fmt::Display for FaceSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Omitted => Ok(()),
			Self::Sides(sides) => write!(f, "{sides}"),
			Self::Percent => f.write_str("%"),
			Self::Fudge => f.write_str("F"),
			Self::Stunt => f.write_str("S"),
			Self::List(faces) => write!(
				f,
				"[{}]",
				faces.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
			),
			Self::Range(from, to) => write!(f, "[{from}-{to}]"),
			Self::Composite(digits) => write!(
				f,
				"{}%",
				digits.iter().map(ToString::to_string).collect::<String>()
			),
		}
	}
}

/// Generates a parser for signed integers.
fn integer<'src>() -> impl Parser<'src, &'src str, i64, extra::Err<Rich<'src, char>>> + Clone {
	just('-')
		.or_not()
		.then(text::int(10))
		.try_map(|(neg, digits): (Option<char>, &str), span| {
			let val: i64 = digits
				.parse()
				.map_err(|err| Rich::custom(span, format!("Integer: {err}")))?;
			Ok(if neg.is_some() { -val } else { val })
		})
}

/// Generates a parser that specifically handles face specifiers, such as `20`, `%`, `[1,3,5]` or `66%`.
pub fn faces<'src>() -> impl Parser<'src, &'src str, FaceSpec, extra::Err<Rich<'src, char>>> + Clone {
	// Percentile composites (e.g. 66%) need to be tried before plain sides
	let composite = text::int(10).then_ignore(just('%')).map(|digits: &str| {
		FaceSpec::Composite(
			digits
				.chars()
				.filter_map(|digit| digit.to_digit(10))
				.filter_map(|digit| u8::try_from(digit).ok())
				.collect(),
		)
	});

	// Ranges (e.g. [2-5])
	let range = integer()
		.then_ignore(just('-'))
		.then(integer())
		.delimited_by(just('['), just(']'))
		.map(|(from, to)| FaceSpec::Range(from, to));

	// Lists (e.g. [1,3,5])
	let list = integer()
		.separated_by(just(',').padded())
		.at_least(1)
		.collect::<Vec<_>>()
		.delimited_by(just('['), just(']'))
		.map(FaceSpec::List);

	let sides = integer().try_map(|sides, span| {
		if sides == 0 {
			Err(Rich::custom(span, "Dice sides: dice must have at least one side"))
		} else {
			Ok(FaceSpec::Sides(sides))
		}
	});

	choice((
		composite,
		just('%').to(FaceSpec::Percent),
		one_of("fF").to(FaceSpec::Fudge),
		just('S').to(FaceSpec::Stunt),
		range,
		list,
		sides,
	))
}

/// Generates a parser that specifically handles dice literals, such as `3d6`, `-2d8`, `d%` or `d`.
pub fn dice_part<'src>() -> impl Parser<'src, &'src str, DiceSpec, extra::Err<Rich<'src, char>>> + Clone {
	integer()
		.or_not()
		.then_ignore(one_of("dD"))
		.then(faces().or_not())
		.map(|(count, faces)| DiceSpec {
			count,
			faces: faces.unwrap_or(FaceSpec::Omitted),
		})
}

/// Generates a parser that handles a full dice literal, with nothing before or after it.
pub fn dice<'src>() -> impl Parser<'src, &'src str, DiceSpec, extra::Err<Rich<'src, char>>> + Clone {
	dice_part().then_ignore(end())
}

/// Error that can occur while parsing a dice literal from a string
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{details}")]
#[non_exhaustive]
pub struct Error {
	/// Details of the parsing failure
	pub details: String,
}
