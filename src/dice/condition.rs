//! Comparisons attached to dice and modifiers, and the sub-evaluator that resolves their comparers.

use core::fmt;

use super::{roller::Roller, to_f64};
use crate::{expr::Expression, lex::Token};

/// Comparison operator of a [`Conditional`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change, no logical fallback")]
pub enum ComparisonOp {
	/// `=`
	Eq,

	/// `=!` (or `!=`)
	Ne,

	/// `<`
	Lt,

	/// `<=` (or `=<`)
	Le,

	/// `>`
	Gt,

	/// `>=` (or `=>`)
	Ge,

	/// `-=` (or `=-`): results equal to the comparer count as -1 when counting successes
	Negate,
}

impl ComparisonOp {
	/// Finds the operator for a symbol.
	///
	/// # Examples
	/// ```
	/// use astragal::dice::condition::ComparisonOp;
	///
	/// assert_eq!(ComparisonOp::from_symbol(">="), Some(ComparisonOp::Ge));
	/// assert_eq!(ComparisonOp::from_symbol("=>"), Some(ComparisonOp::Ge));
	/// assert_eq!(ComparisonOp::from_symbol("=-"), Some(ComparisonOp::Negate));
	/// assert_eq!(ComparisonOp::from_symbol("~"), None);
	/// ```
	#[must_use]
	pub fn from_symbol(symbol: &str) -> Option<Self> {
		Some(match symbol {
			"=" => Self::Eq,
			"=!" | "!=" => Self::Ne,
			"<" => Self::Lt,
			"<=" | "=<" => Self::Le,
			">" => Self::Gt,
			">=" | "=>" => Self::Ge,
			"-=" | "=-" => Self::Negate,
			_ => return None,
		})
	}

	/// Canonical symbol for the operator.
	#[must_use]
	pub const fn symbol(&self) -> &'static str {
		match self {
			Self::Eq => "=",
			Self::Ne => "=!",
			Self::Lt => "<",
			Self::Le => "<=",
			Self::Gt => ">",
			Self::Ge => ">=",
			Self::Negate => "-=",
		}
	}

	/// Compares a value against a comparer. [`ComparisonOp::Negate`] never matches here; it only has meaning when
	/// counting successes.
	#[must_use]
	pub fn check(&self, value: f64, comparer: f64) -> bool {
		match self {
			Self::Eq => value == comparer,
			Self::Ne => value != comparer,
			Self::Lt => value < comparer,
			Self::Le => value <= comparer,
			Self::Gt => value > comparer,
			Self::Ge => value >= comparer,
			Self::Negate => false,
		}
	}
}

impl fmt::Display for ComparisonOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.symbol())
	}
}

/// A comparison of roll values against a comparer, which can be a plain number or a dice expression of its own
/// (`=1d4`). Dice comparers are rolled again every time the condition is checked.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Conditional {
	/// Comparison to make
	pub operator: ComparisonOp,

	/// Comparer as written
	pub comparer: String,

	/// Reduced tokens of the comparer
	pub tokens: Vec<Token>,

	/// Source text of the whole condition (e.g. `>=3`)
	pub text: String,

	/// Most recently resolved value of the comparer
	pub resolved: Option<f64>,
}

impl Conditional {
	/// Creates a new conditional.
	#[must_use]
	pub fn new(operator: ComparisonOp, comparer: impl Into<String>, tokens: Vec<Token>, text: impl Into<String>) -> Self {
		Self {
			operator,
			comparer: comparer.into(),
			tokens,
			text: text.into(),
			resolved: None,
		}
	}

	/// Resolves the comparer to a number, rolling it if it is a dice expression. The result is remembered in
	/// [`Conditional::resolved`]. Comparers that can't be resolved come out as NaN.
	pub fn resolve(&mut self, roller: &mut dyn Roller) -> f64 {
		let value = match self.comparer.trim().parse::<f64>() {
			Ok(value) => value,
			Err(_) if self.tokens.is_empty() => f64::NAN,
			Err(_) => match Expression::build(&self.comparer, self.tokens.clone()) {
				Ok(mut expr) => expr.roll_dyn(roller).unwrap_or_else(|err| {
					log::trace!("Comparer {} could not be rolled: {err}", self.comparer);
					f64::NAN
				}),
				Err(err) => {
					log::trace!("Comparer {} could not be built: {err}", self.comparer);
					f64::NAN
				}
			},
		};

		self.resolved = Some(value);
		value
	}

	/// Resolves the comparer and checks a value against it. Unresolvable comparers never match.
	pub fn check(&mut self, value: i64, roller: &mut dyn Roller) -> bool {
		let comparer = self.resolve(roller);
		if comparer.is_nan() {
			log::trace!("Skipping condition {} with an unresolvable comparer", self.text);
			return false;
		}
		self.operator.check(to_f64(value), comparer)
	}
}

impl fmt::Display for Conditional {
	/// Formats the conditional with its resolved comparer, if it has been resolved.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.resolved {
			Some(resolved) if !resolved.is_nan() => write!(f, "{}{resolved}", self.operator),
			_ => write!(f, "{}{}", self.operator, self.comparer),
		}
	}
}

/// Checks a value against a set of conditions, matching if any one of them does.
///
/// Conditions whose comparer resolves to NaN are skipped. An empty set of conditions never matches.
///
/// # Examples
/// ```
/// use astragal::dice::{
/// 	condition::{check_condition, ComparisonOp, Conditional},
/// 	roller::Max as MaxRoller,
/// };
///
/// let mut conditions = vec![
/// 	Conditional::new(ComparisonOp::Lt, "2", Vec::new(), "<2"),
/// 	Conditional::new(ComparisonOp::Ge, "oops", Vec::new(), ">=oops"),
/// 	Conditional::new(ComparisonOp::Eq, "6", Vec::new(), "=6"),
/// ];
///
/// assert!(check_condition(1, &mut conditions, &mut MaxRoller));
/// assert!(check_condition(6, &mut conditions, &mut MaxRoller));
/// assert!(!check_condition(4, &mut conditions, &mut MaxRoller));
/// ```
pub fn check_condition(value: i64, conditions: &mut [Conditional], roller: &mut dyn Roller) -> bool {
	conditions.iter_mut().any(|condition| condition.check(value, roller))
}
