//! Seams for values that live outside of the expression: named fields used as numbers, and the sub-rollers that
//! resolve table, section, line, tag and dataview lookups.

use core::fmt;
use std::collections::HashMap;

/// Resolves bare words in expressions (e.g. `str` in `1d20 + str`) to numbers.
pub trait FieldLookup: Send + Sync {
	/// Looks up the value of a field.
	fn lookup(&self, name: &str) -> Option<f64>;
}

impl FieldLookup for HashMap<String, f64> {
	fn lookup(&self, name: &str) -> Option<f64> {
		self.get(name).copied()
	}
}

/// Value produced by an external sub-roller.
#[derive(Debug, Clone, PartialEq)]
#[expect(clippy::exhaustive_enums, reason = "Lookups produce either numbers or text")]
pub enum LookupValue {
	/// A numeric result
	Number(f64),

	/// A text result, such as a table row or a line of a note
	Text(String),
}

impl fmt::Display for LookupValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(number) => write!(f, "{number}"),
			Self::Text(text) => f.write_str(text),
		}
	}
}

/// A rollable handle for a lookup expression, produced by a [`Dispatch`].
pub trait RollerHandle: Send {
	/// Rolls the lookup.
	fn roll(&mut self) -> LookupValue;
}

/// Creates sub-rollers for lookup expressions (`[[Note^table]]`, `#tag`, `dv(...)`).
pub trait Dispatch: Send + Sync {
	/// Gets a roller for a lookup expression, found in the note at `source`. Returns `None` for expressions the
	/// dispatch can't resolve.
	fn get_roller(&self, expr: &str, source: &str) -> Option<Box<dyn RollerHandle>>;
}
