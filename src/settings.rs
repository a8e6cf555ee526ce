//! User-facing settings: defaults for omitted dice parts and how results are presented.

use serde::{Deserialize, Serialize};

/// How results are rounded for presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change")]
pub enum Round {
	/// Truncated to two decimal places
	#[default]
	None,

	/// Rounded to the nearest integer, halves rounding up
	Normal,

	/// Rounded up
	Up,

	/// Rounded down
	Down,
}

impl Round {
	/// Rounds a value.
	///
	/// # Examples
	/// ```
	/// use astragal::settings::Round;
	///
	/// assert_eq!(Round::None.apply(10.0 / 3.0), 3.33);
	/// assert_eq!(Round::Normal.apply(-2.5), -2.0);
	/// assert_eq!(Round::Up.apply(2.1), 3.0);
	/// assert_eq!(Round::Down.apply(2.9), 2.0);
	/// ```
	#[must_use]
	pub fn apply(&self, value: f64) -> f64 {
		match self {
			Self::None => (value * 100.0).trunc() / 100.0,
			Self::Normal => (value + 0.5).floor(),
			Self::Up => value.ceil(),
			Self::Down => value.floor(),
		}
	}
}

/// Settings for lexing and presenting rolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Settings {
	/// Roll count for dice that omit it (`d6`)
	pub default_roll: u32,

	/// Face count for dice that omit it (`2d`)
	pub default_face: u32,

	/// Rounding of results
	pub round: Round,

	/// Whether positive results are shown with a `+`
	pub signed: bool,

	/// Whether the expected value is shown instead of rolling
	pub average: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			default_roll: 1,
			default_face: 100,
			round: Round::default(),
			signed: false,
			average: false,
		}
	}
}

impl Settings {
	/// Loads settings from TOML. Anything missing keeps its default.
	///
	/// # Errors
	/// If the TOML is malformed or a setting has the wrong type, an error is returned.
	///
	/// # Examples
	/// ```
	/// use astragal::settings::{Round, Settings};
	///
	/// let settings = Settings::from_toml("default_face = 20\nround = \"Up\"").unwrap();
	/// assert_eq!(settings.default_face, 20);
	/// assert_eq!(settings.default_roll, 1);
	/// assert_eq!(settings.round, Round::Up);
	/// ```
	#[cfg(feature = "settings")]
	pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(source)
	}

	/// Formats a result for display: rounded, and with a leading `+` for positive values when signed.
	///
	/// # Examples
	/// ```
	/// use astragal::Settings;
	///
	/// let mut settings = Settings::default();
	/// assert_eq!(settings.format_result(10.0 / 3.0), "3.33");
	///
	/// settings.signed = true;
	/// assert_eq!(settings.format_result(4.0), "+4");
	/// assert_eq!(settings.format_result(-4.0), "-4");
	/// ```
	#[must_use]
	pub fn format_result(&self, value: f64) -> String {
		let rounded = self.round.apply(value);
		let sign = if self.signed && rounded > 0.0 { "+" } else { "" };
		format!("{sign}{rounded}")
	}
}
