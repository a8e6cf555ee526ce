//! Serializable snapshots of rolled expressions, used to replay a roll without rolling again.

use serde::{Deserialize, Serialize};

use crate::dice::{Die, ResultEntry};

/// Outcome of a single rolled die.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DieRecord {
	/// Number of dice that were rolled
	pub rolls: u32,

	/// Rolled entries, in display order
	pub entries: Vec<ResultEntry>,

	/// Resolved comparer of every condition on the die, in [`Die::conditionals`] order
	#[serde(default)]
	pub resolved: Vec<Option<f64>>,
}

impl From<&Die> for DieRecord {
	fn from(die: &Die) -> Self {
		Self {
			rolls: die.rolls,
			entries: die.results.iter().cloned().collect(),
			resolved: die.conditionals().map(|conditional| conditional.resolved).collect(),
		}
	}
}

/// Outcome of a rolled expression: its total and the results of every die, in build order.
///
/// # Examples
/// ```
/// use astragal::{dice::roller::Iter as IterRoller, lex::Lexer, record::RollRecord, Expression};
///
/// let mut expr = Expression::build("2d6 + 1", Lexer::default().parse("2d6 + 1")?)?;
/// expr.roll_sync(&mut IterRoller::new([3, 4]))?;
///
/// let json = serde_json::to_string(&expr.record().unwrap()).unwrap();
/// let record: RollRecord = serde_json::from_str(&json).unwrap();
///
/// let mut replayed = Expression::build("2d6 + 1", Lexer::default().parse("2d6 + 1")?)?;
/// replayed.replay(&record)?;
/// assert_eq!(replayed.result(), Some(8.0));
/// assert_eq!(replayed.display(), expr.display());
/// # Ok::<(), astragal::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RollRecord {
	/// Total of the expression
	pub result: f64,

	/// Outcome of each die
	pub dice: Vec<DieRecord>,
}

impl RollRecord {
	/// Creates a new record.
	#[must_use]
	pub const fn new(result: f64, dice: Vec<DieRecord>) -> Self {
		Self { result, dice }
	}
}
