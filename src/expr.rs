//! Expressions built from reduced token streams: building their dice, rolling them and folding their results
//! together.

use core::fmt;
#[cfg(feature = "render")]
use std::sync::Arc;

#[cfg(feature = "render")]
use crate::{
	dice::roller::Fork,
	render::{Cancellation, RenderBackend},
};
use crate::{
	dice::{
		roller::Roller,
		source::{self, Source},
		Die, Error as DiceError, Warning,
	},
	lex::{MathOp, Token, TokenKind},
	record::{DieRecord, RollRecord},
};

/// Trait to allow creation of expanded descriptions with an optional max number of individual listed results where
/// applicable
pub trait Describe {
	/// Builds a detailed expression string with additional information about non-deterministic elements.
	/// Any elements of the expression that can have a different result between multiple evaluations or multiple results
	/// should list all of the specific individual results that occurred (ideally, up to `list_limit` of them).
	#[must_use]
	fn describe(&self, list_limit: Option<usize>) -> String;
}

/// One step of the postfix evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
	/// Push the result of a die, by build index
	Die(usize),

	/// Pop two values and push the result of an operator on them
	Op(MathOp),
}

/// A full dice expression, such as `4d6kh3 + 1d8!`, built from its reduced (postfix) tokens.
///
/// Every dice token becomes one [`Die`], which owns its modifiers and conditions. Rolling an expression rolls all of
/// its dice and then folds the operators over their results.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
	/// Input the expression was built from
	original: String,

	/// Reduced tokens
	tokens: Vec<Token>,

	/// Evaluation steps
	steps: Vec<Step>,

	/// Dice, in build order (which is also source order)
	dice: Vec<Die>,

	/// Problems encountered while building
	warnings: Vec<Warning>,

	/// Total of the latest roll
	result: Option<f64>,

	/// Lowest and highest possible totals, computed alongside the latest roll
	bounds: Option<(f64, f64)>,

	/// Stunt points earned in the latest roll
	stunt_points: Option<i64>,
}

impl Expression {
	/// Builds an expression from the input it came from and its reduced tokens.
	///
	/// Modifier tokens are attached to the most recently built die. Modifiers that land on plain numbers are skipped
	/// and recorded as [warnings](Self::warnings).
	///
	/// # Errors
	/// If a token can't be turned into a die, a modifier has no die to attach to, or a token type can't be part of a
	/// rolled expression (such as a table lookup), an error variant is returned.
	pub fn build(original: impl Into<String>, tokens: Vec<Token>) -> Result<Self, BuildError> {
		let mut steps = Vec::with_capacity(tokens.len());
		let mut dice: Vec<Die> = Vec::new();
		let mut warnings = Vec::new();

		for token in &tokens {
			match token.kind {
				TokenKind::Math(op) => steps.push(Step::Op(op)),
				kind if kind.is_dice() => {
					dice.push(Die::from_token(token)?);
					steps.push(Step::Die(dice.len() - 1));
				}
				kind if kind.is_modifier() => {
					let die = dice
						.last_mut()
						.ok_or_else(|| BuildError::DanglingModifier(token.text.clone()))?;
					warnings.extend(die.attach(token)?);
				}
				kind => return Err(BuildError::Unsupported(kind)),
			}
		}

		if steps.is_empty() {
			return Err(BuildError::Empty);
		}

		Ok(Self {
			original: original.into(),
			tokens,
			steps,
			dice,
			warnings,
			result: None,
			bounds: None,
			stunt_points: None,
		})
	}

	/// Rolls every die with an RNG and folds the results together, returning the total.
	///
	/// # Errors
	/// If the expression's operators don't line up with its values, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use astragal::{dice::roller::Iter as IterRoller, lex::Lexer, Expression};
	///
	/// let mut expr = Expression::build("1d20+4", Lexer::default().parse("1d20+4")?)?;
	/// assert_eq!(expr.roll_sync(&mut IterRoller::new([10]))?, 14.0);
	/// assert_eq!(expr.display(), "[10]+4");
	/// # Ok::<(), astragal::Error>(())
	/// ```
	pub fn roll_sync(&mut self, roller: &mut impl Roller) -> Result<f64, RollError> {
		self.roll_dyn(roller)
	}

	/// Rolls every die with a dynamically-dispatched RNG. Used by conditions to roll their comparers.
	pub(crate) fn roll_dyn(&mut self, rng: &mut dyn Roller) -> Result<f64, RollError> {
		let mut source = Source::Rng(rng);
		source::now(self.roll_from(&mut source)).unwrap_or(Err(RollError::Suspended))
	}

	/// Rolls every die with an RNG and folds the results together, returning the total. This is the asynchronous
	/// counterpart of [`Self::roll_sync()`]; RNG-backed rolls never actually wait.
	///
	/// # Errors
	/// If the expression's operators don't line up with its values, an error variant is returned.
	pub async fn roll(&mut self, roller: &mut impl Roller) -> Result<f64, RollError> {
		let mut source = Source::Rng(roller);
		self.roll_from(&mut source).await
	}

	/// Rolls every die through a render backend, then folds the results together.
	///
	/// Each die (other than those whose count comes from a parenthesised group) is rolled on its own task with a fork
	/// of the RNG, so every die is shown at the same time. Dice counted by a group are rolled afterwards, once their
	/// count is known. Results are only committed once every die has finished. If cancellation is requested first,
	/// all outstanding dice are aborted and the expression is left as it was.
	///
	/// # Errors
	/// If the roll is cancelled, a task fails, or the expression's operators don't line up with its values, an error
	/// variant is returned.
	#[cfg(feature = "render")]
	pub async fn roll_rendered<R: Fork + 'static>(
		&mut self,
		roller: &mut R,
		backend: Arc<dyn RenderBackend>,
		mut cancel: Cancellation,
	) -> Result<f64, RollError> {
		let mut tasks = tokio::task::JoinSet::new();
		for (index, die) in self.dice.iter().enumerate() {
			if die.parened || die.is_static() {
				continue;
			}

			let mut die = die.clone();
			let mut rng = roller.fork();
			let backend = Arc::clone(&backend);
			tasks.spawn(async move {
				let mut source = Source::Render {
					rng: &mut rng,
					backend: &*backend,
				};
				die.roll(&mut source).await;
				(index, die)
			});
		}

		let mut rolled = Vec::with_capacity(tasks.len());
		loop {
			tokio::select! {
				biased;
				() = cancel.cancelled() => {
					tasks.abort_all();
					log::debug!("Rendered roll of {} was aborted", self.original);
					return Err(RollError::Aborted);
				}
				joined = tasks.join_next() => match joined {
					Some(Ok(done)) => rolled.push(done),
					Some(Err(err)) => {
						tasks.abort_all();
						return Err(RollError::Render(err.to_string()));
					}
					None => break,
				},
			}
		}

		let mut staged = self.clone();
		for (index, die) in rolled {
			if let Some(slot) = staged.dice.get_mut(index) {
				*slot = die;
			}
		}

		// Dice counted by a group are rendered while folding
		let mut source = Source::Render {
			rng: roller,
			backend: &*backend,
		};
		let folded = tokio::select! {
			biased;
			() = cancel.cancelled() => None,
			folded = staged.fold(Some(&mut source)) => Some(folded),
		};
		let Some(folded) = folded else {
			log::debug!("Rendered roll of {} was aborted", self.original);
			return Err(RollError::Aborted);
		};

		let total = folded?;
		*self = staged;
		Ok(total)
	}

	/// Rolls the dice from a source and folds them.
	pub(crate) async fn roll_from(&mut self, source: &mut Source<'_>) -> Result<f64, RollError> {
		for die in self.dice.iter_mut().filter(|die| !die.parened) {
			die.roll(source).await;
		}
		self.fold(Some(source)).await
	}

	/// Folds the operators over the dice results, rolling parenthesised-count dice along the way when there is a
	/// source to roll them from.
	async fn fold(&mut self, mut source: Option<&mut Source<'_>>) -> Result<f64, RollError> {
		let mut values: Vec<(f64, f64, f64)> = Vec::with_capacity(self.steps.len());
		let mut stunt_points = None;

		for step in &self.steps {
			match *step {
				Step::Die(index) => {
					let die = self.dice.get_mut(index).ok_or(RollError::Malformed("missing die"))?;
					if die.parened {
						let (count, ..) = values.pop().ok_or(RollError::Malformed("parenthesised dice without a count"))?;
						die.set_rolls(count);
						if let Some(source) = source.as_deref_mut() {
							die.roll(source).await;
						}
					}

					stunt_points = stunt_points.or_else(|| die.stunt_points());
					values.push((die.result(), die.min_possible(), die.max_possible()));
				}
				Step::Op(op) => {
					let b = values.pop().ok_or(RollError::Malformed("operator without operands"))?;
					let a = values.pop().ok_or(RollError::Malformed("operator without operands"))?;
					let (min, max) = bounds(op, (a.1, a.2), (b.1, b.2));
					values.push((op.apply(a.0, b.0), min, max));
				}
			}
		}

		let (result, min, max) = match values.as_slice() {
			[single] => *single,
			_ => return Err(RollError::Malformed("operands without operators")),
		};

		log::debug!("Rolled {}: {result} ({})", self.original, self.display());
		self.result = Some(result);
		self.bounds = Some((min, max));
		self.stunt_points = stunt_points;
		Ok(result)
	}

	/// Total of the latest roll.
	#[must_use]
	pub const fn result(&self) -> Option<f64> {
		self.result
	}

	/// Highest possible total, known after the first roll.
	#[must_use]
	pub fn max(&self) -> Option<f64> {
		self.bounds.map(|(_, max)| max)
	}

	/// Lowest possible total, known after the first roll.
	#[must_use]
	pub fn min(&self) -> Option<f64> {
		self.bounds.map(|(min, _)| min)
	}

	/// Whether the latest roll hit the highest possible total.
	#[must_use]
	pub fn is_max(&self) -> bool {
		self.result.is_some() && self.result == self.max()
	}

	/// Whether the latest roll hit the lowest possible total.
	#[must_use]
	pub fn is_min(&self) -> bool {
		self.result.is_some() && self.result == self.min()
	}

	/// Stunt points earned in the latest roll.
	#[must_use]
	pub const fn stunt_points(&self) -> Option<i64> {
		self.stunt_points
	}

	/// Expected total of the expression, without rolling. `None` if any die can't be averaged (stunt dice and
	/// percentile composites) or the expression is malformed.
	///
	/// # Examples
	/// ```
	/// use astragal::{lex::Lexer, Expression};
	///
	/// let expr = Expression::build("2d6 + 1", Lexer::default().parse("2d6 + 1")?)?;
	/// assert_eq!(expr.average(), Some(8.0));
	/// # Ok::<(), astragal::Error>(())
	/// ```
	#[must_use]
	pub fn average(&self) -> Option<f64> {
		let mut values = Vec::with_capacity(self.steps.len());
		for step in &self.steps {
			match *step {
				Step::Die(index) => {
					let die = self.dice.get(index)?;
					let average = if die.parened {
						values.pop()? * die.shape.average()
					} else {
						die.average()?
					};
					values.push(average);
				}
				Step::Op(op) => {
					let b = values.pop()?;
					let a = values.pop()?;
					values.push(op.apply(a, b));
				}
			}
		}

		match values.as_slice() {
			[single] => Some(*single),
			_ => None,
		}
	}

	/// Display of the latest roll: the original input with every die replaced by its rolled results, such as
	/// `[3, 6!, 2d] + 4`. Stunt points are appended when earned.
	#[must_use]
	pub fn display(&self) -> String {
		self.describe(None)
	}

	/// Captures the outcome of the latest roll, or `None` if it hasn't been rolled.
	#[must_use]
	pub fn record(&self) -> Option<RollRecord> {
		Some(RollRecord::new(
			self.result?,
			self.dice.iter().map(DieRecord::from).collect(),
		))
	}

	/// Restores the outcome of a recorded roll without rolling anything, recalculating the total, bounds and display.
	///
	/// # Errors
	/// If the record has a different number of dice than the expression, or the expression's operators don't line up
	/// with its values, an error variant is returned.
	pub fn replay(&mut self, record: &RollRecord) -> Result<(), RollError> {
		if record.dice.len() != self.dice.len() {
			return Err(RollError::RecordMismatch {
				expected: self.dice.len(),
				found: record.dice.len(),
			});
		}

		for (die, recorded) in self.dice.iter_mut().zip(&record.dice) {
			die.rolls = recorded.rolls;
			die.results = recorded.entries.iter().cloned().collect();

			let mut resolved = recorded.resolved.iter().copied();
			for conditional in die.conditionals_mut() {
				conditional.resolved = resolved.next().flatten();
			}
		}

		source::now(self.fold(None)).unwrap_or(Err(RollError::Suspended))?;
		Ok(())
	}

	/// Input the expression was built from.
	#[must_use]
	pub fn original(&self) -> &str {
		&self.original
	}

	/// Reduced tokens the expression was built from.
	#[must_use]
	pub fn tokens(&self) -> &[Token] {
		&self.tokens
	}

	/// Dice of the expression, in source order.
	#[must_use]
	pub fn dice(&self) -> &[Die] {
		&self.dice
	}

	/// Problems encountered while building.
	#[must_use]
	pub fn warnings(&self) -> &[Warning] {
		&self.warnings
	}
}

/// Lowest and highest results of an operator over two ranges, from the corners of the ranges.
fn bounds(op: MathOp, (a_min, a_max): (f64, f64), (b_min, b_max): (f64, f64)) -> (f64, f64) {
	[
		op.apply(a_min, b_min),
		op.apply(a_min, b_max),
		op.apply(a_max, b_min),
		op.apply(a_max, b_max),
	]
	.into_iter()
	.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
		(min.min(value), max.max(value))
	})
}

impl Describe for Expression {
	/// Replaces each die's source text in the original input with its rolled results, skipping over the text of its
	/// modifiers and conditions. Plain numbers are left as written.
	fn describe(&self, list_limit: Option<usize>) -> String {
		let mut out = String::with_capacity(self.original.len() * 2);
		let mut rest = self.original.as_str();

		for die in &self.dice {
			let Some(at) = rest.find(die.text.as_str()) else {
				continue;
			};
			out.push_str(&rest[..at]);
			rest = &rest[at + die.text.len()..];

			if die.is_static() || die.results.is_empty() {
				out.push_str(&die.text);
				continue;
			}
			out.push_str(&die.describe(list_limit));

			for suffix in &die.suffix {
				let trimmed = rest.trim_start();
				if let Some(after) = trimmed.strip_prefix(suffix.as_str()) {
					rest = after;
				}
			}
		}
		out.push_str(rest);

		if let Some(points) = self.stunt_points {
			out.push_str(&format!(" - {points} Stunt Points"));
		}
		out
	}
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// Error that can occur while building an [`Expression`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
	/// Dice-related error (creating a die or attaching a modifier)
	#[error(transparent)]
	Dice(#[from] DiceError),

	/// A modifier came before any dice.
	#[error("modifier {0} has no dice to apply to")]
	DanglingModifier(String),

	/// A token can't be rolled as part of an expression.
	#[error("{0:?} tokens can't be rolled as part of an expression")]
	Unsupported(TokenKind),

	/// There was nothing to build.
	#[error("expression is empty")]
	Empty,
}

/// Error that can occur while rolling an [`Expression`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RollError {
	/// A rendered roll was cancelled before all of its dice finished.
	#[error("roll was aborted")]
	Aborted,

	/// The expression's operators and values don't line up.
	#[error("malformed expression: {0}")]
	Malformed(&'static str),

	/// A render task failed.
	#[error("rendering failed: {0}")]
	Render(String),

	/// A record doesn't belong to the expression it was replayed on.
	#[error("record has {found} dice, but the expression has {expected}")]
	RecordMismatch {
		/// Number of dice in the expression
		expected: usize,

		/// Number of dice in the record
		found: usize,
	},

	/// A synchronous roll tried to wait on something.
	#[error("synchronous roll was suspended")]
	Suspended,
}
