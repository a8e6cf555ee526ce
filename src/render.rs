//! Rendered rolls: dice values produced by an external backend (such as a 3D dice animation) instead of an RNG.
//!
//! A backend receives one [`RenderRequest`] per die and answers with the values it landed on. Dice that can't be
//! rendered (faces other than `1..=N`) keep using the RNG.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::{
	dice::{DieKind, Shape},
	narrative::NarrativeFace,
};

/// What a render backend is asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RenderKind {
	/// A regular die
	Standard,

	/// A fudge die
	Fudge,

	/// A stunt die
	Stunt,

	/// A narrative die of a colour
	Narrative(NarrativeFace),
}

/// Request for a single die value from a render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct RenderRequest {
	/// Kind of die to render
	pub kind: RenderKind,

	/// Number of sides of the die
	pub sides: i64,
}

impl RenderRequest {
	/// Request for a regular die with faces `1..=sides`.
	#[must_use]
	pub const fn standard(sides: i64) -> Self {
		Self {
			kind: RenderKind::Standard,
			sides,
		}
	}

	/// Request for a die of the given shape.
	#[must_use]
	pub fn for_shape(shape: &Shape) -> Self {
		let kind = match shape.kind {
			DieKind::Fudge => RenderKind::Fudge,
			DieKind::Stunt => RenderKind::Stunt,
			DieKind::Narrative(face) => RenderKind::Narrative(face),
			_ => RenderKind::Standard,
		};

		Self {
			kind,
			sides: match kind {
				RenderKind::Fudge => 3,
				_ => shape.max_face(),
			},
		}
	}
}

/// Backend that produces die values for rendered rolls.
///
/// Backends may answer with more than one value per die: a d100 can be shown as a tens die and a ones die, which are
/// combined with [`combine_values`]. An empty answer makes the die fall back to the RNG.
#[async_trait]
pub trait RenderBackend: Send + Sync {
	/// Shows a die and resolves to the values it landed on.
	async fn resolve_die(&self, request: &RenderRequest) -> Vec<i64>;
}

/// Combines the values a backend produced for one die.
///
/// Percentile dice shown as two d10s combine as `tens * 10 + ones`, with a 10 on either die reading as 0 and a
/// double 10 reading as 100. Anything else is summed. Returns `None` when there are no values.
///
/// # Examples
/// ```
/// use astragal::render::combine_values;
///
/// assert_eq!(combine_values(&[7, 3], 100), Some(73));
/// assert_eq!(combine_values(&[10, 4], 100), Some(4));
/// assert_eq!(combine_values(&[10, 10], 100), Some(100));
/// assert_eq!(combine_values(&[2, 3], 6), Some(5));
/// assert_eq!(combine_values(&[], 6), None);
/// ```
#[must_use]
pub fn combine_values(values: &[i64], max_face: i64) -> Option<i64> {
	match values {
		[] => None,
		[10, 10] if max_face == 100 => Some(100),
		[tens, ones, ..] if max_face == 100 => {
			let digit = |value: i64| if value == 10 { 0 } else { value };
			Some(digit(*tens) * 10 + digit(*ones))
		}
		_ => Some(values.iter().sum()),
	}
}

/// Receiving side of a cancellation signal, checked by rendered rolls while they wait for their dice.
#[derive(Debug, Clone)]
pub struct Cancellation(watch::Receiver<bool>);

/// Sending side of a cancellation signal.
#[derive(Debug)]
pub struct Canceller(watch::Sender<bool>);

impl Cancellation {
	/// Creates a linked canceller and cancellation.
	#[must_use]
	pub fn new() -> (Canceller, Self) {
		let (tx, rx) = watch::channel(false);
		(Canceller(tx), Self(rx))
	}

	/// A cancellation that never fires.
	#[must_use]
	pub fn never() -> Self {
		Self::new().1
	}

	/// Whether cancellation has been requested.
	#[must_use]
	pub fn is_cancelled(&self) -> bool {
		*self.0.borrow()
	}

	/// Resolves once cancellation is requested. Never resolves if the canceller is dropped without cancelling.
	pub async fn cancelled(&mut self) {
		let closed = self.0.wait_for(|&cancelled| cancelled).await.is_err();
		if closed {
			core::future::pending::<()>().await;
		}
	}
}

impl Canceller {
	/// Requests cancellation.
	pub fn cancel(&self) {
		self.0.send_replace(true);
	}
}
