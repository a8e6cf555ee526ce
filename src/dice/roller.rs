//! Sources of random face values for rolling [`Die`](super::Die)s.

use core::iter::Peekable;

#[cfg(feature = "fastrand")]
use fastrand::Rng;

/// Generates face values - the only source of randomness the evaluator ever touches.
///
/// Rollers must be [`Send`] so that a roll may hand them to rendered dice resolving on other tasks.
pub trait Roller: Send {
	/// Generates a value between `min` and `max`, inclusive on both ends.
	#[must_use]
	fn uniform(&mut self, min: i64, max: i64) -> i64;

	/// Picks one of the given faces.
	///
	/// Contiguous faces are generated directly with [`Roller::uniform`], so that predetermined rollers yield the face
	/// value itself. Any other set of faces is indexed with a uniform value instead.
	#[must_use]
	fn pick(&mut self, faces: &[i64]) -> i64 {
		let (Some(&first), Some(&last)) = (faces.first(), faces.last()) else {
			return 0;
		};

		if is_contiguous(faces) {
			return self.uniform(first, last);
		}

		let max_index = i64::try_from(faces.len()).unwrap_or(i64::MAX).saturating_sub(1);
		let index = usize::try_from(self.uniform(0, max_index)).unwrap_or(0);
		faces.get(index).copied().unwrap_or(first)
	}
}

impl<R: Roller + ?Sized> Roller for &mut R {
	#[inline]
	fn uniform(&mut self, min: i64, max: i64) -> i64 {
		(**self).uniform(min, max)
	}
}

/// Splits off an independent roller, so that dice resolving concurrently don't share one.
pub trait Fork: Roller + Sized {
	/// Creates a new roller that can be used independently of this one.
	#[must_use]
	fn fork(&mut self) -> Self;
}

/// Checks whether faces are ascending and without gaps (e.g. `1..=6`).
pub(crate) fn is_contiguous(faces: &[i64]) -> bool {
	faces.windows(2).all(|pair| pair[0].checked_add(1) == Some(pair[1]))
}

/// Generates values randomly using [fastrand]. Requires the `fastrand` feature (enabled by default).
///
/// # Examples
///
/// ## Default fastrand roller
/// ```
/// use astragal::dice::roller::{FastRand as FastRandRoller, Roller};
///
/// let mut roller = FastRandRoller::default();
/// let val = roller.uniform(1, 6);
/// assert!((1..=6).contains(&val));
/// ```
///
/// ## Manually seeded fastrand roller
/// ```
/// use astragal::dice::roller::{FastRand as FastRandRoller, Roller};
///
/// let mut first = FastRandRoller::with_seed(0x750c38d574400);
/// let mut second = FastRandRoller::with_seed(0x750c38d574400);
/// assert_eq!(first.uniform(1, 20), second.uniform(1, 20));
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone, Default)]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate values.
	#[must_use]
	#[inline]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate values.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	#[inline]
	fn uniform(&mut self, min: i64, max: i64) -> i64 {
		if min <= max {
			self.0.i64(min..=max)
		} else {
			self.0.i64(max..=min)
		}
	}
}

#[cfg(feature = "fastrand")]
impl Fork for FastRand {
	#[inline]
	fn fork(&mut self) -> Self {
		Self(self.0.fork())
	}
}

/// Generates values that are always one specific value, regardless of the range asked for.
///
/// # Examples
/// ```
/// use astragal::dice::roller::{Roller, Val as ValRoller};
///
/// let mut roller = ValRoller(42);
/// assert_eq!(roller.uniform(1, 6), 42);
/// assert_eq!(roller.uniform(1, 20), 42);
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub i64);

impl Roller for Val {
	#[inline]
	fn uniform(&mut self, _min: i64, _max: i64) -> i64 {
		self.0
	}
}

impl Fork for Val {
	#[inline]
	fn fork(&mut self) -> Self {
		self.clone()
	}
}

/// Generates values that are always the top of the range asked for.
///
/// # Examples
/// ```
/// use astragal::dice::roller::{Max as MaxRoller, Roller};
///
/// let mut roller = MaxRoller;
/// assert_eq!(roller.uniform(1, 6), 6);
/// assert_eq!(roller.uniform(-1, 1), 1);
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	#[inline]
	fn uniform(&mut self, min: i64, max: i64) -> i64 {
		min.max(max)
	}
}

impl Fork for Max {
	#[inline]
	fn fork(&mut self) -> Self {
		Self
	}
}

/// Generates values from an iterator. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use astragal::dice::roller::{Iter as IterRoller, Roller};
///
/// let mut roller = IterRoller::new([1, 2, 3, 4, 10]);
/// assert_eq!(roller.uniform(1, 6), 1);
/// assert_eq!(roller.uniform(1, 6), 2);
/// assert!(roller.can_roll());
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = i64>>(Peekable<I>);

impl<I: Iterator<Item = i64>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = i64> + Send> Roller for Iter<I> {
	/// Generates the next value from the iterator.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn uniform(&mut self, _min: i64, _max: i64) -> i64 {
		self.0.next().expect("iterator is finished")
	}
}
