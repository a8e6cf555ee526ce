//! Where dice get their values from during a roll.

use core::{
	future::Future,
	pin::pin,
	task::{Context, Poll, Waker},
};

use super::roller::Roller;
#[cfg(feature = "render")]
use crate::render::RenderBackend;

/// Source of values for a roll. Every value acquisition (initial rolls, explosions, rerolls) goes through the same
/// source, so that a die's modifiers use the same means as its initial roll.
pub(crate) enum Source<'a> {
	/// Values are generated by an RNG
	Rng(&'a mut dyn Roller),

	/// Values are produced by a render backend, falling back to an RNG for dice it can't render
	#[cfg(feature = "render")]
	Render {
		rng: &'a mut dyn Roller,
		backend: &'a dyn RenderBackend,
	},
}

impl Source<'_> {
	/// RNG of the source, used for anything the render backend doesn't provide.
	pub(crate) fn rng(&mut self) -> &mut dyn Roller {
		match self {
			Self::Rng(rng) => &mut **rng,
			#[cfg(feature = "render")]
			Self::Render { rng, .. } => &mut **rng,
		}
	}
}

/// Drives a future that never suspends to completion, returning `None` if it does suspend.
pub(crate) fn now<F: Future>(future: F) -> Option<F::Output> {
	let mut future = pin!(future);
	let mut cx = Context::from_waker(Waker::noop());
	match future.as_mut().poll(&mut cx) {
		Poll::Ready(output) => Some(output),
		Poll::Pending => None,
	}
}
