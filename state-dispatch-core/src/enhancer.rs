//! Store enhancers: the single extension point around store creation
//!
//! An enhancer receives the function that creates a store and returns a new
//! one. Enhancers see every dispatch by wrapping the reducer before handing
//! it on, so the store they produce keeps the same public operations.
//!
//! # Example
//!
//! ```ignore
//! use state_dispatch::{create_store, StoreCreator, StoreEnhancer};
//!
//! // Closures are enhancers
//! let announce = |next: StoreCreator<AppState, AppAction>| -> StoreCreator<AppState, AppAction> {
//!     Box::new(move |reducer, preloaded| {
//!         tracing::info!("creating store");
//!         next(reducer, preloaded)
//!     })
//! };
//!
//! let store = create_store(reducer, None, announce.then(ActionLogger::log_all()))?;
//! ```

use std::sync::Arc;

use crate::error::StoreError;
use crate::reducer::BoxReducer;
use crate::store::Store;

/// Function that builds a store from a reducer and optional preloaded state
pub type StoreCreator<S, A> =
    Box<dyn FnOnce(BoxReducer<S, A>, Option<Arc<S>>) -> Result<Store<S, A>, StoreError>>;

/// Wraps store creation to add cross-cutting behaviour (logging, recording)
pub trait StoreEnhancer<S, A> {
    /// Return a creator that builds on `next`
    fn enhance(self, next: StoreCreator<S, A>) -> StoreCreator<S, A>;

    /// Compose with another enhancer.
    ///
    /// `self` receives the creator already enhanced by `inner`, so `self`
    /// wraps the reducer first and `inner`'s wrapper ends up outermost.
    fn then<E>(self, inner: E) -> Composed<Self, E>
    where
        Self: Sized,
        E: StoreEnhancer<S, A>,
    {
        compose(self, inner)
    }
}

impl<S, A, F> StoreEnhancer<S, A> for F
where
    F: FnOnce(StoreCreator<S, A>) -> StoreCreator<S, A>,
{
    fn enhance(self, next: StoreCreator<S, A>) -> StoreCreator<S, A> {
        self(next)
    }
}

/// Enhancer that leaves store creation untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnhancer;

impl<S, A> StoreEnhancer<S, A> for NoopEnhancer {
    fn enhance(self, next: StoreCreator<S, A>) -> StoreCreator<S, A> {
        next
    }
}

/// Two enhancers applied as `outer(inner(next))`
#[derive(Debug, Clone)]
pub struct Composed<O, I> {
    outer: O,
    inner: I,
}

/// Compose two enhancers into one, `outer(inner(next))`
pub fn compose<O, I>(outer: O, inner: I) -> Composed<O, I> {
    Composed { outer, inner }
}

impl<S, A, O, I> StoreEnhancer<S, A> for Composed<O, I>
where
    O: StoreEnhancer<S, A>,
    I: StoreEnhancer<S, A>,
{
    fn enhance(self, next: StoreCreator<S, A>) -> StoreCreator<S, A> {
        self.outer.enhance(self.inner.enhance(next))
    }
}

/// Enhancer that may be switched off, e.g. by a CLI flag
#[derive(Debug, Clone, Default)]
pub struct Optional<E>(Option<E>);

/// Apply `enhancer` only when it is `Some`
pub fn optional<E>(enhancer: Option<E>) -> Optional<E> {
    Optional(enhancer)
}

impl<S, A, E: StoreEnhancer<S, A>> StoreEnhancer<S, A> for Optional<E> {
    fn enhance(self, next: StoreCreator<S, A>) -> StoreCreator<S, A> {
        match self.0 {
            Some(enhancer) => enhancer.enhance(next),
            None => next,
        }
    }
}
