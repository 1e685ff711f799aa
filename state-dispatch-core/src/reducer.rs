//! The reducer contract the store consumes

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ReducerError;

/// Pure state transition: `(previous state, action) -> next state`
///
/// The store relies on, but cannot check, these properties:
/// - no side effects, no reliance on outside mutable state
/// - the same `(state, action)` pair always yields an equal state
/// - an action the reducer does not handle returns `Arc::clone(state)`, so
///   `Arc::ptr_eq` tells callers nothing changed
///
/// `init` is the fallback branch for the reserved init action: the store
/// calls it exactly once, at construction, when no preloaded state is given.
///
/// Closures `Fn(&Arc<S>, &A) -> Arc<S>` implement this trait when `S: Default`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use state_dispatch_core::{AnyAction, Reducer};
///
/// fn counter(state: &Arc<i64>, action: &AnyAction) -> Arc<i64> {
///     match action.action_type.as_str() {
///         "inc" => Arc::new(**state + 1),
///         "dec" => Arc::new(**state - 1),
///         _ => Arc::clone(state),
///     }
/// }
///
/// let state = counter.init().unwrap();
/// let next = counter.reduce(&state, &AnyAction::new("inc")).unwrap();
/// assert_eq!(*next, 1);
/// ```
pub trait Reducer<S, A> {
    /// Produce the default state
    fn init(&self) -> Result<Arc<S>, ReducerError>;

    /// Compute the next state
    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Arc<S>, ReducerError>;
}

impl<S, A, F> Reducer<S, A> for F
where
    S: Default,
    F: Fn(&Arc<S>, &A) -> Arc<S>,
{
    fn init(&self) -> Result<Arc<S>, ReducerError> {
        Ok(Arc::new(S::default()))
    }

    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Arc<S>, ReducerError> {
        Ok(self(state, action))
    }
}

/// Type-erased reducer, the form enhancers receive and wrap
pub type BoxReducer<S, A> = Box<dyn Reducer<S, A>>;

/// Reducer built from two closures: an explicit init and a fallible reduce
///
/// Use this when the default state is not `S::default()` or when the
/// reducer can reject an action.
pub struct FnReducer<S, A, I, F> {
    init: I,
    reduce: F,
    _marker: PhantomData<fn(&S, &A)>,
}

impl<S, A, I, F> FnReducer<S, A, I, F>
where
    I: Fn() -> Result<Arc<S>, ReducerError>,
    F: Fn(&Arc<S>, &A) -> Result<Arc<S>, ReducerError>,
{
    /// Create a reducer from an init closure and a reduce closure
    pub fn new(init: I, reduce: F) -> Self {
        Self {
            init,
            reduce,
            _marker: PhantomData,
        }
    }
}

impl<S, A, I, F> Reducer<S, A> for FnReducer<S, A, I, F>
where
    I: Fn() -> Result<Arc<S>, ReducerError>,
    F: Fn(&Arc<S>, &A) -> Result<Arc<S>, ReducerError>,
{
    fn init(&self) -> Result<Arc<S>, ReducerError> {
        (self.init)()
    }

    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Arc<S>, ReducerError> {
        (self.reduce)(state, action)
    }
}

impl<S, A, I, F> fmt::Debug for FnReducer<S, A, I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReducer").finish_non_exhaustive()
    }
}
