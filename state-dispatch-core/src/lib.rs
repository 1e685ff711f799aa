//! Core traits and types for state-dispatch
//!
//! This crate provides a predictable state container following the Redux
//! pattern: one immutable state tree, replaced only by pure reducers in
//! response to dispatched actions, with listeners notified synchronously
//! after every committed transition.
//!
//! # Core Concepts
//!
//! - **Action**: A value describing an intent, identified by `action_type()`
//! - **Reducer**: Pure function from `(state, action)` to the next state
//! - **Store**: Owns the state, runs the dispatch/commit/notify protocol
//! - **Enhancer**: Wraps store creation (logging, recording, devtools)
//!
//! # Basic Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use state_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(rename_all = "camelCase")]
//! enum CounterAction {
//!     Inc,
//!     Dec,
//! }
//!
//! fn counter(state: &Arc<i32>, action: &CounterAction) -> Arc<i32> {
//!     match action {
//!         CounterAction::Inc => Arc::new(**state + 1),
//!         CounterAction::Dec => Arc::new(**state - 1),
//!     }
//! }
//!
//! let store = Store::new(counter)?;
//! store.dispatch(CounterAction::Inc)?;
//! assert_eq!(*store.get_state(), 1);
//! ```
//!
//! # Identity as change detection
//!
//! State lives behind an `Arc`. A reducer that does not handle an action
//! returns the `Arc` it was given, so observers can skip work with
//! `Arc::ptr_eq`:
//!
//! ```ignore
//! let before = store.get_state();
//! store.dispatch(CounterAction::Unrelated)?;
//! assert!(Arc::ptr_eq(&before, &store.get_state()));
//! ```
//!
//! # Dispatch rules
//!
//! `dispatch` fails fast instead of producing inconsistent state:
//!
//! 1. Actions with a blank type, or a type in the reserved `@@state-dispatch/`
//!    namespace, are rejected ([`StoreError::MalformedAction`])
//! 2. Dispatching from inside a reducer or listener of the same store is
//!    rejected ([`StoreError::ReentrantDispatch`])
//! 3. A failing reducer leaves the state untouched and notifies nobody
//!    ([`StoreError::Reducer`])
//! 4. A failing listener stops the notification round after the state was
//!    committed ([`StoreError::Listener`])

pub mod action;
pub mod debug;
pub mod enhancer;
pub mod error;
pub mod reducer;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{validate, Action, AnyAction, INIT_ACTION_TYPE, RESERVED_PREFIX};
pub use reducer::{BoxReducer, FnReducer, Reducer};

// Store exports
pub use store::{create_store, Store, StoreBuilder, Subscription, WeakStore};

// Enhancer exports
pub use enhancer::{
    compose, optional, Composed, NoopEnhancer, Optional, StoreCreator, StoreEnhancer,
};

// Error exports
pub use error::{BoxError, ListenerError, ReducerError, StoreError};

// Testing exports
pub use testing::NotificationProbe;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, AnyAction, INIT_ACTION_TYPE};
    pub use crate::debug::{ActionLogger, ActionLoggerConfig, ActionRecorder};
    pub use crate::enhancer::{compose, NoopEnhancer, StoreCreator, StoreEnhancer};
    pub use crate::error::{ListenerError, ReducerError, StoreError};
    pub use crate::reducer::{FnReducer, Reducer};
    pub use crate::store::{create_store, Store, Subscription, WeakStore};
}
