//! state-dispatch: a predictable state container for Rust
//!
//! Like Redux: one state tree, pure reducers, synchronous listeners. State
//! changes only through dispatched actions, and every observer sees either
//! the state before a dispatch or the state after it, never anything in
//! between.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use state_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(prefix = "cart", rename_all = "camelCase")]
//! enum CartAction {
//!     AddItem { product_id: u32, quantity: u32 },
//!     RemoveItem { product_id: u32 },
//! }
//!
//! let store = Store::new(cart_reducer)?;
//! let reader = store.downgrade();
//! store.subscribe(move || {
//!     if let Some(state) = reader.get_state() {
//!         println!("{state:?}");
//!     }
//! });
//!
//! store.dispatch(CartAction::AddItem { product_id: 1, quantity: 1 })?;
//! ```

// Re-export everything from core
pub use state_dispatch_core::*;

// Re-export derive macros
pub use state_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use state_dispatch_core::{Action, Reducer, StoreEnhancer};

    // Store
    pub use state_dispatch_core::{
        compose, create_store, AnyAction, FnReducer, NoopEnhancer, Store, StoreCreator,
        Subscription, WeakStore, INIT_ACTION_TYPE,
    };

    // Errors
    pub use state_dispatch_core::{ListenerError, ReducerError, StoreError};

    // Debug
    pub use state_dispatch_core::debug::{
        ActionLogConfig, ActionLogger, ActionLoggerConfig, ActionRecorder,
    };

    // Derive macros
    pub use state_dispatch_macros::Action;
}
