//! Debug and inspection utilities for stores
//!
//! Both tools are enhancers, so they attach at store creation and leave the
//! store's operations unchanged:
//!
//! - **ActionLogger**: pattern-filtered `tracing` output, optionally kept in
//!   an in-memory ring buffer
//! - **ActionRecorder**: full history of typed actions with JSON state
//!   snapshots, exportable and replayable
//!
//! # Quick Start
//!
//! ```ignore
//! use state_dispatch::compose;
//! use state_dispatch::debug::{ActionLogger, ActionRecorder};
//!
//! let recorder = ActionRecorder::new();
//! let store = Store::builder(reducer)
//!     .enhancer(compose(ActionLogger::from_env(), recorder.clone()))
//!     .build()?;
//!
//! store.dispatch(CartAction::AddItem { product_id: 1, quantity: 1 })?;
//! println!("{}", recorder.export());
//! ```

pub mod action_logger;
pub mod recorder;

// Action logging
pub use action_logger::{
    glob_match, ActionLog, ActionLogConfig, ActionLogEntry, ActionLogHandle, ActionLogger,
    ActionLoggerConfig, LOG_EXCLUDE_ENV, LOG_INCLUDE_ENV,
};

// Recording
pub use recorder::{ActionRecorder, RecordedAction};
