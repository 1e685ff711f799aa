//! Error types for the store

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed error raised by user code (reducers and listeners)
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Everything `create_store` and `dispatch` can fail with
#[derive(Error, Debug)]
pub enum StoreError {
    /// The action has no usable discriminator
    #[error("malformed action: {0}")]
    MalformedAction(String),

    /// `dispatch` was called from inside a running reducer or listener
    #[error("reentrant dispatch of `{action_type}`: reducers and listeners may not dispatch")]
    ReentrantDispatch { action_type: String },

    /// The reducer failed; state is unchanged and listeners were not notified
    #[error("reducer failed on `{action_type}`: {source}")]
    Reducer {
        action_type: String,
        #[source]
        source: ReducerError,
    },

    /// A listener failed; state was committed, later listeners were skipped
    #[error("listener #{index} failed: {source}")]
    Listener {
        index: usize,
        #[source]
        source: ListenerError,
    },
}

impl StoreError {
    /// The reducer's own error, if this is a reducer failure
    pub fn reducer_error(&self) -> Option<&ReducerError> {
        match self {
            StoreError::Reducer { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error raised by a reducer, carried unchanged to the dispatch caller
pub struct ReducerError(BoxError);

impl ReducerError {
    /// Wrap any error
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(error.into())
    }

    /// Create an error from a message
    pub fn msg(message: impl fmt::Display) -> Self {
        Self(message.to_string().into())
    }

    /// Downcast to the concrete error the reducer raised
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Debug for ReducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ReducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for ReducerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// Error raised by a fallible listener
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ListenerError(#[source] pub BoxError);

impl ListenerError {
    /// Wrap any error
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(error.into())
    }

    /// Create an error from a message
    pub fn msg(message: impl fmt::Display) -> Self {
        Self(message.to_string().into())
    }
}
