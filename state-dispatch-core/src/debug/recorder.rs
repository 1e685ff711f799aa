//! Inspection bridge: records every committed action with a state snapshot
//!
//! `ActionRecorder` is what a devtools extension would attach to a store. It
//! is installed as an enhancer, keeps the typed actions so they can be
//! replayed into another store, and serialises the state after each action
//! so the history can be exported as JSON.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;

use crate::action::{Action, INIT_ACTION_TYPE};
use crate::enhancer::{StoreCreator, StoreEnhancer};
use crate::error::{ReducerError, StoreError};
use crate::reducer::{BoxReducer, Reducer};
use crate::store::Store;

/// One committed transition
#[derive(Debug, Clone)]
pub struct RecordedAction<A> {
    /// Sequence number, starting at 0 for the first recorded entry
    pub sequence: u64,
    /// The dispatched action; `None` for the store's init action
    pub action: Option<A>,
    /// Action type (the reserved init type for the init entry)
    pub action_type: String,
    /// Whether the reducer returned a new state
    pub state_changed: bool,
    /// State after the action, as JSON (`Null` if it failed to serialise)
    pub state: serde_json::Value,
}

impl<A: Action> RecordedAction<A> {
    /// JSON view of this entry: `{"sequence", "type", "summary", "stateChanged", "state"}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "sequence": self.sequence,
            "type": self.action_type,
            "summary": self.action.as_ref().map(|action| action.summary()),
            "stateChanged": self.state_changed,
            "state": self.state,
        })
    }
}

struct History<A> {
    entries: VecDeque<RecordedAction<A>>,
    next_sequence: u64,
    capacity: Option<usize>,
}

impl<A> History<A> {
    fn push(
        &mut self,
        action: Option<A>,
        action_type: &str,
        state_changed: bool,
        state: serde_json::Value,
    ) {
        let entry = RecordedAction {
            sequence: self.next_sequence,
            action,
            action_type: action_type.to_string(),
            state_changed,
            state,
        };
        self.next_sequence += 1;
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            if self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(entry);
    }
}

/// Enhancer recording every successful transition of a store
///
/// Cloning the recorder shares its history: pass one clone to the store and
/// keep the other for inspection. Failed reducer calls are not recorded.
///
/// # Example
///
/// ```ignore
/// use state_dispatch::debug::ActionRecorder;
///
/// let recorder = ActionRecorder::new();
/// let store = create_store(cart_reducer, None, recorder.clone())?;
/// store.dispatch(CartAction::AddItem { product_id: 1, quantity: 1 })?;
///
/// println!("{}", serde_json::to_string_pretty(&recorder.export())?);
/// ```
pub struct ActionRecorder<A> {
    history: Rc<RefCell<History<A>>>,
}

impl<A> Clone for ActionRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            history: Rc::clone(&self.history),
        }
    }
}

impl<A: Action> Default for ActionRecorder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ActionRecorder<A> {
    /// Create a recorder keeping the full history
    pub fn new() -> Self {
        Self {
            history: Rc::new(RefCell::new(History {
                entries: VecDeque::new(),
                next_sequence: 0,
                capacity: None,
            })),
        }
    }

    /// Create a recorder keeping only the latest `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        let recorder = Self::new();
        recorder.history.borrow_mut().capacity = Some(capacity);
        recorder
    }

    /// Copy of the recorded entries (oldest first)
    pub fn entries(&self) -> Vec<RecordedAction<A>> {
        self.history.borrow().entries.iter().cloned().collect()
    }

    /// Recorded actions in dispatch order, without the init entry
    pub fn actions(&self) -> Vec<A> {
        self.history
            .borrow()
            .entries
            .iter()
            .filter_map(|entry| entry.action.clone())
            .collect()
    }

    /// Recorded action types in order, including the init entry
    pub fn action_types(&self) -> Vec<String> {
        self.history
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.action_type.clone())
            .collect()
    }

    /// Snapshot of the state after the most recent recorded entry
    pub fn last_state(&self) -> Option<serde_json::Value> {
        self.history
            .borrow()
            .entries
            .back()
            .map(|entry| entry.state.clone())
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.history.borrow().entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.history.borrow().entries.is_empty()
    }

    /// Forget all entries; sequence numbers keep counting
    pub fn clear(&self) {
        self.history.borrow_mut().entries.clear();
    }

    /// Export the history as a JSON array
    pub fn export(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.history
                .borrow()
                .entries
                .iter()
                .map(RecordedAction::to_json)
                .collect(),
        )
    }

    /// Dispatch every recorded action, in order, into `store`
    ///
    /// Stops at the first failing dispatch. Returns how many actions were
    /// replayed.
    pub fn replay_into<S: 'static>(&self, store: &Store<S, A>) -> Result<usize, StoreError> {
        let actions = self.actions();
        for action in &actions {
            store.dispatch(action.clone())?;
        }
        tracing::debug!(count = actions.len(), "replayed recorded actions");
        Ok(actions.len())
    }

    fn push(&self, action: Option<A>, action_type: &str, changed: bool, state: serde_json::Value) {
        self.history
            .borrow_mut()
            .push(action, action_type, changed, state);
    }
}

fn snapshot<S: Serialize>(state: &S) -> serde_json::Value {
    serde_json::to_value(state).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "state snapshot failed");
        serde_json::Value::Null
    })
}

impl<S, A> StoreEnhancer<S, A> for ActionRecorder<A>
where
    S: Serialize + 'static,
    A: Action,
{
    fn enhance(self, next: StoreCreator<S, A>) -> StoreCreator<S, A> {
        Box::new(move |reducer, preloaded| {
            if let Some(ref state) = preloaded {
                // Preloaded stores never run init; record the starting point instead
                self.push(None, INIT_ACTION_TYPE, false, snapshot(&**state));
            }
            let recording = RecordingReducer {
                inner: reducer,
                recorder: self,
            };
            next(Box::new(recording), preloaded)
        })
    }
}

struct RecordingReducer<S, A> {
    inner: BoxReducer<S, A>,
    recorder: ActionRecorder<A>,
}

impl<S: Serialize, A: Action> Reducer<S, A> for RecordingReducer<S, A> {
    fn init(&self) -> Result<Arc<S>, ReducerError> {
        let state = self.inner.init()?;
        self.recorder
            .push(None, INIT_ACTION_TYPE, true, snapshot(&*state));
        Ok(state)
    }

    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Arc<S>, ReducerError> {
        let next = self.inner.reduce(state, action)?;
        let changed = !Arc::ptr_eq(state, &next);
        self.recorder.push(
            Some(action.clone()),
            action.action_type(),
            changed,
            snapshot(&*next),
        );
        Ok(next)
    }
}
