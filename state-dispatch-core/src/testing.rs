//! Test utilities for state-dispatch stores
//!
//! - [`NotificationProbe`]: hands out labelled listeners and records the
//!   order they were called in
//! - Assertion macros for verifying dispatched actions, typically the list
//!   returned by [`ActionRecorder::actions`](crate::debug::ActionRecorder::actions)
//!
//! # Example
//!
//! ```ignore
//! use state_dispatch::testing::NotificationProbe;
//! use state_dispatch::{assert_emitted, debug::ActionRecorder};
//!
//! let probe = NotificationProbe::new();
//! let recorder = ActionRecorder::new();
//! let store = create_store(counter, None, recorder.clone())?;
//! store.subscribe(probe.listener("render"));
//!
//! store.dispatch(CounterAction::Inc)?;
//!
//! assert_eq!(probe.calls(), vec!["render"]);
//! assert_emitted!(recorder.actions(), CounterAction::Inc);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// Records listener invocations by label, in call order
#[derive(Debug, Clone, Default)]
pub struct NotificationProbe {
    calls: Rc<RefCell<Vec<String>>>,
}

impl NotificationProbe {
    /// Create an empty probe
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that records `label` each time it is called
    pub fn listener(&self, label: impl Into<String>) -> impl Fn() + 'static {
        let calls = Rc::clone(&self.calls);
        let label = label.into();
        move || calls.borrow_mut().push(label.clone())
    }

    /// All recorded labels, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// How often `label` was recorded
    pub fn count(&self, label: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == label).count()
    }

    /// Total number of recorded calls
    pub fn total(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Drain and return all recorded labels
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

/// Collect the `action_type()` of every action in a list.
///
/// # Example
///
/// ```
/// use state_dispatch_core::{testing::action_types, AnyAction};
///
/// let actions = vec![AnyAction::new("inc"), AnyAction::new("dec")];
/// assert_eq!(action_types(&actions), vec!["inc", "dec"]);
/// ```
pub fn action_types<'a, A, I>(actions: I) -> Vec<String>
where
    A: crate::Action + 'a,
    I: IntoIterator<Item = &'a A>,
{
    actions
        .into_iter()
        .map(|a| a.action_type().to_string())
        .collect()
}

/// Assert that a specific action was emitted.
///
/// # Example
///
/// ```ignore
/// use state_dispatch::assert_emitted;
///
/// let actions = recorder.actions();
/// assert_emitted!(actions, CartAction::AddItem { product_id: 1, .. });
/// assert_emitted!(actions, CartAction::RemoveItem { product_id } if *product_id > 5);
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
///
/// # Example
///
/// ```ignore
/// use state_dispatch::assert_not_emitted;
///
/// assert_not_emitted!(recorder.actions(), CartAction::Clear);
/// ```
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first action matching a pattern.
///
/// # Example
///
/// ```ignore
/// use state_dispatch::find_emitted;
///
/// let actions = recorder.actions();
/// if let Some(CartAction::AddItem { quantity, .. }) = find_emitted!(actions, CartAction::AddItem { .. }) {
///     assert_eq!(*quantity, 1);
/// }
/// ```
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
///
/// # Example
///
/// ```ignore
/// use state_dispatch::count_emitted;
///
/// assert_eq!(count_emitted!(recorder.actions(), CounterAction::Inc), 2);
/// ```
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

/// Assert the exact sequence of action types in a list of actions.
///
/// # Example
///
/// ```
/// use state_dispatch_core::{assert_action_types, AnyAction};
///
/// let actions = vec![AnyAction::new("inc"), AnyAction::new("inc"), AnyAction::new("dec")];
/// assert_action_types!(actions, ["inc", "inc", "dec"]);
/// ```
#[macro_export]
macro_rules! assert_action_types {
    ($actions:expr, [$($expected:expr),* $(,)?]) => {{
        let actual = $crate::testing::action_types(&$actions);
        let expected: ::std::vec::Vec<::std::string::String> =
            ::std::vec![$(::std::string::String::from($expected)),*];
        assert_eq!(
            actual, expected,
            "Expected action types {:?}, but got {:?}",
            expected, actual
        );
    }};
}
