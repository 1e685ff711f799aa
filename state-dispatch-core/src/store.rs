//! Centralized state store with reducer pattern

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::action::{self, Action, INIT_ACTION_TYPE};
use crate::enhancer::{NoopEnhancer, StoreCreator, StoreEnhancer};
use crate::error::{ListenerError, StoreError};
use crate::reducer::{BoxReducer, Reducer};

type Listener = Rc<dyn Fn() -> Result<(), ListenerError>>;

struct ListenerEntry {
    id: u64,
    callback: Listener,
}

#[derive(Default)]
struct ListenerSet {
    entries: Vec<ListenerEntry>,
    next_id: u64,
}

impl ListenerSet {
    fn insert(&mut self, callback: Listener) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(ListenerEntry { id, callback });
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn snapshot(&self) -> Vec<Listener> {
        self.entries
            .iter()
            .map(|entry| Rc::clone(&entry.callback))
            .collect()
    }
}

struct StoreInner<S, A> {
    state: RefCell<Arc<S>>,
    reducer: BoxReducer<S, A>,
    listeners: Rc<RefCell<ListenerSet>>,
    dispatching: Cell<bool>,
}

/// Clears the dispatching flag when the dispatch ends, including by panic
struct DispatchGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DispatchGuard<'a> {
    fn acquire(flag: &'a Cell<bool>, action_type: &str) -> Result<Self, StoreError> {
        if flag.replace(true) {
            return Err(StoreError::ReentrantDispatch {
                action_type: action_type.to_string(),
            });
        }
        Ok(Self { flag })
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Centralized state container with a Redux-like dispatch protocol
///
/// The store owns a single state value, changes it only by running the
/// reducer on dispatched actions, and notifies subscribed listeners after
/// every committed change.
///
/// `Store` is a cheap handle: clones share the same state. Listeners and
/// reducers stored inside the store should capture a [`WeakStore`] from
/// [`downgrade`](Self::downgrade) instead of a clone, otherwise the store
/// owns a handle to itself and is never freed.
///
/// # Type Parameters
/// * `S` - The application state type
/// * `A` - The action type (must implement `Action`)
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum CounterAction {
///     Inc,
///     Dec,
/// }
///
/// fn counter(state: &Arc<i32>, action: &CounterAction) -> Arc<i32> {
///     match action {
///         CounterAction::Inc => Arc::new(**state + 1),
///         CounterAction::Dec => Arc::new(**state - 1),
///     }
/// }
///
/// let store = Store::new(counter)?;
/// let reader = store.downgrade();
/// let _sub = store.subscribe(move || {
///     if let Some(count) = reader.get_state() {
///         println!("count = {count}");
///     }
/// });
///
/// store.dispatch(CounterAction::Inc)?;
/// assert_eq!(*store.get_state(), 1);
/// ```
pub struct Store<S, A> {
    inner: Rc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Non-owning handle to a [`Store`]
///
/// Does not keep the store alive. Every access returns `None` once the last
/// [`Store`] handle is gone.
pub struct WeakStore<S, A> {
    inner: Weak<StoreInner<S, A>>,
}

impl<S, A> Clone for WeakStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S: 'static, A: Action> WeakStore<S, A> {
    /// Get an owning handle if the store is still alive
    pub fn upgrade(&self) -> Option<Store<S, A>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }

    /// Current state of a live store
    pub fn get_state(&self) -> Option<Arc<S>> {
        self.upgrade().map(|store| store.get_state())
    }
}

impl<S, A> fmt::Debug for WeakStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Create a store from a reducer, an optional preloaded state and an enhancer.
///
/// Without preloaded state the reducer's init branch runs once to produce
/// the initial state. With preloaded state the reducer is not called.
/// Pass [`NoopEnhancer`] when no enhancer is wanted.
pub fn create_store<S, A, R, E>(
    reducer: R,
    preloaded: Option<S>,
    enhancer: E,
) -> Result<Store<S, A>, StoreError>
where
    S: 'static,
    A: Action,
    R: Reducer<S, A> + 'static,
    E: StoreEnhancer<S, A>,
{
    let base: StoreCreator<S, A> = Box::new(Store::from_parts);
    let creator = enhancer.enhance(base);
    creator(Box::new(reducer), preloaded.map(Arc::new))
}

impl<S: 'static, A: Action> Store<S, A> {
    /// Create a store whose initial state comes from the reducer's init branch
    pub fn new<R>(reducer: R) -> Result<Self, StoreError>
    where
        R: Reducer<S, A> + 'static,
    {
        create_store(reducer, None, NoopEnhancer)
    }

    /// Create a store with preloaded state; the reducer is not called
    pub fn with_state<R>(reducer: R, state: S) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        Self::assemble(Box::new(reducer), Arc::new(state))
    }

    /// Start a builder for stores with an enhancer or preloaded state
    pub fn builder<R>(reducer: R) -> StoreBuilder<S, A, R, NoopEnhancer>
    where
        R: Reducer<S, A> + 'static,
    {
        StoreBuilder {
            reducer,
            preloaded: None,
            enhancer: NoopEnhancer,
            _marker: std::marker::PhantomData,
        }
    }

    /// Base store creator, the innermost function every enhancer wraps
    pub fn from_parts(
        reducer: BoxReducer<S, A>,
        preloaded: Option<Arc<S>>,
    ) -> Result<Self, StoreError> {
        let state = match preloaded {
            Some(state) => state,
            None => reducer.init().map_err(|source| StoreError::Reducer {
                action_type: INIT_ACTION_TYPE.to_string(),
                source,
            })?,
        };
        Ok(Self::assemble(reducer, state))
    }

    fn assemble(reducer: BoxReducer<S, A>, state: Arc<S>) -> Self {
        tracing::debug!("store created");
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                reducer,
                listeners: Rc::new(RefCell::new(ListenerSet::default())),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// Get the current state
    ///
    /// Inside a reducer this is the state before the running dispatch;
    /// inside a listener it is the state that dispatch committed.
    pub fn get_state(&self) -> Arc<S> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Non-owning handle for listeners and reducers that read this store
    pub fn downgrade(&self) -> WeakStore<S, A> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Dispatch an action to the store
    ///
    /// Runs the reducer on the current state, commits its result, then calls
    /// every listener that was subscribed when the dispatch started, in
    /// subscription order. Returns the action that was passed in.
    ///
    /// Fails without touching state when the action is malformed, when called
    /// from inside a reducer or listener of this store, or when the reducer
    /// fails. A failing listener stops the notification round; the new state
    /// stays committed.
    pub fn dispatch(&self, action: A) -> Result<A, StoreError> {
        if let Err(e) = action::validate(&action) {
            tracing::warn!(error = %e, "rejected action");
            return Err(e);
        }

        let action_type = action.action_type();
        let _guard = match DispatchGuard::acquire(&self.inner.dispatching, action_type) {
            Ok(guard) => guard,
            Err(e) => {
                tracing::warn!(action = %action_type, "reentrant dispatch rejected");
                return Err(e);
            }
        };

        let listeners = self.inner.listeners.borrow().snapshot();
        let current = self.get_state();

        let next = self
            .inner
            .reducer
            .reduce(&current, &action)
            .map_err(|source| StoreError::Reducer {
                action_type: action_type.to_string(),
                source,
            })?;

        let changed = !Arc::ptr_eq(&current, &next);
        *self.inner.state.borrow_mut() = next;
        tracing::trace!(
            action = %action_type,
            state_changed = changed,
            listeners = listeners.len(),
            "action committed"
        );

        for (index, listener) in listeners.iter().enumerate() {
            listener().map_err(|source| StoreError::Listener { index, source })?;
        }

        Ok(action)
    }

    /// Register a listener called after every committed dispatch
    ///
    /// Subscribing the same closure twice registers it twice. Listeners
    /// added while a dispatch is running are first called by the next one.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        self.try_subscribe(move || {
            listener();
            Ok(())
        })
    }

    /// Register a listener that can fail; its error aborts the notification
    /// round and is returned from `dispatch`
    pub fn try_subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() -> Result<(), ListenerError> + 'static,
    {
        let id = self.inner.listeners.borrow_mut().insert(Rc::new(listener));
        tracing::debug!(listener = id, "listener subscribed");
        Subscription {
            id,
            listeners: Rc::downgrade(&self.inner.listeners),
        }
    }

    /// Number of currently subscribed listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().entries.len()
    }

    /// Whether a dispatch is running on this store
    pub fn is_dispatching(&self) -> bool {
        self.inner.dispatching.get()
    }
}

impl<S: fmt::Debug, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().entries.len())
            .field("dispatching", &self.inner.dispatching.get())
            .finish()
    }
}

/// Handle returned by [`Store::subscribe`]
///
/// Dropping the handle keeps the listener subscribed; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[derive(Clone)]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<ListenerSet>>,
}

impl Subscription {
    /// Remove this handle's listener; later calls are no-ops
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            if listeners.borrow_mut().remove(self.id) {
                tracing::debug!(listener = self.id, "listener unsubscribed");
            }
        }
    }

    /// Whether the listener is still registered on a live store
    pub fn is_active(&self) -> bool {
        self.listeners
            .upgrade()
            .is_some_and(|listeners| listeners.borrow().contains(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Builder for [`Store`] with optional preloaded state and enhancer
pub struct StoreBuilder<S, A, R, E> {
    reducer: R,
    preloaded: Option<S>,
    enhancer: E,
    _marker: std::marker::PhantomData<fn(A)>,
}

impl<S, A, R, E> StoreBuilder<S, A, R, E>
where
    S: 'static,
    A: Action,
    R: Reducer<S, A> + 'static,
    E: StoreEnhancer<S, A>,
{
    /// Start from this state instead of the reducer's init branch
    pub fn preloaded(mut self, state: S) -> Self {
        self.preloaded = Some(state);
        self
    }

    /// Wrap store creation with an enhancer
    pub fn enhancer<E2>(self, enhancer: E2) -> StoreBuilder<S, A, R, E2>
    where
        E2: StoreEnhancer<S, A>,
    {
        StoreBuilder {
            reducer: self.reducer,
            preloaded: self.preloaded,
            enhancer,
            _marker: std::marker::PhantomData,
        }
    }

    /// Create the store
    pub fn build(self) -> Result<Store<S, A>, StoreError> {
        create_store(self.reducer, self.preloaded, self.enhancer)
    }
}
