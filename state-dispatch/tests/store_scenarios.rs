//! End-to-end store behaviour with derived actions

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use state_dispatch::debug::{ActionLogConfig, ActionLogger, ActionRecorder};
use state_dispatch::prelude::*;
use state_dispatch::testing::NotificationProbe;
use state_dispatch::{assert_action_types, assert_emitted, assert_not_emitted, count_emitted};

// ============================================================================
// Counter
// ============================================================================

#[derive(Action, Clone, Debug, PartialEq)]
#[action(rename_all = "camelCase")]
enum CounterAction {
    Inc,
    Dec,
    Reset,
}

fn counter(state: &Arc<i32>, action: &CounterAction) -> Arc<i32> {
    match action {
        CounterAction::Inc => Arc::new(**state + 1),
        CounterAction::Dec => Arc::new(**state - 1),
        CounterAction::Reset if **state == 0 => Arc::clone(state),
        CounterAction::Reset => Arc::new(0),
    }
}

#[test]
fn counter_inc_inc_dec_ends_at_one() {
    let store = Store::with_state(counter, 0);
    let probe = NotificationProbe::new();
    let rounds = Rc::new(RefCell::new(Vec::new()));

    let reader = store.downgrade();
    let seen = rounds.clone();
    store.subscribe(move || {
        if let Some(state) = reader.get_state() {
            seen.borrow_mut().push(*state);
        }
    });
    store.subscribe(probe.listener("render"));

    for action in [CounterAction::Inc, CounterAction::Inc, CounterAction::Dec] {
        store.dispatch(action).unwrap();
    }

    assert_eq!(*store.get_state(), 1);
    assert_eq!(*rounds.borrow(), vec![1, 2, 1]);
    assert_eq!(probe.count("render"), 3);
}

#[test]
fn every_state_is_the_reducer_applied_to_the_previous_one() {
    let store = Store::new(counter).unwrap();
    let actions = [
        CounterAction::Inc,
        CounterAction::Reset,
        CounterAction::Reset,
        CounterAction::Dec,
        CounterAction::Inc,
        CounterAction::Inc,
        CounterAction::Reset,
        CounterAction::Dec,
    ];

    for action in actions {
        let previous = store.get_state();
        let expected = counter(&previous, &action);
        store.dispatch(action).unwrap();
        let current = store.get_state();

        assert_eq!(*current, *expected);
        if Arc::ptr_eq(&expected, &previous) {
            assert!(Arc::ptr_eq(&current, &previous));
        }
    }
}

#[test]
fn construction_default_matches_reducer_init() {
    let store = Store::new(counter).unwrap();
    let expected = Reducer::<i32, CounterAction>::init(&counter).unwrap();
    assert_eq!(*store.get_state(), *expected);
}

#[test]
fn unhandled_action_keeps_identity() {
    let store = Store::new(counter).unwrap();
    let before = store.get_state();

    store.dispatch(CounterAction::Reset).unwrap();

    assert!(Arc::ptr_eq(&before, &store.get_state()));
}

#[test]
fn listeners_fire_in_subscription_order_exactly_once() {
    let store = Store::new(counter).unwrap();
    let probe = NotificationProbe::new();
    for label in ["L1", "L2", "L3"] {
        store.subscribe(probe.listener(label));
    }

    store.dispatch(CounterAction::Inc).unwrap();

    assert_eq!(probe.calls(), vec!["L1", "L2", "L3"]);
}

#[test]
fn unsubscribed_listener_is_not_called_and_handle_is_reusable() {
    let store = Store::new(counter).unwrap();
    let probe = NotificationProbe::new();
    let first = store.subscribe(probe.listener("first"));
    store.subscribe(probe.listener("second"));

    first.unsubscribe();
    first.unsubscribe();
    store.dispatch(CounterAction::Inc).unwrap();

    assert_eq!(probe.calls(), vec!["second"]);
}

#[test]
fn reducer_dispatching_into_its_own_store_is_rejected() {
    let slot: Rc<RefCell<Option<WeakStore<i32, CounterAction>>>> = Rc::new(RefCell::new(None));
    let inner_error = Rc::new(Cell::new(false));

    let store_ref = slot.clone();
    let flag = inner_error.clone();
    let reducer = FnReducer::new(
        || Ok(Arc::new(0)),
        move |state: &Arc<i32>, action: &CounterAction| {
            if let Some(store) = store_ref.borrow().as_ref().and_then(WeakStore::upgrade) {
                let result = store.dispatch(CounterAction::Reset);
                flag.set(matches!(result, Err(StoreError::ReentrantDispatch { .. })));
            }
            Ok(counter(state, action))
        },
    );

    let store = Store::new(reducer).unwrap();
    *slot.borrow_mut() = Some(store.downgrade());

    store.dispatch(CounterAction::Inc).unwrap();

    assert!(inner_error.get());
    assert_eq!(*store.get_state(), 1);
}

#[test]
fn listener_changes_made_by_a_reducer_apply_from_the_next_dispatch() {
    let probe = NotificationProbe::new();
    let pending: Rc<RefCell<Option<(WeakStore<i32, CounterAction>, Subscription)>>> =
        Rc::new(RefCell::new(None));

    let handles = pending.clone();
    let late = probe.clone();
    let reducer = FnReducer::new(
        || Ok(Arc::new(0)),
        move |state: &Arc<i32>, action: &CounterAction| {
            if let Some((weak, early)) = handles.borrow_mut().take() {
                if let Some(store) = weak.upgrade() {
                    early.unsubscribe();
                    store.subscribe(late.listener("late"));
                }
            }
            Ok(counter(state, action))
        },
    );

    let store = Store::new(reducer).unwrap();
    let early = store.subscribe(probe.listener("early"));
    *pending.borrow_mut() = Some((store.downgrade(), early.clone()));

    // Listeners were captured before the reducer ran
    store.dispatch(CounterAction::Inc).unwrap();
    assert_eq!(probe.drain(), vec!["early"]);
    assert!(!early.is_active());

    store.dispatch(CounterAction::Inc).unwrap();
    assert_eq!(probe.drain(), vec!["late"]);
    assert_eq!(*store.get_state(), 2);
}

// ============================================================================
// Cart
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartItem {
    product_id: u32,
    quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartState {
    cart_items: Vec<CartItem>,
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(prefix = "cart", rename_all = "camelCase")]
enum CartAction {
    AddItem { product_id: u32, quantity: u32 },
    RemoveItem { product_id: u32 },
    #[action(rename = "wishlist/addItem")]
    WishlistAdd { product_id: u32 },
}

fn cart(state: &Arc<CartState>, action: &CartAction) -> Arc<CartState> {
    match action {
        CartAction::AddItem {
            product_id,
            quantity,
        } => {
            let mut cart_items = state.cart_items.clone();
            cart_items.push(CartItem {
                product_id: *product_id,
                quantity: *quantity,
            });
            Arc::new(CartState { cart_items })
        }
        CartAction::RemoveItem { product_id } => Arc::new(CartState {
            cart_items: state
                .cart_items
                .iter()
                .filter(|item| item.product_id != *product_id)
                .cloned()
                .collect(),
        }),
        _ => Arc::clone(state),
    }
}

#[test]
fn cart_add_then_remove_keeps_relative_order() {
    let recorder = ActionRecorder::new();
    let store = create_store(cart, None, recorder.clone()).unwrap();

    for id in [1, 12, 6, 9] {
        store
            .dispatch(CartAction::AddItem {
                product_id: id,
                quantity: 1,
            })
            .unwrap();
    }
    let after_adds = store.get_state();
    for id in [6, 9] {
        store
            .dispatch(CartAction::RemoveItem { product_id: id })
            .unwrap();
    }

    let ids: Vec<u32> = store
        .get_state()
        .cart_items
        .iter()
        .map(|item| item.product_id)
        .collect();
    assert_eq!(ids, vec![1, 12]);

    // Earlier snapshots were never mutated
    assert_eq!(after_adds.cart_items.len(), 4);

    let actions = recorder.actions();
    assert_eq!(count_emitted!(actions, CartAction::AddItem { .. }), 4);
    assert_emitted!(actions, CartAction::RemoveItem { product_id: 9 });
    assert_not_emitted!(actions, CartAction::WishlistAdd { .. });
    assert_action_types!(
        actions,
        [
            "cart/addItem",
            "cart/addItem",
            "cart/addItem",
            "cart/addItem",
            "cart/removeItem",
            "cart/removeItem"
        ]
    );
    assert_eq!(
        recorder.last_state(),
        Some(json!({
            "cartItems": [
                { "productId": 1, "quantity": 1 },
                { "productId": 12, "quantity": 1 }
            ]
        }))
    );
}

#[test]
fn cart_ignores_foreign_actions() {
    let store = Store::new(cart).unwrap();
    let before = store.get_state();

    store
        .dispatch(CartAction::WishlistAdd { product_id: 3 })
        .unwrap();

    assert!(Arc::ptr_eq(&before, &store.get_state()));
    assert!(store.get_state().cart_items.is_empty());
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
struct User {
    name: String,
    age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct PostState {
    post: i64,
    user: User,
    status: String,
}

#[derive(Action, Clone, Debug)]
#[action(prefix = "post", rename_all = "camelCase")]
enum PostAction {
    Increment,
    Decrement,
    IncreaseBy(i64),
    DecreaseBy(i64),
    #[action(rename = "app/setStatus")]
    SetStatus(String),
}

fn posts() -> impl Reducer<PostState, PostAction> {
    FnReducer::new(
        || {
            Ok(Arc::new(PostState {
                post: 0,
                user: User {
                    name: "Anurag Singh".into(),
                    age: 26,
                },
                status: "idle".into(),
            }))
        },
        |state: &Arc<PostState>, action: &PostAction| {
            let post = match action {
                PostAction::Increment => state.post + 1,
                PostAction::Decrement => state.post - 1,
                PostAction::IncreaseBy(by) => state.post + by,
                PostAction::DecreaseBy(by) => state.post - by,
                PostAction::SetStatus(status) => {
                    return Ok(Arc::new(PostState {
                        status: status.clone(),
                        ..(**state).clone()
                    }))
                }
            };
            Ok(Arc::new(PostState {
                post,
                ..(**state).clone()
            }))
        },
    )
}

#[test]
fn post_sequence_matches_walkthrough() {
    let logger = ActionLogger::with_log(ActionLogConfig::default());
    let log = logger.log().cloned().unwrap();
    let store = Store::builder(posts()).enhancer(logger).build().unwrap();

    let initial = store.get_state();
    assert_eq!(initial.status, "idle");

    for action in [
        PostAction::Increment,
        PostAction::Increment,
        PostAction::Decrement,
        PostAction::IncreaseBy(10),
        PostAction::DecreaseBy(3),
        PostAction::SetStatus("loading".into()),
        PostAction::Increment,
        PostAction::SetStatus("ready".into()),
    ] {
        store.dispatch(action).unwrap();
    }

    let state = store.get_state();
    assert_eq!(state.post, 9);
    assert_eq!(state.status, "ready");
    assert_eq!(state.user, initial.user);
    assert_eq!(initial.post, 0);

    let types: Vec<String> = log.entries().into_iter().map(|e| e.action_type).collect();
    assert_eq!(types.len(), 9);
    assert_eq!(types[0], INIT_ACTION_TYPE);
    assert_eq!(types[4], "post/increaseBy");
    assert_eq!(types[8], "app/setStatus");
}

#[test]
fn recorded_post_history_replays_to_same_state() {
    let recorder = ActionRecorder::new();
    let store = create_store(posts(), None, recorder.clone()).unwrap();
    store.dispatch(PostAction::IncreaseBy(5)).unwrap();
    store.dispatch(PostAction::SetStatus("busy".into())).unwrap();

    let replica = Store::new(posts()).unwrap();
    assert_eq!(recorder.replay_into(&replica).unwrap(), 2);

    assert_eq!(*replica.get_state(), *store.get_state());
    assert_eq!(recorder.export().as_array().map(Vec::len), Some(3));
}

#[test]
fn logger_and_recorder_compose() {
    let logger = ActionLogger::with_default_log();
    let log = logger.log().cloned().unwrap();
    let recorder = ActionRecorder::new();

    let store = create_store(counter, Some(5), compose(logger, recorder.clone())).unwrap();
    store.dispatch(CounterAction::Dec).unwrap();

    assert_eq!(*store.get_state(), 4);
    assert_eq!(log.len(), 1);
    assert_eq!(recorder.len(), 2);
}
