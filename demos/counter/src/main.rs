//! Counter - Minimal state-dispatch example
//!
//! This example demonstrates the core pattern:
//! - State: What the app knows
//! - Actions: What can happen
//! - Reducer: How state changes
//! - Store: Where state lives
//! - Main loop: Input -> Action -> Dispatch -> Listeners
//!
//! Input comes from a scripted producer task that feeds an action channel,
//! standing in for a keyboard or network source.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p counter -- inc inc dec
//! RUST_LOG=state_dispatch=debug cargo run -p counter -- --log inc reset
//! ```

use std::cell::RefCell;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use state_dispatch::debug::ActionLogger;
use state_dispatch::prelude::*;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Counter - state-dispatch example
#[derive(Parser, Debug)]
#[command(name = "counter")]
#[command(about = "Drive a counter store from a scripted action channel")]
struct Args {
    /// Steps to dispatch, in order
    #[arg(value_enum, default_values_t = [Step::Inc, Step::Inc, Step::Dec])]
    steps: Vec<Step>,

    /// Delay between steps in milliseconds
    #[arg(long, short, default_value = "50")]
    interval_ms: u64,

    /// Log every dispatched action through tracing
    #[arg(long)]
    log: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Step {
    Inc,
    Dec,
    Reset,
}

// ============================================================================
// State - What the app knows
// ============================================================================

#[derive(Debug, Default)]
struct AppState {
    count: i64,
}

// ============================================================================
// Actions - What can happen
// ============================================================================

#[derive(Action, Clone, Debug)]
#[action(prefix = "counter", rename_all = "camelCase")]
enum AppAction {
    Increment,
    Decrement,
    Reset,
    #[action(rename = "app/quit")]
    Quit,
}

impl From<Step> for AppAction {
    fn from(step: Step) -> Self {
        match step {
            Step::Inc => AppAction::Increment,
            Step::Dec => AppAction::Decrement,
            Step::Reset => AppAction::Reset,
        }
    }
}

// ============================================================================
// Reducer - How state changes (returns the same Arc when nothing changed)
// ============================================================================

fn reducer(state: &Arc<AppState>, action: &AppAction) -> Arc<AppState> {
    match action {
        AppAction::Increment => Arc::new(AppState {
            count: state.count + 1,
        }),
        AppAction::Decrement => Arc::new(AppState {
            count: state.count - 1,
        }),
        AppAction::Reset if state.count != 0 => Arc::new(AppState::default()),
        AppAction::Reset | AppAction::Quit => Arc::clone(state),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("counter=info".parse()?))
        .init();

    let args = Args::parse();

    // Action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppAction>();

    // Store = state + reducer (+ optional logging)
    let logger = ActionLogger::from_env().active(args.log);
    let store = Store::builder(reducer).enhancer(logger).build()?;

    // "Render" whenever a dispatch commits
    let reader = store.downgrade();
    let last = RefCell::new(store.get_state());
    let _render = store.subscribe(move || {
        let Some(state) = reader.get_state() else {
            return;
        };
        if Arc::ptr_eq(&state, &last.borrow()) {
            tracing::debug!("state unchanged, skipping render");
            return;
        }
        println!("count: {}", state.count);
        *last.borrow_mut() = state;
    });

    // Input producer
    let interval = Duration::from_millis(args.interval_ms);
    let steps = args.steps.clone();
    tokio::spawn(async move {
        for step in steps {
            tokio::time::sleep(interval).await;
            if action_tx.send(step.into()).is_err() {
                return;
            }
        }
        let _ = action_tx.send(AppAction::Quit);
    });

    while let Some(action) = action_rx.recv().await {
        if matches!(action, AppAction::Quit) {
            break;
        }
        store.dispatch(action)?;
    }

    tracing::info!(count = store.get_state().count, "done");
    Ok(())
}
