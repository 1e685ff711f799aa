//! Cart - state-dispatch walkthroughs
//!
//! Runs the cart or post scenario against a store and prints every
//! committed state. Enhancers are picked from the command line:
//! - `--log`: trace each action with `ActionLogger`
//! - `--record`: keep a history with `ActionRecorder` and print it as JSON
//!
//! # Usage
//!
//! ```sh
//! cargo run -p cart-example -- cart --add 1,12,6,9 --remove 6,9
//! cargo run -p cart-example -- --record posts --start 0
//! ```

use std::error::Error;
use std::fmt::Debug;

use clap::{Parser, Subcommand};
use serde::Serialize;
use state_dispatch::debug::{ActionLogger, ActionRecorder};
use state_dispatch::{compose, create_store, optional, Action, Reducer, Store, StoreError};
use tracing_subscriber::EnvFilter;

use cart_example::cart::{self, CartAction};
use cart_example::posts::{self, PostAction};

/// Cart - state-dispatch example
#[derive(Parser, Debug)]
#[command(name = "cart")]
#[command(about = "Run store walkthroughs with optional logging and recording")]
struct Args {
    /// Trace every dispatched action
    #[arg(long, global = true)]
    log: bool,

    /// Record the action history and print it as JSON at the end
    #[arg(long, global = true)]
    record: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add and remove cart items by product id
    Cart {
        /// Product ids to add, in order
        #[arg(long, value_delimiter = ',', default_value = "1,12,6,9")]
        add: Vec<u32>,

        /// Product ids to remove afterwards
        #[arg(long, value_delimiter = ',', default_value = "6,9")]
        remove: Vec<u32>,

        /// Quantity for every added item
        #[arg(long, short, default_value = "1")]
        quantity: u32,
    },
    /// Run the post counter walkthrough
    Posts {
        /// Initial post count
        #[arg(long, short, default_value = "0")]
        start: i64,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cart=info".parse()?))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Cart {
            add,
            remove,
            quantity,
        } => {
            let actions = add
                .into_iter()
                .map(|product_id| CartAction::AddItem {
                    product_id,
                    quantity,
                })
                .chain(
                    remove
                        .into_iter()
                        .map(|product_id| CartAction::RemoveItem { product_id }),
                );
            let state = run(cart::reducer, actions, args.log, args.record)?;
            println!("cart: {:?}", state.product_ids());
        }
        Command::Posts { start } => {
            let state = run(
                posts::reducer(start),
                posts::walkthrough(),
                args.log,
                args.record,
            )?;
            println!("post: {}, status: {}", state.post, state.status);
        }
    }

    Ok(())
}

fn run<S, A, R>(
    reducer: R,
    actions: impl IntoIterator<Item = A>,
    log: bool,
    record: bool,
) -> Result<std::sync::Arc<S>, StoreError>
where
    S: Serialize + Debug + 'static,
    A: Action,
    R: Reducer<S, A> + 'static,
{
    let recorder = ActionRecorder::<A>::new();
    let enhancer = compose(
        optional(log.then(ActionLogger::log_all)),
        optional(record.then(|| recorder.clone())),
    );
    let store: Store<S, A> = create_store(reducer, None, enhancer)?;

    let reader = store.downgrade();
    let _print = store.subscribe(move || {
        if let Some(state) = reader.get_state() {
            println!("{state:?}");
        }
    });

    for action in actions {
        let action = store.dispatch(action)?;
        tracing::info!(action = action.action_type(), "dispatched");
    }

    if record {
        match serde_json::to_string_pretty(&recorder.export()) {
            Ok(json) => println!("{json}"),
            Err(error) => tracing::warn!(%error, "failed to serialize history"),
        }
    }

    Ok(store.get_state())
}
