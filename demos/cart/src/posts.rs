//! Post counter with a status flag

use std::sync::Arc;

use serde::Serialize;
use state_dispatch::{Action, FnReducer, Reducer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostState {
    pub post: i64,
    pub user: User,
    pub status: String,
}

impl Default for PostState {
    fn default() -> Self {
        Self {
            post: 0,
            user: User {
                name: "Anurag Singh".into(),
                age: 26,
            },
            status: "idle".into(),
        }
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(prefix = "post", rename_all = "camelCase")]
pub enum PostAction {
    Increment,
    Decrement,
    IncreaseBy(i64),
    DecreaseBy(i64),
    #[action(rename = "app/setStatus")]
    SetStatus(String),
}

/// The walkthrough sequence; ends with `post == 9` and status `"ready"`.
pub fn walkthrough() -> Vec<PostAction> {
    vec![
        PostAction::Increment,
        PostAction::Increment,
        PostAction::Decrement,
        PostAction::IncreaseBy(10),
        PostAction::DecreaseBy(3),
        PostAction::SetStatus("loading".into()),
        PostAction::Increment,
        PostAction::SetStatus("ready".into()),
    ]
}

fn reduce(state: &Arc<PostState>, action: &PostAction) -> Arc<PostState> {
    let post = match action {
        PostAction::Increment => state.post + 1,
        PostAction::Decrement => state.post - 1,
        PostAction::IncreaseBy(by) => state.post + by,
        PostAction::DecreaseBy(by) => state.post - by,
        PostAction::SetStatus(status) if *status == state.status => return Arc::clone(state),
        PostAction::SetStatus(status) => {
            return Arc::new(PostState {
                status: status.clone(),
                ..(**state).clone()
            })
        }
    };
    Arc::new(PostState {
        post,
        ..(**state).clone()
    })
}

/// Reducer starting from `start` instead of zero
pub fn reducer(start: i64) -> impl Reducer<PostState, PostAction> {
    FnReducer::new(
        move || {
            Ok(Arc::new(PostState {
                post: start,
                ..PostState::default()
            }))
        },
        |state: &Arc<PostState>, action: &PostAction| Ok(reduce(state, action)),
    )
}
