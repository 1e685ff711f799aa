//! Cart and post walkthroughs for state-dispatch
//!
//! Two small domains built on the same store:
//! - [`cart`]: add and remove line items by product id
//! - [`posts`]: a counter with a status flag and an untouched user record

pub mod cart;
pub mod posts;
