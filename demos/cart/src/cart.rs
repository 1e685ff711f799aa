//! Shopping cart state, actions and reducer

use std::sync::Arc;

use serde::Serialize;
use state_dispatch::Action;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub cart_items: Vec<CartItem>,
}

impl CartState {
    pub fn product_ids(&self) -> Vec<u32> {
        self.cart_items.iter().map(|item| item.product_id).collect()
    }

    pub fn total_quantity(&self) -> u32 {
        self.cart_items.iter().map(|item| item.quantity).sum()
    }
}

#[derive(Action, Clone, Debug, PartialEq)]
#[action(prefix = "cart", rename_all = "camelCase")]
pub enum CartAction {
    AddItem { product_id: u32, quantity: u32 },
    RemoveItem { product_id: u32 },
    Clear,
}

/// Items keep insertion order; removing drops every line with that id.
pub fn reducer(state: &Arc<CartState>, action: &CartAction) -> Arc<CartState> {
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
        CartAction::RemoveItem { product_id } => {
            if !state.cart_items.iter().any(|i| i.product_id == *product_id) {
                return Arc::clone(state);
            }
            Arc::new(CartState {
                cart_items: state
                    .cart_items
                    .iter()
                    .filter(|i| i.product_id != *product_id)
                    .cloned()
                    .collect(),
            })
        }
        CartAction::Clear if state.cart_items.is_empty() => Arc::clone(state),
        CartAction::Clear => Arc::new(CartState::default()),
    }
}
