//! Action trait and the dynamically shaped `AnyAction`

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Namespace reserved for actions the store dispatches itself
pub const RESERVED_PREFIX: &str = "@@state-dispatch/";

/// Type of the action the store runs through the reducer at construction
pub const INIT_ACTION_TYPE: &str = "@@state-dispatch/INIT";

/// Trait for actions that can be dispatched to the store
///
/// Actions describe an intent to change state. They should be:
/// - Clone: Actions may be logged, recorded, or replayed
/// - Debug: For logging and summaries
///
/// `action_type()` is the discriminator the store validates before running
/// the reducer. Use `#[derive(Action)]` from `state-dispatch-macros` to
/// generate it from variant names.
pub trait Action: Clone + Debug + 'static {
    /// The action's discriminator (conventionally `domain/eventName`)
    fn action_type(&self) -> &str;

    /// Get a human-readable summary for logs
    ///
    /// Default implementation uses Debug formatting.
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

/// Check the minimum shape the store requires from an action.
///
/// The discriminator must be non-blank and must stay out of the reserved
/// `@@state-dispatch/` namespace.
pub fn validate<A: Action>(action: &A) -> Result<(), StoreError> {
    let action_type = action.action_type();
    if action_type.trim().is_empty() {
        return Err(StoreError::MalformedAction(format!(
            "action has no type: {}",
            action.summary()
        )));
    }
    if action_type.starts_with(RESERVED_PREFIX) {
        return Err(StoreError::MalformedAction(format!(
            "action type `{}` is reserved for the store",
            action_type
        )));
    }
    Ok(())
}

/// An action whose shape is only known at runtime.
///
/// Serialises as `{"type": ..., "payload": ...}`, with `payload` omitted when
/// it is null.
///
/// # Example
/// ```
/// use state_dispatch_core::{Action, AnyAction};
/// use serde_json::json;
///
/// let action = AnyAction::try_from(json!({ "type": "post/increaseBy", "payload": 10 })).unwrap();
/// assert_eq!(action.action_type(), "post/increaseBy");
/// assert_eq!(action.payload, json!(10));
///
/// assert!(AnyAction::try_from(json!({ "payload": 10 })).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyAction {
    /// Discriminator
    #[serde(rename = "type")]
    pub action_type: String,
    /// Optional payload
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl AnyAction {
    /// Create an action without payload
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Create an action carrying a payload
    pub fn with_payload(action_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
        }
    }

    /// Deserialize the payload into a concrete type
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            StoreError::MalformedAction(format!(
                "payload of `{}` does not match: {}",
                self.action_type, e
            ))
        })
    }

    /// Parse an action from JSON text
    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| StoreError::MalformedAction(format!("invalid action JSON: {}", e)))?;
        Self::try_from(value)
    }
}

impl Action for AnyAction {
    fn action_type(&self) -> &str {
        &self.action_type
    }

    fn summary(&self) -> String {
        if self.payload.is_null() {
            self.action_type.clone()
        } else {
            format!("{} {}", self.action_type, self.payload)
        }
    }
}

impl TryFrom<serde_json::Value> for AnyAction {
    type Error = StoreError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(mut fields) = value else {
            return Err(StoreError::MalformedAction(format!(
                "action must be an object, got {}",
                value
            )));
        };
        let action_type = match fields.remove("type") {
            Some(serde_json::Value::String(t)) => t,
            Some(other) => {
                return Err(StoreError::MalformedAction(format!(
                    "action `type` must be a string, got {}",
                    other
                )))
            }
            None => {
                return Err(StoreError::MalformedAction(
                    "action has no `type` field".to_string(),
                ))
            }
        };
        let payload = fields.remove("payload").unwrap_or(serde_json::Value::Null);
        Ok(Self {
            action_type,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Debug)]
    enum TestAction {
        Named(&'static str),
    }

    impl Action for TestAction {
        fn action_type(&self) -> &str {
            match self {
                TestAction::Named(t) => t,
            }
        }
    }

    #[test]
    fn test_validate_accepts_regular_types() {
        assert!(validate(&TestAction::Named("cart/addItem")).is_ok());
        assert!(validate(&TestAction::Named("inc")).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_type() {
        let err = validate(&TestAction::Named("  ")).unwrap_err();
        assert!(matches!(err, StoreError::MalformedAction(_)));
    }

    #[test]
    fn test_validate_rejects_reserved_namespace() {
        let err = validate(&TestAction::Named(INIT_ACTION_TYPE)).unwrap_err();
        assert!(matches!(err, StoreError::MalformedAction(msg) if msg.contains("reserved")));
    }

    #[test]
    fn test_any_action_from_value() {
        let action =
            AnyAction::try_from(json!({ "type": "cart/addItem", "payload": { "productId": 1 } }))
                .unwrap();
        assert_eq!(action.action_type(), "cart/addItem");
        assert_eq!(action.payload["productId"], 1);
    }

    #[test]
    fn test_any_action_without_payload() {
        let action = AnyAction::from_json(r#"{"type":"inc"}"#).unwrap();
        assert_eq!(action, AnyAction::new("inc"));
        assert_eq!(action.summary(), "inc");
        assert_eq!(serde_json::to_value(&action).unwrap(), json!({ "type": "inc" }));
    }

    #[test]
    fn test_any_action_missing_type() {
        let err = AnyAction::try_from(json!({ "payload": 3 })).unwrap_err();
        assert!(matches!(err, StoreError::MalformedAction(_)));

        let err = AnyAction::try_from(json!({ "type": 3 })).unwrap_err();
        assert!(matches!(err, StoreError::MalformedAction(_)));

        let err = AnyAction::try_from(json!("inc")).unwrap_err();
        assert!(matches!(err, StoreError::MalformedAction(_)));
    }

    #[test]
    fn test_any_action_payload_as() {
        let action = AnyAction::with_payload("post/increaseBy", json!(10));
        assert_eq!(action.payload_as::<i64>().unwrap(), 10);
        assert!(action.payload_as::<String>().is_err());
    }
}
