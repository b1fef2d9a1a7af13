//! Status enums for orders and cart mutations.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Whether an order has been paid for and finalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Completed,
}

impl OrderStatus {
    /// Map the server's `completed` flag (nullable) to a status.
    #[must_use]
    pub fn from_completed(completed: Option<bool>) -> Self {
        if completed.unwrap_or(false) {
            Self::Completed
        } else {
            Self::Processing
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "Processing"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// A single-unit cart delta understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartAction {
    /// Add one unit.
    Add,
    /// Remove one unit; the server deletes the line at zero.
    Remove,
}

impl fmt::Display for CartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_action_wire_names() {
        assert_eq!(serde_json::to_string(&CartAction::Add).unwrap(), "\"add\"");
        assert_eq!(
            serde_json::to_string(&CartAction::Remove).unwrap(),
            "\"remove\""
        );
        assert_eq!(CartAction::Remove.to_string(), "remove");
    }

    #[test]
    fn test_order_status_from_completed() {
        assert_eq!(OrderStatus::from_completed(Some(true)), OrderStatus::Completed);
        assert_eq!(OrderStatus::from_completed(Some(false)), OrderStatus::Processing);
        assert_eq!(OrderStatus::from_completed(None), OrderStatus::Processing);
    }
}
