//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Order fulfillment lifecycle.
///
/// The happy path runs `pending → confirmed → processing → shipped →
/// delivered`. `cancelled` is reachable from any non-terminal state by an
/// administrator; the owning customer may only cancel while the order is
/// still `pending`. `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The allowed-transition table.
    ///
    /// Forward moves step one state along the chain; cancellation is allowed
    /// from any non-terminal state. Everything else is rejected, including
    /// self-transitions.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Confirmed)
            | (Self::Confirmed, Self::Processing)
            | (Self::Processing, Self::Shipped)
            | (Self::Shipped, Self::Delivered) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Whether the owning customer may cancel from this state.
    #[must_use]
    pub const fn customer_can_cancel(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment state, tracked independently of fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Confirmed.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Delivered));
    }

    #[test]
    fn test_no_backwards_transitions() {
        assert!(!Shipped.can_transition_to(Processing));
        assert!(!Delivered.can_transition_to(Pending));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for next in [Pending, Confirmed, Processing, Shipped, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_customer_cancel_only_while_pending() {
        assert!(Pending.customer_can_cancel());
        assert!(!Confirmed.customer_can_cancel());
        assert!(!Shipped.customer_can_cancel());
        assert!(!Delivered.customer_can_cancel());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [Pending, Confirmed, Processing, Shipped, Delivered, Cancelled] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
