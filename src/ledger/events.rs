//! Ledger events
//!
//! The engine only produces events. Recording and delivery belong to
//! whatever [`EventSink`] the host passes in.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::{Address, Amount};

/// A structured event emitted on a successful state change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Tokens moved between accounts. `from` is [`Address::NULL`] for issuance.
    Transfer {
        from: Address,
        to: Address,
        value: Amount,
    },
    /// An allowance was set
    Approval {
        owner: Address,
        spender: Address,
        value: Amount,
    },
}

impl LedgerEvent {
    /// Whether this event records newly issued supply
    pub fn is_mint(&self) -> bool {
        matches!(self, LedgerEvent::Transfer { from, .. } if from.is_null())
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::Transfer { from, to, value } => {
                write!(f, "Transfer {{ from: {}, to: {}, value: {} }}", from, to, value)
            }
            LedgerEvent::Approval {
                owner,
                spender,
                value,
            } => write!(
                f,
                "Approval {{ owner: {}, spender: {}, value: {} }}",
                owner, spender, value
            ),
        }
    }
}

/// Receiver for events produced during a call
pub trait EventSink {
    fn emit(&mut self, event: LedgerEvent);
}

impl EventSink for Vec<LedgerEvent> {
    fn emit(&mut self, event: LedgerEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_detection() {
        let to = Address::new([1; 20]);
        let mint = LedgerEvent::Transfer {
            from: Address::NULL,
            to,
            value: 10,
        };
        let transfer = LedgerEvent::Transfer {
            from: to,
            to: Address::new([2; 20]),
            value: 10,
        };

        assert!(mint.is_mint());
        assert!(!transfer.is_mint());
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<LedgerEvent> = Vec::new();
        let owner = Address::new([1; 20]);
        let spender = Address::new([2; 20]);

        sink.emit(LedgerEvent::Approval {
            owner,
            spender,
            value: 5,
        });
        sink.emit(LedgerEvent::Approval {
            owner,
            spender,
            value: 7,
        });

        assert_eq!(sink.len(), 2);
        assert!(matches!(sink[1], LedgerEvent::Approval { value: 7, .. }));
    }

    #[test]
    fn test_event_json_keeps_wide_amounts() {
        let event = LedgerEvent::Transfer {
            from: Address::NULL,
            to: Address::new([3; 20]),
            value: u128::MAX,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with("{\"Transfer\""));

        let decoded: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }
}
