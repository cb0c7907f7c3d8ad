//! Observable log records emitted by the escrow.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Bundle, DefinedOfferId, DisplayedOfferId};

/// One observable state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SwapEvent {
    OfferDisplayed {
        id: DisplayedOfferId,
        maker: AccountId,
        name: String,
        bundle: Bundle,
    },
    OfferDefined {
        displayed_id: DisplayedOfferId,
        defined_id: DefinedOfferId,
        maker: AccountId,
        name: String,
        bundle: Bundle,
    },
    OfferAccepted {
        displayed_id: DisplayedOfferId,
        defined_id: DefinedOfferId,
    },
    DisplayedOfferCancelled {
        id: DisplayedOfferId,
    },
    DefinedOfferCancelled {
        id: DefinedOfferId,
    },
}

impl SwapEvent {
    /// Stable upper-case label, for log lines and filtering.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::OfferDisplayed { .. } => "OFFER_DISPLAYED",
            Self::OfferDefined { .. } => "OFFER_DEFINED",
            Self::OfferAccepted { .. } => "OFFER_ACCEPTED",
            Self::DisplayedOfferCancelled { .. } => "DISPLAYED_OFFER_CANCELLED",
            Self::DefinedOfferCancelled { .. } => "DEFINED_OFFER_CANCELLED",
        }
    }
}

impl std::fmt::Display for SwapEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        let ev = SwapEvent::OfferAccepted {
            displayed_id: DisplayedOfferId(1),
            defined_id: DefinedOfferId(2),
        };
        assert_eq!(ev.to_string(), "OFFER_ACCEPTED");
        assert_eq!(
            SwapEvent::DefinedOfferCancelled { id: DefinedOfferId(0) }.label(),
            "DEFINED_OFFER_CANCELLED"
        );
    }

    #[test]
    fn json_is_internally_tagged() {
        let ev = SwapEvent::DisplayedOfferCancelled {
            id: DisplayedOfferId(5),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"DisplayedOfferCancelled\""), "Got: {json}");
        let back: SwapEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
