//! Events emitted by successful calls.

use serde::{Deserialize, Serialize};

use hydro_protocol::discount::PackedDiscountConfig;
use hydro_protocol::{Address, Amount, Asset};

use crate::ledger::BalancePath;

/// A state change committed by a [`Hydro`](crate::hydro::Hydro) call.
///
/// Failed calls emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum HydroEvent {
    Deposit {
        asset: Asset,
        user: Address,
        amount: Amount,
    },
    Withdraw {
        asset: Asset,
        user: Address,
        amount: Amount,
    },
    Transfer {
        asset: Asset,
        from: BalancePath,
        to: BalancePath,
        amount: Amount,
    },
    DiscountConfigChanged {
        config: PackedDiscountConfig,
    },
    OwnershipTransferred {
        previous: Address,
        owner: Address,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let event = HydroEvent::Deposit {
            asset: Asset::NATIVE,
            user: Address::derive("alice"),
            amount: 7,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Deposit");
        assert_eq!(json["amount"], 7);

        let back: HydroEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
