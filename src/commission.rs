use rust_decimal::Decimal;
use serde::Serialize;

use crate::directory::RelationshipOracle;

/// Fee tier of a transfer, picked from the sender/receiver relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionTier {
    /// Both accounts belong to the same owner.
    SelfTransfer,
    Friend,
    Stranger,
}

impl CommissionTier {
    pub fn rate(self) -> Decimal {
        match self {
            CommissionTier::SelfTransfer => Decimal::ZERO,
            // 0.03
            CommissionTier::Friend => Decimal::new(3, 2),
            // 0.10
            CommissionTier::Stranger => Decimal::new(10, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commission {
    pub tier: CommissionTier,
    pub amount: Decimal,
}

/// Computes transfer commissions. Pure, the oracle is only queried.
pub struct CommissionCalculator<'a, O: ?Sized> {
    oracle: &'a O,
}

impl<'a, O> CommissionCalculator<'a, O>
where
    O: RelationshipOracle + ?Sized,
{
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    pub fn tier(&self, sender_owner: &str, receiver_owner: &str) -> CommissionTier {
        if sender_owner == receiver_owner {
            CommissionTier::SelfTransfer
        } else if self.oracle.are_friends(sender_owner, receiver_owner) {
            CommissionTier::Friend
        } else {
            CommissionTier::Stranger
        }
    }

    /// Exact `amount * rate`; `None` only when the product overflows [`Decimal`].
    pub fn calculate(
        &self,
        sender_owner: &str,
        receiver_owner: &str,
        amount: Decimal,
    ) -> Option<Commission> {
        let tier = self.tier(sender_owner, receiver_owner);
        amount
            .checked_mul(tier.rate())
            .map(|amount| Commission { tier, amount })
    }
}
