use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_catalog::InventoryItemId;
use stockbook_core::{AggregateId, DomainError, DomainResult, Entity, UserId};

/// Ledger entry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub AggregateId);

impl TransactionId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Signed effect of a ledger entry on stock.
///
/// Histories may carry tags this build does not recognize; those entries are
/// tolerated and contribute zero to the balance rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
    #[serde(other)]
    Unknown,
}

impl TransactionKind {
    /// Balance contribution multiplier: +1, -1, or 0.
    pub fn sign(self) -> i64 {
        match self {
            TransactionKind::In => 1,
            TransactionKind::Out => -1,
            TransactionKind::Unknown => 0,
        }
    }
}

/// One append-only ledger entry for an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: TransactionId,
    pub item_id: InventoryItemId,
    pub quantity: i64,
    pub kind: TransactionKind,
    pub note: Option<String>,
    pub user_id: Option<UserId>,
    pub recorded_at: DateTime<Utc>,
}

impl InventoryTransaction {
    pub fn new(
        id: TransactionId,
        item_id: InventoryItemId,
        quantity: i64,
        kind: TransactionKind,
        note: Option<String>,
        user_id: Option<UserId>,
        recorded_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation(
                "transaction quantity must be positive",
            ));
        }
        Ok(Self {
            id,
            item_id,
            quantity,
            kind,
            note,
            user_id,
            recorded_at,
        })
    }

    /// Signed contribution of this entry to the running balance.
    pub fn signed_quantity(&self) -> i64 {
        self.kind.sign() * self.quantity
    }
}

impl Entity for InventoryTransaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Net stock derived by folding a history left-to-right.
///
/// `In` adds, `Out` subtracts, unrecognized kinds are no-ops. An empty
/// history yields 0. Pure function of the entries passed in.
pub fn running_balance<'a, I>(transactions: I) -> i64
where
    I: IntoIterator<Item = &'a InventoryTransaction>,
{
    transactions
        .into_iter()
        .fold(0, |balance, tx| balance + tx.signed_quantity())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_item_id() -> InventoryItemId {
        InventoryItemId::new(AggregateId::new())
    }

    fn entry(item_id: InventoryItemId, quantity: i64, kind: TransactionKind) -> InventoryTransaction {
        InventoryTransaction::new(
            TransactionId::new(AggregateId::new()),
            item_id,
            quantity,
            kind,
            None,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn balance_of_empty_history_is_zero() {
        assert_eq!(running_balance([]), 0);
    }

    #[test]
    fn balance_folds_in_and_out() {
        let item = test_item_id();
        let history = vec![
            entry(item, 10, TransactionKind::In),
            entry(item, 3, TransactionKind::Out),
            entry(item, 5, TransactionKind::In),
        ];
        assert_eq!(running_balance(&history), 12);
    }

    #[test]
    fn unknown_kind_contributes_zero() {
        let item = test_item_id();
        let history = vec![
            entry(item, 10, TransactionKind::In),
            entry(item, 999, TransactionKind::Unknown),
            entry(item, 4, TransactionKind::Out),
        ];
        assert_eq!(running_balance(&history), 6);
    }

    #[test]
    fn unrecognized_wire_tag_deserializes_to_unknown() {
        let kind: TransactionKind = serde_json::from_str("\"AUDIT\"").unwrap();
        assert_eq!(kind, TransactionKind::Unknown);
        let kind: TransactionKind = serde_json::from_str("\"IN\"").unwrap();
        assert_eq!(kind, TransactionKind::In);
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let err = InventoryTransaction::new(
            TransactionId::new(AggregateId::new()),
            test_item_id(),
            0,
            TransactionKind::In,
            None,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    fn arb_kind() -> impl Strategy<Value = TransactionKind> {
        prop_oneof![
            Just(TransactionKind::In),
            Just(TransactionKind::Out),
            Just(TransactionKind::Unknown),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the fold equals sum(IN) - sum(OUT) over the history,
        /// with every other kind contributing zero.
        #[test]
        fn fold_matches_signed_sums(
            entries in prop::collection::vec((1i64..1_000, arb_kind()), 0..32)
        ) {
            let item = test_item_id();
            let history: Vec<_> = entries
                .iter()
                .map(|(q, k)| entry(item, *q, *k))
                .collect();

            let ins: i64 = entries
                .iter()
                .filter(|(_, k)| *k == TransactionKind::In)
                .map(|(q, _)| q)
                .sum();
            let outs: i64 = entries
                .iter()
                .filter(|(_, k)| *k == TransactionKind::Out)
                .map(|(q, _)| q)
                .sum();

            prop_assert_eq!(running_balance(&history), ins - outs);
        }
    }
}
