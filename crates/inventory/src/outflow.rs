use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockcast_core::{Entity, OutflowId, ProductId};

/// A recorded withdrawal of a product from stock (sale or usage).
///
/// Immutable historical fact once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outflow {
    pub id: OutflowId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Whether the withdrawal was driven by a promotion.
    #[serde(default)]
    pub promotion: bool,
    pub created_at: DateTime<Utc>,
}

impl Outflow {
    pub fn new(product_id: ProductId, quantity: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: OutflowId::new(),
            product_id,
            quantity,
            promotion: false,
            created_at,
        }
    }

    pub fn promotional(mut self) -> Self {
        self.promotion = true;
        self
    }

    /// Calendar day (UTC) the outflow happened on.
    pub fn date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

impl Entity for Outflow {
    type Id = OutflowId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
