use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockcast_core::{Entity, InflowId, ProductId};

/// A recorded stock replenishment. Updates the product's cost basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inflow {
    pub id: InflowId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Unit cost in the smallest currency unit.
    pub cost_price: u64,
    pub created_at: DateTime<Utc>,
}

impl Inflow {
    pub fn new(
        product_id: ProductId,
        quantity: i64,
        cost_price: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InflowId::new(),
            product_id,
            quantity,
            cost_price,
            created_at,
        }
    }
}

impl Entity for Inflow {
    type Id = InflowId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
