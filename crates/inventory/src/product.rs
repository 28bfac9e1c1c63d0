use serde::{Deserialize, Serialize};

use stockcast_core::{DomainError, DomainResult, Entity, ProductId};

/// A stocked product.
///
/// Prices are kept in the smallest currency unit (e.g. cents) and are optional:
/// a product can exist before anyone has priced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Units currently in stock.
    pub quantity: i64,
    #[serde(default)]
    pub cost_price: Option<u64>,
    #[serde(default)]
    pub selling_price: Option<u64>,
    /// Cost price before the most recent inflow.
    #[serde(default)]
    pub last_cost_price: Option<u64>,
}

impl Product {
    pub fn new(id: ProductId, title: impl Into<String>, quantity: i64) -> Self {
        Self {
            id,
            title: title.into(),
            quantity,
            cost_price: None,
            selling_price: None,
            last_cost_price: None,
        }
    }

    pub fn with_prices(mut self, cost_price: u64, selling_price: u64) -> Self {
        self.cost_price = Some(cost_price);
        self.selling_price = Some(selling_price);
        self
    }

    /// Withdraw `quantity` units from stock.
    ///
    /// Rejects withdrawals larger than what is on hand.
    pub fn withdraw(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("outflow quantity must be positive"));
        }
        if quantity > self.quantity {
            return Err(DomainError::invariant(format!(
                "only {} unit(s) of {} in stock, cannot withdraw {quantity}",
                self.quantity, self.title
            )));
        }
        self.quantity -= quantity;
        Ok(())
    }

    /// Receive `quantity` units bought at `unit_cost`.
    ///
    /// The previous cost price is kept as `last_cost_price`.
    pub fn receive(&mut self, quantity: i64, unit_cost: u64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("inflow quantity must be positive"));
        }
        self.last_cost_price = self.cost_price;
        self.cost_price = Some(unit_cost);
        self.quantity += quantity;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn widget(quantity: i64) -> Product {
        Product::new(ProductId::new(), "widget", quantity).with_prices(500, 800)
    }

    #[test]
    fn withdraw_decrements_stock() {
        let mut p = widget(10);
        p.withdraw(4).unwrap();
        assert_eq!(p.quantity, 6);
    }

    #[test]
    fn withdraw_more_than_stock_is_rejected() {
        let mut p = widget(3);
        let err = p.withdraw(5).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(p.quantity, 3);
    }

    #[test]
    fn zero_withdrawal_is_a_validation_error() {
        let mut p = widget(3);
        assert!(matches!(p.withdraw(0), Err(DomainError::Validation(_))));
    }

    #[test]
    fn receive_rolls_cost_basis() {
        let mut p = widget(2);
        p.receive(5, 650).unwrap();
        assert_eq!(p.quantity, 7);
        assert_eq!(p.cost_price, Some(650));
        assert_eq!(p.last_cost_price, Some(500));
    }

    #[test]
    fn receive_on_unpriced_product_leaves_no_last_cost() {
        let mut p = Product::new(ProductId::new(), "bolt", 0);
        p.receive(1, 10).unwrap();
        assert_eq!(p.last_cost_price, None);
        assert_eq!(p.cost_price, Some(10));
    }

    proptest! {
        /// Property: stock never goes negative through accepted withdrawals.
        #[test]
        fn accepted_withdrawals_keep_stock_non_negative(
            start in 0i64..1_000,
            takes in proptest::collection::vec(1i64..200, 0..30),
        ) {
            let mut p = widget(start);
            for take in takes {
                let _ = p.withdraw(take);
                prop_assert!(p.quantity >= 0);
            }
        }
    }
}
