use std::collections::HashMap;
use std::sync::RwLock;

use stockcast_core::{DomainError, DomainResult, OutflowId, ProductId, position_of};
use stockcast_forecast::{InventoryReader, StoreError};
use stockcast_inventory::{Inflow, Outflow, Product};

use crate::snapshot::InventorySnapshot;

#[derive(Debug, Default)]
struct InventoryState {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
    outflows: Vec<Outflow>,
    inflows: Vec<Inflow>,
}

impl InventoryState {
    fn product_mut(&mut self, id: ProductId) -> DomainResult<&mut Product> {
        let idx = *self
            .index
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
        Ok(&mut self.products[idx])
    }
}

/// In-memory products + stock movements for tests/dev and the CLI.
///
/// Products are listed in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    inner: RwLock<InventoryState>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot as-is: products, then historical movements.
    ///
    /// Movements are stored without replaying them against stock; the
    /// snapshot's product quantities are taken to be current.
    pub fn from_snapshot(snapshot: InventorySnapshot) -> DomainResult<Self> {
        let store = Self::new();
        {
            let mut state = store.write()?;
            for product in snapshot.products {
                insert_product(&mut state, product)?;
            }
            for outflow in &snapshot.outflows {
                if !state.index.contains_key(&outflow.product_id) {
                    return Err(DomainError::not_found(format!(
                        "product {} referenced by outflow {}",
                        outflow.product_id, outflow.id
                    )));
                }
            }
            for inflow in &snapshot.inflows {
                if !state.index.contains_key(&inflow.product_id) {
                    return Err(DomainError::not_found(format!(
                        "product {} referenced by inflow {}",
                        inflow.product_id, inflow.id
                    )));
                }
            }
            state.outflows = snapshot.outflows;
            state.inflows = snapshot.inflows;
        }
        Ok(store)
    }

    pub fn snapshot(&self) -> DomainResult<InventorySnapshot> {
        let state = self.read()?;
        Ok(InventorySnapshot {
            products: state.products.clone(),
            outflows: state.outflows.clone(),
            inflows: state.inflows.clone(),
        })
    }

    pub fn add_product(&self, product: Product) -> DomainResult<()> {
        let mut state = self.write()?;
        insert_product(&mut state, product)
    }

    /// Record a withdrawal and decrement the product's stock.
    pub fn record_outflow(&self, outflow: Outflow) -> DomainResult<()> {
        let mut state = self.write()?;
        state.product_mut(outflow.product_id)?.withdraw(outflow.quantity)?;
        state.outflows.push(outflow);
        Ok(())
    }

    /// Delete a withdrawal record. Stock is left untouched.
    pub fn remove_outflow(&self, outflow_id: OutflowId) -> DomainResult<Outflow> {
        let mut state = self.write()?;
        let pos = position_of(&state.outflows, &outflow_id)
            .ok_or_else(|| DomainError::not_found(format!("outflow {outflow_id}")))?;
        Ok(state.outflows.remove(pos))
    }

    /// Record a replenishment: stock goes up, cost basis rolls forward.
    pub fn record_inflow(&self, inflow: Inflow) -> DomainResult<()> {
        let mut state = self.write()?;
        state
            .product_mut(inflow.product_id)?
            .receive(inflow.quantity, inflow.cost_price)?;
        state.inflows.push(inflow);
        Ok(())
    }

    pub fn inflows(&self) -> DomainResult<Vec<Inflow>> {
        Ok(self.read()?.inflows.clone())
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, InventoryState>> {
        self.inner
            .read()
            .map_err(|_| DomainError::invariant("inventory lock poisoned"))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, InventoryState>> {
        self.inner
            .write()
            .map_err(|_| DomainError::invariant("inventory lock poisoned"))
    }
}

fn insert_product(state: &mut InventoryState, product: Product) -> DomainResult<()> {
    if state.index.contains_key(&product.id) {
        return Err(DomainError::conflict(format!("product {} already exists", product.id)));
    }
    state.index.insert(product.id, state.products.len());
    state.products.push(product);
    Ok(())
}

impl InventoryReader for InMemoryInventory {
    fn products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.products.clone())
    }

    fn outflows(&self) -> Result<Vec<Outflow>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.outflows.clone())
    }

    fn product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.index.get(&product_id).map(|&i| state.products[i].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn outflow_decrements_stock_and_is_listed() {
        let store = InMemoryInventory::new();
        let p = Product::new(ProductId::new(), "a", 10);
        store.add_product(p.clone()).unwrap();

        store.record_outflow(Outflow::new(p.id, 3, Utc::now())).unwrap();

        assert_eq!(store.product(p.id).unwrap().unwrap().quantity, 7);
        assert_eq!(store.outflows_for(p.id).unwrap().len(), 1);
    }

    #[test]
    fn oversized_outflow_is_rejected_and_not_recorded() {
        let store = InMemoryInventory::new();
        let p = Product::new(ProductId::new(), "a", 1);
        store.add_product(p.clone()).unwrap();

        assert!(store.record_outflow(Outflow::new(p.id, 3, Utc::now())).is_err());
        assert!(store.outflows().unwrap().is_empty());
    }

    #[test]
    fn inflow_updates_cost_basis() {
        let store = InMemoryInventory::new();
        let p = Product::new(ProductId::new(), "a", 1).with_prices(100, 150);
        store.add_product(p.clone()).unwrap();

        store.record_inflow(Inflow::new(p.id, 4, 120, Utc::now())).unwrap();

        let p = store.product(p.id).unwrap().unwrap();
        assert_eq!(p.quantity, 5);
        assert_eq!(p.cost_price, Some(120));
        assert_eq!(p.last_cost_price, Some(100));
        assert_eq!(store.inflows().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_product_is_a_conflict() {
        let store = InMemoryInventory::new();
        let p = Product::new(ProductId::new(), "a", 1);
        store.add_product(p.clone()).unwrap();
        assert!(matches!(store.add_product(p), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn snapshot_with_unknown_product_is_rejected() {
        let snapshot = InventorySnapshot {
            products: vec![],
            outflows: vec![Outflow::new(ProductId::new(), 1, Utc::now())],
            inflows: vec![],
        };
        assert!(matches!(
            InMemoryInventory::from_snapshot(snapshot),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn snapshot_with_stray_inflow_is_rejected() {
        let known = Product::new(ProductId::new(), "known", 3);
        let snapshot = InventorySnapshot {
            products: vec![known.clone()],
            outflows: vec![Outflow::new(known.id, 1, Utc::now())],
            inflows: vec![Inflow::new(ProductId::new(), 4, 250, Utc::now())],
        };
        assert!(matches!(
            InMemoryInventory::from_snapshot(snapshot),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn remove_outflow_keeps_stock() {
        let store = InMemoryInventory::new();
        let p = Product::new(ProductId::new(), "a", 5);
        store.add_product(p.clone()).unwrap();
        let o = Outflow::new(p.id, 2, Utc::now());
        store.record_outflow(o.clone()).unwrap();

        let removed = store.remove_outflow(o.id).unwrap();

        assert_eq!(removed, o);
        assert!(store.outflows().unwrap().is_empty());
        assert_eq!(store.product(p.id).unwrap().unwrap().quantity, 3);
    }
}
