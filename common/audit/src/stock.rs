use std::collections::HashMap;

use uuid::Uuid;

use crate::DomainEvent;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Debounces low-stock notifications per `(product, store)`.
///
/// Stock is low when `quantity <= threshold`. An event is produced only when
/// a level moves from not-low to low; staying low is silent, and rising above
/// the threshold re-arms the item. Items never observed before count as
/// not-low.
#[derive(Debug, Default)]
pub struct LowStockMonitor {
    low: HashMap<(Uuid, Uuid), bool>,
}

impl LowStockMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(
        &mut self,
        product_id: Uuid,
        store_id: Uuid,
        quantity: i32,
        threshold: i32,
    ) -> Option<DomainEvent> {
        let is_low = quantity <= threshold;
        let was_low = self.low.insert((product_id, store_id), is_low).unwrap_or(false);

        (is_low && !was_low).then_some(DomainEvent::LowStock {
            product_id,
            store_id,
            quantity,
            threshold,
        })
    }

    pub fn is_low(&self, product_id: Uuid, store_id: Uuid) -> bool {
        self.low.get(&(product_id, store_id)).copied().unwrap_or(false)
    }

    pub fn forget(&mut self, product_id: Uuid, store_id: Uuid) {
        self.low.remove(&(product_id, store_id));
    }
}
