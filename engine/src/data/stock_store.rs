// In-memory stock data: bins, the item master and item suppliers
use shared::models::{Item, StockBin};
use std::collections::HashMap;

pub struct StockStore {
    // Load order is kept; reports sort stably on top of it.
    bins: Vec<StockBin>,
    // (item_code, warehouse) -> position in `bins`
    bin_index: HashMap<(String, String), usize>,
    items: HashMap<String, Item>,
    suppliers: HashMap<String, Vec<String>>,
}

impl StockStore {
    pub fn new() -> Self {
        StockStore {
            bins: Vec::new(),
            bin_index: HashMap::new(),
            items: HashMap::new(),
            suppliers: HashMap::new(),
        }
    }

    /// A bin for an item/warehouse pair already held is replaced in place.
    pub fn add_bins(&mut self, new_bins: Vec<StockBin>) {
        self.bins.reserve(new_bins.len());
        for bin in new_bins {
            let key = (bin.item_code.clone(), bin.warehouse.clone());
            match self.bin_index.get(&key) {
                Some(&pos) => self.bins[pos] = bin,
                None => {
                    self.bin_index.insert(key, self.bins.len());
                    self.bins.push(bin);
                }
            }
        }
    }

    pub fn add_items(&mut self, new_items: Vec<Item>) {
        for item in new_items {
            self.items.insert(item.item_code.clone(), item);
        }
    }

    pub fn add_item_suppliers(&mut self, pairs: Vec<(String, String)>) {
        for (item_code, supplier) in pairs {
            let suppliers = self.suppliers.entry(item_code).or_default();
            if !suppliers.contains(&supplier) {
                suppliers.push(supplier);
            }
        }
    }

    pub fn bins(&self) -> &[StockBin] {
        &self.bins
    }

    pub fn item(&self, item_code: &str) -> Option<&Item> {
        self.items.get(item_code)
    }

    pub fn suppliers_for(&self, item_code: &str) -> &[String] {
        self.suppliers.get(item_code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// (bins, items, item/supplier pairs)
    pub fn counts(&self) -> (usize, usize, usize) {
        let pairs = self.suppliers.values().map(Vec::len).sum();
        (self.bins.len(), self.items.len(), pairs)
    }
}

impl Default for StockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(item_code: &str, warehouse: &str, projected_qty: f64) -> StockBin {
        StockBin {
            item_code: item_code.to_string(),
            warehouse: warehouse.to_string(),
            actual_qty: 0.0,
            indented_qty: 0.0,
            reserved_qty: 0.0,
            ordered_qty: 0.0,
            projected_qty,
        }
    }

    #[test]
    fn test_add_bins_replaces_same_location() {
        let mut store = StockStore::new();
        store.add_bins(vec![bin("BOLT-10", "Main", -5.0), bin("BOLT-10", "Annex", -1.0)]);
        store.add_bins(vec![bin("BOLT-10", "Main", -8.0)]);

        assert_eq!(store.bins().len(), 2);
        assert_eq!(store.bins()[0].projected_qty, -8.0);
        assert_eq!(store.bins()[1].warehouse, "Annex");
    }

    #[test]
    fn test_add_bins_many_locations() {
        // 5 000 items in each of 4 warehouses
        let export = |qty: fn(usize) -> f64| -> Vec<StockBin> {
            (0..20_000)
                .map(|i| bin(&format!("ITEM-{}", i % 5_000), &format!("WH-{}", i / 5_000), qty(i)))
                .collect()
        };

        let mut store = StockStore::new();
        store.add_bins(export(|_| -1.0));
        assert_eq!(store.bins().len(), 20_000);

        // Reloading the same export replaces every bin in place
        store.add_bins(export(|i| -(i as f64)));
        assert_eq!(store.bins().len(), 20_000);
        assert_eq!(store.bins()[7_321].item_code, "ITEM-2321");
        assert_eq!(store.bins()[7_321].warehouse, "WH-1");
        assert_eq!(store.bins()[7_321].projected_qty, -7_321.0);
    }

    #[test]
    fn test_suppliers_deduplicated_in_order() {
        let mut store = StockStore::new();
        store.add_item_suppliers(vec![
            ("BOLT-10".to_string(), "Bolt Bros".to_string()),
            ("BOLT-10".to_string(), "Acme Fasteners".to_string()),
            ("BOLT-10".to_string(), "Bolt Bros".to_string()),
        ]);
        assert_eq!(store.suppliers_for("BOLT-10"), ["Bolt Bros", "Acme Fasteners"]);
        assert!(store.suppliers_for("NUT-M4").is_empty());
        assert_eq!(store.counts(), (0, 0, 2));
    }
}
