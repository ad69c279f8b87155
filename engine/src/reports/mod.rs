// Report execution over the stock store
pub mod session;

use std::collections::HashMap;

use serde::Serialize;
use shared::models::ReportRow;
use shared::report::{ColumnDef, ReportDefinition, ReportFilters};

use crate::data::stock_store::StockStore;
use crate::error::EngineError;

pub use session::{OrderCandidate, ReportSession};

pub const UNKNOWN_WAREHOUSE: &str = "Unknown Warehouse";
pub const UNKNOWN_SUPPLIER: &str = "Unknown Supplier";

/// An item stocked in one warehouse that more than one supplier can fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSupplierWarning {
    pub item_code: String,
    pub warehouse: String,
    pub suppliers: Vec<String>,
}

impl std::fmt::Display for DuplicateSupplierWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (Warehouse: {}) => {}",
            self.item_code,
            self.warehouse,
            self.suppliers.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutput {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<ReportRow>,
    pub warnings: Vec<DuplicateSupplierWarning>,
}

/// Lists bins with a negative projection, most short first.
///
/// Bins whose item is missing from the item master are left out. With a
/// supplier join every (bin, supplier) pair becomes a row, and a bin without
/// suppliers still shows once with no supplier.
pub fn run_report(
    definition: &ReportDefinition,
    store: &StockStore,
    filters: &ReportFilters,
) -> Result<ReportOutput, EngineError> {
    filters.validate_against(definition)?;

    let mut rows = Vec::new();
    for bin in store.bins() {
        if bin.projected_qty >= 0.0 {
            continue;
        }
        let Some(item) = store.item(&bin.item_code) else {
            tracing::debug!(item_code = %bin.item_code, "Skipping bin without item master record");
            continue;
        };
        if filters.item_code.as_deref().map_or(false, |code| code != bin.item_code) {
            continue;
        }
        if filters.warehouse.as_deref().map_or(false, |wh| wh != bin.warehouse) {
            continue;
        }

        if !definition.supplier_join {
            rows.push(ReportRow::from_bin(bin));
            continue;
        }

        let suppliers = store.suppliers_for(&bin.item_code);
        let candidates: Vec<Option<&String>> = if suppliers.is_empty() {
            vec![None]
        } else {
            suppliers.iter().map(Some).collect()
        };
        for supplier in candidates {
            if let Some(wanted) = filters.supplier.as_deref() {
                if supplier.map(String::as_str) != Some(wanted) {
                    continue;
                }
            }
            let mut row = ReportRow::from_bin(bin);
            row.image = item.image.clone();
            row.supplier = supplier.cloned();
            rows.push(row);
        }
    }

    // sort_by is stable, ties keep load order
    rows.sort_by(|a, b| a.projected_qty.total_cmp(&b.projected_qty));

    let warnings = if definition.supplier_join {
        duplicate_suppliers(&rows)
    } else {
        Vec::new()
    };
    if !warnings.is_empty() {
        tracing::warn!(
            report = %definition.name,
            count = warnings.len(),
            "Items with multiple suppliers in the same warehouse"
        );
    }

    tracing::debug!(report = %definition.name, rows = rows.len(), "Report executed");
    Ok(ReportOutput {
        columns: definition.columns.clone(),
        rows,
        warnings,
    })
}

/// Groups rows by (item, warehouse) and reports every group reached by more
/// than one supplier, in order of first appearance.
pub fn duplicate_suppliers(rows: &[ReportRow]) -> Vec<DuplicateSupplierWarning> {
    let mut groups: Vec<DuplicateSupplierWarning> = Vec::new();
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    for row in rows {
        if row.item_code.is_empty() {
            continue;
        }
        let warehouse = if row.warehouse.is_empty() {
            UNKNOWN_WAREHOUSE
        } else {
            row.warehouse.as_str()
        };
        let supplier = row.supplier.as_deref().unwrap_or(UNKNOWN_SUPPLIER).to_string();

        match positions.get(&(row.item_code.as_str(), warehouse)) {
            Some(&pos) => groups[pos].suppliers.push(supplier),
            None => {
                positions.insert((row.item_code.as_str(), warehouse), groups.len());
                groups.push(DuplicateSupplierWarning {
                    item_code: row.item_code.clone(),
                    warehouse: warehouse.to_string(),
                    suppliers: vec![supplier],
                });
            }
        }
    }
    groups.retain(|g| g.suppliers.len() > 1);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Item, StockBin};

    fn bin(item_code: &str, warehouse: &str, projected_qty: f64) -> StockBin {
        StockBin {
            item_code: item_code.to_string(),
            warehouse: warehouse.to_string(),
            actual_qty: 1.0,
            indented_qty: 2.0,
            reserved_qty: 3.0,
            ordered_qty: 4.0,
            projected_qty,
        }
    }

    fn item(item_code: &str, image: Option<&str>) -> Item {
        Item {
            item_code: item_code.to_string(),
            item_name: format!("{} name", item_code),
            image: image.map(str::to_string),
            stock_uom: "Nos".to_string(),
            purchase_uom: None,
            conversion_factor: 1.0,
        }
    }

    fn unfiltered(definition: ReportDefinition, store: &StockStore) -> ReportOutput {
        run_report(&definition, store, &ReportFilters::default()).unwrap()
    }

    fn sample_store() -> StockStore {
        let mut store = StockStore::new();
        store.add_bins(vec![
            bin("BOLT-10", "Main", -5.0),
            bin("NUT-M4", "Main", -20.0),
            bin("WASHER", "Main", 10.0),
            bin("BOLT-10", "Annex", -5.0),
            bin("GHOST", "Main", -99.0),
        ]);
        store.add_items(vec![
            item("BOLT-10", Some("/files/bolt.png")),
            item("NUT-M4", None),
            item("WASHER", None),
        ]);
        store.add_item_suppliers(vec![
            ("BOLT-10".to_string(), "Acme Fasteners".to_string()),
            ("BOLT-10".to_string(), "Bolt Bros".to_string()),
        ]);
        store
    }

    #[test]
    fn test_items_needed_lists_shortages_most_short_first() {
        let store = sample_store();
        let output = unfiltered(ReportDefinition::items_needed(), &store);

        let keys: Vec<_> = output
            .rows
            .iter()
            .map(|r| (r.item_code.as_str(), r.warehouse.as_str()))
            .collect();
        // GHOST has no item record, WASHER is not short
        assert_eq!(keys, vec![("NUT-M4", "Main"), ("BOLT-10", "Main"), ("BOLT-10", "Annex")]);
        assert!(output.rows.iter().all(|r| r.supplier.is_none() && r.image.is_none()));
        assert!(output.warnings.is_empty());
        assert_eq!(output.columns.len(), 7);
    }

    #[test]
    fn test_items_needed_filters() {
        let store = sample_store();
        let filters = ReportFilters::from_inputs("BOLT-10", "Annex", "");
        let output = run_report(&ReportDefinition::items_needed(), &store, &filters).unwrap();
        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.rows[0].warehouse, "Annex");

        let filters = ReportFilters::from_inputs("", "", "Acme Fasteners");
        let err = run_report(&ReportDefinition::items_needed(), &store, &filters).unwrap_err();
        assert!(matches!(err, EngineError::FilterError { .. }));
    }

    #[test]
    fn test_supply_needs_joins_suppliers() {
        let store = sample_store();
        let output = unfiltered(ReportDefinition::supply_needs(), &store);

        assert_eq!(output.rows.len(), 5);
        assert_eq!(output.rows[0].item_code, "NUT-M4");
        assert_eq!(output.rows[0].supplier, None);

        let main_bolts: Vec<_> = output
            .rows
            .iter()
            .filter(|r| r.item_code == "BOLT-10" && r.warehouse == "Main")
            .collect();
        assert_eq!(main_bolts.len(), 2);
        assert_eq!(main_bolts[0].image.as_deref(), Some("/files/bolt.png"));
        assert_eq!(main_bolts[0].supplier.as_deref(), Some("Acme Fasteners"));
        assert_eq!(main_bolts[1].supplier.as_deref(), Some("Bolt Bros"));
    }

    #[test]
    fn test_supply_needs_warns_about_duplicate_suppliers() {
        let store = sample_store();
        let output = unfiltered(ReportDefinition::supply_needs(), &store);

        assert_eq!(output.warnings.len(), 2);
        assert_eq!(
            output.warnings[0].to_string(),
            "BOLT-10 (Warehouse: Main) => Acme Fasteners, Bolt Bros"
        );
        assert_eq!(output.warnings[1].warehouse, "Annex");
    }

    #[test]
    fn test_supply_needs_supplier_filter() {
        let store = sample_store();
        let filters = ReportFilters::from_inputs("", "", "Bolt Bros");
        let output = run_report(&ReportDefinition::supply_needs(), &store, &filters).unwrap();

        assert_eq!(output.rows.len(), 2);
        assert!(output.rows.iter().all(|r| r.supplier.as_deref() == Some("Bolt Bros")));
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_supply_needs_over_many_bins() {
        let mut store = StockStore::new();
        let bins: Vec<_> = (0..40_000)
            .map(|i| bin(&format!("ITEM-{}", i % 10_000), &format!("WH-{}", i / 10_000), -1.0))
            .collect();
        let items: Vec<_> = (0..10_000).map(|i| item(&format!("ITEM-{}", i), None)).collect();
        store.add_bins(bins);
        store.add_items(items);
        store.add_item_suppliers(vec![
            ("ITEM-42".to_string(), "Acme Fasteners".to_string()),
            ("ITEM-42".to_string(), "Bolt Bros".to_string()),
        ]);

        let output = unfiltered(ReportDefinition::supply_needs(), &store);
        assert_eq!(output.rows.len(), 40_004);
        // One warning per warehouse holding ITEM-42, in order of first appearance
        let warehouses: Vec<_> = output.warnings.iter().map(|w| w.warehouse.as_str()).collect();
        assert_eq!(warehouses, vec!["WH-0", "WH-1", "WH-2", "WH-3"]);
        assert!(output.warnings.iter().all(|w| w.item_code == "ITEM-42"));
    }

    #[test]
    fn test_duplicate_suppliers_fills_unknown_names() {
        let mut with_supplier = ReportRow::from_bin(&bin("BOLT-10", "", -1.0));
        with_supplier.supplier = Some("Acme Fasteners".to_string());
        let without_supplier = ReportRow::from_bin(&bin("BOLT-10", "", -1.0));

        let warnings = duplicate_suppliers(&[with_supplier, without_supplier]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].warehouse, UNKNOWN_WAREHOUSE);
        assert_eq!(warnings[0].suppliers, vec!["Acme Fasteners", UNKNOWN_SUPPLIER]);
    }
}
