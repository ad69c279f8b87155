// Report definitions: filters, columns and presentation flags for the
// shortage views. Both views share one schema; what differs between them is
// data, not code.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CellValue, DocType, ReportRow};
use crate::number_format::NumberFormatSpec;

pub const ITEMS_NEEDED: &str = "Items Needed";
pub const SUPPLY_NEEDS: &str = "Supply Needs";

// Fractional digits shown for Float cells
pub const FLOAT_PRECISION: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Link,
    Float,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDef {
    pub fieldname: String,
    pub label: String,
    pub fieldtype: FieldType,
    pub options: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub label: String,
    pub fieldname: String,
    pub fieldtype: FieldType,
    pub options: Option<String>,
    pub width: u32,
    pub editable: bool,
}

impl ColumnDef {
    fn link(label: &str, fieldname: &str, doctype: &str, width: u32) -> Self {
        ColumnDef {
            label: label.to_string(),
            fieldname: fieldname.to_string(),
            fieldtype: FieldType::Link,
            options: Some(doctype.to_string()),
            width,
            editable: false,
        }
    }

    fn float(label: &str, fieldname: &str, width: u32) -> Self {
        ColumnDef {
            label: label.to_string(),
            fieldname: fieldname.to_string(),
            fieldtype: FieldType::Float,
            options: None,
            width,
            editable: false,
        }
    }

    fn editable(mut self) -> Self {
        self.editable = true;
        self
    }
}

fn link_filter(fieldname: &str, label: &str, doctype: &str) -> FilterDef {
    FilterDef {
        fieldname: fieldname.to_string(),
        label: label.to_string(),
        fieldtype: FieldType::Link,
        options: Some(doctype.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub name: String,
    pub filters: Vec<FilterDef>,
    pub columns: Vec<ColumnDef>,
    // Rows can be ticked for the "Create" actions
    pub checkbox_column: bool,
    // Fieldname shown emphasised when its value is negative
    pub highlight_negative: Option<String>,
    // Rows carry supplier and image from the item master
    pub supplier_join: bool,
    pub create_actions: Vec<DocType>,
}

impl ReportDefinition {
    /// Shortages per item and warehouse, straight from stock bins.
    pub fn items_needed() -> Self {
        ReportDefinition {
            name: ITEMS_NEEDED.to_string(),
            filters: vec![
                link_filter("item_code", "Item", "Item"),
                link_filter("warehouse", "Warehouse", "Warehouse"),
            ],
            columns: vec![
                ColumnDef::link("Item", "item_code", "Item", 120),
                ColumnDef::link("Warehouse", "warehouse", "Warehouse", 120),
                ColumnDef::float("Actual", "actual_qty", 90),
                ColumnDef::float("Requested", "indented_qty", 90),
                ColumnDef::float("Reserved", "reserved_qty", 90),
                ColumnDef::float("Ordered", "ordered_qty", 90),
                ColumnDef::float("Projected", "projected_qty", 90),
            ],
            checkbox_column: true,
            highlight_negative: Some("projected_qty".to_string()),
            supplier_join: false,
            create_actions: vec![DocType::MaterialRequest, DocType::PurchaseOrder],
        }
    }

    /// Shortages with their suppliers; the order quantity can be edited.
    pub fn supply_needs() -> Self {
        ReportDefinition {
            name: SUPPLY_NEEDS.to_string(),
            filters: vec![
                link_filter("item_code", "Item", "Item"),
                link_filter("warehouse", "Warehouse", "Warehouse"),
                link_filter("supplier", "Supplier", "Supplier"),
            ],
            columns: vec![
                ColumnDef {
                    label: "Image".to_string(),
                    fieldname: "image".to_string(),
                    fieldtype: FieldType::Data,
                    options: None,
                    width: 100,
                    editable: false,
                },
                ColumnDef::link("Item", "item_code", "Item", 120),
                ColumnDef::link("Warehouse", "warehouse", "Warehouse", 120),
                ColumnDef::link("Supplier", "supplier", "Supplier", 120),
                ColumnDef::float("Available Qty", "actual_qty", 150),
                ColumnDef::float("Suggested Qty To Order", "projected_qty", 220).editable(),
                ColumnDef::float("Required Qty", "reserved_qty", 150),
                ColumnDef::float("Requested Qty", "indented_qty", 150),
                ColumnDef::float("Receivable Qty", "ordered_qty", 150),
            ],
            checkbox_column: true,
            highlight_negative: Some("projected_qty".to_string()),
            supplier_join: true,
            create_actions: vec![DocType::MaterialRequest, DocType::PurchaseOrder],
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            ITEMS_NEEDED => Some(Self::items_needed()),
            SUPPLY_NEEDS => Some(Self::supply_needs()),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::items_needed(), Self::supply_needs()]
    }

    pub fn column(&self, fieldname: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.fieldname == fieldname)
    }

    pub fn column_index(&self, fieldname: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.fieldname == fieldname)
    }

    pub fn editable_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.editable)
    }

    pub fn has_filter(&self, fieldname: &str) -> bool {
        self.filters.iter().any(|f| f.fieldname == fieldname)
    }

    /// Display text and emphasis for one cell, `None` for unknown columns.
    pub fn format_cell(
        &self,
        row: &ReportRow,
        fieldname: &str,
        spec: &NumberFormatSpec,
    ) -> Option<CellDisplay> {
        let column = self.column(fieldname)?;
        let value = row.value(fieldname)?;
        let text = match (&value, column.fieldtype) {
            (CellValue::Float(v), FieldType::Float) => spec.format(*v, FLOAT_PRECISION),
            (CellValue::Float(v), _) => v.to_string(),
            (CellValue::Text(s), _) => s.clone(),
            (CellValue::Empty, _) => String::new(),
        };
        let negative = matches!(value, CellValue::Float(v) if v < 0.0);
        let emphasis = if negative && self.highlight_negative.as_deref() == Some(fieldname) {
            Emphasis::Negative
        } else {
            Emphasis::None
        };
        Some(CellDisplay { text, emphasis })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Emphasis {
    None,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDisplay {
    pub text: String,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("report '{report}' has no '{fieldname}' filter")]
    UnknownFilter { report: String, fieldname: String },
}

/// Filter values as entered by a user; blank values mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilters {
    pub item_code: Option<String>,
    pub warehouse: Option<String>,
    pub supplier: Option<String>,
}

impl ReportFilters {
    /// Builds filters from raw inputs, treating empty strings as unset.
    pub fn from_inputs(item_code: &str, warehouse: &str, supplier: &str) -> Self {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        ReportFilters {
            item_code: non_empty(item_code),
            warehouse: non_empty(warehouse),
            supplier: non_empty(supplier),
        }
    }

    pub fn validate_against(&self, definition: &ReportDefinition) -> Result<(), FilterError> {
        let set = [
            ("item_code", self.item_code.is_some()),
            ("warehouse", self.warehouse.is_some()),
            ("supplier", self.supplier.is_some()),
        ];
        for (fieldname, is_set) in set {
            if is_set && !definition.has_filter(fieldname) {
                return Err(FilterError::UnknownFilter {
                    report: definition.name.clone(),
                    fieldname: fieldname.to_string(),
                });
            }
        }
        Ok(())
    }
}
