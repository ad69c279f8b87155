use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stock position of one item in one warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBin {
    pub item_code: String,
    pub warehouse: String,
    pub actual_qty: f64,
    // "indented" is the host's name for quantity already requested
    pub indented_qty: f64,
    pub reserved_qty: f64,
    pub ordered_qty: f64,
    // Negative means a shortage
    pub projected_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_code: String,
    pub item_name: String,
    pub image: Option<String>,
    pub stock_uom: String,
    pub purchase_uom: Option<String>,
    pub conversion_factor: f64,
}

/// One line of a shortage report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub image: Option<String>,
    pub item_code: String,
    pub warehouse: String,
    pub supplier: Option<String>,
    pub actual_qty: f64,
    pub indented_qty: f64,
    pub reserved_qty: f64,
    pub ordered_qty: f64,
    pub projected_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Float(f64),
    Empty,
}

impl ReportRow {
    pub fn from_bin(bin: &StockBin) -> Self {
        ReportRow {
            image: None,
            item_code: bin.item_code.clone(),
            warehouse: bin.warehouse.clone(),
            supplier: None,
            actual_qty: bin.actual_qty,
            indented_qty: bin.indented_qty,
            reserved_qty: bin.reserved_qty,
            ordered_qty: bin.ordered_qty,
            projected_qty: bin.projected_qty,
        }
    }

    /// Looks a cell up by the column fieldname used in report definitions.
    pub fn value(&self, fieldname: &str) -> Option<CellValue> {
        let text = |v: &Option<String>| match v {
            Some(s) => CellValue::Text(s.clone()),
            None => CellValue::Empty,
        };
        let value = match fieldname {
            "image" => text(&self.image),
            "item_code" => CellValue::Text(self.item_code.clone()),
            "warehouse" => CellValue::Text(self.warehouse.clone()),
            "supplier" => text(&self.supplier),
            _ => CellValue::Float(self.float(fieldname)?),
        };
        Some(value)
    }

    pub fn float(&self, fieldname: &str) -> Option<f64> {
        match fieldname {
            "actual_qty" => Some(self.actual_qty),
            "indented_qty" => Some(self.indented_qty),
            "reserved_qty" => Some(self.reserved_qty),
            "ordered_qty" => Some(self.ordered_qty),
            "projected_qty" => Some(self.projected_qty),
            _ => None,
        }
    }

    /// Returns false when `fieldname` is not a quantity column.
    pub fn set_float(&mut self, fieldname: &str, value: f64) -> bool {
        let slot = match fieldname {
            "actual_qty" => &mut self.actual_qty,
            "indented_qty" => &mut self.indented_qty,
            "reserved_qty" => &mut self.reserved_qty,
            "ordered_qty" => &mut self.ordered_qty,
            "projected_qty" => &mut self.projected_qty,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    MaterialRequest,
    PurchaseOrder,
}

impl DocType {
    pub fn label(self) -> &'static str {
        match self {
            DocType::MaterialRequest => "Material Request",
            DocType::PurchaseOrder => "Purchase Order",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            DocType::MaterialRequest => "material-request",
            DocType::PurchaseOrder => "purchase-order",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Material Request" => Some(DocType::MaterialRequest),
            "Purchase Order" => Some(DocType::PurchaseOrder),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialRequestType {
    Purchase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub item_code: String,
    pub item_name: Option<String>,
    pub warehouse: String,
    pub qty: f64,
    pub schedule_date: NaiveDate,
    pub uom: Option<String>,
    pub stock_uom: Option<String>,
    pub conversion_factor: Option<f64>,
}

impl DocumentLine {
    pub fn apply_details(&mut self, details: &ItemDetails) {
        self.item_name = Some(details.item_name.clone());
        self.uom = Some(details.uom.clone());
        self.stock_uom = Some(details.stock_uom.clone());
        self.conversion_factor = Some(details.conversion_factor);
    }
}

/// An unsaved document, as handed out by a document service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftDocument {
    pub name: String,
    pub doctype: DocType,
    pub company: Option<String>,
    pub material_request_type: Option<MaterialRequestType>,
    pub schedule_date: Option<NaiveDate>,
    pub items: Vec<DocumentLine>,
}

impl DraftDocument {
    pub fn new(name: impl Into<String>, doctype: DocType) -> Self {
        DraftDocument {
            name: name.into(),
            doctype,
            company: None,
            material_request_type: None,
            schedule_date: None,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub item_name: String,
    pub uom: String,
    pub stock_uom: String,
    pub conversion_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetailsRequest {
    pub item_code: String,
    pub warehouse: String,
    pub doctype: DocType,
    pub company: Option<String>,
    pub qty: f64,
}
