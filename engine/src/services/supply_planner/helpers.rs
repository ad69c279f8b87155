// Conversions between domain types and their protobuf messages
use shared::models::ReportRow;
use shared::report::{ColumnDef, FieldType, FilterDef, ReportDefinition};

use crate::error::EngineError;
use crate::reports::DuplicateSupplierWarning;
use crate::services::{
    ColumnDefinition, FilterDefinition, ProtoDuplicateSupplierWarning, ProtoReportRow,
    ReportDefinitionResponse,
};

pub fn field_type_name(fieldtype: FieldType) -> &'static str {
    match fieldtype {
        FieldType::Link => "Link",
        FieldType::Float => "Float",
        FieldType::Data => "Data",
    }
}

pub fn to_proto_row(row: &ReportRow) -> ProtoReportRow {
    ProtoReportRow {
        image: row.image.clone().unwrap_or_default(),
        item_code: row.item_code.clone(),
        warehouse: row.warehouse.clone(),
        supplier: row.supplier.clone().unwrap_or_default(),
        actual_qty: row.actual_qty,
        indented_qty: row.indented_qty,
        reserved_qty: row.reserved_qty,
        ordered_qty: row.ordered_qty,
        projected_qty: row.projected_qty,
    }
}

pub fn to_proto_warning(warning: &DuplicateSupplierWarning) -> ProtoDuplicateSupplierWarning {
    ProtoDuplicateSupplierWarning {
        item_code: warning.item_code.clone(),
        warehouse: warning.warehouse.clone(),
        suppliers: warning.suppliers.clone(),
    }
}

fn to_proto_filter(filter: &FilterDef) -> FilterDefinition {
    FilterDefinition {
        fieldname: filter.fieldname.clone(),
        label: filter.label.clone(),
        fieldtype: field_type_name(filter.fieldtype).to_string(),
        options: filter.options.clone().unwrap_or_default(),
    }
}

fn to_proto_column(column: &ColumnDef) -> ColumnDefinition {
    ColumnDefinition {
        label: column.label.clone(),
        fieldname: column.fieldname.clone(),
        fieldtype: field_type_name(column.fieldtype).to_string(),
        options: column.options.clone().unwrap_or_default(),
        width: column.width,
        editable: column.editable,
    }
}

pub fn to_proto_definition(definition: &ReportDefinition) -> ReportDefinitionResponse {
    ReportDefinitionResponse {
        name: definition.name.clone(),
        filters: definition.filters.iter().map(to_proto_filter).collect(),
        columns: definition.columns.iter().map(to_proto_column).collect(),
        checkbox_column: definition.checkbox_column,
        highlight_negative: definition.highlight_negative.clone().unwrap_or_default(),
        create_actions: definition
            .create_actions
            .iter()
            .map(|doctype| doctype.label().to_string())
            .collect(),
    }
}

/// Missing files surface as I/O errors; everything else a loader reports is
/// a problem with the file's contents.
pub fn loader_error(err: anyhow::Error) -> EngineError {
    if let Some(io) = err.root_cause().downcast_ref::<std::io::Error>() {
        return EngineError::IoError {
            source: std::io::Error::new(io.kind(), format!("{:#}", err)),
        };
    }
    EngineError::CsvDataFormatError(format!("{:#}", err))
}
