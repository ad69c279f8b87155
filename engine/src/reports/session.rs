// Selection and inline edits on a report's rows. Edits are parsed and
// written into the row model when they are committed, so ordering works
// from the model instead of whatever text the table currently shows.
use std::collections::{BTreeSet, HashSet};

use shared::models::ReportRow;
use shared::number_format::NumberFormatSpec;
use shared::report::ReportDefinition;

use crate::error::EngineError;

/// A checked row, reduced to what document drafting needs.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCandidate {
    pub item_code: String,
    pub warehouse: String,
    pub supplier: Option<String>,
    // None when the row's last edit could not be read as a number
    pub qty: Option<f64>,
}

pub struct ReportSession {
    definition: ReportDefinition,
    rows: Vec<ReportRow>,
    spec: NumberFormatSpec,
    checked: BTreeSet<usize>,
    not_orderable: HashSet<usize>,
}

impl ReportSession {
    pub fn new(definition: ReportDefinition, rows: Vec<ReportRow>, spec: NumberFormatSpec) -> Self {
        ReportSession {
            definition,
            rows,
            spec,
            checked: BTreeSet::new(),
            not_orderable: HashSet::new(),
        }
    }

    pub fn definition(&self) -> &ReportDefinition {
        &self.definition
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn check(&mut self, index: usize) -> Result<(), EngineError> {
        self.ensure_row(index)?;
        self.checked.insert(index);
        Ok(())
    }

    pub fn uncheck(&mut self, index: usize) {
        self.checked.remove(&index);
    }

    pub fn check_all(&mut self) {
        self.checked.extend(0..self.rows.len());
    }

    pub fn checked_indices(&self) -> Vec<usize> {
        self.checked.iter().copied().collect()
    }

    /// Applies text typed into an editable cell.
    ///
    /// On success the row holds the parsed value at once. On failure the
    /// row keeps its old value but is no longer orderable until a later
    /// edit parses.
    pub fn commit_edit(
        &mut self,
        index: usize,
        fieldname: &str,
        text: &str,
    ) -> Result<f64, EngineError> {
        self.ensure_row(index)?;
        let editable = self
            .definition
            .column(fieldname)
            .map_or(false, |column| column.editable);
        if !editable {
            return Err(EngineError::NotEditable(fieldname.to_string()));
        }

        match self.spec.parse(text) {
            Ok(value) => {
                self.rows[index].set_float(fieldname, value);
                self.not_orderable.remove(&index);
                tracing::debug!(index, fieldname, value, "Committed cell edit");
                Ok(value)
            }
            Err(e) => {
                self.not_orderable.insert(index);
                tracing::warn!(index, fieldname, text, error = %e, "Rejected cell edit");
                Err(e.into())
            }
        }
    }

    /// Checked rows in table order.
    pub fn order_lines(&self) -> Vec<OrderCandidate> {
        self.checked
            .iter()
            .filter_map(|&index| self.rows.get(index).map(|row| (index, row)))
            .map(|(index, row)| OrderCandidate {
                item_code: row.item_code.clone(),
                warehouse: row.warehouse.clone(),
                supplier: row.supplier.clone(),
                qty: (!self.not_orderable.contains(&index)).then_some(row.projected_qty),
            })
            .collect()
    }

    fn ensure_row(&self, index: usize) -> Result<(), EngineError> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(EngineError::RowOutOfRange { index })
        }
    }
}
