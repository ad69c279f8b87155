use chrono::{Days, Local, NaiveDate};
use shared::models::{DocType, DocumentLine, DraftDocument, ItemDetailsRequest, MaterialRequestType};

use super::DocumentService;
use crate::error::EngineError;
use crate::reports::OrderCandidate;

/// Result of drafting a document from checked report rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOutcome {
    pub document: DraftDocument,
    pub route: String,
    // Candidates dropped for a missing item code or quantity
    pub skipped: usize,
}

pub struct DocumentDrafter<S: DocumentService> {
    service: S,
    lead_days: u32,
}

impl<S: DocumentService> DocumentDrafter<S> {
    pub fn new(service: S, lead_days: u32) -> Self {
        DocumentDrafter { service, lead_days }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn make_material_request(
        &self,
        candidates: &[OrderCandidate],
    ) -> Result<DraftOutcome, EngineError> {
        let today = Local::now().date_naive();
        self.make_document(DocType::MaterialRequest, candidates, today).await
    }

    pub async fn make_purchase_order(
        &self,
        candidates: &[OrderCandidate],
    ) -> Result<DraftOutcome, EngineError> {
        let today = Local::now().date_naive();
        self.make_document(DocType::PurchaseOrder, candidates, today).await
    }

    /// Drafts `doctype` with one line per usable candidate and opens its form.
    ///
    /// Shortages are negative, so every line orders the absolute quantity.
    pub async fn make_document(
        &self,
        doctype: DocType,
        candidates: &[OrderCandidate],
        today: NaiveDate,
    ) -> Result<DraftOutcome, EngineError> {
        if candidates.is_empty() {
            return Err(EngineError::NoRowsSelected { doctype });
        }

        let (valid, skipped): (Vec<_>, Vec<_>) =
            candidates.iter().partition(|c| is_orderable(c));
        if valid.is_empty() {
            tracing::warn!(
                %doctype,
                skipped = skipped.len(),
                "No orderable rows among the selection"
            );
            return Err(EngineError::NoValidItems { doctype });
        }

        let schedule_date = today
            .checked_add_days(Days::new(u64::from(self.lead_days)))
            .ok_or_else(|| {
                EngineError::DocumentError(format!("Schedule date out of range for {}", today))
            })?;

        let mut draft = self.service.create_draft(doctype).await?;
        if doctype == DocType::MaterialRequest {
            draft.material_request_type = Some(MaterialRequestType::Purchase);
            draft.schedule_date = Some(schedule_date);
        }

        for candidate in valid {
            // is_orderable guarantees a quantity
            let qty = candidate.qty.unwrap_or_default().abs();
            let mut line = DocumentLine {
                item_code: candidate.item_code.clone(),
                item_name: None,
                warehouse: candidate.warehouse.clone(),
                qty,
                schedule_date,
                uom: None,
                stock_uom: None,
                conversion_factor: None,
            };

            let request = ItemDetailsRequest {
                item_code: candidate.item_code.clone(),
                warehouse: candidate.warehouse.clone(),
                doctype,
                company: draft.company.clone(),
                qty,
            };
            match self.service.fetch_item_details(request).await {
                Ok(details) => line.apply_details(&details),
                Err(e) => tracing::warn!(
                    item_code = %candidate.item_code,
                    error = %e,
                    "Item details lookup failed; keeping line without them"
                ),
            }
            self.service.add_child_row(&mut draft, line);
        }

        let route = self.service.navigate_to_form(&draft).await?;
        tracing::info!(
            %doctype,
            name = %draft.name,
            lines = draft.items.len(),
            skipped = skipped.len(),
            "Drafted document"
        );
        Ok(DraftOutcome {
            document: draft,
            route,
            skipped: skipped.len(),
        })
    }
}

fn is_orderable(candidate: &OrderCandidate) -> bool {
    !candidate.item_code.trim().is_empty()
        && candidate.qty.map_or(false, |qty| qty.is_finite() && qty != 0.0)
}
