// Handler for the CreateDocument RPC
use std::sync::Arc;

use chrono::Local;
use shared::models::DocType;
use shared::number_format::NumberFormatSpec;
use tonic::{Response, Status};
use uuid::Uuid;

use crate::config::settings::EngineSettings;
use crate::documents::{DocumentDrafter, DocumentService};
use crate::error::EngineError;
use crate::reports::OrderCandidate;
use crate::services::{CreateDocumentRequest, CreateDocumentResponse, SelectedLine};

fn to_candidate(line: SelectedLine, spec: &NumberFormatSpec) -> OrderCandidate {
    // Typed text wins over the numeric quantity
    let qty = if line.quantity_text.trim().is_empty() {
        Some(line.quantity)
    } else {
        match spec.parse(&line.quantity_text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    item_code = %line.item_code,
                    text = %line.quantity_text,
                    error = %e,
                    "Quantity text not usable; line will be skipped"
                );
                None
            }
        }
    };
    OrderCandidate {
        item_code: line.item_code,
        warehouse: line.warehouse,
        supplier: None,
        qty,
    }
}

pub async fn handle_create_document(
    req_payload: CreateDocumentRequest,
    drafter: Arc<DocumentDrafter<Arc<dyn DocumentService>>>,
    settings: Arc<EngineSettings>,
) -> Result<Response<CreateDocumentResponse>, Status> {
    let request_id = Uuid::new_v4().to_string();
    let doctype = DocType::from_label(&req_payload.doctype)
        .ok_or_else(|| EngineError::UnknownDocType(req_payload.doctype.clone()))?;

    let spec = settings.number_format_spec();
    let candidates: Vec<OrderCandidate> = req_payload
        .lines
        .into_iter()
        .map(|line| to_candidate(line, &spec))
        .collect();

    let outcome = drafter
        .make_document(doctype, &candidates, Local::now().date_naive())
        .await
        .map_err(|e| {
            tracing::warn!(%request_id, %doctype, error = %e, "Document not drafted");
            e
        })?;

    tracing::debug!(
        %request_id,
        name = %outcome.document.name,
        route = %outcome.route,
        "Document drafted"
    );
    Ok(Response::new(CreateDocumentResponse {
        request_id,
        document_name: outcome.document.name,
        route: outcome.route,
        lines_added: outcome.document.items.len() as i32,
        lines_skipped: outcome.skipped as i32,
    }))
}
