// Handler for the RunReport RPC
use std::sync::Arc;

use shared::report::{ReportDefinition, ReportFilters};
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use super::helpers::{to_proto_row, to_proto_warning};
use crate::config::settings::EngineSettings;
use crate::data::stock_store::StockStore;
use crate::error::EngineError;
use crate::reports;
use crate::services::{ProtoReportRow, ReportChunk, RunReportRequest};

pub async fn handle_run_report(
    req_payload: RunReportRequest,
    stock_store: Arc<RwLock<StockStore>>,
    settings: Arc<EngineSettings>,
) -> Result<Response<ReceiverStream<Result<ReportChunk, Status>>>, Status> {
    let definition = ReportDefinition::by_name(&req_payload.report_name)
        .ok_or_else(|| EngineError::ReportNotFound(req_payload.report_name.clone()))?;
    let filters = ReportFilters::from_inputs(
        &req_payload.item_code,
        &req_payload.warehouse,
        &req_payload.supplier,
    );

    let store = stock_store.read().await;
    let output = reports::run_report(&definition, &store, &filters)?;
    drop(store);

    let rows: Vec<ProtoReportRow> = output.rows.iter().map(to_proto_row).collect();
    let mut warnings: Vec<_> = output.warnings.iter().map(to_proto_warning).collect();
    let chunk_size = settings.report_chunk_size;

    let (tx, rx) = mpsc::channel(4);
    let report_name = definition.name;

    tokio::spawn(async move {
        tracing::debug!(
            report = %report_name,
            rows = rows.len(),
            chunk_size,
            "Streaming report rows"
        );
        if rows.is_empty() {
            // Clients always get one chunk, even for an empty report
            let chunk = ReportChunk {
                rows: Vec::new(),
                warnings,
            };
            if let Err(e) = tx.send(Ok(chunk)).await {
                tracing::error!(
                    error = ?e,
                    report = %report_name,
                    "Failed to send empty report chunk to stream"
                );
            }
            return;
        }

        for rows in rows.chunks(chunk_size) {
            let chunk = ReportChunk {
                rows: rows.to_vec(),
                warnings: std::mem::take(&mut warnings),
            };
            if let Err(e) = tx.send(Ok(chunk)).await {
                tracing::error!(
                    error = ?e,
                    report = %report_name,
                    "Failed to send report chunk to stream; client gone"
                );
                return;
            }
        }
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}
