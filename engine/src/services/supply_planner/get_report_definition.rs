// Handler for the GetReportDefinition RPC
use shared::report::ReportDefinition;
use tonic::{Response, Status};

use super::helpers::to_proto_definition;
use crate::error::EngineError;
use crate::services::{ReportDefinitionRequest, ReportDefinitionResponse};

pub async fn handle_get_report_definition(
    req_payload: ReportDefinitionRequest,
) -> Result<Response<ReportDefinitionResponse>, Status> {
    let definition = ReportDefinition::by_name(&req_payload.report_name)
        .ok_or_else(|| EngineError::ReportNotFound(req_payload.report_name.clone()))?;
    tracing::debug!(
        report = %definition.name,
        columns = definition.columns.len(),
        "Resolved report definition"
    );
    Ok(Response::new(to_proto_definition(&definition)))
}
