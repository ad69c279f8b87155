// Handler for the ParseNumber RPC
use std::sync::Arc;

use shared::number_format::infer_format;
use tonic::{Response, Status};

use crate::config::settings::EngineSettings;
use crate::services::{ParseNumberRequest, ParseNumberResponse};

pub async fn handle_parse_number(
    req_payload: ParseNumberRequest,
    settings: Arc<EngineSettings>,
) -> Result<Response<ParseNumberResponse>, Status> {
    let spec = if req_payload.number_format.is_empty() {
        settings.number_format_spec()
    } else {
        infer_format(&req_payload.number_format)
    };

    // A bad number is an answer, not a failed call
    let response = match spec.parse(&req_payload.text) {
        Ok(value) => ParseNumberResponse {
            success: true,
            value,
            message: String::new(),
        },
        Err(e) => {
            tracing::debug!(text = %req_payload.text, error = %e, "Number did not parse");
            ParseNumberResponse {
                success: false,
                value: 0.0,
                message: e.to_string(),
            }
        }
    };
    Ok(Response::new(response))
}
