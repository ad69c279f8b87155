// engine/src/services/supply_planner/mod.rs
// The SupplyPlanner service: shared state plus one handler module per RPC.
use super::{
    CreateDocumentRequest, CreateDocumentResponse, LoadStockRequest, LoadStockResponse,
    ParseNumberRequest, ParseNumberResponse, ReportChunk, ReportDefinitionRequest,
    ReportDefinitionResponse, RunReportRequest, SupplyPlanner,
};
use crate::config::settings::EngineSettings;
use crate::data::stock_store::StockStore;
use crate::documents::{DocumentDrafter, DocumentService, InMemoryDocumentService};
use crate::error::EngineError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

pub mod create_document;
pub mod get_report_definition;
pub mod helpers;
pub mod load_stock_data;
pub mod parse_number;
pub mod run_report;

pub struct SupplyPlannerService {
    stock_store: Arc<RwLock<StockStore>>,
    settings: Arc<EngineSettings>,
    drafter: Arc<DocumentDrafter<Arc<dyn DocumentService>>>,
}

impl SupplyPlannerService {
    /// Fails when `settings` would not let the engine run, e.g. a zero chunk size.
    pub fn new(
        stock_store: Arc<RwLock<StockStore>>,
        settings: EngineSettings,
        documents: Arc<dyn DocumentService>,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        let drafter = DocumentDrafter::new(documents, settings.schedule_lead_days);
        Ok(SupplyPlannerService {
            stock_store,
            settings: Arc::new(settings),
            drafter: Arc::new(drafter),
        })
    }

    /// Drafts documents in memory, against the same stock store.
    pub fn with_in_memory_documents(
        stock_store: Arc<RwLock<StockStore>>,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let company = settings.default_company.clone();
        let documents = InMemoryDocumentService::new(stock_store.clone(), company);
        Self::new(stock_store, settings, Arc::new(documents))
    }
}

#[tonic::async_trait]
impl SupplyPlanner for SupplyPlannerService {
    async fn load_stock_data(
        &self,
        request: Request<LoadStockRequest>,
    ) -> Result<Response<LoadStockResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            bins_path = %req_payload.bins_path,
            items_path = %req_payload.items_path,
            suppliers_path = %req_payload.suppliers_path,
            "Received LoadStockRequest, dispatching to handler."
        );
        let store = self.stock_store.clone();
        load_stock_data::handle_load_stock_data(req_payload, store, self.settings.clone()).await
    }

    async fn get_report_definition(
        &self,
        request: Request<ReportDefinitionRequest>,
    ) -> Result<Response<ReportDefinitionResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            report = %req_payload.report_name,
            "Received ReportDefinitionRequest, dispatching to handler."
        );
        get_report_definition::handle_get_report_definition(req_payload).await
    }

    type RunReportStream = ReceiverStream<Result<ReportChunk, Status>>;
    async fn run_report(
        &self,
        request: Request<RunReportRequest>,
    ) -> Result<Response<Self::RunReportStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            report = %req_payload.report_name,
            item_code = %req_payload.item_code,
            warehouse = %req_payload.warehouse,
            supplier = %req_payload.supplier,
            "Received RunReportRequest, dispatching to handler."
        );
        let store = self.stock_store.clone();
        run_report::handle_run_report(req_payload, store, self.settings.clone()).await
    }

    async fn parse_number(
        &self,
        request: Request<ParseNumberRequest>,
    ) -> Result<Response<ParseNumberResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            text = %req_payload.text,
            number_format = %req_payload.number_format,
            "Received ParseNumberRequest, dispatching to handler."
        );
        parse_number::handle_parse_number(req_payload, self.settings.clone()).await
    }

    async fn create_document(
        &self,
        request: Request<CreateDocumentRequest>,
    ) -> Result<Response<CreateDocumentResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            doctype = %req_payload.doctype,
            lines = req_payload.lines.len(),
            "Received CreateDocumentRequest, dispatching to handler."
        );
        let drafter = self.drafter.clone();
        create_document::handle_create_document(req_payload, drafter, self.settings.clone()).await
    }
}
