// gRPC surface of the engine
pub mod generated {
    tonic::include_proto!("supply_planner");
}

pub use generated::supply_planner_server::{SupplyPlanner, SupplyPlannerServer};
pub use generated::{
    ColumnDefinition, CreateDocumentRequest, CreateDocumentResponse,
    DuplicateSupplierWarning as ProtoDuplicateSupplierWarning, FilterDefinition,
    LoadStockRequest, LoadStockResponse, ParseNumberRequest, ParseNumberResponse, ReportChunk,
    ReportDefinitionRequest, ReportDefinitionResponse, ReportRow as ProtoReportRow,
    RunReportRequest, SelectedLine,
};

pub mod supply_planner;
