// Engine main entry point
use engine::config::settings::EngineSettings;
use engine::data::stock_store::StockStore;
use engine::services::supply_planner::load_stock_data::load_into_store;
use engine::services::supply_planner::SupplyPlannerService;
use engine::services::SupplyPlannerServer;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls verbosity, info when unset
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Supply Planner Engine...");

    let settings = EngineSettings::load()?;
    let addr = format!("{}:{}", settings.host, settings.port).parse()?;
    info!("Engine will listen on {}", addr);

    let stock_store = Arc::new(RwLock::new(StockStore::new()));

    let bins_path = settings.bins_path.clone().unwrap_or_default();
    let items_path = settings.items_path.clone().unwrap_or_default();
    let suppliers_path = settings.suppliers_path.clone().unwrap_or_default();
    if !(bins_path.is_empty() && items_path.is_empty() && suppliers_path.is_empty()) {
        let (bins, items, suppliers) =
            load_into_store(&stock_store, &settings, &bins_path, &items_path, &suppliers_path)
                .await?;
        info!(bins, items, suppliers, "Loaded startup stock data");
    }

    let supply_planner_service =
        SupplyPlannerService::with_in_memory_documents(stock_store.clone(), settings)?;

    Server::builder()
        .add_service(SupplyPlannerServer::new(supply_planner_service))
        .serve(addr)
        .await?;

    Ok(())
}
