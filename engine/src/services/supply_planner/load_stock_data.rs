// Handler for the LoadStockData RPC
use std::sync::Arc;

use tokio::sync::RwLock;
use tonic::{Response, Status};

use super::helpers::loader_error;
use crate::config::settings::EngineSettings;
use crate::data::csv_parser::StockCsvParser;
use crate::data::stock_store::StockStore;
use crate::error::EngineError;
use crate::services::{LoadStockRequest, LoadStockResponse};

/// Counts of what one load added: (bins, items, item/supplier pairs).
pub type LoadCounts = (usize, usize, usize);

/// Parses every non-empty path first and only then touches the store, so a
/// bad file leaves the store as it was.
pub async fn load_into_store(
    stock_store: &RwLock<StockStore>,
    settings: &EngineSettings,
    bins_path: &str,
    items_path: &str,
    suppliers_path: &str,
) -> Result<LoadCounts, EngineError> {
    let spec = settings.number_format_spec();
    let delimiter = settings.delimiter();

    let bins = match bins_path {
        "" => Vec::new(),
        path => StockCsvParser::load_bins_from_csv(path, &spec, delimiter).map_err(loader_error)?,
    };
    let items = match items_path {
        "" => Vec::new(),
        path => StockCsvParser::load_items_from_csv(path, &spec, delimiter).map_err(loader_error)?,
    };
    let suppliers = match suppliers_path {
        "" => Vec::new(),
        path => {
            StockCsvParser::load_item_suppliers_from_csv(path, delimiter).map_err(loader_error)?
        }
    };

    let counts = (bins.len(), items.len(), suppliers.len());
    let mut store = stock_store.write().await;
    store.add_bins(bins);
    store.add_items(items);
    store.add_item_suppliers(suppliers);
    Ok(counts)
}

pub async fn handle_load_stock_data(
    req_payload: LoadStockRequest,
    stock_store: Arc<RwLock<StockStore>>,
    settings: Arc<EngineSettings>,
) -> Result<Response<LoadStockResponse>, Status> {
    if req_payload.bins_path.is_empty()
        && req_payload.items_path.is_empty()
        && req_payload.suppliers_path.is_empty()
    {
        return Err(Status::invalid_argument("At least one CSV path is required"));
    }

    let (bins, items, suppliers) = load_into_store(
        &stock_store,
        &settings,
        &req_payload.bins_path,
        &req_payload.items_path,
        &req_payload.suppliers_path,
    )
    .await?;

    tracing::debug!(bins, items, suppliers, "Stock data loaded");
    Ok(Response::new(LoadStockResponse {
        success: true,
        message: format!(
            "Loaded {} bins, {} items and {} item suppliers",
            bins, items, suppliers
        ),
        bins_loaded: bins as i32,
        items_loaded: items as i32,
        suppliers_loaded: suppliers as i32,
    }))
}
