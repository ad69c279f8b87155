// Document service seam. Drafting code only talks to the host's document
// model through this trait; `InMemoryDocumentService` is the implementation
// the engine runs with.
pub mod drafting;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use shared::models::{DocType, DocumentLine, DraftDocument, ItemDetails, ItemDetailsRequest};
use tokio::sync::{Mutex, RwLock};

use crate::data::stock_store::StockStore;
use crate::error::EngineError;

pub use drafting::{DocumentDrafter, DraftOutcome};

#[tonic::async_trait]
pub trait DocumentService: Send + Sync {
    /// A new, unsaved document of `doctype`.
    async fn create_draft(&self, doctype: DocType) -> Result<DraftDocument, EngineError>;

    fn add_child_row(&self, draft: &mut DraftDocument, line: DocumentLine) {
        draft.items.push(line);
    }

    /// Names, units and conversion factor for an item line.
    async fn fetch_item_details(
        &self,
        request: ItemDetailsRequest,
    ) -> Result<ItemDetails, EngineError>;

    /// Opens the draft's form; returns the route that was opened.
    async fn navigate_to_form(&self, draft: &DraftDocument) -> Result<String, EngineError>;
}

#[tonic::async_trait]
impl<T: DocumentService + ?Sized> DocumentService for Arc<T> {
    async fn create_draft(&self, doctype: DocType) -> Result<DraftDocument, EngineError> {
        (**self).create_draft(doctype).await
    }

    fn add_child_row(&self, draft: &mut DraftDocument, line: DocumentLine) {
        (**self).add_child_row(draft, line)
    }

    async fn fetch_item_details(
        &self,
        request: ItemDetailsRequest,
    ) -> Result<ItemDetails, EngineError> {
        (**self).fetch_item_details(request).await
    }

    async fn navigate_to_form(&self, draft: &DraftDocument) -> Result<String, EngineError> {
        (**self).navigate_to_form(draft).await
    }
}

// Opened drafts kept before the oldest is forgotten
pub const MAX_OPEN_DRAFTS: usize = 256;

#[derive(Default)]
struct OpenDrafts {
    by_name: HashMap<String, DraftDocument>,
    // Names, oldest first
    order: VecDeque<String>,
}

impl OpenDrafts {
    fn insert(&mut self, draft: DraftDocument) {
        if self.by_name.insert(draft.name.clone(), draft.clone()).is_none() {
            self.order.push_back(draft.name);
        }
        while self.order.len() > MAX_OPEN_DRAFTS {
            if let Some(oldest) = self.order.pop_front() {
                self.by_name.remove(&oldest);
            }
        }
    }
}

pub struct InMemoryDocumentService {
    stock_store: Arc<RwLock<StockStore>>,
    default_company: Option<String>,
    counters: Mutex<HashMap<DocType, u64>>,
    drafts: Mutex<OpenDrafts>,
    last_route: Mutex<Option<String>>,
}

impl InMemoryDocumentService {
    pub fn new(stock_store: Arc<RwLock<StockStore>>, default_company: Option<String>) -> Self {
        InMemoryDocumentService {
            stock_store,
            default_company,
            counters: Mutex::new(HashMap::new()),
            drafts: Mutex::new(OpenDrafts::default()),
            last_route: Mutex::new(None),
        }
    }

    /// One of the last `MAX_OPEN_DRAFTS` drafts opened, by name.
    pub async fn draft(&self, name: &str) -> Option<DraftDocument> {
        self.drafts.lock().await.by_name.get(name).cloned()
    }

    pub async fn last_route(&self) -> Option<String> {
        self.last_route.lock().await.clone()
    }
}

#[tonic::async_trait]
impl DocumentService for InMemoryDocumentService {
    async fn create_draft(&self, doctype: DocType) -> Result<DraftDocument, EngineError> {
        let mut counters = self.counters.lock().await;
        let counter = counters.entry(doctype).or_insert(0);
        *counter += 1;

        let name = format!("new-{}-{}", doctype.slug(), counter);
        let mut draft = DraftDocument::new(name, doctype);
        draft.company = self.default_company.clone();
        Ok(draft)
    }

    async fn fetch_item_details(
        &self,
        request: ItemDetailsRequest,
    ) -> Result<ItemDetails, EngineError> {
        let store = self.stock_store.read().await;
        let item = store
            .item(&request.item_code)
            .ok_or_else(|| EngineError::ItemNotFound(request.item_code.clone()))?;

        // Both document types buy, so the purchase unit applies when set.
        let uom = item.purchase_uom.clone().unwrap_or_else(|| item.stock_uom.clone());
        let conversion_factor = if uom == item.stock_uom {
            1.0
        } else {
            item.conversion_factor
        };

        Ok(ItemDetails {
            item_name: item.item_name.clone(),
            uom,
            stock_uom: item.stock_uom.clone(),
            conversion_factor,
        })
    }

    async fn navigate_to_form(&self, draft: &DraftDocument) -> Result<String, EngineError> {
        let route = format!("/app/{}/{}", draft.doctype.slug(), draft.name);
        self.drafts.lock().await.insert(draft.clone());
        *self.last_route.lock().await = Some(route.clone());
        tracing::info!(
            doctype = %draft.doctype,
            name = %draft.name,
            items = draft.items.len(),
            "Opened draft form"
        );
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Item;

    fn service() -> InMemoryDocumentService {
        let mut store = StockStore::new();
        store.add_items(vec![
            Item {
                item_code: "BOLT-10".to_string(),
                item_name: "Hex bolt M10".to_string(),
                image: None,
                stock_uom: "Nos".to_string(),
                purchase_uom: Some("Box".to_string()),
                conversion_factor: 100.0,
            },
            Item {
                item_code: "NUT-M4".to_string(),
                item_name: "Nut M4".to_string(),
                image: None,
                stock_uom: "Nos".to_string(),
                purchase_uom: None,
                conversion_factor: 12.0,
            },
        ]);
        let company = Some("Acme SP".to_string());
        InMemoryDocumentService::new(Arc::new(RwLock::new(store)), company)
    }

    fn details_request(item_code: &str) -> ItemDetailsRequest {
        ItemDetailsRequest {
            item_code: item_code.to_string(),
            warehouse: "Main".to_string(),
            doctype: DocType::PurchaseOrder,
            company: None,
            qty: 1.0,
        }
    }

    #[tokio::test]
    async fn test_create_draft_names_per_doctype() {
        let service = service();
        let first = service.create_draft(DocType::MaterialRequest).await.unwrap();
        let second = service.create_draft(DocType::MaterialRequest).await.unwrap();
        let order = service.create_draft(DocType::PurchaseOrder).await.unwrap();

        assert_eq!(first.name, "new-material-request-1");
        assert_eq!(second.name, "new-material-request-2");
        assert_eq!(order.name, "new-purchase-order-1");
        assert_eq!(first.company.as_deref(), Some("Acme SP"));
        assert!(first.items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_item_details_uses_purchase_unit() {
        let service = service();
        let details = service.fetch_item_details(details_request("BOLT-10")).await.unwrap();
        assert_eq!(details.uom, "Box");
        assert_eq!(details.stock_uom, "Nos");
        assert_eq!(details.conversion_factor, 100.0);

        let details = service.fetch_item_details(details_request("NUT-M4")).await.unwrap();
        assert_eq!(details.uom, "Nos");
        assert_eq!(details.conversion_factor, 1.0);

        let err = service.fetch_item_details(details_request("GHOST")).await.unwrap_err();
        assert!(matches!(err, EngineError::ItemNotFound(ref code) if code == "GHOST"));
    }

    #[tokio::test]
    async fn test_navigate_keeps_opened_draft() {
        let service = service();
        let draft = service.create_draft(DocType::PurchaseOrder).await.unwrap();
        let route = service.navigate_to_form(&draft).await.unwrap();

        assert_eq!(route, "/app/purchase-order/new-purchase-order-1");
        assert_eq!(service.draft("new-purchase-order-1").await, Some(draft));
        assert_eq!(service.last_route().await, Some(route));
    }

    #[tokio::test]
    async fn test_open_drafts_are_capped() {
        let service = service();
        for _ in 0..MAX_OPEN_DRAFTS + 10 {
            let draft = service.create_draft(DocType::MaterialRequest).await.unwrap();
            service.navigate_to_form(&draft).await.unwrap();
        }

        assert_eq!(service.drafts.lock().await.by_name.len(), MAX_OPEN_DRAFTS);
        assert!(service.draft("new-material-request-10").await.is_none());
        assert!(service.draft("new-material-request-11").await.is_some());
        let newest = format!("new-material-request-{}", MAX_OPEN_DRAFTS + 10);
        assert!(service.draft(&newest).await.is_some());
        assert_eq!(
            service.last_route().await,
            Some(format!("/app/material-request/{}", newest))
        );
    }
}
