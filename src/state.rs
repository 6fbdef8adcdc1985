//! Shared handler state: the services, all built on one injected store.

use crate::{
    services::{
        access_service::AccessService, catalog_service::CatalogService,
        upload_service::UploadService,
    },
    store::ObjectStore,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub access: AccessService,
    pub uploads: UploadService,
    pub store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, max_upload_bytes: usize) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            access: AccessService::new(store.clone()),
            uploads: UploadService::new(store.clone(), max_upload_bytes),
            store,
        }
    }
}
