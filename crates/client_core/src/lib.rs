use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use shared::{
    domain::{VehicleId, VehicleRecord},
    protocol::UpdateVehicleInput,
};

pub mod config;
mod controller;
pub mod error;
pub mod graphql;
pub mod notification;
pub mod paging;
pub mod view_state;

pub use controller::{
    export_preset_label, ControllerOptions, InventoryController, EXPORT_AGE_PRESETS,
    EXPORT_FAILURE_MESSAGE, EXPORT_SUCCESS_MESSAGE, IMPORT_FAILURE_MESSAGE,
    IMPORT_SUCCESS_MESSAGE,
};
pub use error::{ControllerError, FetchError, ValidationError};
pub use paging::{Page, PageWindow};
pub use view_state::{Modal, Notice, NoticeKind, ViewEvent, ViewQuery, ViewState};

/// Listing, search, update and delete all live on the records service.
#[async_trait]
pub trait VehicleDirectory: Send + Sync {
    async fn list_page(&self, window: PageWindow) -> Result<Vec<VehicleRecord>, FetchError>;
    async fn search_page(
        &self,
        text: &str,
        window: PageWindow,
    ) -> Result<Vec<VehicleRecord>, FetchError>;
    async fn update_vehicle(&self, input: UpdateVehicleInput) -> Result<VehicleId, FetchError>;
    /// `Ok(false)` means the service accepted the call but removed nothing.
    async fn remove_vehicle(&self, id: VehicleId) -> Result<bool, FetchError>;
}

#[async_trait]
pub trait ImportService: Send + Sync {
    async fn upload_csv(&self, upload: CsvUpload) -> Result<serde_json::Value, FetchError>;
}

#[async_trait]
pub trait ExportService: Send + Sync {
    async fn export_by_age(&self, age: u32) -> Result<serde_json::Value, FetchError>;
}

/// The three independently addressable services a controller talks to.
#[derive(Clone)]
pub struct Gateways {
    pub directory: Arc<dyn VehicleDirectory>,
    pub importer: Arc<dyn ImportService>,
    pub exporter: Arc<dyn ExportService>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl CsvUpload {
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self {
            file_name,
            contents,
        })
    }
}
