use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::{
    domain::{OwnerField, VehicleId},
    protocol::UpdateVehicleInput,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    config::Settings,
    error::{ControllerError, ValidationError},
    notification::NotificationTimer,
    view_state::{publish, Modal, Notice, ViewEvent, ViewQuery, ViewState},
    CsvUpload, ExportService, Gateways, ImportService, VehicleDirectory,
};

pub const EXPORT_AGE_PRESETS: [u32; 9] = [5, 6, 7, 8, 9, 10, 15, 20, 30];
pub const EXPORT_SUCCESS_MESSAGE: &str = "Export completed successfully!";
pub const EXPORT_FAILURE_MESSAGE: &str = "Export failed, please try again.";
pub const IMPORT_SUCCESS_MESSAGE: &str = "File uploaded successfully!";
pub const IMPORT_FAILURE_MESSAGE: &str = "File upload failed, please try again.";

pub fn export_preset_label(age: u32) -> String {
    format!("Over {age} years")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub notification_duration: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            notification_duration: Duration::from_secs(10),
        }
    }
}

impl From<&Settings> for ControllerOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            page_size: settings.page_size,
            notification_duration: settings.notification_duration(),
        }
    }
}

/// Owns the view state of one inventory screen and turns user intents into
/// service calls.
///
/// Intents take `&self` so the presentation layer can fire a new one while an
/// earlier request is still in flight. Query results carry a ticket and only
/// the most recently issued query may commit its rows.
pub struct InventoryController {
    directory: Arc<dyn VehicleDirectory>,
    importer: Arc<dyn ImportService>,
    exporter: Arc<dyn ExportService>,
    page_size: u32,
    state: Arc<Mutex<ViewState>>,
    latest_query: AtomicU64,
    notifications: NotificationTimer,
    events: broadcast::Sender<ViewEvent>,
}

impl InventoryController {
    pub fn new(gateways: Gateways, options: ControllerOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let state = Arc::new(Mutex::new(ViewState::default()));
        let notifications = NotificationTimer::new(
            Arc::clone(&state),
            events.clone(),
            options.notification_duration,
        );
        Arc::new(Self {
            directory: gateways.directory,
            importer: gateways.importer,
            exporter: gateways.exporter,
            page_size: options.page_size.max(1),
            state,
            latest_query: AtomicU64::new(0),
            notifications,
            events,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    /// First load of the screen.
    pub async fn mount(&self) -> Result<(), ControllerError> {
        self.refresh().await
    }

    /// Re-issues whichever query matches the current page and search text.
    pub async fn refresh(&self) -> Result<(), ControllerError> {
        let query = self.state.lock().await.current_query();
        self.run_query(query).await
    }

    pub async fn set_search_text(&self, text: impl Into<String>) -> Result<(), ControllerError> {
        let query = {
            let mut guard = self.state.lock().await;
            guard.set_search_text(text.into());
            publish(&self.events, &guard);
            guard.current_query()
        };
        self.run_query(query).await
    }

    pub async fn next_page(&self) -> Result<(), ControllerError> {
        let query = {
            let mut guard = self.state.lock().await;
            let next = guard.page().next();
            guard.set_page(next);
            publish(&self.events, &guard);
            guard.current_query()
        };
        self.run_query(query).await
    }

    /// No-op on the first page.
    pub async fn previous_page(&self) -> Result<(), ControllerError> {
        let query = {
            let mut guard = self.state.lock().await;
            let previous = guard.page().previous();
            if previous == guard.page() {
                return Ok(());
            }
            guard.set_page(previous);
            publish(&self.events, &guard);
            guard.current_query()
        };
        self.run_query(query).await
    }

    async fn run_query(&self, query: ViewQuery) -> Result<(), ControllerError> {
        let ticket = self.latest_query.fetch_add(1, Ordering::SeqCst) + 1;
        let page = query.page();
        let window = page.window(self.page_size);

        let result = match &query {
            ViewQuery::Listing { .. } => self.directory.list_page(window).await,
            ViewQuery::Search { text, .. } => self.directory.search_page(text, window).await,
        };

        let records = match result {
            Ok(records) => records,
            Err(err) => {
                error!(
                    page = page.get(),
                    offset = window.offset,
                    error = %err,
                    "failed to fetch vehicles; keeping current rows"
                );
                return Err(err.into());
            }
        };

        let mut guard = self.state.lock().await;
        let latest = self.latest_query.load(Ordering::SeqCst);
        if ticket != latest {
            debug!(ticket, latest, "discarding stale vehicle page");
            return Ok(());
        }
        info!(
            page = page.get(),
            count = records.len(),
            search = matches!(query, ViewQuery::Search { .. }),
            "vehicle page loaded"
        );
        guard.replace_records(records);
        publish(&self.events, &guard);
        Ok(())
    }

    pub async fn open_update(&self, id: VehicleId) -> Result<(), ControllerError> {
        let mut guard = self.state.lock().await;
        let record = guard
            .find_record(id)
            .cloned()
            .ok_or(ValidationError::UnknownRecord(id))?;
        guard.open_modal(Modal::update(record))?;
        publish(&self.events, &guard);
        Ok(())
    }

    pub async fn open_delete(&self, id: VehicleId) -> Result<(), ControllerError> {
        let mut guard = self.state.lock().await;
        let record = guard
            .find_record(id)
            .cloned()
            .ok_or(ValidationError::UnknownRecord(id))?;
        guard.open_modal(Modal::Delete { record })?;
        publish(&self.events, &guard);
        Ok(())
    }

    pub async fn edit_field(
        &self,
        field: OwnerField,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let mut guard = self.state.lock().await;
        guard.edit_field(field, value.into())?;
        publish(&self.events, &guard);
        Ok(())
    }

    /// Cancel on either dialog; selection and edit buffer are discarded.
    pub async fn close_modal(&self) {
        let mut guard = self.state.lock().await;
        guard.close_modal();
        publish(&self.events, &guard);
    }

    pub async fn submit_update(&self) -> Result<(), ControllerError> {
        let input = {
            let guard = self.state.lock().await;
            match guard.modal() {
                Some(Modal::Update { record, buffer }) => UpdateVehicleInput {
                    id: record.id,
                    first_name: buffer.first_name.clone(),
                    last_name: buffer.last_name.clone(),
                    email: buffer.email.clone(),
                },
                _ => return Err(ValidationError::NoUpdateInProgress.into()),
            }
        };
        let id = input.id;

        if let Err(err) = self.directory.update_vehicle(input).await {
            error!(vehicle_id = id.0, error = %err, "failed to update vehicle");
            return Err(err.into());
        }
        info!(vehicle_id = id.0, "vehicle updated");

        {
            let mut guard = self.state.lock().await;
            if guard.close_modal_for(id) {
                publish(&self.events, &guard);
            }
        }
        self.refresh().await
    }

    pub async fn confirm_delete(&self) -> Result<(), ControllerError> {
        let id = {
            let guard = self.state.lock().await;
            match guard.modal() {
                Some(Modal::Delete { record }) => record.id,
                _ => return Err(ValidationError::NoDeleteInProgress.into()),
            }
        };

        match self.directory.remove_vehicle(id).await {
            Ok(true) => info!(vehicle_id = id.0, "vehicle removed"),
            Ok(false) => warn!(vehicle_id = id.0, "service reported nothing removed"),
            Err(err) => {
                error!(vehicle_id = id.0, error = %err, "failed to delete vehicle");
                return Err(err.into());
            }
        }

        {
            let mut guard = self.state.lock().await;
            if guard.close_modal_for(id) {
                publish(&self.events, &guard);
            }
        }
        self.refresh().await
    }

    pub async fn select_file(&self, path: Option<PathBuf>) {
        let mut guard = self.state.lock().await;
        guard.select_file(path);
        publish(&self.events, &guard);
    }

    /// Bulk import of the selected file. A successful import is treated like
    /// any other committed mutation and refreshes the current view.
    pub async fn upload(&self) -> Result<(), ControllerError> {
        let selected = self
            .state
            .lock()
            .await
            .selected_file()
            .map(|path| path.to_path_buf());
        let Some(path) = selected else {
            warn!("upload requested without a selected file");
            return Err(ValidationError::NoFileSelected.into());
        };

        let upload = match CsvUpload::read(&path).await {
            Ok(upload) => upload,
            Err(source) => {
                error!(path = %path.display(), error = %source, "failed to read import file");
                return Err(ControllerError::ReadFile { path, source });
            }
        };
        let size_bytes = upload.contents.len();

        match self.importer.upload_csv(upload).await {
            Ok(response) => {
                info!(path = %path.display(), size_bytes, %response, "file uploaded");
                self.notifications
                    .show(Notice::success(IMPORT_SUCCESS_MESSAGE))
                    .await;
                self.refresh().await
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to upload file");
                self.notifications
                    .show(Notice::failure(IMPORT_FAILURE_MESSAGE))
                    .await;
                Err(err.into())
            }
        }
    }

    pub async fn toggle_export_menu(&self) {
        let mut guard = self.state.lock().await;
        guard.toggle_export_menu();
        publish(&self.events, &guard);
    }

    /// Exports vehicles older than `age` years. The menu closes as soon as the
    /// export is issued; the outcome is reported through the notification.
    pub async fn export_by_age(&self, age: u32) -> Result<(), ControllerError> {
        {
            let mut guard = self.state.lock().await;
            guard.close_export_menu();
            publish(&self.events, &guard);
        }

        info!(age, "exporting vehicles older than threshold");
        match self.exporter.export_by_age(age).await {
            Ok(response) => {
                info!(age, %response, "export completed");
                self.notifications
                    .show(Notice::success(EXPORT_SUCCESS_MESSAGE))
                    .await;
                Ok(())
            }
            Err(err) => {
                error!(age, error = %err, "failed to export vehicles");
                self.notifications
                    .show(Notice::failure(EXPORT_FAILURE_MESSAGE))
                    .await;
                Err(err.into())
            }
        }
    }

    pub async fn dismiss_notification(&self) {
        self.notifications.dismiss().await;
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
