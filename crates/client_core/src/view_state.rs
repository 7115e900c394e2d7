//! Everything the presentation layer needs to draw the inventory screen.

use std::path::{Path, PathBuf};

use shared::domain::{OwnerDetails, OwnerField, VehicleId, VehicleRecord};
use tokio::sync::broadcast;

use crate::{error::ValidationError, paging::Page};

/// At most one dialog is open at a time; the variant carries its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Update {
        record: VehicleRecord,
        buffer: OwnerDetails,
    },
    Delete {
        record: VehicleRecord,
    },
}

impl Modal {
    pub fn update(record: VehicleRecord) -> Self {
        let buffer = record.owner();
        Self::Update { record, buffer }
    }

    pub fn record(&self) -> &VehicleRecord {
        match self {
            Self::Update { record, .. } | Self::Delete { record } => record,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

/// Which backend query reproduces the rows the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewQuery {
    Listing { page: Page },
    Search { text: String, page: Page },
}

impl ViewQuery {
    pub fn page(&self) -> Page {
        match self {
            Self::Listing { page } | Self::Search { page, .. } => *page,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    StateChanged(ViewState),
    /// The notification timer hid the notice on its own.
    NotificationExpired,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    records: Vec<VehicleRecord>,
    page: Page,
    search_text: String,
    modal: Option<Modal>,
    export_menu_open: bool,
    notification: Option<Notice>,
    selected_file: Option<PathBuf>,
}

impl ViewState {
    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn selected_record(&self) -> Option<&VehicleRecord> {
        self.modal.as_ref().map(Modal::record)
    }

    pub fn edit_buffer(&self) -> Option<&OwnerDetails> {
        match &self.modal {
            Some(Modal::Update { buffer, .. }) => Some(buffer),
            _ => None,
        }
    }

    pub fn is_update_modal_open(&self) -> bool {
        matches!(self.modal, Some(Modal::Update { .. }))
    }

    pub fn is_delete_modal_open(&self) -> bool {
        matches!(self.modal, Some(Modal::Delete { .. }))
    }

    pub fn is_export_menu_open(&self) -> bool {
        self.export_menu_open
    }

    pub fn notification(&self) -> Option<&Notice> {
        self.notification.as_ref()
    }

    pub fn is_notification_visible(&self) -> bool {
        self.notification.is_some()
    }

    pub fn notification_text(&self) -> &str {
        self.notification
            .as_ref()
            .map(|notice| notice.message.as_str())
            .unwrap_or_default()
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    /// Empty search text means the unfiltered listing.
    pub fn current_query(&self) -> ViewQuery {
        if self.search_text.is_empty() {
            ViewQuery::Listing { page: self.page }
        } else {
            ViewQuery::Search {
                text: self.search_text.clone(),
                page: self.page,
            }
        }
    }

    pub(crate) fn find_record(&self, id: VehicleId) -> Option<&VehicleRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub(crate) fn replace_records(&mut self, records: Vec<VehicleRecord>) {
        self.records = records;
    }

    pub(crate) fn set_page(&mut self, page: Page) {
        self.page = page;
    }

    pub(crate) fn set_search_text(&mut self, text: String) {
        self.search_text = text;
    }

    pub(crate) fn open_modal(&mut self, modal: Modal) -> Result<(), ValidationError> {
        if self.modal.is_some() {
            return Err(ValidationError::ModalAlreadyOpen);
        }
        self.modal = Some(modal);
        Ok(())
    }

    pub(crate) fn edit_field(
        &mut self,
        field: OwnerField,
        value: String,
    ) -> Result<(), ValidationError> {
        match &mut self.modal {
            Some(Modal::Update { buffer, .. }) => {
                buffer.set(field, value);
                Ok(())
            }
            _ => Err(ValidationError::NoUpdateInProgress),
        }
    }

    pub(crate) fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Closes the dialog only if it still targets `id`; the user may have
    /// cancelled and opened another one while a request was in flight.
    pub(crate) fn close_modal_for(&mut self, id: VehicleId) -> bool {
        if self.selected_record().map(|record| record.id) == Some(id) {
            self.modal = None;
            return true;
        }
        false
    }

    pub(crate) fn toggle_export_menu(&mut self) {
        self.export_menu_open = !self.export_menu_open;
    }

    pub(crate) fn close_export_menu(&mut self) {
        self.export_menu_open = false;
    }

    pub(crate) fn show_notice(&mut self, notice: Notice) {
        self.notification = Some(notice);
    }

    pub(crate) fn clear_notice(&mut self) -> bool {
        self.notification.take().is_some()
    }

    pub(crate) fn select_file(&mut self, path: Option<PathBuf>) {
        self.selected_file = path;
    }
}

pub(crate) fn publish(events: &broadcast::Sender<ViewEvent>, state: &ViewState) {
    if events.receiver_count() > 0 {
        let _ = events.send(ViewEvent::StateChanged(state.clone()));
    }
}
