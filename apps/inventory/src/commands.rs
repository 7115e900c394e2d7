//! User intents typed at the prompt and their dispatch to the controller.

use std::path::PathBuf;

use client_core::{ControllerError, InventoryController, EXPORT_AGE_PRESETS};
use shared::domain::{OwnerField, VehicleId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    Search(String),
    NextPage,
    PreviousPage,
    Refresh,
    SelectFile(Option<PathBuf>),
    Upload,
    ToggleExportMenu,
    Export(u32),
    Edit(VehicleId),
    SetField(OwnerField, String),
    SaveUpdate,
    Delete(VehicleId),
    ConfirmDelete,
    Cancel,
    DismissNotification,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub const HELP: &str = "\
commands:
  search [text]              filter rows (empty text clears the filter)
  next | prev | refresh      page through the listing
  file [path]                choose (or clear) the CSV file to import
  upload                     import the chosen file
  export                     show or hide the export menu
  export <years>             export vehicles older than <years>
  edit <id>                  open the update dialog for a row
  set <first|last|email> <value>
  save                       submit the update dialog
  delete <id>                open the delete confirmation
  confirm                    confirm the deletion
  cancel                     close the open dialog
  dismiss                    close the notification
  show | help | quit";

pub fn parse_intent(line: &str) -> Result<UserIntent, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let intent = match command {
        "search" | "s" => UserIntent::Search(rest.to_string()),
        "next" | "n" => UserIntent::NextPage,
        "prev" | "previous" | "p" => UserIntent::PreviousPage,
        "refresh" | "r" => UserIntent::Refresh,
        "file" => UserIntent::SelectFile((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "upload" => UserIntent::Upload,
        "export" if rest.is_empty() => UserIntent::ToggleExportMenu,
        "export" => {
            let age = rest
                .parse::<u32>()
                .map_err(|_| format!("export expects a number of years, got '{rest}'"))?;
            if !EXPORT_AGE_PRESETS.contains(&age) {
                return Err(format!(
                    "export thresholds are {}",
                    EXPORT_AGE_PRESETS
                        .iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            UserIntent::Export(age)
        }
        "edit" | "update" => UserIntent::Edit(parse_id(rest)?),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(field, value)| (field, value.trim()))
                .unwrap_or((rest, ""));
            let field = OwnerField::from_name(field)
                .ok_or_else(|| format!("unknown field '{field}'; use first, last or email"))?;
            UserIntent::SetField(field, value.to_string())
        }
        "save" => UserIntent::SaveUpdate,
        "delete" => UserIntent::Delete(parse_id(rest)?),
        "confirm" => UserIntent::ConfirmDelete,
        "cancel" => UserIntent::Cancel,
        "dismiss" => UserIntent::DismissNotification,
        "show" | "" => UserIntent::Show,
        "help" | "?" => UserIntent::Help,
        "quit" | "exit" | "q" => UserIntent::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(intent)
}

fn parse_id(raw: &str) -> Result<VehicleId, String> {
    raw.parse::<i64>()
        .map(VehicleId)
        .map_err(|_| format!("expected a vehicle id, got '{raw}'"))
}

pub fn intent_name(intent: &UserIntent) -> &'static str {
    match intent {
        UserIntent::Search(_) => "search",
        UserIntent::NextPage => "next_page",
        UserIntent::PreviousPage => "previous_page",
        UserIntent::Refresh => "refresh",
        UserIntent::SelectFile(_) => "select_file",
        UserIntent::Upload => "upload",
        UserIntent::ToggleExportMenu => "toggle_export_menu",
        UserIntent::Export(_) => "export",
        UserIntent::Edit(_) => "open_update",
        UserIntent::SetField(..) => "edit_field",
        UserIntent::SaveUpdate => "submit_update",
        UserIntent::Delete(_) => "open_delete",
        UserIntent::ConfirmDelete => "confirm_delete",
        UserIntent::Cancel => "close_modal",
        UserIntent::DismissNotification => "dismiss_notification",
        UserIntent::Show => "show",
        UserIntent::Help => "help",
        UserIntent::Quit => "quit",
    }
}

pub async fn dispatch(
    controller: &InventoryController,
    intent: UserIntent,
) -> Result<Flow, ControllerError> {
    tracing::debug!(intent = intent_name(&intent), "dispatching user intent");
    match intent {
        UserIntent::Search(text) => controller.set_search_text(text).await?,
        UserIntent::NextPage => controller.next_page().await?,
        UserIntent::PreviousPage => controller.previous_page().await?,
        UserIntent::Refresh => controller.refresh().await?,
        UserIntent::SelectFile(path) => controller.select_file(path).await,
        UserIntent::Upload => controller.upload().await?,
        UserIntent::ToggleExportMenu => controller.toggle_export_menu().await,
        UserIntent::Export(age) => controller.export_by_age(age).await?,
        UserIntent::Edit(id) => controller.open_update(id).await?,
        UserIntent::SetField(field, value) => controller.edit_field(field, value).await?,
        UserIntent::SaveUpdate => controller.submit_update().await?,
        UserIntent::Delete(id) => controller.open_delete(id).await?,
        UserIntent::ConfirmDelete => controller.confirm_delete().await?,
        UserIntent::Cancel => controller.close_modal().await,
        UserIntent::DismissNotification => controller.dismiss_notification().await,
        UserIntent::Show | UserIntent::Help => {}
        UserIntent::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}
