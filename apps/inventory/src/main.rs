mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{self, load_settings, Settings},
    graphql::graphql_gateways,
    ControllerOptions, InventoryController, ViewEvent,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing_subscriber::EnvFilter;

use crate::commands::{dispatch, parse_intent, Flow, UserIntent, HELP};

#[derive(Parser, Debug)]
#[command(name = "vehicle-inventory", about = "Browse and manage the vehicle inventory")]
struct Args {
    /// TOML settings file; defaults to ./vehicle_inventory.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    directory_url: Option<String>,
    #[arg(long)]
    import_url: Option<String>,
    #[arg(long)]
    export_url: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
}

/// Command-line values win over the file and the environment.
fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(url) = &args.directory_url {
        settings.directory_url = url.clone();
    }
    if let Some(url) = &args.import_url {
        settings.import_url = url.clone();
    }
    if let Some(url) = &args.export_url {
        settings.export_url = url.clone();
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    apply_overrides(&mut settings, &args);
    config::validate(&settings).context("invalid settings")?;
    tracing::info!(
        directory = %settings.directory_url,
        import = %settings.import_url,
        export = %settings.export_url,
        page_size = settings.page_size,
        "starting vehicle inventory"
    );

    let gateways = graphql_gateways(&settings)?;
    let controller = InventoryController::new(gateways, ControllerOptions::from(&settings));
    let mut events = controller.subscribe_events();

    if let Err(err) = controller.mount().await {
        eprintln!("initial load failed: {err}");
    }
    println!("{}", render::render_view(&controller.snapshot().await));
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let intent = match parse_intent(&line) {
                    Ok(intent) => intent,
                    Err(message) => {
                        eprintln!("{message}");
                        continue;
                    }
                };
                if intent == UserIntent::Help {
                    println!("{HELP}");
                    continue;
                }
                match dispatch(&controller, intent).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(err) if err.is_validation() => eprintln!("{err}"),
                    Err(err) => eprintln!("request failed: {err}"),
                }
                println!("{}", render::render_view(&controller.snapshot().await));
            }
            event = events.recv() => match event {
                Ok(ViewEvent::NotificationExpired) => println!("(notification dismissed)"),
                Ok(ViewEvent::StateChanged(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "view events lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_page_size_repairs_an_invalid_file_value() {
        let mut settings = Settings {
            page_size: 0,
            ..Settings::default()
        };
        let args = Args::parse_from(["vehicle-inventory", "--page-size", "5"]);
        apply_overrides(&mut settings, &args);
        assert_eq!(settings.page_size, 5);
        config::validate(&settings).expect("valid after overrides");
    }

    #[test]
    fn cli_endpoints_replace_configured_ones() {
        let mut settings = Settings::default();
        let args = Args::parse_from([
            "vehicle-inventory",
            "--export-url",
            "https://export.internal/graphql",
        ]);
        apply_overrides(&mut settings, &args);
        assert_eq!(settings.export_url, "https://export.internal/graphql");
        assert_eq!(settings.directory_url, Settings::default().directory_url);
    }
}
