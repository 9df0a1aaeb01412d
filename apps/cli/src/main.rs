use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    vendors::EmailAction, Control, HttpProcurementApi, Outcome, SearchCriteria, SyncController,
    ToastCenter,
};
use shared::domain::{Item, RfqId, VendorId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "procure", about = "Drive RFQ item extraction, correction and vendor matching")]
struct Args {
    /// Backend base URL; overrides procure.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Write the rendered HTML fragment here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract items from the RFQ's uploaded documents.
    Process {
        #[arg(long)]
        rfq: String,
    },
    /// Replace the RFQ's items with the ones in a JSON file.
    Save {
        #[arg(long)]
        rfq: String,
        #[arg(long)]
        items: PathBuf,
    },
    /// Rank vendors for every saved item of the RFQ.
    Match {
        #[arg(long)]
        rfq: String,
        /// Items JSON used to label the result groups.
        #[arg(long)]
        items: Option<PathBuf>,
    },
    Search {
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        zip: Option<String>,
        #[arg(long)]
        vendor_type: Option<String>,
        /// Ignored unless --zip is given.
        #[arg(long)]
        radius: Option<u32>,
    },
    /// Generate an RFQ email for a vendor, optionally sending it.
    Email {
        #[arg(long)]
        rfq: String,
        #[arg(long)]
        vendor: String,
        #[arg(long, default_value_t = 1)]
        serial: u32,
        #[arg(long)]
        send: bool,
    },
}

fn read_items(path: &Path) -> Result<Vec<Item>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read items file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("items file '{}' is not a JSON item list", path.display()))
}

fn check<T>(outcome: Outcome<T>) -> Result<T> {
    match outcome {
        Outcome::Done(value) => Ok(value),
        Outcome::Failed(message) => bail!(message),
        Outcome::Skipped(reason) => bail!("operation skipped: {reason:?}"),
    }
}

fn emit(out: Option<&Path>, html: &str) -> Result<()> {
    match out {
        Some(path) => fs::write(path, html)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            println!("{html}");
            Ok(())
        }
    }
}

async fn run(args: Args, controller: &SyncController) -> Result<String> {
    let html = match args.command {
        Command::Process { rfq } => {
            check(controller.process_documents(&RfqId::new(rfq)).await)?;
            controller.table_html().await
        }
        Command::Save { rfq, items } => {
            controller.load_items(&read_items(&items)?).await;
            check(controller.save_item_corrections(&RfqId::new(rfq)).await)?;
            controller.table_html().await
        }
        Command::Match { rfq, items } => {
            if let Some(items) = items {
                controller.load_items(&read_items(&items)?).await;
            }
            controller.enable(Control::MatchVendors).await;
            check(controller.match_vendors_for_rfq(&RfqId::new(rfq)).await)?;
            controller
                .vendor_matches()
                .await
                .map(|view| view.to_html())
                .unwrap_or_default()
        }
        Command::Search {
            keywords,
            country,
            city,
            zip,
            vendor_type,
            radius,
        } => {
            let criteria = SearchCriteria {
                keywords,
                country,
                city,
                zip_code: zip,
                vendor_type,
                radius_miles: radius,
            };
            check(controller.search_vendors(&criteria).await)?;
            controller
                .search_results()
                .await
                .map(|view| view.to_html())
                .unwrap_or_default()
        }
        Command::Email {
            rfq,
            vendor,
            serial,
            send,
        } => {
            let action = EmailAction {
                rfq_id: RfqId::new(rfq),
                vendor_id: VendorId::new(vendor),
                serial,
            };
            check(controller.generate_email(&action).await)?;
            let html = controller
                .email_preview()
                .await
                .map(|preview| preview.to_html())
                .unwrap_or_default();
            if send {
                check(controller.send_email().await)?;
            } else {
                controller.discard_email().await;
            }
            html
        }
    };
    Ok(html)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(server_url) = &args.server_url {
        settings.server_url = server_url.clone();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(server_url = %settings.server_url, "procure client starting");

    let api = HttpProcurementApi::with_timeout(&settings.server_url, settings.request_timeout())
        .context("failed to configure backend client")?;
    let controller = SyncController::new(Arc::new(api), Arc::new(ToastCenter::default()));

    let out = args.out.clone();
    let html = run(args, &controller).await?;
    emit(out.as_deref(), &html)
}
