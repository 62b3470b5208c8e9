use clap::Parser;
use credit_ledger::application::engine::CreditEngine;
use credit_ledger::config::{GatewayCredentials, GatewayMode, KeySecret, Settings};
use credit_ledger::domain::ports::{LedgerStoreRef, PaymentGatewayRef};
use credit_ledger::domain::transaction::DEFAULT_MAX_ATTEMPTS;
use credit_ledger::infrastructure::in_memory::InMemoryStore;
use credit_ledger::infrastructure::local_gateway::LocalGateway;
use credit_ledger::infrastructure::razorpay::{DEFAULT_BASE_URL, RazorpayGateway};
use credit_ledger::interfaces::jsonl::dispatch;
use credit_ledger::interfaces::jsonl::messages::Response;
use credit_ledger::interfaces::jsonl::request_reader::RequestReader;
use credit_ledger::interfaces::jsonl::response_writer::ResponseWriter;
use credit_ledger::telemetry;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file with one JSON request per line
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Gateway API key id
    #[arg(long, env = "RAZORPAY_KEY_ID", default_value = "")]
    key_id: String,

    /// Gateway key secret, also used to verify payment signatures
    #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
    key_secret: String,

    /// Gateway API base URL
    #[arg(long, env = "RAZORPAY_API_URL", default_value = DEFAULT_BASE_URL)]
    gateway_url: String,

    /// Mint orders locally instead of calling the gateway
    #[arg(long)]
    local_gateway: bool,

    /// Attempts per persistent-store transaction before giving up on contention
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_transaction_attempts: u32,
}

impl Cli {
    fn into_settings(self) -> Settings {
        let gateway = if self.local_gateway {
            GatewayMode::Local
        } else {
            GatewayMode::Razorpay {
                base_url: self.gateway_url,
            }
        };
        let mut settings = Settings::new(
            GatewayCredentials {
                key_id: self.key_id,
                key_secret: KeySecret::new(self.key_secret),
            },
            gateway,
        );
        settings.db_path = self.db_path;
        settings.max_transaction_attempts = self.max_transaction_attempts;
        settings
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(settings: &Settings) -> Result<LedgerStoreRef> {
    use credit_ledger::infrastructure::rocksdb::RocksDbStore;

    if let Some(db_path) = &settings.db_path {
        // Use persistent storage (RocksDB)
        let store = RocksDbStore::open(db_path)
            .into_diagnostic()?
            .with_max_attempts(settings.max_transaction_attempts);
        return Ok(Arc::new(store));
    }
    Ok(Arc::new(InMemoryStore::new()))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(settings: &Settings) -> Result<LedgerStoreRef> {
    if settings.db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Arc::new(InMemoryStore::new()))
}

fn build_gateway(settings: &Settings) -> Result<PaymentGatewayRef> {
    match &settings.gateway {
        GatewayMode::Local => Ok(Arc::new(LocalGateway::new())),
        GatewayMode::Razorpay { base_url } => {
            let gateway = RazorpayGateway::new(settings.credentials.clone(), base_url.clone())
                .into_diagnostic()?;
            Ok(Arc::new(gateway))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let cli = Cli::parse();
    let input = cli.input.clone();
    let settings = cli.into_settings();
    settings.validate().into_diagnostic()?;

    let engine = CreditEngine::new(
        open_store(&settings)?,
        build_gateway(&settings)?,
        settings.credentials.key_secret.clone(),
    );

    let file = File::open(&input).into_diagnostic()?;
    let reader = RequestReader::new(BufReader::new(file));

    let stdout = io::stdout();
    let mut writer = ResponseWriter::new(stdout.lock());
    for request in reader.requests() {
        let response = match request {
            Ok(request) => dispatch(&engine, request).await,
            Err(e) => {
                warn!(error = %e, "Error reading request");
                Response::from(&e)
            }
        };
        writer.write_response(&response).into_diagnostic()?;
    }

    Ok(())
}
