use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use wardrobot_ai::{AiClient, GarmentClassifier, GeminiProvider, ProviderConfig};
use wardrobot_core::http::{start_http_server, AppState};
use wardrobot_core::processing::HttpSegmenter;
use wardrobot_core::repositories::WardrobeItemRepository;
use wardrobot_core::services::IngestService;
use wardrobot_core::storage::MediaStore;
use wardrobot_core::{Database, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "wardrobot")]
#[command(author, version, about = "Wardrobot - wardrobe management backend with AI garment classification")]
struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, default_value = "0.0.0.0:8000")]
    bind_addr: String,

    /// Postgres connection URL. Falls back to DATABASE_URL.
    #[arg(long)]
    db_url: Option<String>,

    /// Directory for processed garment images
    #[arg(long, default_value = "media")]
    media_dir: String,

    /// Base URL of the background-segmentation service
    #[arg(long, default_value = "http://127.0.0.1:7000/api/remove")]
    segmenter_url: String,

    /// Generative model handle used for classification and outfits
    #[arg(long, default_value = "gemini-1.5-flash")]
    model: String,

    /// Timeout in seconds applied to each external call
    #[arg(long, default_value = "60")]
    call_timeout_secs: u64,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("wardrobot=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!("Wardrobot starting. bind_addr={}", args.bind_addr);

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run_server(args: Args) -> Result<(), Error> {
    let db_url = args
        .db_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| Error::Parse("no database URL: pass --db-url or set DATABASE_URL".into()))?;

    let api_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| Error::Parse("GEMINI_API_KEY is not set".into()))?;

    let db = Database::new(&db_url).await?;
    db.migrate().await?;

    let call_timeout = Duration::from_secs(args.call_timeout_secs);

    let provider = Arc::new(GeminiProvider::new(ProviderConfig::new(api_key, args.model)));
    let classifier =
        Arc::new(GarmentClassifier::new(provider.clone()).with_timeout(call_timeout));
    let ai = Arc::new(AiClient::new(provider).with_timeout(call_timeout));

    let segmenter = Arc::new(HttpSegmenter::new(args.segmenter_url).with_timeout(call_timeout));
    let store = Arc::new(MediaStore::new(&args.media_dir)?);
    let repo = Arc::new(WardrobeItemRepository::new(db.pool().clone()));

    let ingest = Arc::new(IngestService::new(
        segmenter.clone(),
        classifier,
        repo.clone(),
        store.clone(),
    ));

    let state = AppState {
        ingest,
        repo,
        store,
        segmenter,
        ai,
    };

    let addr: SocketAddr = args
        .bind_addr
        .parse()
        .map_err(|e| Error::Parse(format!("invalid bind address: {}", e)))?;
    let shutdown_tx = start_http_server(addr, state).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| Error::Io(e))?;
    info!("Shutdown signal received.");
    let _ = shutdown_tx.send(());

    Ok(())
}
