//! noid-server - durable pool registry HTTP server
//!
//! Run modes:
//!   cargo run --bin noid-server          Start the HTTP API (see NOID_* env vars)
//!   cargo run --bin noid-server -- help  Show usage

use std::env;
use std::sync::Arc;

use noidpool::config::{ServerConfig, StoreKind};
use noidpool::http;
use noidpool::logging;
use noidpool::registry::Registry;
use noidpool::storage::{DirectoryPoolStore, NullPoolStore, PoolStore, SqlitePoolStore};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("help") {
        print_usage();
        return;
    }

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init_from_config(&config) {
        eprintln!("failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let store: Arc<dyn PoolStore> = match build_store(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let registry = Registry::new(store);

    // Startup reload must complete before the server accepts traffic.
    if let Err(e) = registry.load_from_store().await {
        tracing::error!("failed to load pools from store: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = http::start_server(registry, config.listen_port).await {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}

fn build_store(config: &ServerConfig) -> Result<Arc<dyn PoolStore>, String> {
    match config.store_kind {
        StoreKind::Null => Ok(Arc::new(NullPoolStore)),
        StoreKind::Directory => {
            let path = config.store_path.as_ref().expect("validated by ServerConfig::from_env");
            DirectoryPoolStore::new(path)
                .map(|s| Arc::new(s) as Arc<dyn PoolStore>)
                .map_err(|e| e.to_string())
        }
        StoreKind::Sqlite => {
            let path = config.store_path.as_ref().expect("validated by ServerConfig::from_env");
            SqlitePoolStore::new(path)
                .map(|s| Arc::new(s) as Arc<dyn PoolStore>)
                .map_err(|e| e.to_string())
        }
    }
}

fn print_usage() {
    println!("noid-server - durable pool registry HTTP server");
    println!();
    println!("Usage:");
    println!("  noid-server          Start the HTTP server");
    println!("  noid-server help     Show this message");
    println!();
    println!("Environment Variables:");
    println!("  NOID_LISTEN_PORT   HTTP port to bind (default: 8080)");
    println!("  NOID_STORE         sqlite | directory | null (default: null)");
    println!("  NOID_STORE_PATH    sqlite db file or JSON directory root");
    println!("  NOID_LOG_LEVEL     trace|debug|info|warn|error (default: info)");
    println!("  NOID_LOG_FORMAT    json | pretty (default: pretty)");
}
