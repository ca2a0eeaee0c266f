use std::process::ExitCode;
use std::sync::Arc;

use account_heater::{run_heater, Config, HeaterStores, NullNotifier};
use clap::Parser;
use fact_cache::{FactCache, CURRENT_FORMAT_VERSION};
use storage_gateway::mock::{InMemoryMetadataStore, InMemoryPersistentDataStore, InMemoryPrecomputedStore, InMemoryStateStore};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::parse();
    info!(
        metadata_db = %config.metadata_db,
        precomputed_db = %config.precomputed_db,
        state_db = %config.state_db,
        persistentdata_db = %config.persistentdata_db,
        memcached = %config.memcached,
        "account heater starting"
    );

    // Real driver glue for these connection strings is out of scope; the
    // stores below are the interface this CLI drives, wired to in-memory
    // implementations until a production deployment supplies real ones.
    let precomputed: Arc<dyn storage_gateway::PrecomputedStore> = Arc::new(InMemoryPrecomputedStore::new());
    let stores = HeaterStores {
        state: Arc::new(InMemoryStateStore::new()),
        metadata: Arc::new(InMemoryMetadataStore::new()),
        precomputed: precomputed.clone(),
        persistentdata: Arc::new(InMemoryPersistentDataStore::new()),
        cache: Arc::new(FactCache::new(precomputed, CURRENT_FORMAT_VERSION)),
    };
    let notifier = NullNotifier;

    match run_heater(&stores, &notifier, config.full_history).await {
        Ok(summary) => {
            info!(successful = summary.successful.len(), failed = summary.failed.len(), "heater run finished");
            if summary.exit_code() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!(error = %e, "heater run aborted");
            ExitCode::FAILURE
        }
    }
}
