//! CLI surface (SPEC_FULL §4.6 "CLI surface (heater)"): five required
//! connection strings plus a memcached address, each also settable from an
//! environment variable of the same name.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "account-heater", about = "Warms the precomputed-facts cache for every active account")]
pub struct Config {
    /// Connection string for the metadata store (GitHub mirror).
    #[arg(long, env = "METADATA_DB")]
    pub metadata_db: String,

    /// Connection string for the precomputed-facts store.
    #[arg(long, env = "PRECOMPUTED_DB")]
    pub precomputed_db: String,

    /// Connection string for the account/team/settings store.
    #[arg(long, env = "STATE_DB")]
    pub state_db: String,

    /// Connection string for the persistentdata store (deployments, etc).
    #[arg(long, env = "PERSISTENTDATA_DB")]
    pub persistentdata_db: String,

    /// Address of the memcached instance backing the local fact cache tier.
    #[arg(long, env = "MEMCACHED")]
    pub memcached: String,

    /// Mine from the Unix epoch instead of the usual two-year rolling window.
    #[arg(long, env = "CI")]
    pub full_history: bool,
}
