//! Chain clients keyed by chain id.
//!
//! The configured chain's client is built at startup. Clients for the other
//! supported networks are created on first use from the network table, so a
//! wallet switched to another chain is still watched on the right RPC.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::blockchain::chains;
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainConfig};

pub struct ChainClients {
    home: Arc<BlockchainClient>,
    others: Mutex<HashMap<u64, Arc<BlockchainClient>>>,
}

impl ChainClients {
    pub fn new(home: Arc<BlockchainClient>) -> Self {
        Self {
            home,
            others: Mutex::new(HashMap::new()),
        }
    }

    /// The client for the configured chain.
    pub fn home(&self) -> &Arc<BlockchainClient> {
        &self.home
    }

    /// Client for `chain_id`, created on first use.
    ///
    /// Non-home chains reuse the home client's timeouts and polling settings
    /// with the network table's public RPC and no failovers.
    pub async fn client(&self, chain_id: u64) -> BlockchainResult<Arc<BlockchainClient>> {
        if chain_id == self.home.chain_id() {
            return Ok(self.home.clone());
        }
        let chain = chains::find_chain(chain_id).ok_or(BlockchainError::UnsupportedChain(chain_id))?;

        let mut others = self.others.lock().await;
        if let Some(client) = others.get(&chain_id) {
            return Ok(client.clone());
        }

        let config = ChainConfig {
            chain_id,
            rpc_url: chain.rpc_url.to_string(),
            failover_urls: Vec::new(),
            ..self.home.config().clone()
        };
        tracing::info!(chain_id, rpc_url = %config.rpc_url, "Creating client for switched chain");
        let client = Arc::new(BlockchainClient::new(config).await?);
        others.insert(chain_id, client.clone());
        Ok(client)
    }
}
