//! Network configuration for the JSON-RPC ledger client.
//!
//! Resolution-time settings live in [`ResolveConfig`](crate::ResolveConfig);
//! this module only describes how to reach a fullnode.

use crate::error::{BuilderError, BuilderResult};
use crate::retry::RetryConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle-connection settings handed to the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// `None` leaves the per-host idle count unbounded.
    pub idle_per_host: Option<usize>,
    pub idle_timeout: Duration,
    /// `None` disables TCP keepalive probes.
    pub keepalive: Option<Duration>,
    pub nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            keepalive: Some(Duration::from_secs(60)),
            nodelay: true,
        }
    }
}

impl PoolConfig {
    /// A small pool of short-lived connections, suited to a local node.
    pub fn short_lived() -> Self {
        Self {
            idle_per_host: Some(4),
            idle_timeout: Duration::from_secs(15),
            keepalive: None,
            nodelay: true,
        }
    }

    #[must_use]
    pub fn with_idle_per_host(mut self, limit: usize) -> Self {
        self.idle_per_host = Some(limit);
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_keepalive(mut self, interval: Option<Duration>) -> Self {
        self.keepalive = interval;
        self
    }

    #[must_use]
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

/// Known Sui networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    /// A node started with `sui start` on the default port
    Localnet,
    /// Any other endpoint
    Custom,
}

impl Network {
    /// Public fullnode endpoint, or `None` for [`Network::Custom`].
    pub fn default_rpc_url(self) -> Option<&'static str> {
        Some(match self {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Localnet => "http://127.0.0.1:9000",
            Network::Custom => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
            Network::Custom => "custom",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "localnet" | "local" => Ok(Network::Localnet),
            other => Err(BuilderError::Config(format!("unknown network '{other}'"))),
        }
    }
}

/// Configuration for [`SuiClient`](crate::api::SuiClient).
///
/// ```rust
/// use std::time::Duration;
/// use sui_txn_builder::config::PoolConfig;
/// use sui_txn_builder::retry::RetryConfig;
/// use sui_txn_builder::SuiConfig;
///
/// let config = SuiConfig::testnet()
///     .with_timeout(Duration::from_secs(20))
///     .with_retry(RetryConfig::public_endpoint())
///     .with_pool(PoolConfig::default().with_idle_per_host(16));
/// assert!(config.rpc_url().unwrap().as_str().contains("testnet"));
/// ```
#[derive(Debug, Clone)]
pub struct SuiConfig {
    network: Network,
    endpoint: Option<Url>,
    timeout: Duration,
    retry: RetryConfig,
    pool: PoolConfig,
}

impl Default for SuiConfig {
    fn default() -> Self {
        Self::for_network(Network::Devnet)
    }
}

impl SuiConfig {
    /// Settings for a well-known network.
    ///
    /// Public networks get patient retries; `Localnet` gets a short timeout,
    /// quick retries and a small pool.
    pub fn for_network(network: Network) -> Self {
        let base = Self {
            network,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            pool: PoolConfig::default(),
        };
        match network {
            Network::Mainnet => base.with_retry(RetryConfig::public_endpoint()),
            Network::Localnet => base
                .with_timeout(Duration::from_secs(10))
                .with_retry(RetryConfig::local())
                .with_pool(PoolConfig::short_lived()),
            _ => base,
        }
    }

    pub fn mainnet() -> Self {
        Self::for_network(Network::Mainnet)
    }

    pub fn testnet() -> Self {
        Self::for_network(Network::Testnet)
    }

    pub fn devnet() -> Self {
        Self::for_network(Network::Devnet)
    }

    pub fn localnet() -> Self {
        Self::for_network(Network::Localnet)
    }

    /// Points at an arbitrary RPC endpoint.
    pub fn custom(rpc_url: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(rpc_url)?;
        Ok(Self {
            endpoint: Some(endpoint),
            ..Self::for_network(Network::Custom)
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn without_retry(self) -> Self {
        self.with_retry(RetryConfig::none())
    }

    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The endpoint requests are posted to.
    pub fn rpc_url(&self) -> BuilderResult<Url> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        let preset = self.network.default_rpc_url().ok_or_else(|| {
            BuilderError::Config("custom network configured without an RPC URL".into())
        })?;
        Ok(Url::parse(preset)?)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool
    }
}
