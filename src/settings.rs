use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub coordination: CoordinationConfig,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NodeConfig {
    /// Human-assigned label for display and diagnostics only. Lease ownership
    /// is compared by the process-lifetime node UUID, never by this label.
    #[serde(default = "default_node_label")]
    pub id: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            id: default_node_label(),
        }
    }
}

fn default_node_label() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "node".to_string())
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoordinationBackend {
    /// Single-node mode: no shared store, this node is always the leader.
    #[default]
    Standalone,
    /// Multi-node mode: leadership arbitrated through a Redis-compatible store.
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoordinationConfig {
    #[serde(default)]
    pub backend: CoordinationBackend,
    /// Connection URL for the shared store. Required when backend = "redis".
    pub redis_url: Option<String>,
    /// Namespace prefix for every coordination key this cluster writes.
    #[serde(default = "default_cluster_prefix")]
    pub cluster_prefix: String,
    /// Leader lease TTL in minutes. Converted to seconds for store calls.
    #[serde(default = "default_lease_ttl_minutes")]
    pub lease_ttl_minutes: u64,
    /// How often each node attempts election, in seconds.
    /// Defaults to half the lease TTL.
    pub election_interval_secs: Option<u64>,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            backend: CoordinationBackend::default(),
            redis_url: None,
            cluster_prefix: default_cluster_prefix(),
            lease_ttl_minutes: default_lease_ttl_minutes(),
            election_interval_secs: None,
        }
    }
}

fn default_cluster_prefix() -> String {
    "foreman".to_string()
}

fn default_lease_ttl_minutes() -> u64 {
    2
}

impl CoordinationConfig {
    pub fn lease_ttl(&self) -> Duration {
        Duration::from_secs(self.lease_ttl_minutes * 60)
    }

    pub fn election_interval(&self) -> Duration {
        match self.election_interval_secs {
            Some(secs) => Duration::from_secs(secs),
            None => self.lease_ttl() / 2,
        }
    }

    /// Reject configurations that would silently weaken mutual exclusion.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend == CoordinationBackend::Redis && self.redis_url.is_none() {
            anyhow::bail!("coordination backend is 'redis' but no redis_url is configured");
        }
        if self.lease_ttl_minutes == 0 {
            anyhow::bail!("lease_ttl_minutes must be at least 1");
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let cfg: Self = match path {
            Some(p) => {
                let data = fs::read_to_string(p)
                    .with_context(|| format!("reading config file {}", p.display()))?;
                toml::from_str(&data)?
            }
            None => Self::default(),
        };
        cfg.coordination.validate()?;
        Ok(cfg)
    }
}
