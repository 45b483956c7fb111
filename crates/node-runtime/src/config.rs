//! Node configuration.
//!
//! Defaults suit a development node; every knob can be overridden with an
//! `LA_*` environment variable.

use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Reconciliation poll period.
    pub engine_tick: Duration,
    /// Timeout sweep period.
    pub sweep_interval: Duration,
    /// Gossip outbox drain period.
    pub gossip_interval: Duration,
    /// Maximum on-chain rows processed per engine tick, and maximum
    /// records per gossip drain.
    pub batch_size: usize,
    /// Blocks an unmatched row or unsettled escrow may linger.
    pub retention_window: u64,
    /// Seconds an unconfirmed mint may await its on-chain half.
    pub mint_ttl_secs: u64,
    /// Follower channel capacity.
    pub follower_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_tick: Duration::from_millis(1_000),
            sweep_interval: Duration::from_secs(60),
            gossip_interval: Duration::from_secs(5),
            batch_size: 100,
            retention_window: 100,
            mint_ttl_secs: 86_400,
            follower_buffer: 256,
        }
    }
}

impl Config {
    /// Defaults overridden from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env_u64("LA_ENGINE_TICK_MS") {
            config.engine_tick = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("LA_SWEEP_INTERVAL_MS") {
            config.sweep_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("LA_GOSSIP_INTERVAL_MS") {
            config.gossip_interval = Duration::from_millis(ms);
        }
        if let Some(n) = env_u64("LA_BATCH_SIZE") {
            config.batch_size = n as usize;
        }
        if let Some(n) = env_u64("LA_RETENTION_WINDOW") {
            config.retention_window = n;
        }
        if let Some(n) = env_u64("LA_MINT_TTL_SECS") {
            config.mint_ttl_secs = n;
        }
        if let Some(n) = env_u64("LA_FOLLOWER_BUFFER") {
            config.follower_buffer = n.max(1) as usize;
        }
        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparsable override");
            None
        }
    }
}
