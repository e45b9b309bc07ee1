use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::identity::{IdentityVerifier, StaticTokenVerifier};
use crate::telemetry::PrometheusMatchMetrics;
use dashmap::DashMap;
use finditback::FinditbackConfig;
use matcher::{MatchConfig, Matcher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::{InMemoryStore, ReportStore};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: caller id -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, Instant)>>,

    /// Report store (shared across requests)
    pub store: Arc<dyn ReportStore>,

    /// Matcher instance (shared across requests)
    pub matcher: Arc<Matcher>,

    /// Bearer token verifier
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl ServerState {
    /// Create server state with the in-memory store and the static token verifier
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let match_config = match &config.matcher_config_path {
            Some(path) => {
                tracing::info!(path = %path, "loading matcher configuration");
                FinditbackConfig::from_file(path)?.to_match_config()?
            }
            None => MatchConfig::default(),
        };

        let mut matcher = Matcher::new(match_config)?;
        if config.metrics_enabled {
            matcher = matcher.with_metrics(Arc::new(PrometheusMatchMetrics));
        }

        let verifier = StaticTokenVerifier::new(config.tokens.clone());

        Ok(Self::with_parts(
            config,
            Arc::new(InMemoryStore::new()),
            Arc::new(matcher),
            Arc::new(verifier),
        ))
    }

    /// Assemble state from explicit collaborators
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn ReportStore>,
        matcher: Arc<Matcher>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            store,
            matcher,
            verifier,
        }
    }

    /// Check rate limit for a caller; fixed one-minute window
    pub fn check_rate_limit(&self, caller: &str) -> bool {
        let now = Instant::now();
        let window = Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self
            .rate_limiter
            .entry(caller.to_string())
            .or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}
