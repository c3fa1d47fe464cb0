use std::sync::Arc;

use mathlens_core::{Config, ConfigError, RateLimiter, SlidingWindowLimiter, Solver, UploadValidator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<Solver>,
    pub validator: UploadValidator,
    /// `None` when rate limiting is disabled
    pub limiter: Option<Arc<dyn RateLimiter>>,
    pub expose_upstream_errors: bool,
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Build state around an existing solver.
    pub fn new(solver: Solver, config: &Config) -> Self {
        let limiter = config.rate_limit.enabled.then(|| {
            Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit)) as Arc<dyn RateLimiter>
        });

        Self {
            solver: Arc::new(solver),
            validator: UploadValidator::new(&config.limits),
            limiter,
            expose_upstream_errors: config.server.expose_upstream_errors,
            trust_forwarded_for: config.server.trust_forwarded_for,
        }
    }

    /// Build state with real providers from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(Solver::from_config(config)?, config))
    }

    /// Replace the request gate.
    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }
}
