//! The `mathlens serve` command.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use mathlens::{create_router, AppState};
use mathlens_core::{Config, ProviderKind};

/// Arguments for the `serve` command.
///
/// Every flag overrides the matching config file value.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, env = "MATHLENS_BIND")]
    pub bind: Option<String>,

    /// Upstream call timeout in milliseconds
    #[arg(long, env = "MATHLENS_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "MATHLENS_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<u64>,

    /// Directory with a built frontend to serve at `/`
    #[arg(long, env = "MATHLENS_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Disable the per-client request gate
    #[arg(long)]
    pub no_rate_limit: bool,

    /// Perplexity model name
    #[arg(long, env = "PERPLEXITY_MODEL")]
    pub perplexity_model: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// OpenAI model name
    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.limits.request_timeout_ms = timeout_ms;
        }
        if let Some(max) = self.max_upload_bytes {
            config.limits.max_upload_bytes = max;
        }
        if self.static_dir.is_some() {
            config.server.static_dir = self.static_dir;
        }
        if self.no_rate_limit {
            config.rate_limit.enabled = false;
        }

        let models = [
            (ProviderKind::Perplexity, self.perplexity_model),
            (ProviderKind::Gemini, self.gemini_model),
            (ProviderKind::OpenAi, self.openai_model),
        ];
        for (kind, model) in models {
            if let Some(model) = model {
                config.provider_mut(kind).model = model;
            }
        }
    }
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.check()?;

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

    let state = AppState::from_config(&config)?;
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        addr = %addr,
        max_upload_bytes = config.limits.max_upload_bytes,
        timeout_ms = config.limits.request_timeout_ms,
        rate_limit = config.rate_limit.enabled,
        "Server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        ServeArgs {
            bind: Some("0.0.0.0:9000".to_string()),
            timeout_ms: Some(5_000),
            max_upload_bytes: Some(1024),
            no_rate_limit: true,
            gemini_model: Some("gemini-2.0-flash".to_string()),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.limits.request_timeout_ms, 5_000);
        assert_eq!(config.limits.max_upload_bytes, 1024);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.providers.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.providers.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config::default();
        ServeArgs::default().apply(&mut config);
        assert_eq!(config.server.bind, Config::default().server.bind);
        assert!(config.rate_limit.enabled);
    }
}
