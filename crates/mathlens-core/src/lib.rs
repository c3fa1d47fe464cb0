//! mathlens core - upload validation and response normalization for
//! photographed math problems.
//!
//! # Architecture
//!
//! The core is stateless per request apart from the request gate:
//!
//! ```text
//! Upload → Validate → Provider call → Extract text → Recover JSON → {raw, parsed}
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use mathlens_core::{Config, ProviderKind, Solver, UploadValidator};
//!
//! #[tokio::main]
//! async fn main() -> mathlens_core::Result<()> {
//!     let config = Config::load()?;
//!     let solver = Solver::from_config(&config)?;
//!     let validator = UploadValidator::new(&config.limits);
//!
//!     let bytes = std::fs::read("problem.png")?;
//!     let upload = validator
//!         .validate_bytes(Some("image/png"), None, bytes)
//!         .map_err(mathlens_core::SolveError::from)?;
//!     let result = solver.solve(ProviderKind::Gemini, &upload).await?;
//!     println!("{:?}", result.parsed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod llm;
pub mod solver;
pub mod types;
pub mod upload;

// Re-exports for convenient access
pub use config::{Config, ProviderSettings};
pub use error::{ConfigError, MathlensError, Result, SolveError, SolveResult, UploadError};
pub use gate::{Clock, ManualClock, RateDecision, RateLimiter, SlidingWindowLimiter, SystemClock};
pub use llm::{extract_text, recover_json, Extraction, RawResponse, SolveProvider, SolveRequest};
pub use solver::Solver;
pub use types::{ErrorKind, ErrorResult, ImageFormat, ImageUpload, ParsedResult, ProviderKind};
pub use upload::UploadValidator;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
