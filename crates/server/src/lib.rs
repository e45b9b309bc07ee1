//! FindItBack Server - HTTP REST API for lost-and-found matching
//!
//! Exposes report management and the lost/found matcher over a JSON API.
//!
//! - **Reports**: create, list, fetch, resolve, claim, return, delete
//! - **Matching**: per-report, per-caller and global match listings
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! Bearer tokens are resolved to caller identities by an
//! [`IdentityVerifier`]; store, matcher and verifier all live in
//! [`ServerState`] rather than in globals.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Protected Endpoints (Bearer Token Required)
//!
//! - `POST|GET /api/v1/lost`, `POST|GET /api/v1/found`
//! - `GET|DELETE /api/v1/lost/{id}`, `GET|DELETE /api/v1/found/{id}`
//! - `POST /api/v1/lost/{id}/resolve`
//! - `POST /api/v1/found/{id}/claim`, `POST /api/v1/found/{id}/return`
//! - `GET /api/v1/matches/lost/{id}`, `GET /api/v1/matches/found/{id}`
//! - `GET /api/v1/matches` (`minScore`, `limit`)
//! - `GET /api/v1/matches/my/lost`, `GET /api/v1/matches/my/found`

pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use identity::{CallerId, IdentityVerifier, StaticTokenVerifier};
pub use server::{build_router, start_server};
pub use state::ServerState;
