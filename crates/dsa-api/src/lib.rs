pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod jobs;
pub mod master;
pub mod metrics;
pub mod middleware;
pub mod profile;
pub mod progress;
pub mod quiz;
pub mod roadmap;
pub mod router;
pub mod state;
pub mod tracing;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
