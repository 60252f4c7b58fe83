//! Music taste profiles and track recommendations
//!
//! Turns community tags into mood/energy scores, builds listener taste profiles, and
//! assembles de-duplicated playlists from a seed artist and/or a stored profile. The
//! catalog and tag services are supplied by the host through the traits in
//! [`services::providers`].

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{AppError, AppResult};
pub use services::providers::{AccessToken, CatalogSource, Sources, TagSource};
