//! Client for the SiteBook REST backend.
//!
//! The backend owns the canonical project and timeline records; this crate
//! fetches and writes them over JSON. [`BackendClient`] implements
//! [`sitebook_models::RecordStore`], so code written against the trait runs
//! unchanged against the backend or the local store.
//!
//! ```no_run
//! use sitebook_client::{BackendClient, ClientConfig};
//! use sitebook_models::RecordStore;
//!
//! let config = ClientConfig::new("http://localhost:5000")?.with_token("secret");
//! let client = BackendClient::new(config)?;
//! let projects = client.list_projects()?;
//! # Ok::<(), sitebook_client::ClientError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::BackendClient;
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
