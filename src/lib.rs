//! # student-search
//!
//! Typed request building and result checking for an Elasticsearch-compatible
//! engine, exercised against a four-document student fixture.
//!
//! The engine does the indexing and scoring. This crate builds the JSON
//! request bodies ([`query`]), drives the index lifecycle over REST
//! ([`DocumentIndex`]), and checks responses against expected ids and scores
//! ([`scenarios`], [`results`]). [`scoring`] reproduces the engine's
//! function-score arithmetic so expected scores can be derived offline.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use student_search::{fixture, scenarios, ClientConfig, DocumentIndex, Student};
//!
//! # async fn run() -> student_search::Result<()> {
//! let config = ClientConfig::load_or_default(std::path::Path::new("."));
//! let index: DocumentIndex<Student> = DocumentIndex::new(config)?;
//!
//! for scenario in scenarios::all() {
//!     index.reset().await?;
//!     index.bulk_create(&fixture::load_default()?).await?;
//!     let res = index.search(&scenario.request).await?;
//!     if let Err(mismatch) = scenario.verify(&res) {
//!         eprintln!("{}: {}", scenario.name, mismatch);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod fixture;
pub mod index;
pub mod query;
pub mod results;
pub mod scenarios;
pub mod scoring;
pub mod types;

pub use client::EsClient;
pub use config::{ClientConfig, Visibility};
pub use error::{Result, SearchError};
pub use index::DocumentIndex;
pub use results::{IdOrder, Mismatch};
pub use scenarios::Scenario;
pub use types::*;

use tracing_subscriber::prelude::*;

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
