//! bridge-buddy: retrieval-augmented tutor for ProtoPie Bridge
//!
//! An offline batch job (`build-kb`) indexes a document corpus into a vector
//! store in failure-isolated batches; the serving process (`buddy-server`)
//! answers questions over HTTP by retrieving the most relevant chunks and
//! forwarding them as context to a hosted generative model.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod query;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::BuddyConfig;
pub use error::{Error, Result};
pub use types::{Chunk, Document};
