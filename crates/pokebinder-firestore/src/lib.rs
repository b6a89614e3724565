//! Minimal Firestore REST client used by the document-store sink.
//!
//! Only the write path the sync needs is implemented: authenticate with a
//! service-account key and replace whole documents by id. [`MemoryStore`]
//! implements the same [`DocumentStore`] contract in-process.

pub mod client;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod store;
pub mod token;
pub mod value;

pub use client::FirestoreClient;
pub use credentials::ServiceAccountKey;
pub use error::FirestoreError;
pub use memory::MemoryStore;
pub use store::{Document, DocumentStore};
pub use token::{ServiceAccountTokenSource, StaticToken, TokenSource};
