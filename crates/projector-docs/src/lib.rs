pub mod auth;
pub mod client;
pub mod error;

pub use client::{extract_doc_id, DocsClient, FetchedDoc};
pub use error::DocsError;
