//! # prazo notion
//!
//! Everything that talks to the Notion API: the HTTP client (liveness
//! check, cursor-paginated database queries, single page fetches), the
//! total property extractors, and the relation resolver.

pub mod client;
pub mod props;
pub mod relations;

pub use client::NotionClient;
