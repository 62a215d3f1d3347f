//! In-memory storage backend.
//!
//! Holds every dependency edge (and, for local use, every issue summary) in
//! RAM. Data is **lost when the process exits** unless written out with the
//! JSONL helpers re-exported here, which is what the JSONL backend in
//! [`crate::storage`] does.
//!
//! # Architecture
//!
//! - [`InMemoryEdgeStore`]: edges in insertion order, with hash indexes by id,
//!   source, target and type. Every query is answered from an index and
//!   returns edges in insertion order.
//! - [`IssueRegistry`]: `HashMap<IssueId, IssueSummary>`; listings are sorted
//!   by identifier.
//!
//! Both are `Arc<tokio::sync::Mutex<_>>` handles, so clones share state and
//! every method takes `&self`.
//!
//! # Edge Direction
//!
//! Edges are stored exactly as inserted. `blocks` edges point from the
//! blocker to the blocked issue; `relates` and `duplicates` keep whichever
//! direction the caller used and are read symmetrically by the engine.

mod edges;
mod inner;
mod issues;
mod jsonl;

pub use edges::InMemoryEdgeStore;
pub use issues::IssueRegistry;
pub use jsonl::{
    load_edges_from_jsonl, load_issues_from_jsonl, save_edges_to_jsonl, save_issues_to_jsonl,
    LoadWarning,
};
