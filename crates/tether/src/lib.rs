//! Tether - issue dependency graph engine.
//!
//! Tracks typed dependencies between issues (`blocks`, `relates`,
//! `duplicates`), keeps the `blocks` graph acyclic, and answers scheduling
//! questions: what is blocked, what is ready, and which chain of work is
//! longest.
//!
//! The crate ships both a library and the `tether` CLI.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod engine;
pub mod error;
pub mod id_generation;
pub mod storage;

// Repository context used by the CLI
pub mod app;
pub mod config;

// Public CLI module (needed by binary)
pub mod cli;
pub mod output;

pub use engine::DependencyEngine;
pub use error::{Error, Result};
