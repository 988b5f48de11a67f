//! Stencilbank - structural sentence fingerprinting and rewrite pipeline.
//!
//! Derives a language-agnostic structural fingerprint for each sentence
//! (clause structure, punctuation shape, length), matches fingerprints
//! against a persisted bank of sentence patterns, and drives long documents
//! through a crash-recoverable, rate-limited batch rewrite pipeline backed
//! by an external LLM oracle.

pub mod cli;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod oracle;
pub mod pipeline;
pub mod repository;
pub mod schema;
pub mod services;
pub mod text;

pub use error::{Error, Result};
