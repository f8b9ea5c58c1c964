//! # Doc Compare Core
//!
//! Pure comparison logic for doc-compare: data models, chunking, lexical
//! diff, text metrics, the analysis capability traits with a local
//! heuristic backend, and the semantic, sentiment and tone comparators.
//!
//! This crate contains no async runtime, HTTP client, or filesystem I/O.
//! Every function takes already-extracted text and returns plain data;
//! degenerate input (empty documents, single-document corpora) yields
//! defined neutral values instead of errors.

pub mod analysis;
pub mod chunk;
pub mod diff;
pub mod metrics;
pub mod models;
pub mod semantic;
pub mod sentiment;
pub mod tone;
