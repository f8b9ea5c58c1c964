//! # Doc Compare
//!
//! Compares pairs (or sets) of plain-text documents and produces a
//! composite report: lexical diff, semantic overlap, sentiment and tone
//! signals, optionally enriched by a translation service and an AI
//! narrative backend.
//!
//! The pure comparison engine lives in [`doc_compare_core`]. This crate
//! adds everything that talks to the outside world.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌──────────────────────┐
//! │  raw text  │──▶│ Translation │──▶│ diff │ semantic │ ... │
//! └────────────┘   └──────┬──────┘   └──────────┬───────────┘
//!                         │                     ▼
//!                  ┌──────┴──────┐       ┌──────────────┐
//!                  │ RemoteCaller│◀──────│   Insights   │
//!                  │ retry+chunk │       │  aggregator  │
//!                  └─────────────┘       └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`remote`] | HTTP calls with retry and backoff |
//! | [`translate`] | Translation and language detection backends |
//! | [`narrative`] | AI narrative backend and prompts |
//! | [`insights`] | Single-call aggregate report |
//! | [`views`] | Diff, corpus, keyword and metric views for the CLI |

pub mod config;
pub mod insights;
pub mod narrative;
pub mod remote;
pub mod translate;
pub mod views;
