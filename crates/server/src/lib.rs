//! Credit scorer HTTP service
//!
//! Thin routing layer over the resident model in `scoring-lib`.

pub mod api;
pub mod config;
