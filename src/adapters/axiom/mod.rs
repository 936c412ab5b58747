//! Axiom Adapter
//!
//! Analytics ingest and APL query access.

mod client;

pub use client::{AxiomClient, AxiomConfig};
