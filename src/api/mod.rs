//! Spot backend client
//!
//! JSON over HTTP to the Vagas+ backend: the spot list, crowd-sourced
//! status reports and violation reports.

pub mod client;

pub use client::BackendClient;
