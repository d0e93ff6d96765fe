//! services/api/src/lib.rs
//!
//! The KalaKriti marketplace service: adapters, configuration and the HTTP surface.

pub mod adapters;
pub mod config;
pub mod credentials;
pub mod error;
pub mod web;
