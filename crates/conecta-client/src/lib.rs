//! Conecta client library
//!
//! This crate provides the core functionality for the Conecta desktop
//! client: the backend client, the query cache, per-entity data access, and
//! the egui screens.

pub mod backend;
pub mod cache;
pub mod data;
pub mod state;
pub mod ui;
