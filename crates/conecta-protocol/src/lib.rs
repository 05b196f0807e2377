//! Shared types for the Conecta client.
//!
//! Record types mirror the rows the backend returns (including joined
//! relations), the events module defines the realtime wire format, and the
//! roles module holds the capability predicates the UI gates on.

pub mod events;
pub mod roles;
pub mod types;

pub use events::*;
pub use roles::*;
pub use types::*;
