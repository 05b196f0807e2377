//! Per-entity data access over the backend client.
//!
//! Each module owns its entity's query keys, fetches (shaped into
//! `conecta-protocol` types, joined relations included) and mutations.
//! Screens never touch the backend client directly.

pub mod announcements;
pub mod events;
pub mod invites;
pub mod members;
pub mod messages;
pub mod ministries;
pub mod profiles;
pub mod push;
