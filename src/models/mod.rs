//! Core data models for the media service.
//!
//! Stored objects come from the backing store; media entries are the
//! decorated, per-request view served to clients. Nothing here is persisted
//! by this service except through the store itself.

pub mod media;
pub mod object;
pub mod upload;
