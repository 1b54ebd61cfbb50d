//! Draft/auto-save client for deal room editing.
//!
//! Talks to the remote draft store over HTTP ([`api::DraftStoreApi`]),
//! tracks the per-editor save state ([`status::SaveStatus`]), and
//! orchestrates debounced auto-save, manual save, publish, conflict
//! detection, and crash recovery ([`autosave::AutosaveController`]).
//! Save outcomes are broadcast as [`events::SaveEvent`]s.

pub mod api;
pub mod autosave;
pub mod events;
pub mod status;
