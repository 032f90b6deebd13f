//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with query filters within the domain layer, while encapsulating
//! the underlying implementation details remain in the `entity_api` crate.
pub use entity_api::{IntoQueryFilterMap, QueryFilterMap};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    calendar_events, calls, categories, classification_source, drive_file_status, drive_files,
    google_integrations, prompts, sentiment, users, Id,
};

pub mod calendar_sync;
pub mod call;
pub mod call_analysis;
pub mod call_import;
pub mod category;
pub mod category_classifier;
pub mod confidence_policy;
pub mod domain_classifier;
pub mod drive_sync;
pub mod error;
pub mod integration;
pub mod participants;
pub mod playbook;
pub mod prompt;
pub mod transcript_match;
pub mod user;

pub mod gateway;
