//! HTTP clients for the external services the pipeline depends on. Each
//! client implements the matching provider trait so the domain logic stays
//! provider-agnostic.

pub mod google_calendar;
pub mod google_drive;
pub mod openai;
