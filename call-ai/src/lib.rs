//! Provider abstraction layer for the external capabilities the call
//! intelligence pipeline consumes:
//! - LLM chat completion (summaries, adjudication, analysis)
//! - Remote file store search/list/download (Drive transcripts)
//! - Remote calendar event listing
//!
//! The design is provider-agnostic: the domain pipeline is written against
//! these traits, so swapping OpenAI for another model vendor or Drive for
//! another store only requires a new gateway implementation.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::completion::CompletionOptions;
pub use types::event::RemoteEvent;
pub use types::file::{FileQuery, RemoteFile};
