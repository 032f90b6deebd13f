use uuid::Uuid;

pub mod prelude;

// Core entities
pub mod calendar_events;
pub mod calls;
pub mod categories;
pub mod drive_files;
pub mod google_integrations;
pub mod prompts;
pub mod users;

// Shared enums
pub mod classification_source;
pub mod drive_file_status;
pub mod sentiment;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
