pub use super::calendar_events::Entity as CalendarEvents;
pub use super::calls::Entity as Calls;
pub use super::categories::Entity as Categories;
pub use super::drive_files::Entity as DriveFiles;
pub use super::google_integrations::Entity as GoogleIntegrations;
pub use super::prompts::Entity as Prompts;
pub use super::users::Entity as Users;
