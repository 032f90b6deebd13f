pub mod calendar;
pub mod completion;
pub mod file_store;
