pub mod completion;
pub mod event;
pub mod file;
