pub mod error;
pub mod event;
pub mod process;
pub mod store;
