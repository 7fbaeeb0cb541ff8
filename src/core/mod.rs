pub mod completion;
pub mod import;
pub mod ownership;
pub mod policy;
pub mod rooms;
pub mod runtime;
pub mod schedule;
pub mod state;
pub mod sweep;
pub mod timeline;
pub mod watchdog;
