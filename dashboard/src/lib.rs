pub mod app;
pub mod bootstrap;
pub mod config;
pub mod events;
pub mod host;
pub mod server;
pub mod shutdown;

pub use bootstrap::{init_foundation, init_worker};
