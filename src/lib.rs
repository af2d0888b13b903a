pub mod app;
pub mod command;
pub mod config;
pub mod logging;
pub mod sample;
pub mod session;

pub use app::App;
pub use session::{History, HistoryEntry, Session};
