//! Mailwright: resilient webmail automation with generated content.
//!
//! The engine lives in the workspace crates; this crate wires them to a
//! real browser (chromiumoxide) and a command line.

pub mod config;
pub mod substrate;

pub use config::AppConfig;
pub use substrate::ChromiumLauncher;
