pub mod analyzer;
pub mod cli;
pub mod config;
pub mod display;
pub mod export;
pub mod filter;
pub mod harvester;
pub mod record;

pub use record::{Source, UrlRecord};
