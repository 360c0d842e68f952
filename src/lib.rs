pub mod app;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fill;
pub mod fs_util;
pub mod output;
pub mod store;
