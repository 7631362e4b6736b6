pub mod app;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod download;
pub mod error;
pub mod fs_util;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod species;
