//! Core functionality for file list management, conversion jobs, and configuration

pub mod config;
pub mod engine;
pub mod file_list;
pub mod job;
