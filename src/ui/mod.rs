//! UI panels for Paperdrop

pub mod file_list;
pub mod progress;
