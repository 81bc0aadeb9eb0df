// src/models/mod.rs

pub mod export_row;
pub mod subject;
pub mod submission;
