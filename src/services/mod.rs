// src/services/mod.rs

pub mod aggregate;
pub mod export;
pub mod rows;
pub mod status;
pub mod writer;
