// src/handlers/mod.rs

pub mod export;
