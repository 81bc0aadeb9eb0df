// src/models/subject.rs

use serde::{Deserialize, Serialize};

/// Represents the 'subjects' table in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}
