//! Collection entity - One JSON document per named record collection.
//!
//! The tracker persists each collection (entries, users, off-days, activity log) as a
//! single serialized document keyed by collection name. `version` is bumped on every
//! write so concurrent writers can be told apart in the logs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Collection database model - stores one serialized collection per row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Collection name (e.g., `"production_entries"`)
    #[sea_orm(unique)]
    pub key: String,
    /// JSON array of records
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// Write counter, starts at 1
    pub version: i64,
    /// When this collection was last written
    pub updated_at: DateTime,
}

/// `Collection` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
