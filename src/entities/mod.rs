//! Entity module - Contains the SeaORM entity definitions for the database.
//! The tracker keeps every record collection as a JSON document in one table.

pub mod collection;

pub use collection::{
    Column as CollectionColumn, Entity as CollectionEntity, Model as CollectionModel,
};
