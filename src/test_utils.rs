//! Shared test utilities for `ProdTrack`.
//!
//! Helpers for setting up stores and creating users, entries and off-days with
//! sensible defaults.

use crate::{
    core::{
        entry::{self, NewPlan},
        notify::CollectingNotifier,
    },
    errors::Result,
    models::{Category, EntryStage, OffDay, ProductionEntry, Process, Role, Unit, User},
    store::{Collection, DbStore, MemoryStore, Store},
};
use chrono::{DateTime, Utc};

/// Creates an empty in-memory store.
/// This is the standard setup for business-logic tests.
#[allow(clippy::unused_async)]
pub async fn setup_memory_store() -> Result<MemoryStore> {
    Ok(MemoryStore::new())
}

/// Creates a database-backed store over an in-memory `SQLite` database with all
/// tables initialized.
pub async fn setup_db_store() -> Result<DbStore> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(DbStore::new(db))
}

/// Creates a user with the given id, name and role.
///
/// # Defaults
/// * `username`: lowercased name
/// * `password_hash`: placeholder, never verifies
/// * `chat_id`: None
#[must_use]
pub fn user_with_role(id: &str, name: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        username: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
        password_hash: "not-a-hash".to_string(),
        chat_id: None,
    }
}

/// Admin actor.
#[must_use]
pub fn admin_user() -> User {
    user_with_role("u-admin", "Amina", Role::Admin)
}

/// Manager actor.
#[must_use]
pub fn manager_user() -> User {
    user_with_role("u-manager", "Mahmud", Role::Manager)
}

/// Planner actor.
#[must_use]
pub fn planner_user() -> User {
    user_with_role("u-planner", "Priya", Role::Planner)
}

/// Operator actor.
#[must_use]
pub fn operator_user() -> User {
    user_with_role("u-operator", "Omar", Role::Operator)
}

/// Builds a planned entry without touching any store.
///
/// # Defaults
/// * Tablet, Mixing, "Paracetamol 500"
/// * plan 100 KG, no actual
#[must_use]
pub fn sample_entry(id: &str, date: &str) -> ProductionEntry {
    ProductionEntry {
        id: id.to_string(),
        date: date.to_string(),
        category: Category::Tablet,
        process: Process::Mixing,
        product_name: "Paracetamol 500".to_string(),
        plan_quantity: 100,
        actual_quantity: 0,
        unit: Unit::Kg,
        batch_no: None,
        manpower: 0,
        stage: Some(EntryStage::Planned),
        last_updated_by: "u-admin".to_string(),
        updated_at: DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default(),
    }
}

/// Plan input for the default product on `date`.
#[must_use]
pub fn plan_input(date: &str, quantity: i64) -> NewPlan {
    NewPlan {
        date: date.to_string(),
        category: Category::Tablet,
        process: Process::Mixing,
        product_name: "Paracetamol 500".to_string(),
        quantity,
        unit: Unit::Kg,
    }
}

/// Creates a plan for the default product through the real operation, acting as admin.
pub async fn create_test_plan<S: Store>(
    store: &S,
    date: &str,
    quantity: i64,
) -> Result<ProductionEntry> {
    entry::create_plan(
        store,
        &CollectingNotifier::new(),
        &admin_user(),
        plan_input(date, quantity),
    )
    .await
}

/// Marks `date` as an off-day.
pub async fn add_off_day<S: Store>(store: &S, date: &str, description: &str) -> Result<()> {
    let off_day = OffDay {
        date: date.to_string(),
        description: description.to_string(),
    };
    store
        .modify(Collection::OffDays, move |days: &mut Vec<OffDay>| {
            days.push(off_day);
            Ok(())
        })
        .await
}
