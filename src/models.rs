//! Record types persisted in the store and passed between the core modules.
//!
//! Documents are serialized with camelCase keys so the same JSON is understood by the
//! local store and the remote mirror.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Product category an entry belongs to. Reports are always scoped to one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Compressed tablets
    Tablet,
    /// Hard and soft capsules
    Capsule,
    /// Oral liquids
    Syrup,
    /// Sachets and bulk powders
    Powder,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 4] = [Self::Tablet, Self::Capsule, Self::Syrup, Self::Powder];

    /// Stable name used in storage, reports and file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tablet => "Tablet",
            Self::Capsule => "Capsule",
            Self::Syrup => "Syrup",
            Self::Powder => "Powder",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("Unknown category '{s}'")))
    }
}

/// Production process step. Names outside the known set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Process {
    /// Weighing out raw material
    Dispensing,
    /// Blending
    Mixing,
    /// Wet or dry granulation
    Granulation,
    /// Tablet pressing
    Compression,
    /// Capsule filling
    Encapsulation,
    /// Film or sugar coating
    Coating,
    /// Liquid or powder filling
    Filling,
    /// Secondary packing
    Packing,
    /// A process name not in the known set
    Other(String),
}

impl Process {
    /// Known processes in the fixed order used by the per-process breakdown.
    pub const KNOWN: [Self; 8] = [
        Self::Dispensing,
        Self::Mixing,
        Self::Granulation,
        Self::Compression,
        Self::Encapsulation,
        Self::Coating,
        Self::Filling,
        Self::Packing,
    ];

    /// Display and storage name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Dispensing => "Dispensing",
            Self::Mixing => "Mixing",
            Self::Granulation => "Granulation",
            Self::Compression => "Compression",
            Self::Encapsulation => "Encapsulation",
            Self::Coating => "Coating",
            Self::Filling => "Filling",
            Self::Packing => "Packing",
            Self::Other(name) => name,
        }
    }

    /// Whether this is one of [`Process::KNOWN`].
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for Process {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        Self::KNOWN
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_string()))
    }
}

impl From<&str> for Process {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Process> for String {
    fn from(value: Process) -> Self {
        match value {
            Process::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit of measure for plan and actual quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    /// Kilograms
    Kg,
    /// Litres
    Ltr,
    /// Pieces
    Pcs,
    /// Shipper boxes
    Box,
}

impl Unit {
    /// Every unit, in display order.
    pub const ALL: [Self; 4] = [Self::Kg, Self::Ltr, Self::Pcs, Self::Box];

    /// Short code as stored and shown.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "KG",
            Self::Ltr => "LTR",
            Self::Pcs => "PCS",
            Self::Box => "BOX",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("Unknown unit '{s}'")))
    }
}

/// Staff role. Determines which mutations a user may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including staff administration
    Admin,
    /// Plans, records, edits and deletes entries
    Manager,
    /// Creates plans
    Planner,
    /// Records actual output
    Operator,
}

impl Role {
    /// Every role.
    pub const ALL: [Self; 4] = [Self::Admin, Self::Manager, Self::Planner, Self::Operator];

    /// Lowercase role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Planner => "planner",
            Self::Operator => "operator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("Unknown role '{s}'")))
    }
}

/// Which half of an entry has been filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStage {
    /// Plan set, actual not yet recorded
    Planned,
    /// Actual output recorded
    Recorded,
}

impl EntryStage {
    /// Lowercase label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Recorded => "recorded",
        }
    }
}

/// One planned-or-recorded unit of work for a (date, category, process, product).
///
/// Plan and actual live on the same record: planning creates it with
/// `actual_quantity == 0`, recording the actual mutates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEntry {
    /// Opaque unique id (UUID v4)
    pub id: String,
    /// Normalized `YYYY-MM-DD` date key
    pub date: String,
    /// Product category
    pub category: Category,
    /// Process step
    pub process: Process,
    /// Free-text product name
    pub product_name: String,
    /// Planned output
    pub plan_quantity: u32,
    /// Recorded output, 0 until recorded
    pub actual_quantity: u32,
    /// Unit for both quantities
    pub unit: Unit,
    /// Lot identifier attached when the actual is recorded
    #[serde(default)]
    pub batch_no: Option<String>,
    /// Headcount that produced the actual
    #[serde(default)]
    pub manpower: u32,
    /// Explicit plan/actual stage; absent on documents written before it existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<EntryStage>,
    /// Id of the user who last wrote the entry
    pub last_updated_by: String,
    /// When the entry was last written
    pub updated_at: DateTime<Utc>,
}

impl ProductionEntry {
    /// Stage of the entry. Legacy documents without a stored stage count as recorded
    /// once an actual quantity is present.
    #[must_use]
    pub fn stage(&self) -> EntryStage {
        self.stage.unwrap_or(if self.actual_quantity > 0 {
            EntryStage::Recorded
        } else {
            EntryStage::Planned
        })
    }
}

/// A calendar holiday. Plans cannot be created on an off-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffDay {
    /// `YYYY-MM-DD` date key
    pub date: String,
    /// Holiday name
    pub description: String,
}

/// A staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Login name, unique ignoring case
    pub username: String,
    /// Contact address
    pub email: String,
    /// Access role
    pub role: Role,
    /// Argon2 PHC hash string
    pub password_hash: String,
    /// Chat-platform account bound to this user, if any
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// Kind of audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    /// A plan was created
    CreatePlan,
    /// An actual was recorded
    RecordActual,
    /// An entry edit changed at least one field
    EditEntry,
    /// An entry edit submitted no changes
    EditNoChange,
    /// An entry was deleted
    DeleteEntry,
    /// A user was added
    AddUser,
    /// A user was deleted
    DeleteUser,
    /// A user's role was changed
    ChangeRole,
    /// A user's password was reset
    ResetPassword,
    /// A chat account was linked to a user
    LinkChat,
}

impl LogAction {
    /// Tag shown in the activity log.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatePlan => "CREATE_PLAN",
            Self::RecordActual => "RECORD_ACTUAL",
            Self::EditEntry => "EDIT_ENTRY",
            Self::EditNoChange => "EDIT_NO_CHANGE",
            Self::DeleteEntry => "DELETE_ENTRY",
            Self::AddUser => "ADD_USER",
            Self::DeleteUser => "DELETE_USER",
            Self::ChangeRole => "CHANGE_ROLE",
            Self::ResetPassword => "RESET_PASSWORD",
            Self::LinkChat => "LINK_CHAT",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Opaque unique id
    pub id: String,
    /// Acting user id
    pub user_id: String,
    /// Acting user display name at the time of the action
    pub user_name: String,
    /// What happened
    pub action: LogAction,
    /// Human-readable description
    pub details: String,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_process_parsing_is_case_insensitive() {
        assert_eq!(Process::from("mixing"), Process::Mixing);
        assert_eq!(Process::from(" PACKING "), Process::Packing);
    }

    #[test]
    fn test_unknown_process_kept_verbatim() {
        let process = Process::from("Sterilization");
        assert_eq!(process, Process::Other("Sterilization".to_string()));
        assert!(!process.is_known());

        let json = serde_json::to_string(&process).unwrap();
        assert_eq!(json, "\"Sterilization\"");
        let back: Process = serde_json::from_str(&json).unwrap();
        assert_eq!(back, process);
    }

    #[test]
    fn test_unit_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Unit::Kg).unwrap(), "\"KG\"");
        assert_eq!("ltr".parse::<Unit>().unwrap(), Unit::Ltr);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = "Ointment".parse::<Category>().unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_legacy_entry_stage_inferred_from_actual() {
        let json = r#"{
            "id": "e1",
            "date": "2024-01-10",
            "category": "Tablet",
            "process": "Mixing",
            "productName": "Paracetamol 500",
            "planQuantity": 100,
            "actualQuantity": 80,
            "unit": "KG",
            "lastUpdatedBy": "u1",
            "updatedAt": "2024-01-10T08:00:00Z"
        }"#;
        let entry: ProductionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.stage, None);
        assert_eq!(entry.stage(), EntryStage::Recorded);
        assert_eq!(entry.manpower, 0);
        assert_eq!(entry.batch_no, None);
    }
}
