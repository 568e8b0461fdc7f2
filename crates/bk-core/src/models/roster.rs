//! Read models for the roster collaborators.
//!
//! Students, classes, schools and staff accounts are provisioned by
//! another subsystem. The BK core only reads them to check tenancy and
//! to label its views.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student as seen through the student lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: Uuid,
    /// Tenant the student belongs to.
    pub school_id: Uuid,
    pub school_name: String,
    pub class_id: Option<Uuid>,
    pub class_name: Option<String>,
    pub name: String,
    pub nis: String,
    pub nisn: String,
}

/// A staff account as seen through the staff lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffRecord {
    pub id: Uuid,
    /// `None` for platform-level accounts that belong to no school.
    pub school_id: Option<Uuid>,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSchool {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncClass {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStudent {
    pub id: Uuid,
    pub school_id: Uuid,
    pub class_id: Option<Uuid>,
    pub name: String,
    pub nis: String,
    pub nisn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStaff {
    pub id: Uuid,
    pub school_id: Option<Uuid>,
    pub username: String,
    pub name: String,
}
