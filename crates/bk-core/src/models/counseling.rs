//! Counseling note domain model.
//!
//! `internal_note` is confidential to the counseling (BK) role. Only
//! `parent_summary` may be shown to anyone else. Read paths must go
//! through the visibility projector in `bk-service`; this type is never
//! handed to a presentation layer directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::DateRange;

#[derive(Debug, Clone)]
pub struct CounselingNote {
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub internal_note: String,
    pub parent_summary: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateCounselingNote {
    pub student_id: Uuid,
    pub internal_note: String,
    pub parent_summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCounselingNote {
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub internal_note: String,
    pub parent_summary: Option<String>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCounselingNote {
    pub internal_note: Option<String>,
    /// `Some(Some(val))` = replace, `Some(None)` = clear, `None` = no change.
    pub parent_summary: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CounselingNoteFilter {
    pub student_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    #[serde(flatten)]
    pub dates: DateRange,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}
