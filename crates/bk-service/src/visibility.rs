//! Role-dependent projection of counseling notes.
//!
//! Counselors get the [`CounselingNoteView::Full`] shape. Everyone else
//! gets [`CounselingNoteView::Restricted`], which has no `internal_note`
//! field at all.

use bk_core::models::caller::StaffRole;
use bk_core::models::counseling::CounselingNote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullNote {
    pub id: Uuid,
    pub student_id: Uuid,
    pub internal_note: String,
    pub parent_summary: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestrictedNote {
    pub id: Uuid,
    pub student_id: Uuid,
    pub parent_summary: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "visibility", rename_all = "snake_case")]
pub enum CounselingNoteView {
    Full(FullNote),
    Restricted(RestrictedNote),
}

impl CounselingNoteView {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Full(n) => n.id,
            Self::Restricted(n) => n.id,
        }
    }

    pub fn parent_summary(&self) -> Option<&str> {
        match self {
            Self::Full(n) => n.parent_summary.as_deref(),
            Self::Restricted(n) => n.parent_summary.as_deref(),
        }
    }
}

pub fn project(note: CounselingNote, role: StaffRole) -> CounselingNoteView {
    if role.can_read_internal_notes() {
        CounselingNoteView::Full(FullNote {
            id: note.id,
            student_id: note.student_id,
            internal_note: note.internal_note,
            parent_summary: note.parent_summary,
            created_by: note.created_by,
            created_at: note.created_at,
            updated_at: note.updated_at,
        })
    } else {
        CounselingNoteView::Restricted(RestrictedNote {
            id: note.id,
            student_id: note.student_id,
            parent_summary: note.parent_summary,
            created_by: note.created_by,
            created_at: note.created_at,
            updated_at: note.updated_at,
        })
    }
}

pub fn project_all(notes: Vec<CounselingNote>, role: StaffRole) -> Vec<CounselingNoteView> {
    notes.into_iter().map(|n| project(n, role)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> CounselingNote {
        CounselingNote {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            internal_note: "Conflict at home".into(),
            parent_summary: Some("Discussed study habits".into()),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn counselor_sees_everything() {
        let view = project(note(), StaffRole::Counselor);
        match view {
            CounselingNoteView::Full(full) => assert_eq!(full.internal_note, "Conflict at home"),
            other => panic!("expected full view, got {other:?}"),
        }
    }

    #[test]
    fn restricted_shape_has_no_internal_note() {
        for role in [StaffRole::HomeroomTeacher, StaffRole::Parent, StaffRole::SchoolAdmin] {
            let view = project(note(), role);
            assert!(matches!(view, CounselingNoteView::Restricted(_)));
            assert_eq!(view.parent_summary(), Some("Discussed study habits"));

            let json = serde_json::to_value(&view).unwrap();
            assert_eq!(json["visibility"], "restricted");
            assert!(json.get("internal_note").is_none());
            assert!(!json.to_string().contains("Conflict at home"));
        }
    }
}
