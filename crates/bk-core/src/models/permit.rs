//! Exit permit domain model.
//!
//! A permit is either open (the student has left and not come back yet)
//! or returned. The transition is one-way.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::repository::DateRange;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PermitStatus {
    Open,
    Returned,
}

/// Serializes with the derived `has_returned` and `status` alongside the
/// stored fields; both are ignored when deserializing.
#[derive(Debug, Clone, Deserialize)]
pub struct Permit {
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub reason: String,
    pub exit_time: DateTime<Utc>,
    pub return_time: Option<DateTime<Utc>>,
    pub responsible_teacher_id: Uuid,
    /// Set by the external export step once a receipt has been rendered.
    pub document_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Permit {
    pub fn has_returned(&self) -> bool {
        self.return_time.is_some()
    }

    pub fn status(&self) -> PermitStatus {
        if self.has_returned() {
            PermitStatus::Returned
        } else {
            PermitStatus::Open
        }
    }
}

impl Serialize for Permit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Permit", 12)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("school_id", &self.school_id)?;
        state.serialize_field("student_id", &self.student_id)?;
        state.serialize_field("reason", &self.reason)?;
        state.serialize_field("exit_time", &self.exit_time)?;
        state.serialize_field("return_time", &self.return_time)?;
        state.serialize_field("has_returned", &self.has_returned())?;
        state.serialize_field("status", &self.status())?;
        state.serialize_field("responsible_teacher_id", &self.responsible_teacher_id)?;
        state.serialize_field("document_url", &self.document_url)?;
        state.serialize_field("created_by", &self.created_by)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreatePermit {
    pub student_id: Uuid,
    pub reason: String,
    pub exit_time: Option<DateTime<Utc>>,
    pub responsible_teacher_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewPermit {
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub reason: String,
    pub exit_time: DateTime<Utc>,
    pub responsible_teacher_id: Uuid,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecordReturn {
    pub return_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PermitFilter {
    pub student_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub responsible_teacher_id: Option<Uuid>,
    pub has_returned: Option<bool>,
    /// Applied to `exit_time`.
    #[serde(flatten)]
    pub dates: DateRange,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Data printed on a permit receipt. Produced on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermitDocument {
    pub permit_id: Uuid,
    pub student_name: String,
    pub student_nis: String,
    pub student_nisn: String,
    pub class_name: String,
    pub school_name: String,
    pub reason: String,
    pub exit_time: DateTime<Utc>,
    pub responsible_teacher: String,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permit(return_time: Option<DateTime<Utc>>) -> Permit {
        let now = Utc::now();
        Permit {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            reason: "Dentist appointment".into(),
            exit_time: now,
            return_time,
            responsible_teacher_id: Uuid::new_v4(),
            document_url: None,
            created_by: Uuid::new_v4(),
            created_at: now,
        }
    }

    #[test]
    fn json_reports_return_state() {
        let open = serde_json::to_value(permit(None)).unwrap();
        assert_eq!(open["has_returned"], false);
        assert_eq!(open["status"], "open");
        assert!(open["return_time"].is_null());

        let back = serde_json::to_value(permit(Some(Utc::now()))).unwrap();
        assert_eq!(back["has_returned"], true);
        assert_eq!(back["status"], "returned");
    }

    #[test]
    fn json_reads_back_without_derived_fields() {
        let original = permit(Some(Utc::now()));
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Permit = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, original.id);
        assert_eq!(parsed.status(), PermitStatus::Returned);
    }
}
