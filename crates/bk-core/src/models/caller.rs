//! Caller identity injected into every service operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    SuperAdmin,
    SchoolAdmin,
    /// Counseling and discipline staff (guru BK).
    Counselor,
    HomeroomTeacher,
    Teacher,
    Parent,
    Student,
}

impl StaffRole {
    /// Whether this role may see confidential counseling content.
    pub fn can_read_internal_notes(self) -> bool {
        matches!(self, Self::Counselor)
    }

    /// Whether this role may create, change or delete counseling notes.
    pub fn can_author_counseling(self) -> bool {
        matches!(self, Self::Counselor)
    }
}

/// Who is making the request and on behalf of which school.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Caller {
    /// Tenant the request is scoped to.
    pub school_id: Uuid,
    pub user_id: Uuid,
    pub role: StaffRole,
}

impl Caller {
    pub fn new(school_id: Uuid, user_id: Uuid, role: StaffRole) -> Self {
        Self {
            school_id,
            user_id,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_counselors_see_internal_notes() {
        assert!(StaffRole::Counselor.can_read_internal_notes());
        for role in [
            StaffRole::SuperAdmin,
            StaffRole::SchoolAdmin,
            StaffRole::HomeroomTeacher,
            StaffRole::Teacher,
            StaffRole::Parent,
            StaffRole::Student,
        ] {
            assert!(!role.can_read_internal_notes(), "{role:?}");
            assert!(!role.can_author_counseling(), "{role:?}");
        }
    }
}
