//! Structural checks, tenancy checks and point defaulting applied before
//! any case record is written.

use bk_core::error::{BkError, BkResult};
use bk_core::models::caller::Caller;
use bk_core::models::category::ViolationCategory;
use bk_core::models::roster::{StaffRecord, StudentRecord};
use bk_core::models::violation::ViolationLevel;
use bk_core::repository::{StaffDirectory, StudentDirectory};
use tracing::warn;
use uuid::Uuid;

/// Trim `value` and reject it if nothing is left.
pub fn require_text(field: &'static str, value: &str) -> BkResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BkError::missing(field));
    }
    Ok(trimmed.to_string())
}

pub fn require_id(field: &'static str, id: Uuid) -> BkResult<Uuid> {
    if id.is_nil() {
        return Err(BkError::missing(field));
    }
    Ok(id)
}

/// Trim an optional free-text field, mapping blank input to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the raw level text of a violation command.
pub fn parse_level(raw: &str) -> BkResult<ViolationLevel> {
    if raw.trim().is_empty() {
        return Err(BkError::missing("level"));
    }
    raw.parse()
}

/// Zero is treated as "not supplied".
pub fn achievement_point(point: i64) -> BkResult<i64> {
    match point {
        0 => Err(BkError::missing("point")),
        p if p < 0 => Err(BkError::rule("achievement point must be positive")),
        p => Ok(p),
    }
}

pub fn category_point(point: i64) -> BkResult<i64> {
    if point > 0 {
        return Err(BkError::rule("category default point must be zero or negative"));
    }
    Ok(point)
}

/// Resolve the point charged for a violation.
///
/// First match wins: the caller's explicit value, then the default of an
/// active category, then the level constant.
pub fn resolve_violation_point(
    explicit: Option<i64>,
    category: Option<&ViolationCategory>,
    level: ViolationLevel,
) -> i64 {
    if let Some(point) = explicit {
        if point > 0 {
            warn!(point, "Explicit violation point is positive; accepted as given");
        }
        return point;
    }
    match category {
        Some(c) if c.is_active => c.default_point,
        _ => level.default_point(),
    }
}

/// Look up a student and make sure it belongs to the caller's school.
pub async fn resolve_student<St: StudentDirectory>(
    students: &St,
    caller: &Caller,
    student_id: Uuid,
) -> BkResult<StudentRecord> {
    let student = students
        .find_student_by_id(require_id("student_id", student_id)?)
        .await?;
    if student.school_id != caller.school_id {
        warn!(
            student_id = %student_id,
            school_id = %caller.school_id,
            "Student belongs to another school"
        );
        return Err(BkError::TenancyViolation { entity: "student" });
    }
    Ok(student)
}

/// Look up the staff member responsible for a permit.
///
/// Platform accounts without a school never qualify.
pub async fn resolve_teacher<Sf: StaffDirectory>(
    staff: &Sf,
    caller: &Caller,
    teacher_id: Uuid,
) -> BkResult<StaffRecord> {
    let teacher = match staff
        .find_user_by_id(require_id("responsible_teacher_id", teacher_id)?)
        .await
    {
        Ok(t) => t,
        Err(BkError::NotFound { .. }) => return Err(BkError::not_found("teacher", teacher_id)),
        Err(e) => return Err(e),
    };
    if teacher.school_id != Some(caller.school_id) {
        return Err(BkError::TenancyViolation { entity: "teacher" });
    }
    Ok(teacher)
}
