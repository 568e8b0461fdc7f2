//! Row helpers shared by the SurrealDB repositories.

use bk_core::models::violation::ViolationLevel;
use bk_core::repository::RecordQuery;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub total: u64,
}

/// Row struct for `math::sum` queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct SumRow {
    pub total: i64,
}

pub(crate) fn first_count(rows: Vec<CountRow>) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}

pub(crate) fn first_sum(rows: Vec<SumRow>) -> i64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}

pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    field: &str,
) -> Result<Option<Uuid>, DbError> {
    value.as_deref().map(|v| parse_uuid(v, field)).transpose()
}

pub(crate) fn parse_level(value: &str) -> Result<ViolationLevel, DbError> {
    value
        .parse()
        .map_err(|_| DbError::Decode(format!("unknown violation level: {value}")))
}

/// `WHERE` clause builder for tenant-scoped listings.
///
/// The clause always starts with `school_id = $school_id`. Each optional
/// condition references a parameter that the caller binds unconditionally
/// (as `NONE` when unused).
pub(crate) struct Conditions {
    clauses: Vec<String>,
}

impl Conditions {
    pub fn for_school() -> Self {
        Self {
            clauses: vec!["school_id = $school_id".into()],
        }
    }

    pub fn push(&mut self, clause: impl Into<String>) {
        self.clauses.push(clause.into());
    }

    /// Add the student and time-window conditions of a [`RecordQuery`].
    pub fn with_scope(mut self, scope: &RecordQuery, time_field: &str) -> Self {
        if scope.student_ids.is_some() {
            self.push("student_id IN $student_ids");
        }
        if scope.from.is_some() {
            self.push(format!("{time_field} >= $from"));
        }
        if scope.until.is_some() {
            self.push(format!("{time_field} < $until"));
        }
        self
    }

    pub fn render(&self) -> String {
        self.clauses.join(" AND ")
    }
}

pub(crate) fn scope_student_ids(scope: &RecordQuery) -> Option<Vec<String>> {
    scope
        .student_ids
        .as_ref()
        .map(|ids| ids.iter().map(Uuid::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn conditions_only_include_set_filters() {
        let scope = RecordQuery {
            student_ids: Some(vec![]),
            from: Some(Utc::now()),
            until: None,
        };
        let rendered = Conditions::for_school()
            .with_scope(&scope, "exit_time")
            .render();
        assert_eq!(
            rendered,
            "school_id = $school_id AND student_id IN $student_ids AND exit_time >= $from"
        );
    }

    #[test]
    fn bad_level_is_a_decode_error() {
        assert!(matches!(parse_level("extreme"), Err(DbError::Decode(_))));
        assert_eq!(parse_level("severe").unwrap(), ViolationLevel::Severe);
    }
}
