//! SurrealDB implementation of [`PermitRepository`].

use bk_core::error::BkResult;
use bk_core::models::permit::{NewPermit, Permit};
use bk_core::repository::{PaginatedResult, Pagination, PermitQuery, PermitRepository};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::support::{Conditions, CountRow, first_count, parse_uuid, scope_student_ids};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermitRow {
    school_id: String,
    student_id: String,
    reason: String,
    exit_time: DateTime<Utc>,
    return_time: Option<DateTime<Utc>>,
    responsible_teacher_id: String,
    document_url: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl PermitRow {
    fn try_into_permit(self, id: Uuid) -> Result<Permit, DbError> {
        Ok(Permit {
            id,
            school_id: parse_uuid(&self.school_id, "school")?,
            student_id: parse_uuid(&self.student_id, "student")?,
            reason: self.reason,
            exit_time: self.exit_time,
            return_time: self.return_time,
            responsible_teacher_id: parse_uuid(&self.responsible_teacher_id, "teacher")?,
            document_url: self.document_url,
            created_by: parse_uuid(&self.created_by, "creator")?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct PermitRowWithId {
    record_id: String,
    school_id: String,
    student_id: String,
    reason: String,
    exit_time: DateTime<Utc>,
    return_time: Option<DateTime<Utc>>,
    responsible_teacher_id: String,
    document_url: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl PermitRowWithId {
    fn try_into_permit(self) -> Result<Permit, DbError> {
        let id = parse_uuid(&self.record_id, "permit")?;
        PermitRow {
            school_id: self.school_id,
            student_id: self.student_id,
            reason: self.reason,
            exit_time: self.exit_time,
            return_time: self.return_time,
            responsible_teacher_id: self.responsible_teacher_id,
            document_url: self.document_url,
            created_by: self.created_by,
            created_at: self.created_at,
        }
        .try_into_permit(id)
    }
}

fn not_found(id: String) -> DbError {
    DbError::NotFound {
        entity: "permit".into(),
        id,
    }
}

/// SurrealDB implementation of the exit permit repository.
#[derive(Clone)]
pub struct SurrealPermitRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermitRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermitRepository for SurrealPermitRepository<C> {
    async fn create(&self, input: NewPermit) -> BkResult<Permit> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permit', $id) SET \
                 school_id = $school_id, student_id = $student_id, \
                 reason = $reason, exit_time = $exit_time, \
                 responsible_teacher_id = $teacher_id, created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("reason", input.reason))
            .bind(("exit_time", input.exit_time))
            .bind(("teacher_id", input.responsible_teacher_id.to_string()))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PermitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_permit(id)?)
    }

    async fn get_by_id(&self, school_id: Uuid, id: Uuid) -> BkResult<Permit> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('permit', $id) \
                 WHERE school_id = $school_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_permit(id)?)
    }

    async fn list_by_student(&self, school_id: Uuid, student_id: Uuid) -> BkResult<Vec<Permit>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permit \
                 WHERE school_id = $school_id AND student_id = $student_id \
                 ORDER BY exit_time DESC",
            )
            .bind(("school_id", school_id.to_string()))
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermitRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PermitRowWithId::try_into_permit)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list(
        &self,
        school_id: Uuid,
        query: PermitQuery,
        pagination: Pagination,
    ) -> BkResult<PaginatedResult<Permit>> {
        let mut conditions = Conditions::for_school().with_scope(&query.scope, "exit_time");
        if query.responsible_teacher_id.is_some() {
            conditions.push("responsible_teacher_id = $teacher_id");
        }
        match query.has_returned {
            Some(true) => conditions.push("return_time != NONE"),
            Some(false) => conditions.push("return_time = NONE"),
            None => {}
        }
        let where_clause = conditions.render();

        let statements = format!(
            "SELECT count() AS total FROM permit WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM permit WHERE {where_clause} \
             ORDER BY exit_time DESC LIMIT $limit START $offset;"
        );

        let mut result = self
            .db
            .query(&statements)
            .bind(("school_id", school_id.to_string()))
            .bind(("student_ids", scope_student_ids(&query.scope)))
            .bind(("from", query.scope.from))
            .bind(("until", query.scope.until))
            .bind((
                "teacher_id",
                query.responsible_teacher_id.map(|t| t.to_string()),
            ))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let rows: Vec<PermitRowWithId> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PermitRowWithId::try_into_permit)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: first_count(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn mark_returned(
        &self,
        school_id: Uuid,
        id: Uuid,
        return_time: DateTime<Utc>,
    ) -> BkResult<Option<Permit>> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('permit', $id) SET return_time = $return_time \
                 WHERE school_id = $school_id AND return_time = NONE",
            )
            .bind(("id", id_str))
            .bind(("school_id", school_id.to_string()))
            .bind(("return_time", return_time))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PermitRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_permit(id)?)),
            // Either missing or already closed; distinguish the two.
            None => self.get_by_id(school_id, id).await.map(|_| None),
        }
    }

    async fn set_document_url(&self, school_id: Uuid, id: Uuid, url: String) -> BkResult<Permit> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('permit', $id) SET document_url = $url \
                 WHERE school_id = $school_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .bind(("url", url))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PermitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_permit(id)?)
    }

    async fn delete(&self, school_id: Uuid, id: Uuid) -> BkResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('permit', $id) \
                 WHERE school_id = $school_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermitRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(id_str).into());
        }
        Ok(())
    }

    async fn count(&self, school_id: Uuid) -> BkResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM permit \
                 WHERE school_id = $school_id GROUP ALL",
            )
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }

    async fn count_open(&self, school_id: Uuid) -> BkResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM permit \
                 WHERE school_id = $school_id AND return_time = NONE GROUP ALL",
            )
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }
}
