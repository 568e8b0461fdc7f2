//! SurrealDB implementation of [`CounselingNoteRepository`].

use bk_core::error::BkResult;
use bk_core::models::counseling::{CounselingNote, NewCounselingNote, UpdateCounselingNote};
use bk_core::repository::{CounselingNoteRepository, PaginatedResult, Pagination, RecordQuery};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::support::{Conditions, CountRow, first_count, parse_uuid, scope_student_ids};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct NoteRow {
    school_id: String,
    student_id: String,
    internal_note: String,
    parent_summary: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NoteRow {
    fn try_into_note(self, id: Uuid) -> Result<CounselingNote, DbError> {
        Ok(CounselingNote {
            id,
            school_id: parse_uuid(&self.school_id, "school")?,
            student_id: parse_uuid(&self.student_id, "student")?,
            internal_note: self.internal_note,
            parent_summary: self.parent_summary,
            created_by: parse_uuid(&self.created_by, "creator")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct NoteRowWithId {
    record_id: String,
    school_id: String,
    student_id: String,
    internal_note: String,
    parent_summary: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NoteRowWithId {
    fn try_into_note(self) -> Result<CounselingNote, DbError> {
        let id = parse_uuid(&self.record_id, "counseling note")?;
        NoteRow {
            school_id: self.school_id,
            student_id: self.student_id,
            internal_note: self.internal_note,
            parent_summary: self.parent_summary,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_note(id)
    }
}

fn not_found(id: String) -> DbError {
    DbError::NotFound {
        entity: "counseling note".into(),
        id,
    }
}

/// SurrealDB implementation of the counseling note repository.
#[derive(Clone)]
pub struct SurrealCounselingNoteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCounselingNoteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CounselingNoteRepository for SurrealCounselingNoteRepository<C> {
    async fn create(&self, input: NewCounselingNote) -> BkResult<CounselingNote> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('counseling_note', $id) SET \
                 school_id = $school_id, student_id = $student_id, \
                 internal_note = $internal_note, \
                 parent_summary = $parent_summary, created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("internal_note", input.internal_note))
            .bind(("parent_summary", input.parent_summary))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_note(id)?)
    }

    async fn get_by_id(&self, school_id: Uuid, id: Uuid) -> BkResult<CounselingNote> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('counseling_note', $id) \
                 WHERE school_id = $school_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_note(id)?)
    }

    async fn list_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> BkResult<Vec<CounselingNote>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM counseling_note \
                 WHERE school_id = $school_id AND student_id = $student_id \
                 ORDER BY created_at DESC",
            )
            .bind(("school_id", school_id.to_string()))
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(NoteRowWithId::try_into_note)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list(
        &self,
        school_id: Uuid,
        query: RecordQuery,
        pagination: Pagination,
    ) -> BkResult<PaginatedResult<CounselingNote>> {
        let where_clause = Conditions::for_school()
            .with_scope(&query, "created_at")
            .render();

        let statements = format!(
            "SELECT count() AS total FROM counseling_note WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM counseling_note WHERE {where_clause} \
             ORDER BY created_at DESC LIMIT $limit START $offset;"
        );

        let mut result = self
            .db
            .query(&statements)
            .bind(("school_id", school_id.to_string()))
            .bind(("student_ids", scope_student_ids(&query)))
            .bind(("from", query.from))
            .bind(("until", query.until))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let rows: Vec<NoteRowWithId> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(NoteRowWithId::try_into_note)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: first_count(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(
        &self,
        school_id: Uuid,
        id: Uuid,
        input: UpdateCounselingNote,
    ) -> BkResult<CounselingNote> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.internal_note.is_some() {
            sets.push("internal_note = $internal_note");
        }
        if input.parent_summary.is_some() {
            sets.push("parent_summary = $parent_summary");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('counseling_note', $id) SET {} \
             WHERE school_id = $school_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()));

        if let Some(note) = input.internal_note {
            builder = builder.bind(("internal_note", note));
        }
        if let Some(summary) = input.parent_summary {
            builder = builder.bind(("parent_summary", summary));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_note(id)?)
    }

    async fn delete(&self, school_id: Uuid, id: Uuid) -> BkResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('counseling_note', $id) \
                 WHERE school_id = $school_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(id_str).into());
        }
        Ok(())
    }

    async fn count(&self, school_id: Uuid) -> BkResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM counseling_note \
                 WHERE school_id = $school_id GROUP ALL",
            )
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }
}
