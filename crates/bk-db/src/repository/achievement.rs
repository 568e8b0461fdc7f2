//! SurrealDB implementation of [`AchievementRepository`].

use bk_core::error::BkResult;
use bk_core::models::achievement::{Achievement, NewAchievement};
use bk_core::repository::{AchievementRepository, PaginatedResult, Pagination, RecordQuery};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::support::{
    Conditions, CountRow, SumRow, first_count, first_sum, parse_uuid, scope_student_ids,
};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AchievementRow {
    school_id: String,
    student_id: String,
    title: String,
    point: i64,
    description: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl AchievementRow {
    fn try_into_achievement(self, id: Uuid) -> Result<Achievement, DbError> {
        Ok(Achievement {
            id,
            school_id: parse_uuid(&self.school_id, "school")?,
            student_id: parse_uuid(&self.student_id, "student")?,
            title: self.title,
            point: self.point,
            description: self.description,
            created_by: parse_uuid(&self.created_by, "creator")?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct AchievementRowWithId {
    record_id: String,
    school_id: String,
    student_id: String,
    title: String,
    point: i64,
    description: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl AchievementRowWithId {
    fn try_into_achievement(self) -> Result<Achievement, DbError> {
        let id = parse_uuid(&self.record_id, "achievement")?;
        AchievementRow {
            school_id: self.school_id,
            student_id: self.student_id,
            title: self.title,
            point: self.point,
            description: self.description,
            created_by: self.created_by,
            created_at: self.created_at,
        }
        .try_into_achievement(id)
    }
}

fn not_found(id: String) -> DbError {
    DbError::NotFound {
        entity: "achievement".into(),
        id,
    }
}

/// SurrealDB implementation of the achievement repository.
#[derive(Clone)]
pub struct SurrealAchievementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAchievementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AchievementRepository for SurrealAchievementRepository<C> {
    async fn create(&self, input: NewAchievement) -> BkResult<Achievement> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('achievement', $id) SET \
                 school_id = $school_id, student_id = $student_id, \
                 title = $title, point = $point, \
                 description = $description, created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("title", input.title))
            .bind(("point", input.point))
            .bind(("description", input.description))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AchievementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_achievement(id)?)
    }

    async fn get_by_id(&self, school_id: Uuid, id: Uuid) -> BkResult<Achievement> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('achievement', $id) \
                 WHERE school_id = $school_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AchievementRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_achievement(id)?)
    }

    async fn list_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> BkResult<Vec<Achievement>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM achievement \
                 WHERE school_id = $school_id AND student_id = $student_id \
                 ORDER BY created_at DESC",
            )
            .bind(("school_id", school_id.to_string()))
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AchievementRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(AchievementRowWithId::try_into_achievement)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list(
        &self,
        school_id: Uuid,
        query: RecordQuery,
        pagination: Pagination,
    ) -> BkResult<PaginatedResult<Achievement>> {
        let where_clause = Conditions::for_school()
            .with_scope(&query, "created_at")
            .render();

        let statements = format!(
            "SELECT count() AS total FROM achievement WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM achievement WHERE {where_clause} \
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
        let rows: Vec<AchievementRowWithId> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(AchievementRowWithId::try_into_achievement)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: first_count(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn delete(&self, school_id: Uuid, id: Uuid) -> BkResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('achievement', $id) \
                 WHERE school_id = $school_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AchievementRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(id_str).into());
        }
        Ok(())
    }

    async fn count(&self, school_id: Uuid) -> BkResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM achievement \
                 WHERE school_id = $school_id GROUP ALL",
            )
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_count(rows))
    }

    async fn sum_points_by_student(&self, school_id: Uuid, student_id: Uuid) -> BkResult<i64> {
        let mut result = self
            .db
            .query(
                "SELECT math::sum(point) AS total FROM achievement \
                 WHERE school_id = $school_id AND student_id = $student_id \
                 GROUP ALL",
            )
            .bind(("school_id", school_id.to_string()))
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SumRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_sum(rows))
    }
}
