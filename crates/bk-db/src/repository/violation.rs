//! SurrealDB implementation of [`ViolationRepository`].

use bk_core::error::BkResult;
use bk_core::models::violation::{NewViolation, Violation};
use bk_core::repository::{
    PaginatedResult, Pagination, StudentTally, ViolationQuery, ViolationRepository,
};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::support::{
    Conditions, CountRow, SumRow, first_count, first_sum, parse_level, parse_optional_uuid,
    parse_uuid, scope_student_ids,
};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ViolationRow {
    school_id: String,
    student_id: String,
    category_id: Option<String>,
    category: String,
    level: String,
    point: i64,
    description: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl ViolationRow {
    fn try_into_violation(self, id: Uuid) -> Result<Violation, DbError> {
        Ok(Violation {
            id,
            school_id: parse_uuid(&self.school_id, "school")?,
            student_id: parse_uuid(&self.student_id, "student")?,
            category_id: parse_optional_uuid(self.category_id, "category")?,
            category: self.category,
            level: parse_level(&self.level)?,
            point: self.point,
            description: self.description,
            created_by: parse_uuid(&self.created_by, "creator")?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ViolationRowWithId {
    record_id: String,
    school_id: String,
    student_id: String,
    category_id: Option<String>,
    category: String,
    level: String,
    point: i64,
    description: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl ViolationRowWithId {
    fn try_into_violation(self) -> Result<Violation, DbError> {
        let id = parse_uuid(&self.record_id, "violation")?;
        ViolationRow {
            school_id: self.school_id,
            student_id: self.student_id,
            category_id: self.category_id,
            category: self.category,
            level: self.level,
            point: self.point,
            description: self.description,
            created_by: self.created_by,
            created_at: self.created_at,
        }
        .try_into_violation(id)
    }
}

#[derive(Debug, SurrealValue)]
struct TallyRow {
    student_id: String,
    total: u64,
}

fn not_found(id: String) -> DbError {
    DbError::NotFound {
        entity: "violation".into(),
        id,
    }
}

/// SurrealDB implementation of the violation repository.
#[derive(Clone)]
pub struct SurrealViolationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealViolationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ViolationRepository for SurrealViolationRepository<C> {
    async fn create(&self, input: NewViolation) -> BkResult<Violation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('violation', $id) SET \
                 school_id = $school_id, student_id = $student_id, \
                 category_id = $category_id, category = $category, \
                 level = $level, point = $point, \
                 description = $description, created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("student_id", input.student_id.to_string()))
            .bind(("category_id", input.category_id.map(|c| c.to_string())))
            .bind(("category", input.category))
            .bind(("level", input.level.as_str()))
            .bind(("point", input.point))
            .bind(("description", input.description))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ViolationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_violation(id)?)
    }

    async fn get_by_id(&self, school_id: Uuid, id: Uuid) -> BkResult<Violation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('violation', $id) \
                 WHERE school_id = $school_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ViolationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_violation(id)?)
    }

    async fn list_by_student(&self, school_id: Uuid, student_id: Uuid) -> BkResult<Vec<Violation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM violation \
                 WHERE school_id = $school_id AND student_id = $student_id \
                 ORDER BY created_at DESC",
            )
            .bind(("school_id", school_id.to_string()))
            .bind(("student_id", student_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ViolationRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ViolationRowWithId::try_into_violation)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn list(
        &self,
        school_id: Uuid,
        query: ViolationQuery,
        pagination: Pagination,
    ) -> BkResult<PaginatedResult<Violation>> {
        let mut conditions = Conditions::for_school().with_scope(&query.scope, "created_at");
        if query.level.is_some() {
            conditions.push("level = $level");
        }
        if query.category.is_some() {
            conditions.push("string::contains(string::lowercase(category), $category)");
        }
        let where_clause = conditions.render();

        let statements = format!(
            "SELECT count() AS total FROM violation WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM violation WHERE {where_clause} \
             ORDER BY created_at DESC LIMIT $limit START $offset;"
        );

        let mut result = self
            .db
            .query(&statements)
            .bind(("school_id", school_id.to_string()))
            .bind(("student_ids", scope_student_ids(&query.scope)))
            .bind(("from", query.scope.from))
            .bind(("until", query.scope.until))
            .bind(("level", query.level.map(|l| l.as_str().to_string())))
            .bind(("category", query.category.map(|c| c.to_lowercase())))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let rows: Vec<ViolationRowWithId> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ViolationRowWithId::try_into_violation)
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
                "DELETE type::record('violation', $id) \
                 WHERE school_id = $school_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ViolationRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(id_str).into());
        }
        Ok(())
    }

    async fn count(&self, school_id: Uuid) -> BkResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM violation \
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
                "SELECT math::sum(point) AS total FROM violation \
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

    async fn tally_by_student(&self, school_id: Uuid) -> BkResult<Vec<StudentTally>> {
        let mut result = self
            .db
            .query(
                "SELECT student_id, count() AS total FROM violation \
                 WHERE school_id = $school_id GROUP BY student_id",
            )
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TallyRow> = result.take(0).map_err(DbError::from)?;
        let tallies = rows
            .into_iter()
            .map(|row| {
                Ok(StudentTally {
                    student_id: parse_uuid(&row.student_id, "student")?,
                    violation_count: row.total,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(tallies)
    }
}
