//! SurrealDB implementation of [`ViolationCategoryRepository`].

use bk_core::error::BkResult;
use bk_core::models::category::{
    CreateViolationCategory, UpdateViolationCategory, ViolationCategory, name_key,
};
use bk_core::repository::ViolationCategoryRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::support::{Conditions, parse_level, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct CategoryRow {
    school_id: String,
    name: String,
    default_point: i64,
    default_level: String,
    description: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    fn try_into_category(self, id: Uuid) -> Result<ViolationCategory, DbError> {
        Ok(ViolationCategory {
            id,
            school_id: parse_uuid(&self.school_id, "school")?,
            name: self.name,
            default_point: self.default_point,
            default_level: parse_level(&self.default_level)?,
            description: self.description,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct CategoryRowWithId {
    record_id: String,
    school_id: String,
    name: String,
    default_point: i64,
    default_level: String,
    description: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRowWithId {
    fn try_into_category(self) -> Result<ViolationCategory, DbError> {
        let id = parse_uuid(&self.record_id, "category")?;
        CategoryRow {
            school_id: self.school_id,
            name: self.name,
            default_point: self.default_point,
            default_level: self.default_level,
            description: self.description,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .try_into_category(id)
    }
}

fn not_found(id: String) -> DbError {
    DbError::NotFound {
        entity: "violation category".into(),
        id,
    }
}

/// Name collisions arrive as a rejection from `idx_category_school_name`.
fn write_error(err: surrealdb::Error) -> DbError {
    let message = err.to_string();
    if message.contains("idx_category_school_name") {
        DbError::Duplicate("a violation category with this name already exists".into())
    } else {
        DbError::Query(message)
    }
}

/// SurrealDB implementation of the violation category repository.
#[derive(Clone)]
pub struct SurrealViolationCategoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealViolationCategoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ViolationCategoryRepository for SurrealViolationCategoryRepository<C> {
    async fn create(&self, input: CreateViolationCategory) -> BkResult<ViolationCategory> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let key = name_key(&input.name);

        let result = self
            .db
            .query(
                "CREATE type::record('violation_category', $id) SET \
                 school_id = $school_id, name = $name, name_key = $name_key, \
                 default_point = $default_point, default_level = $default_level, \
                 description = $description, is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("name", input.name.trim().to_string()))
            .bind(("name_key", key))
            .bind(("default_point", input.default_point))
            .bind(("default_level", input.default_level.as_str()))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(write_error)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_category(id)?)
    }

    async fn get_by_id(&self, school_id: Uuid, id: Uuid) -> BkResult<ViolationCategory> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('violation_category', $id) \
                 WHERE school_id = $school_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_category(id)?)
    }

    async fn find_by_name(
        &self,
        school_id: Uuid,
        name: &str,
    ) -> BkResult<Option<ViolationCategory>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM violation_category \
                 WHERE school_id = $school_id AND name_key = $name_key LIMIT 1",
            )
            .bind(("school_id", school_id.to_string()))
            .bind(("name_key", name_key(name)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_category()?)),
            None => Ok(None),
        }
    }

    async fn list(&self, school_id: Uuid, active_only: bool) -> BkResult<Vec<ViolationCategory>> {
        let mut conditions = Conditions::for_school();
        if active_only {
            conditions.push("is_active = true");
        }
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM violation_category \
             WHERE {} ORDER BY name ASC",
            conditions.render()
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(CategoryRowWithId::try_into_category)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(items)
    }

    async fn update(
        &self,
        school_id: Uuid,
        id: Uuid,
        input: UpdateViolationCategory,
    ) -> BkResult<ViolationCategory> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name, name_key = $name_key");
        }
        if input.default_point.is_some() {
            sets.push("default_point = $default_point");
        }
        if input.default_level.is_some() {
            sets.push("default_level = $default_level");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('violation_category', $id) SET {} \
             WHERE school_id = $school_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()));

        if let Some(name) = input.name {
            builder = builder
                .bind(("name_key", name_key(&name)))
                .bind(("name", name.trim().to_string()));
        }
        if let Some(point) = input.default_point {
            builder = builder.bind(("default_point", point));
        }
        if let Some(level) = input.default_level {
            builder = builder.bind(("default_level", level.as_str()));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(active) = input.is_active {
            builder = builder.bind(("is_active", active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(write_error)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id_str))?;
        Ok(row.try_into_category(id)?)
    }

    async fn delete(&self, school_id: Uuid, id: Uuid) -> BkResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "DELETE type::record('violation_category', $id) \
                 WHERE school_id = $school_id RETURN BEFORE",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", school_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(not_found(id_str).into());
        }
        Ok(())
    }
}
