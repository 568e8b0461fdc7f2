//! SurrealDB mirror of the school roster.
//!
//! Implements the read-only [`StudentDirectory`] and [`StaffDirectory`]
//! lookups. The `upsert_*` methods are the sync hooks used by the
//! provisioning subsystem (and by tests) to keep the mirror current.

use bk_core::error::BkResult;
use bk_core::models::roster::{
    StaffRecord, StudentRecord, SyncClass, SyncSchool, SyncStaff, SyncStudent,
};
use bk_core::repository::{StaffDirectory, StudentDirectory};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::support::{parse_optional_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct StudentRow {
    school_id: String,
    class_id: Option<String>,
    name: String,
    nis: String,
    nisn: String,
}

#[derive(Debug, SurrealValue)]
struct NameRow {
    name: String,
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    record_id: String,
}

#[derive(Debug, SurrealValue)]
struct StaffRow {
    school_id: Option<String>,
    username: String,
    name: String,
}

/// SurrealDB implementation of the roster lookups.
#[derive(Clone)]
pub struct SurrealRosterDirectory<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRosterDirectory<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    pub async fn upsert_school(&self, input: SyncSchool) -> BkResult<()> {
        self.db
            .query("UPSERT type::record('school', $id) SET name = $name")
            .bind(("id", input.id.to_string()))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    pub async fn upsert_class(&self, input: SyncClass) -> BkResult<()> {
        self.db
            .query(
                "UPSERT type::record('classroom', $id) SET \
                 school_id = $school_id, name = $name",
            )
            .bind(("id", input.id.to_string()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    pub async fn upsert_student(&self, input: SyncStudent) -> BkResult<()> {
        self.db
            .query(
                "UPSERT type::record('student', $id) SET \
                 school_id = $school_id, class_id = $class_id, \
                 name = $name, nis = $nis, nisn = $nisn",
            )
            .bind(("id", input.id.to_string()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("class_id", input.class_id.map(|c| c.to_string())))
            .bind(("name", input.name))
            .bind(("nis", input.nis))
            .bind(("nisn", input.nisn))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    pub async fn upsert_staff(&self, input: SyncStaff) -> BkResult<()> {
        self.db
            .query(
                "UPSERT type::record('staff', $id) SET \
                 school_id = $school_id, username = $username, name = $name",
            )
            .bind(("id", input.id.to_string()))
            .bind(("school_id", input.school_id.map(|s| s.to_string())))
            .bind(("username", input.username))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    async fn lookup_name(&self, table: &'static str, id: &str) -> Result<Option<String>, DbError> {
        let mut result = self
            .db
            .query("SELECT name FROM type::record($table, $id)")
            .bind(("table", table))
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<NameRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.name))
    }
}

impl<C: Connection> StudentDirectory for SurrealRosterDirectory<C> {
    async fn find_student_by_id(&self, id: Uuid) -> BkResult<StudentRecord> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('student', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StudentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "student".into(),
            id: id_str,
        })?;

        let school_name = self
            .lookup_name("school", &row.school_id)
            .await?
            .unwrap_or_default();
        let class_name = match row.class_id.as_deref() {
            Some(class_id) => self.lookup_name("classroom", class_id).await?,
            None => None,
        };

        Ok(StudentRecord {
            id,
            school_id: parse_uuid(&row.school_id, "school")?,
            school_name,
            class_id: parse_optional_uuid(row.class_id, "class")?,
            class_name,
            name: row.name,
            nis: row.nis,
            nisn: row.nisn,
        })
    }

    async fn list_student_ids_in_class(
        &self,
        school_id: Uuid,
        class_id: Uuid,
    ) -> BkResult<Vec<Uuid>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id FROM student \
                 WHERE school_id = $school_id AND class_id = $class_id",
            )
            .bind(("school_id", school_id.to_string()))
            .bind(("class_id", class_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        let ids = rows
            .iter()
            .map(|row| parse_uuid(&row.record_id, "student"))
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(ids)
    }
}

impl<C: Connection> StaffDirectory for SurrealRosterDirectory<C> {
    async fn find_user_by_id(&self, id: Uuid) -> BkResult<StaffRecord> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('staff', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StaffRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "staff".into(),
            id: id_str,
        })?;

        Ok(StaffRecord {
            id,
            school_id: parse_optional_uuid(row.school_id, "school")?,
            username: row.username,
            name: row.name,
        })
    }
}
