//! BK tables and the versioned migration runner.
//!
//! Every table is SCHEMAFULL and scoped by `school_id`. Ids are UUID
//! strings; levels and roles are strings checked by ASSERT.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// Version 1: roster, categories and the four case record tables.
const SCHEMA_V1: &str = "\
-- =======================================================================
-- Roster mirror (provisioned by the school administration subsystem)
-- =======================================================================
DEFINE TABLE school SCHEMAFULL;
DEFINE FIELD name ON TABLE school TYPE string;

DEFINE TABLE classroom SCHEMAFULL;
DEFINE FIELD school_id ON TABLE classroom TYPE string;
DEFINE FIELD name ON TABLE classroom TYPE string;
DEFINE INDEX idx_classroom_school ON TABLE classroom COLUMNS school_id;

DEFINE TABLE student SCHEMAFULL;
DEFINE FIELD school_id ON TABLE student TYPE string;
DEFINE FIELD class_id ON TABLE student TYPE option<string>;
DEFINE FIELD name ON TABLE student TYPE string;
DEFINE FIELD nis ON TABLE student TYPE string;
DEFINE FIELD nisn ON TABLE student TYPE string;
DEFINE INDEX idx_student_school_class ON TABLE student \
    COLUMNS school_id, class_id;

DEFINE TABLE staff SCHEMAFULL;
DEFINE FIELD school_id ON TABLE staff TYPE option<string>;
DEFINE FIELD username ON TABLE staff TYPE string;
DEFINE FIELD name ON TABLE staff TYPE string;

-- =======================================================================
-- Violation categories (school scope)
-- =======================================================================
DEFINE TABLE violation_category SCHEMAFULL;
DEFINE FIELD school_id ON TABLE violation_category TYPE string;
DEFINE FIELD name ON TABLE violation_category TYPE string;
DEFINE FIELD name_key ON TABLE violation_category TYPE string;
DEFINE FIELD default_point ON TABLE violation_category TYPE int \
    ASSERT $value <= 0;
DEFINE FIELD default_level ON TABLE violation_category TYPE string \
    ASSERT $value IN ['light', 'moderate', 'severe'];
DEFINE FIELD description ON TABLE violation_category TYPE string \
    DEFAULT '';
DEFINE FIELD is_active ON TABLE violation_category TYPE bool \
    DEFAULT true;
DEFINE FIELD created_at ON TABLE violation_category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE violation_category TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_category_school_name ON TABLE violation_category \
    COLUMNS school_id, name_key UNIQUE;

-- =======================================================================
-- Violations (school scope)
-- =======================================================================
DEFINE TABLE violation SCHEMAFULL;
DEFINE FIELD school_id ON TABLE violation TYPE string;
DEFINE FIELD student_id ON TABLE violation TYPE string;
DEFINE FIELD category_id ON TABLE violation TYPE option<string>;
DEFINE FIELD category ON TABLE violation TYPE string;
DEFINE FIELD level ON TABLE violation TYPE string \
    ASSERT $value IN ['light', 'moderate', 'severe'];
DEFINE FIELD point ON TABLE violation TYPE int;
DEFINE FIELD description ON TABLE violation TYPE string;
DEFINE FIELD created_by ON TABLE violation TYPE string;
DEFINE FIELD created_at ON TABLE violation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_violation_school_student ON TABLE violation \
    COLUMNS school_id, student_id;

-- =======================================================================
-- Achievements (school scope)
-- =======================================================================
DEFINE TABLE achievement SCHEMAFULL;
DEFINE FIELD school_id ON TABLE achievement TYPE string;
DEFINE FIELD student_id ON TABLE achievement TYPE string;
DEFINE FIELD title ON TABLE achievement TYPE string;
DEFINE FIELD point ON TABLE achievement TYPE int ASSERT $value > 0;
DEFINE FIELD description ON TABLE achievement TYPE option<string>;
DEFINE FIELD created_by ON TABLE achievement TYPE string;
DEFINE FIELD created_at ON TABLE achievement TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_achievement_school_student ON TABLE achievement \
    COLUMNS school_id, student_id;

-- =======================================================================
-- Exit permits (school scope)
-- =======================================================================
DEFINE TABLE permit SCHEMAFULL;
DEFINE FIELD school_id ON TABLE permit TYPE string;
DEFINE FIELD student_id ON TABLE permit TYPE string;
DEFINE FIELD reason ON TABLE permit TYPE string;
DEFINE FIELD exit_time ON TABLE permit TYPE datetime;
DEFINE FIELD return_time ON TABLE permit TYPE option<datetime>;
DEFINE FIELD responsible_teacher_id ON TABLE permit TYPE string;
DEFINE FIELD document_url ON TABLE permit TYPE option<string>;
DEFINE FIELD created_by ON TABLE permit TYPE string;
DEFINE FIELD created_at ON TABLE permit TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permit_school_student ON TABLE permit \
    COLUMNS school_id, student_id;

-- =======================================================================
-- Counseling notes (school scope)
-- =======================================================================
DEFINE TABLE counseling_note SCHEMAFULL;
DEFINE FIELD school_id ON TABLE counseling_note TYPE string;
DEFINE FIELD student_id ON TABLE counseling_note TYPE string;
DEFINE FIELD internal_note ON TABLE counseling_note TYPE string;
DEFINE FIELD parent_summary ON TABLE counseling_note \
    TYPE option<string>;
DEFINE FIELD created_by ON TABLE counseling_note TYPE string;
DEFINE FIELD created_at ON TABLE counseling_note TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE counseling_note TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_counseling_school_student ON TABLE counseling_note \
    COLUMNS school_id, student_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the schema up to the latest version and return that version.
///
/// The `_migration` table records every applied version; only versions
/// above the highest recorded one are run.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let applied: Vec<MigrationRecord> = result.take(0)?;
    let mut version = applied.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(move |m| m.version > version) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying BK schema migration"
        );

        // Schema change and its bookkeeping row go in one transaction.
        let statements = format!(
            "BEGIN TRANSACTION;\n{}\nCREATE _migration SET version = $version, name = $name;\nCOMMIT TRANSACTION;",
            migration.sql
        );
        db.query(statements)
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "v{} '{}': {e}",
                    migration.version, migration.name
                ))
            })?;
        version = migration.version;
    }

    info!(schema_version = version, "BK schema up to date");
    Ok(version)
}
