//! Violation domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BkError;
use crate::repository::DateRange;

/// Severity of a violation. Also used as a category's default level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationLevel {
    Light,
    Moderate,
    Severe,
}

impl ViolationLevel {
    pub const ALL: [ViolationLevel; 3] = [Self::Light, Self::Moderate, Self::Severe];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }

    /// Point charged when neither an explicit point nor an active
    /// category default applies.
    pub fn default_point(self) -> i64 {
        match self {
            Self::Light => -5,
            Self::Moderate => -15,
            Self::Severe => -30,
        }
    }
}

impl fmt::Display for ViolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationLevel {
    type Err = BkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            other => Err(BkError::rule(format!(
                "level must be one of: light, moderate, severe (got '{other}')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub category_id: Option<Uuid>,
    /// Category name, stored even when `category_id` is absent.
    pub category: String,
    pub level: ViolationLevel,
    pub point: i64,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied command for recording a violation.
///
/// `level` is kept as raw text so that unknown values surface as a
/// domain-rule error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateViolation {
    pub student_id: Uuid,
    pub category_id: Option<Uuid>,
    pub category: String,
    pub level: String,
    /// Explicit point override. Takes priority over any default.
    pub point: Option<i64>,
    pub description: String,
}

/// A validated, fully-resolved violation ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewViolation {
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub category_id: Option<Uuid>,
    pub category: String,
    pub level: ViolationLevel,
    pub point: i64,
    pub description: String,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViolationFilter {
    pub student_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    /// Case-insensitive substring match on the category name.
    pub category: Option<String>,
    pub level: Option<ViolationLevel>,
    #[serde(flatten)]
    pub dates: DateRange,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}
