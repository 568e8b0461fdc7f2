//! Achievement domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::DateRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    /// Always strictly positive.
    pub point: i64,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateAchievement {
    pub student_id: Uuid,
    pub title: String,
    pub point: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAchievement {
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub point: i64,
    pub description: Option<String>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AchievementFilter {
    pub student_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    #[serde(flatten)]
    pub dates: DateRange,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Accumulated achievement points for one student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AchievementPoints {
    pub student_id: Uuid,
    pub student_name: String,
    pub total_points: i64,
}
