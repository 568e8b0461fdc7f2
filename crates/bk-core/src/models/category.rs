//! Violation category domain model.
//!
//! Categories are configured per school and provide a default point and
//! level for violations recorded under them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::violation::ViolationLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationCategory {
    pub id: Uuid,
    pub school_id: Uuid,
    /// Unique per school, compared case-insensitively.
    pub name: String,
    /// Always zero or negative.
    pub default_point: i64,
    pub default_level: ViolationLevel,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateViolationCategory {
    pub school_id: Uuid,
    pub name: String,
    pub default_point: i64,
    pub default_level: ViolationLevel,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateViolationCategory {
    pub name: Option<String>,
    pub default_point: Option<i64>,
    pub default_level: Option<ViolationLevel>,
    pub description: Option<String>,
    /// `Some(false)` deactivates the category. Existing violations are
    /// left untouched.
    pub is_active: Option<bool>,
}

/// Normalized form of a category name used for uniqueness checks.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The category set seeded for a school that has none configured yet.
pub fn default_categories(school_id: Uuid) -> Vec<CreateViolationCategory> {
    use ViolationLevel::{Light, Moderate, Severe};

    [
        ("Lateness", -5, Light, "Arriving late to school"),
        ("Truancy", -15, Moderate, "Absent without notice"),
        ("Uniform", -5, Light, "Not wearing the required uniform"),
        ("Misconduct", -10, Moderate, "Disrespectful behaviour"),
        ("Violence", -30, Severe, "Physical violence"),
        ("Bullying", -25, Severe, "Bullying another student"),
        ("Smoking", -20, Severe, "Smoking on school grounds"),
        ("Drugs", -50, Severe, "Involvement with narcotics"),
        ("Theft", -30, Severe, "Stealing"),
        ("Vandalism", -20, Moderate, "Damaging school property"),
        ("Other", -5, Light, "Other violations"),
    ]
    .into_iter()
    .map(
        |(name, default_point, default_level, description)| CreateViolationCategory {
            school_id,
            name: name.into(),
            default_point,
            default_level,
            description: description.into(),
        },
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_positive_and_unique() {
        let school = Uuid::new_v4();
        let defaults = default_categories(school);
        assert_eq!(defaults.len(), 11);

        let mut keys: Vec<String> = defaults.iter().map(|c| name_key(&c.name)).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), defaults.len());

        for c in &defaults {
            assert!(c.default_point <= 0, "{} has positive default", c.name);
            assert_eq!(c.school_id, school);
        }
    }

    #[test]
    fn name_key_ignores_case_and_padding() {
        assert_eq!(name_key("  Bullying "), name_key("bullying"));
    }
}
