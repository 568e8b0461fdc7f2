//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and tenant scoped: every call takes
//! the `school_id` the request is made for, and implementations must never
//! return or touch a record belonging to another school.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BkResult;
use crate::models::{
    achievement::{Achievement, NewAchievement},
    category::{CreateViolationCategory, UpdateViolationCategory, ViolationCategory},
    counseling::{CounselingNote, NewCounselingNote, UpdateCounselingNote},
    permit::{NewPermit, Permit},
    roster::{StaffRecord, StudentRecord},
    violation::{NewViolation, Violation, ViolationLevel},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Page-numbered view of a [`PaginatedResult`], as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn from_result(result: PaginatedResult<T>, page: u64, page_size: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            result.total.div_ceil(page_size)
        };
        Self {
            items: result.items,
            page,
            page_size,
            total: result.total,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Calendar-day range filter. Both ends are inclusive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    /// First instant included by the range (midnight UTC of the start day).
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// First instant *excluded* by the range (midnight UTC after the end day).
    pub fn upper_bound_exclusive(&self) -> Option<DateTime<Utc>> {
        self.end_date
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }
}

/// Selection shared by every case-record listing.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Restrict to these students. `Some(vec![])` matches nothing.
    pub student_ids: Option<Vec<Uuid>>,
    /// Inclusive lower bound on the record's reference timestamp.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the record's reference timestamp.
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ViolationQuery {
    pub scope: RecordQuery,
    pub level: Option<ViolationLevel>,
    /// Case-insensitive substring of the category name.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PermitQuery {
    /// Time bounds apply to `exit_time`.
    pub scope: RecordQuery,
    pub responsible_teacher_id: Option<Uuid>,
    pub has_returned: Option<bool>,
}

/// Number of violations recorded for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentTally {
    pub student_id: Uuid,
    pub violation_count: u64,
}

// ---------------------------------------------------------------------------
// Case record store
// ---------------------------------------------------------------------------

pub trait ViolationCategoryRepository: Send + Sync {
    fn create(
        &self,
        input: CreateViolationCategory,
    ) -> impl Future<Output = BkResult<ViolationCategory>> + Send;
    fn get_by_id(
        &self,
        school_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BkResult<ViolationCategory>> + Send;
    /// Look up a category by its case-insensitive name.
    fn find_by_name(
        &self,
        school_id: Uuid,
        name: &str,
    ) -> impl Future<Output = BkResult<Option<ViolationCategory>>> + Send;
    fn list(
        &self,
        school_id: Uuid,
        active_only: bool,
    ) -> impl Future<Output = BkResult<Vec<ViolationCategory>>> + Send;
    fn update(
        &self,
        school_id: Uuid,
        id: Uuid,
        input: UpdateViolationCategory,
    ) -> impl Future<Output = BkResult<ViolationCategory>> + Send;
    /// Hard delete. Violations keep their denormalized category name.
    fn delete(&self, school_id: Uuid, id: Uuid) -> impl Future<Output = BkResult<()>> + Send;
}

pub trait ViolationRepository: Send + Sync {
    fn create(&self, input: NewViolation) -> impl Future<Output = BkResult<Violation>> + Send;
    fn get_by_id(
        &self,
        school_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BkResult<Violation>> + Send;
    /// All violations of one student, newest first.
    fn list_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> impl Future<Output = BkResult<Vec<Violation>>> + Send;
    /// Filtered listing, newest first.
    fn list(
        &self,
        school_id: Uuid,
        query: ViolationQuery,
        pagination: Pagination,
    ) -> impl Future<Output = BkResult<PaginatedResult<Violation>>> + Send;
    fn delete(&self, school_id: Uuid, id: Uuid) -> impl Future<Output = BkResult<()>> + Send;
    fn count(&self, school_id: Uuid) -> impl Future<Output = BkResult<u64>> + Send;
    /// Sum of `point` over the student's violations (0 when none).
    fn sum_points_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> impl Future<Output = BkResult<i64>> + Send;
    /// Violation count per student, for every student with at least one.
    fn tally_by_student(
        &self,
        school_id: Uuid,
    ) -> impl Future<Output = BkResult<Vec<StudentTally>>> + Send;
}

pub trait AchievementRepository: Send + Sync {
    fn create(&self, input: NewAchievement)
    -> impl Future<Output = BkResult<Achievement>> + Send;
    fn get_by_id(
        &self,
        school_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BkResult<Achievement>> + Send;
    fn list_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> impl Future<Output = BkResult<Vec<Achievement>>> + Send;
    fn list(
        &self,
        school_id: Uuid,
        query: RecordQuery,
        pagination: Pagination,
    ) -> impl Future<Output = BkResult<PaginatedResult<Achievement>>> + Send;
    fn delete(&self, school_id: Uuid, id: Uuid) -> impl Future<Output = BkResult<()>> + Send;
    fn count(&self, school_id: Uuid) -> impl Future<Output = BkResult<u64>> + Send;
    fn sum_points_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> impl Future<Output = BkResult<i64>> + Send;
}

pub trait PermitRepository: Send + Sync {
    fn create(&self, input: NewPermit) -> impl Future<Output = BkResult<Permit>> + Send;
    fn get_by_id(&self, school_id: Uuid, id: Uuid)
    -> impl Future<Output = BkResult<Permit>> + Send;
    fn list_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> impl Future<Output = BkResult<Vec<Permit>>> + Send;
    /// Filtered listing ordered by `exit_time`, newest first.
    fn list(
        &self,
        school_id: Uuid,
        query: PermitQuery,
        pagination: Pagination,
    ) -> impl Future<Output = BkResult<PaginatedResult<Permit>>> + Send;
    /// Set `return_time` only if the permit is still open.
    ///
    /// Returns `Ok(None)` when the permit exists but has already been
    /// returned, so concurrent callers cannot both close it.
    fn mark_returned(
        &self,
        school_id: Uuid,
        id: Uuid,
        return_time: DateTime<Utc>,
    ) -> impl Future<Output = BkResult<Option<Permit>>> + Send;
    fn set_document_url(
        &self,
        school_id: Uuid,
        id: Uuid,
        url: String,
    ) -> impl Future<Output = BkResult<Permit>> + Send;
    fn delete(&self, school_id: Uuid, id: Uuid) -> impl Future<Output = BkResult<()>> + Send;
    fn count(&self, school_id: Uuid) -> impl Future<Output = BkResult<u64>> + Send;
    /// Permits whose student has not come back yet.
    fn count_open(&self, school_id: Uuid) -> impl Future<Output = BkResult<u64>> + Send;
}

pub trait CounselingNoteRepository: Send + Sync {
    fn create(
        &self,
        input: NewCounselingNote,
    ) -> impl Future<Output = BkResult<CounselingNote>> + Send;
    fn get_by_id(
        &self,
        school_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = BkResult<CounselingNote>> + Send;
    fn list_by_student(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> impl Future<Output = BkResult<Vec<CounselingNote>>> + Send;
    fn list(
        &self,
        school_id: Uuid,
        query: RecordQuery,
        pagination: Pagination,
    ) -> impl Future<Output = BkResult<PaginatedResult<CounselingNote>>> + Send;
    fn update(
        &self,
        school_id: Uuid,
        id: Uuid,
        input: UpdateCounselingNote,
    ) -> impl Future<Output = BkResult<CounselingNote>> + Send;
    fn delete(&self, school_id: Uuid, id: Uuid) -> impl Future<Output = BkResult<()>> + Send;
    fn count(&self, school_id: Uuid) -> impl Future<Output = BkResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Roster collaborators (read-only)
// ---------------------------------------------------------------------------

pub trait StudentDirectory: Send + Sync {
    /// Resolve a student regardless of school; callers compare
    /// `school_id` themselves to detect tenant mismatches.
    fn find_student_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = BkResult<StudentRecord>> + Send;
    /// Ids of the students currently placed in a class of this school.
    fn list_student_ids_in_class(
        &self,
        school_id: Uuid,
        class_id: Uuid,
    ) -> impl Future<Output = BkResult<Vec<Uuid>>> + Send;
}

pub trait StaffDirectory: Send + Sync {
    fn find_user_by_id(&self, id: Uuid) -> impl Future<Output = BkResult<StaffRecord>> + Send;
}
