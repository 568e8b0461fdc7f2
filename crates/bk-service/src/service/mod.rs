//! Orchestration of the BK operations.
//!
//! Each service is generic over the repository traits it needs, so this
//! crate has no dependency on the database crate.

mod achievement;
mod category;
mod counseling;
mod insight;
mod permit;
mod violation;

pub use achievement::AchievementService;
pub use category::CategoryService;
pub use counseling::CounselingService;
pub use insight::{Dashboard, InsightService, StudentProfile, StudentSummary};
pub use permit::PermitService;
pub use violation::ViolationService;

use bk_core::error::BkResult;
use bk_core::models::caller::Caller;
use bk_core::repository::{DateRange, RecordQuery, StudentDirectory};
use uuid::Uuid;

/// Translate listing filters into a store query.
///
/// A class filter is expanded to the ids of the students placed in it.
/// Combined with a student filter the two are intersected, so a student
/// outside the class matches nothing.
pub(crate) async fn record_scope<St: StudentDirectory>(
    students: &St,
    caller: &Caller,
    student_id: Option<Uuid>,
    class_id: Option<Uuid>,
    dates: &DateRange,
) -> BkResult<RecordQuery> {
    let student_ids = match (student_id, class_id) {
        (None, None) => None,
        (Some(id), None) => Some(vec![id]),
        (student, Some(class_id)) => {
            let mut ids = students
                .list_student_ids_in_class(caller.school_id, class_id)
                .await?;
            if let Some(id) = student {
                ids.retain(|s| *s == id);
            }
            Some(ids)
        }
    };

    Ok(RecordQuery {
        student_ids,
        from: dates.lower_bound(),
        until: dates.upper_bound_exclusive(),
    })
}
