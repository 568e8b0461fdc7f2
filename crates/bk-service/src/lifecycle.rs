//! Exit permit lifecycle: `Open -> Returned`, one-way.

use bk_core::error::{BkError, BkResult};
use bk_core::models::permit::Permit;
use chrono::{DateTime, Utc};
use tracing::warn;

pub const ALREADY_RETURNED: &str = "permit already returned";

pub fn already_returned() -> BkError {
    BkError::Conflict {
        reason: ALREADY_RETURNED.into(),
    }
}

/// Check that `permit` may be closed at `return_time` and return the
/// instant to persist.
///
/// Returns before `exit_time` are accepted and only logged.
pub fn plan_return(permit: &Permit, return_time: Option<DateTime<Utc>>) -> BkResult<DateTime<Utc>> {
    let return_time = return_time.ok_or_else(|| BkError::missing("return_time"))?;
    if permit.has_returned() {
        return Err(already_returned());
    }
    if return_time < permit.exit_time {
        warn!(
            permit_id = %permit.id,
            exit_time = %permit.exit_time,
            return_time = %return_time,
            "Return recorded before exit time"
        );
    }
    Ok(return_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bk_core::ErrorKind;
    use chrono::Duration;
    use uuid::Uuid;

    fn open_permit() -> Permit {
        Permit {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            reason: "Sick".into(),
            exit_time: Utc::now(),
            return_time: None,
            responsible_teacher_id: Uuid::new_v4(),
            document_url: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_permit_can_return() {
        let permit = open_permit();
        let at = permit.exit_time + Duration::hours(2);
        assert_eq!(plan_return(&permit, Some(at)).unwrap(), at);
    }

    #[test]
    fn return_before_exit_is_accepted() {
        let permit = open_permit();
        let at = permit.exit_time - Duration::hours(1);
        assert!(plan_return(&permit, Some(at)).is_ok());
    }

    #[test]
    fn missing_time_and_second_return_fail() {
        let mut permit = open_permit();
        assert!(matches!(
            plan_return(&permit, None),
            Err(BkError::MissingField {
                field: "return_time"
            })
        ));

        permit.return_time = Some(Utc::now());
        let err = plan_return(&permit, Some(Utc::now())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
