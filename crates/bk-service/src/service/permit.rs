//! Exit permits: issue, return, receipt.

use bk_core::error::{BkError, BkResult};
use bk_core::models::caller::Caller;
use bk_core::models::permit::{
    CreatePermit, NewPermit, Permit, PermitDocument, PermitFilter, RecordReturn,
};
use bk_core::repository::{Page, PermitQuery, PermitRepository, StaffDirectory, StudentDirectory};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::record_scope;
use crate::config::CaseConfig;
use crate::lifecycle::{already_returned, plan_return};
use crate::validation::{require_id, require_text, resolve_student, resolve_teacher};

pub struct PermitService<P, St, Sf>
where
    P: PermitRepository,
    St: StudentDirectory,
    Sf: StaffDirectory,
{
    permits: P,
    students: St,
    staff: Sf,
    config: CaseConfig,
}

impl<P, St, Sf> PermitService<P, St, Sf>
where
    P: PermitRepository,
    St: StudentDirectory,
    Sf: StaffDirectory,
{
    pub fn new(permits: P, students: St, staff: Sf, config: CaseConfig) -> Self {
        Self {
            permits,
            students,
            staff,
            config,
        }
    }

    pub async fn create(&self, caller: &Caller, input: CreatePermit) -> BkResult<Permit> {
        let student_id = require_id("student_id", input.student_id)?;
        let reason = require_text("reason", &input.reason)?;
        let exit_time = input.exit_time.ok_or_else(|| BkError::missing("exit_time"))?;
        let teacher_id = require_id("responsible_teacher_id", input.responsible_teacher_id)?;

        resolve_student(&self.students, caller, student_id).await?;
        resolve_teacher(&self.staff, caller, teacher_id).await?;

        let permit = self
            .permits
            .create(NewPermit {
                school_id: caller.school_id,
                student_id,
                reason,
                exit_time,
                responsible_teacher_id: teacher_id,
                created_by: caller.user_id,
            })
            .await?;

        debug!(permit_id = %permit.id, student_id = %student_id, "Issued exit permit");
        Ok(permit)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> BkResult<Permit> {
        self.permits.get_by_id(caller.school_id, id).await
    }

    /// Filtered listing ordered by exit time, newest first. Date filters
    /// apply to `exit_time`.
    pub async fn list(&self, caller: &Caller, filter: PermitFilter) -> BkResult<Page<Permit>> {
        let request = self.config.page_request(filter.page, filter.page_size);
        let scope = record_scope(
            &self.students,
            caller,
            filter.student_id,
            filter.class_id,
            &filter.dates,
        )
        .await?;
        let query = PermitQuery {
            scope,
            responsible_teacher_id: filter.responsible_teacher_id,
            has_returned: filter.has_returned,
        };

        let result = self
            .permits
            .list(caller.school_id, query, request.pagination())
            .await?;
        Ok(Page::from_result(result, request.page, request.page_size))
    }

    pub async fn list_for_student(&self, caller: &Caller, student_id: Uuid) -> BkResult<Vec<Permit>> {
        resolve_student(&self.students, caller, student_id).await?;
        self.permits
            .list_by_student(caller.school_id, student_id)
            .await
    }

    /// Close an open permit. A second return is a conflict regardless of
    /// the time supplied.
    pub async fn record_return(&self, caller: &Caller, id: Uuid, input: RecordReturn) -> BkResult<Permit> {
        let permit = self.permits.get_by_id(caller.school_id, id).await?;
        let return_time = plan_return(&permit, input.return_time)?;

        let permit = self
            .permits
            .mark_returned(caller.school_id, id, return_time)
            .await?
            .ok_or_else(already_returned)?;

        info!(permit_id = %id, return_time = %return_time, "Student returned");
        Ok(permit)
    }

    /// Assemble the data printed on a permit receipt.
    pub async fn document(&self, caller: &Caller, id: Uuid) -> BkResult<PermitDocument> {
        let permit = self.permits.get_by_id(caller.school_id, id).await?;
        let student = resolve_student(&self.students, caller, permit.student_id).await?;
        let teacher = resolve_teacher(&self.staff, caller, permit.responsible_teacher_id).await?;

        Ok(PermitDocument {
            permit_id: permit.id,
            student_name: student.name,
            student_nis: student.nis,
            student_nisn: student.nisn,
            class_name: student.class_name.unwrap_or_default(),
            school_name: student.school_name,
            reason: permit.reason,
            exit_time: permit.exit_time,
            responsible_teacher: teacher.name,
            generated_at: Utc::now(),
        })
    }

    /// Store the location of a rendered receipt.
    pub async fn attach_document(&self, caller: &Caller, id: Uuid, url: &str) -> BkResult<Permit> {
        let url = require_text("document_url", url)?;
        let permit = self
            .permits
            .set_document_url(caller.school_id, id, url)
            .await?;
        debug!(permit_id = %id, "Attached permit document");
        Ok(permit)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> BkResult<()> {
        self.permits.delete(caller.school_id, id).await?;
        debug!(permit_id = %id, "Deleted exit permit");
        Ok(())
    }
}
