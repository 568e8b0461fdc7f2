//! Counseling notes. Only counselors may write them; every read goes
//! through the visibility projector.

use bk_core::error::{BkError, BkResult};
use bk_core::models::caller::Caller;
use bk_core::models::counseling::{
    CounselingNoteFilter, CreateCounselingNote, NewCounselingNote, UpdateCounselingNote,
};
use bk_core::repository::{CounselingNoteRepository, Page, StudentDirectory};
use tracing::debug;
use uuid::Uuid;

use super::record_scope;
use crate::config::CaseConfig;
use crate::validation::{optional_text, require_id, require_text, resolve_student};
use crate::visibility::{CounselingNoteView, project, project_all};

pub struct CounselingService<N: CounselingNoteRepository, St: StudentDirectory> {
    notes: N,
    students: St,
    config: CaseConfig,
}

fn ensure_author(caller: &Caller) -> BkResult<()> {
    if caller.role.can_author_counseling() {
        Ok(())
    } else {
        Err(BkError::Forbidden {
            reason: "only counseling staff may write counseling notes".into(),
        })
    }
}

impl<N: CounselingNoteRepository, St: StudentDirectory> CounselingService<N, St> {
    pub fn new(notes: N, students: St, config: CaseConfig) -> Self {
        Self {
            notes,
            students,
            config,
        }
    }

    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateCounselingNote,
    ) -> BkResult<CounselingNoteView> {
        ensure_author(caller)?;
        let student_id = require_id("student_id", input.student_id)?;
        let internal_note = require_text("internal_note", &input.internal_note)?;

        resolve_student(&self.students, caller, student_id).await?;

        let note = self
            .notes
            .create(NewCounselingNote {
                school_id: caller.school_id,
                student_id,
                internal_note,
                parent_summary: optional_text(input.parent_summary),
                created_by: caller.user_id,
            })
            .await?;

        debug!(note_id = %note.id, student_id = %student_id, "Recorded counseling note");
        Ok(project(note, caller.role))
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> BkResult<CounselingNoteView> {
        let note = self.notes.get_by_id(caller.school_id, id).await?;
        Ok(project(note, caller.role))
    }

    pub async fn list(
        &self,
        caller: &Caller,
        filter: CounselingNoteFilter,
    ) -> BkResult<Page<CounselingNoteView>> {
        let request = self.config.page_request(filter.page, filter.page_size);
        let scope = record_scope(
            &self.students,
            caller,
            filter.student_id,
            filter.class_id,
            &filter.dates,
        )
        .await?;

        let result = self
            .notes
            .list(caller.school_id, scope, request.pagination())
            .await?;
        Ok(Page::from_result(result, request.page, request.page_size)
            .map(|note| project(note, caller.role)))
    }

    pub async fn list_for_student(
        &self,
        caller: &Caller,
        student_id: Uuid,
    ) -> BkResult<Vec<CounselingNoteView>> {
        resolve_student(&self.students, caller, student_id).await?;
        let notes = self
            .notes
            .list_by_student(caller.school_id, student_id)
            .await?;
        Ok(project_all(notes, caller.role))
    }

    /// Replace the internal note and/or the parent summary. A blank
    /// summary clears it; a blank internal note is rejected.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: UpdateCounselingNote,
    ) -> BkResult<CounselingNoteView> {
        ensure_author(caller)?;
        let internal_note = input
            .internal_note
            .as_deref()
            .map(|n| require_text("internal_note", n))
            .transpose()?;
        let parent_summary = input.parent_summary.map(optional_text);

        let note = self
            .notes
            .update(
                caller.school_id,
                id,
                UpdateCounselingNote {
                    internal_note,
                    parent_summary,
                },
            )
            .await?;

        debug!(note_id = %id, "Updated counseling note");
        Ok(project(note, caller.role))
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> BkResult<()> {
        ensure_author(caller)?;
        self.notes.delete(caller.school_id, id).await?;
        debug!(note_id = %id, "Deleted counseling note");
        Ok(())
    }
}
