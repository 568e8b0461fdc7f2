//! Violation category management.

use bk_core::error::{BkError, BkResult};
use bk_core::models::caller::Caller;
use bk_core::models::category::{
    CreateViolationCategory, UpdateViolationCategory, ViolationCategory, default_categories,
};
use bk_core::repository::ViolationCategoryRepository;
use tracing::{debug, info};
use uuid::Uuid;

use crate::validation::{category_point, require_text};

pub struct CategoryService<C: ViolationCategoryRepository> {
    categories: C,
}

impl<C: ViolationCategoryRepository> CategoryService<C> {
    pub fn new(categories: C) -> Self {
        Self { categories }
    }

    /// Create a category for the caller's school. `input.school_id` is
    /// overwritten with the caller's tenant.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateViolationCategory,
    ) -> BkResult<ViolationCategory> {
        let name = require_text("name", &input.name)?;
        let default_point = category_point(input.default_point)?;

        self.ensure_name_free(caller.school_id, &name, None).await?;

        let category = self
            .categories
            .create(CreateViolationCategory {
                school_id: caller.school_id,
                name,
                default_point,
                default_level: input.default_level,
                description: input.description.trim().to_string(),
            })
            .await?;
        debug!(category_id = %category.id, school_id = %caller.school_id, "Created violation category");
        Ok(category)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> BkResult<ViolationCategory> {
        self.categories.get_by_id(caller.school_id, id).await
    }

    pub async fn list(&self, caller: &Caller, active_only: bool) -> BkResult<Vec<ViolationCategory>> {
        self.categories.list(caller.school_id, active_only).await
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        mut input: UpdateViolationCategory,
    ) -> BkResult<ViolationCategory> {
        if let Some(name) = input.name.as_deref() {
            let name = require_text("name", name)?;
            self.ensure_name_free(caller.school_id, &name, Some(id))
                .await?;
            input.name = Some(name);
        }
        if let Some(point) = input.default_point {
            category_point(point)?;
        }
        if let Some(description) = input.description.as_mut() {
            *description = description.trim().to_string();
        }

        let category = self.categories.update(caller.school_id, id, input).await?;
        debug!(category_id = %id, active = category.is_active, "Updated violation category");
        Ok(category)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> BkResult<()> {
        self.categories.delete(caller.school_id, id).await?;
        debug!(category_id = %id, "Deleted violation category");
        Ok(())
    }

    /// Seed the default category set for a school that has no categories
    /// yet. Once any category exists, active or not, nothing is created.
    pub async fn initialize_defaults(&self, caller: &Caller) -> BkResult<Vec<ViolationCategory>> {
        let existing = self.categories.list(caller.school_id, false).await?;
        if !existing.is_empty() {
            debug!(
                school_id = %caller.school_id,
                existing = existing.len(),
                "School already has violation categories, skipping defaults"
            );
            return Ok(Vec::new());
        }

        let mut created = Vec::new();
        for input in default_categories(caller.school_id) {
            created.push(self.categories.create(input).await?);
        }
        info!(
            school_id = %caller.school_id,
            created = created.len(),
            "Default violation categories initialized"
        );
        Ok(created)
    }

    async fn ensure_name_free(&self, school_id: Uuid, name: &str, except: Option<Uuid>) -> BkResult<()> {
        match self.categories.find_by_name(school_id, name).await? {
            Some(existing) if Some(existing.id) != except => Err(BkError::Conflict {
                reason: format!("violation category '{name}' already exists"),
            }),
            _ => Ok(()),
        }
    }
}
