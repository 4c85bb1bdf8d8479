//! Category use-case service.
//!
//! Thin orchestration over the scoped category repository; the interesting
//! behavior (detaching tasks on delete) lives in the storage schema.

use crate::model::category::{Category, CategoryId, CategoryPatch};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::RepoError;
use crate::scope::Scope;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for category use-cases.
#[derive(Debug)]
pub enum CategoryServiceError {
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for CategoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent category state: {details}")
            }
        }
    }
}

impl Error for CategoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for CategoryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Input for creating a category; icon/color fall back to entity defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Category service facade over the scoped repository.
pub struct CategoryService<C: CategoryRepository> {
    scope: Scope,
    categories: C,
}

impl<C: CategoryRepository> CategoryService<C> {
    pub fn new(scope: Scope, categories: C) -> Self {
        Self { scope, categories }
    }

    /// Lists the acting user's categories ordered by name.
    pub fn get_all_categories(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.categories.list_all()?)
    }

    pub fn get_category_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryServiceError> {
        Ok(self.categories.get_by_id(id)?)
    }

    pub fn create_category(&self, input: NewCategory) -> Result<Category, CategoryServiceError> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite.into());
        };

        let mut category = Category::new(user_id, input.name);
        if let Some(icon) = input.icon {
            category.icon = icon;
        }
        if let Some(color) = input.color {
            category.color = color;
        }

        let id = self.categories.create(&category)?;
        self.categories
            .get_by_id(id)?
            .ok_or(CategoryServiceError::InconsistentState(
                "created category not found in read-back",
            ))
    }

    /// Applies a partial update; `Ok(None)` when absent or not owned.
    pub fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Option<Category>, CategoryServiceError> {
        let Some(mut category) = self.categories.get_by_id(id)? else {
            return Ok(None);
        };

        category.apply_patch(patch);
        self.categories.update(&category)?;
        let updated = self.categories.get_by_id(id)?.ok_or(
            CategoryServiceError::InconsistentState("updated category not found in read-back"),
        )?;
        Ok(Some(updated))
    }

    /// Deletes a category; its tasks are detached, not deleted. Returns
    /// `false` when absent or not owned.
    pub fn delete_category(&self, id: CategoryId) -> Result<bool, CategoryServiceError> {
        Ok(self.categories.delete_by_id(id)?)
    }
}
