//! Category domain model.
//!
//! Categories are per-user display groupings. Deleting one never deletes
//! its tasks; the storage schema detaches them (`ON DELETE SET NULL`).

use crate::model::{require_text, ValidationError};
use crate::scope::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a category.
pub type CategoryId = Uuid;

pub const CATEGORY_NAME_MAX_CHARS: usize = 100;
const ICON_MAX_CHARS: usize = 10;
const COLOR_MAX_CHARS: usize = 7;

const DEFAULT_ICON: &str = "\u{1F4C1}";
const DEFAULT_COLOR: &str = "#6b7280";

/// A user-owned grouping for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: CategoryId,
    pub name: String,
    /// Short symbol (usually an emoji) shown next to the name.
    pub icon: String,
    /// `#rrggbb` hex color.
    pub color: String,
    /// Owning user; categories are never shared.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Creates a category with the default icon and color.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            icon: DEFAULT_ICON.to_string(),
            color: DEFAULT_COLOR.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, CATEGORY_NAME_MAX_CHARS)?;
        require_text("icon", &self.icon, ICON_MAX_CHARS)?;
        if !is_hex_color(&self.color) {
            return Err(ValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }

    /// Applies a partial update field by field.
    pub fn apply_patch(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(icon) = &patch.icon {
            self.icon = icon.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}

/// Mutable category fields for partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

fn is_hex_color(value: &str) -> bool {
    value.len() <= COLOR_MAX_CHARS
        && value.strip_prefix('#').is_some_and(|rest| {
            rest.len() == 6 && rest.chars().all(|c| c.is_ascii_hexdigit())
        })
}
