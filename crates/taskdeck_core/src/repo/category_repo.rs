//! Category repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every statement filters by `user_id`; categories are never shared.
//! - Multi-row reads are ordered by name (case-insensitive), uuid as the
//!   tie-breaker.
//! - Deleting a category detaches its tasks via `ON DELETE SET NULL`.

use crate::model::category::{Category, CategoryId};
use crate::repo::{from_epoch_ms, parse_uuid, to_epoch_ms, RepoError, RepoResult};
use crate::scope::Scope;
use chrono::Utc;
use rusqlite::{params, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    icon,
    color,
    user_id,
    created_at,
    updated_at
FROM categories";

/// Repository interface for category persistence.
pub trait CategoryRepository {
    fn create(&self, category: &Category) -> RepoResult<CategoryId>;
    fn update(&self, category: &Category) -> RepoResult<()>;
    fn get_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn list_all(&self) -> RepoResult<Vec<Category>>;
    fn delete_by_id(&self, id: CategoryId) -> RepoResult<bool>;

    fn delete(&self, category: &Category) -> RepoResult<bool> {
        self.delete_by_id(category.uuid)
    }
}

/// SQLite-backed category repository bound to one acting identity.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
    scope: Scope,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection, scope: Scope) -> Self {
        Self { conn, scope }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create(&self, category: &Category) -> RepoResult<CategoryId> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite);
        };
        if category.user_id != user_id {
            return Err(RepoError::ScopeViolation);
        }
        category.validate()?;

        self.conn.execute(
            "INSERT INTO categories (
                uuid,
                name,
                icon,
                color,
                user_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                category.uuid.to_string(),
                category.name.as_str(),
                category.icon.as_str(),
                category.color.as_str(),
                user_id.to_string(),
                to_epoch_ms(category.created_at),
                to_epoch_ms(category.updated_at),
            ],
        )?;

        Ok(category.uuid)
    }

    fn update(&self, category: &Category) -> RepoResult<()> {
        let Some(user_id) = self.scope.user_id() else {
            return Err(RepoError::AnonymousWrite);
        };
        category.validate()?;

        let changed = self.conn.execute(
            "UPDATE categories
             SET
                name = ?1,
                icon = ?2,
                color = ?3,
                updated_at = ?4
             WHERE uuid = ?5
               AND user_id = ?6;",
            params![
                category.name.as_str(),
                category.icon.as_str(),
                category.color.as_str(),
                to_epoch_ms(Utc::now()),
                category.uuid.to_string(),
                user_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(category.uuid));
        }

        Ok(())
    }

    fn get_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL} WHERE uuid = ?1 AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), user_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }

        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Category>> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }

        Ok(categories)
    }

    fn delete_by_id(&self, id: CategoryId) -> RepoResult<bool> {
        let Some(user_id) = self.scope.user_id() else {
            return Ok(false);
        };

        let changed = self.conn.execute(
            "DELETE FROM categories WHERE uuid = ?1 AND user_id = ?2;",
            params![id.to_string(), user_id.to_string()],
        )?;

        Ok(changed > 0)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_id")?;

    let category = Category {
        uuid: parse_uuid("categories.uuid", &uuid_text)?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        user_id: parse_uuid("categories.user_id", &user_text)?,
        created_at: from_epoch_ms("categories.created_at", row.get("created_at")?)?,
        updated_at: from_epoch_ms("categories.updated_at", row.get("updated_at")?)?,
    };
    category.validate()?;
    Ok(category)
}
