use savanna_db::{Database, Result};

use super::models::{AdminPage, LayoutMode, LayoutPreference};

#[derive(Clone)]
pub struct PreferenceStore {
    db: Database,
}

impl PreferenceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Stored mode for `page`, grid when nothing was saved yet.
    pub async fn layout(&self, page: AdminPage) -> Result<LayoutMode> {
        let mode: Option<String> =
            sqlx::query_scalar("SELECT mode FROM layout_preferences WHERE page = ?")
                .bind(page.as_str())
                .fetch_optional(self.db.pool())
                .await?;

        match mode {
            Some(mode) => Ok(mode.parse::<LayoutMode>()?),
            None => Ok(LayoutMode::default()),
        }
    }

    pub async fn set_layout(&self, page: AdminPage, mode: LayoutMode) -> Result<LayoutPreference> {
        sqlx::query(
            r#"
            INSERT INTO layout_preferences (page, mode)
            VALUES (?, ?)
            ON CONFLICT(page) DO UPDATE SET mode = excluded.mode
            "#,
        )
        .bind(page.as_str())
        .bind(mode.as_str())
        .execute(self.db.pool())
        .await?;

        Ok(LayoutPreference { page, mode })
    }

    /// One entry per admin page, defaults filled in.
    pub async fn all(&self) -> Result<Vec<LayoutPreference>> {
        let mut preferences = Vec::with_capacity(AdminPage::ALL.len());
        for &page in AdminPage::ALL {
            preferences.push(LayoutPreference {
                page,
                mode: self.layout(page).await?,
            });
        }
        Ok(preferences)
    }
}
