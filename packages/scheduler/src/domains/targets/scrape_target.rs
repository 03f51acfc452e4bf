//! Scrape target model.
//!
//! Targets are operator-managed configuration: which sources to scrape and
//! how often. The weekly planner reads them to lay out each target's scrape
//! jobs; their lifecycle is otherwise owned by an external CRUD surface.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::domains::jobs::TaskKind;

pub type ScrapeTargetId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "target_kind", rename_all = "snake_case")]
pub enum TargetKind {
    Website,
    Instagram,
}

impl TargetKind {
    /// The job kind a scrape of this target dispatches as.
    pub fn scrape_task_kind(&self) -> TaskKind {
        match self {
            TargetKind::Website => TaskKind::WebsiteScrape,
            TargetKind::Instagram => TaskKind::InstagramScrape,
        }
    }
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeTarget {
    pub id: ScrapeTargetId,
    pub name: String,
    pub url: String,
    pub kind: TargetKind,
    pub frequency_hours: i32,
    pub created_at: DateTime<Utc>,
}

impl ScrapeTarget {
    pub async fn create(
        name: &str,
        url: &str,
        kind: TargetKind,
        frequency_hours: i32,
        pool: &PgPool,
    ) -> Result<Self> {
        let target = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO scrape_targets (name, url, kind, frequency_hours, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, name, url, kind, frequency_hours, created_at
            "#,
        )
        .bind(name)
        .bind(url)
        .bind(kind)
        .bind(frequency_hours)
        .fetch_one(pool)
        .await?;

        Ok(target)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let targets = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, name, url, kind, frequency_hours, created_at
            FROM scrape_targets
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(targets)
    }
}
