//! Media asset model.
//!
//! Assets are produced by the media-generation service when a create-media
//! job completes. Post jobs reference them through `asset_ref_id`; the
//! asset's kind decides whether the successors are image or video posts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use typed_builder::TypedBuilder;

pub type MediaAssetId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Insert payload for a generated artifact.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewMediaAsset {
    pub blob_url: String,
    #[builder(default, setter(strip_option))]
    pub caption: Option<String>,
    pub kind: MediaKind,
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: MediaAssetId,
    pub blob_url: String,
    pub caption: Option<String>,
    pub kind: MediaKind,
    pub created_at: DateTime<Utc>,
}

impl MediaAsset {
    /// Store a newly generated artifact.
    pub async fn create(new_asset: NewMediaAsset, pool: &PgPool) -> Result<Self> {
        let asset = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO media_assets (blob_url, caption, kind, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, blob_url, caption, kind, created_at
            "#,
        )
        .bind(&new_asset.blob_url)
        .bind(&new_asset.caption)
        .bind(new_asset.kind)
        .fetch_one(pool)
        .await?;

        Ok(asset)
    }

    pub async fn find_by_id(id: MediaAssetId, pool: &PgPool) -> Result<Self> {
        let asset = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, blob_url, caption, kind, created_at
            FROM media_assets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .context("Media asset not found")?;

        Ok(asset)
    }
}
