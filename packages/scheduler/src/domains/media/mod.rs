//! Media domain - generated artifacts referenced by post jobs.

pub mod media_asset;

pub use media_asset::{MediaAsset, MediaKind, NewMediaAsset};
