//! Database entity definitions.

pub mod cache_entry;
pub mod content;
pub mod media;
pub mod setting;

pub use cache_entry::CacheEntryEntity;
pub use content::{ContentVersionEntity, PublishedContentEntity};
pub use media::MediaAssetEntity;
pub use setting::{SettingChangeEntity, SettingEntity};
