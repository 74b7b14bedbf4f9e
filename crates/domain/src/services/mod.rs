//! Domain services for the marketplace admin backend.
//!
//! Services hold the business rules and talk to persistence only through
//! the traits in [`crate::store`].

pub mod audit;
pub mod cache;
pub mod configuration;
pub mod content;
pub mod media;
pub mod notifier;
pub mod publisher;
pub mod validator;
pub mod versioning;

pub use audit::{audit_helpers, record_best_effort, AuditLogBuilder};
pub use cache::{CacheOptions, ConfigurationCache};
pub use configuration::{setting_cache_key, ConfigurationManager, ConfigurationOptions};
pub use content::{ContentManager, ContentOptions};
pub use media::{classify_file, MediaOptions, MediaProcessor};
pub use notifier::{ChangeNotifier, ListenerCallback, NotifierOptions};
pub use publisher::{content_cache_keys, ContentPublisher};
pub use validator::{CustomValidator, SettingsValidator, SettingsValidatorBuilder};
pub use versioning::{diff_versions, VersionManager};
