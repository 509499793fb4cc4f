pub mod assets;
pub mod projects;
pub mod settings;

pub use assets::{AssetError, AssetService, StoredAsset, UploadRequest};
pub use projects::{CreateProject, DeleteProject, ProjectError, ProjectService, UpdateProject};
pub use settings::{EnsureOutcome, SettingsError, SettingsService, SettingsUpdate};
