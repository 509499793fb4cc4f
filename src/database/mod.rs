pub mod manager;
pub mod memory;
pub mod models;
pub mod projects;
pub mod settings;

pub use manager::{DatabaseManager, StoreError};
pub use memory::{MemoryProjectStore, MemorySettingsStore};
pub use models::{NewProject, Project, ProjectFilter, ProjectPatch, Setting};
pub use projects::{PgProjectStore, ProjectStore};
pub use settings::{PgSettingsStore, SettingsStore};
