pub mod project;
pub mod setting;

pub use project::{NewProject, Project, ProjectFilter, ProjectPatch};
pub use setting::Setting;
