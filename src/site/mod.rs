//! Server-rendered pages with owner-only edit affordances.

pub mod html;
pub mod pages;
pub mod trigger;
pub mod widgets;

pub use trigger::OwnerTrigger;
pub use widgets::{EditableWidget, WidgetDraft, WidgetError};

/// Browser side of the owner flow: key chord, login dialog, widget editors.
pub const OWNER_SCRIPT: &str = include_str!("owner.js");
