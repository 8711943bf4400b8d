pub mod checklist;
pub mod classify;
pub mod render;
pub mod style;
pub mod tools;

pub use checklist::ChecklistStore;
pub use classify::{Verdict, classify};
pub use render::Renderer;
