//! Process-lifetime context memory.

pub mod item;
pub mod store;

pub use item::{ContextItem, ContextKind};
pub use store::{ContextStore, PROJECT_ID_KEY};
