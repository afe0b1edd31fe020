mod actor;
mod handle;
pub mod models;
pub mod navigator;
pub mod projector;
pub mod range;

pub use handle::AgendaHandle;
pub use models::{AgendaSnapshot, MappedEvent};
pub use navigator::{ViewMode, ViewNavigator, ViewState};
pub use range::ViewWindow;
