//! Selection paths, selections and the selection manager

mod manager;
mod path;
mod set;

pub use manager::{Direction, ObserverId, SelectionManager, SelectionOperation};
pub use path::SelPath;
pub use set::Selection;
