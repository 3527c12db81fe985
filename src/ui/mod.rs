mod app;
mod events;
mod widgets;

pub use app::{run_gui, WsTesterApp};
pub use events::AppEvent;
