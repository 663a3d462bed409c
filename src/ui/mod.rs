mod layout;
mod renderer;
mod terminal;

pub use terminal::{run_ui, UiOptions};
