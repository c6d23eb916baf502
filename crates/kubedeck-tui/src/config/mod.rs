mod keybindings;
mod settings;

pub use keybindings::{KeyBinding, KeyBindings, KeyContext};
pub use settings::{Settings, SettingsError};
