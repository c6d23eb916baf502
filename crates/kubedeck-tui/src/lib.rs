//! TUI components for kubedeck
//!
//! This crate provides the terminal user interface for kubedeck,
//! including the view controller, settings, keybindings, event handling,
//! resource tables and rendering.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;
pub mod views;

pub use app::{Action, Controller, ControllerConfig, LogMessage, Message, ViewState};
pub use config::{KeyBinding, KeyBindings, KeyContext, Settings, SettingsError};
pub use tui::{Event, EventHandler, Scroll, Tui};
pub use ui::{Layout, Theme, render};
