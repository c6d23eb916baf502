use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, ViewState};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Shift is dropped for characters; the case already carries it
    pub fn from_event(event: &KeyEvent) -> Self {
        let modifiers = match event.code {
            KeyCode::Char(_) => event.modifiers - KeyModifiers::SHIFT,
            _ => event.modifiers,
        };
        Self {
            code: event.code,
            modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    ListNavigation,
    PodView,
    DeploymentView,
    LogViewer,
}

impl KeyContext {
    /// Contexts consulted for `view`, most specific first
    pub fn chain(view: ViewState) -> &'static [KeyContext] {
        match view {
            ViewState::Pod => &[KeyContext::PodView, KeyContext::ListNavigation, KeyContext::Global],
            ViewState::Deployment => &[
                KeyContext::DeploymentView,
                KeyContext::ListNavigation,
                KeyContext::Global,
            ],
            ViewState::Context | ViewState::Namespace => {
                &[KeyContext::ListNavigation, KeyContext::Global]
            }
            ViewState::Log => &[KeyContext::LogViewer, KeyContext::Global],
        }
    }
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Esc), Action::Back);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Table navigation, shared by every list view
        let mut list_nav = HashMap::new();
        list_nav.insert(KeyBinding::new(KeyCode::Char('j')), Action::Down);
        list_nav.insert(KeyBinding::new(KeyCode::Down), Action::Down);
        list_nav.insert(KeyBinding::new(KeyCode::Char('k')), Action::Up);
        list_nav.insert(KeyBinding::new(KeyCode::Up), Action::Up);
        list_nav.insert(KeyBinding::new(KeyCode::Char('g')), Action::Top);
        list_nav.insert(KeyBinding::new(KeyCode::Home), Action::Top);
        list_nav.insert(KeyBinding::new(KeyCode::Char('G')), Action::Bottom);
        list_nav.insert(KeyBinding::new(KeyCode::End), Action::Bottom);
        list_nav.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        list_nav.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        list_nav.insert(KeyBinding::new(KeyCode::Enter), Action::Select);
        bindings.insert(KeyContext::ListNavigation, list_nav);

        let mut pod_view = HashMap::new();
        pod_view.insert(KeyBinding::new(KeyCode::Char('c')), Action::ShowContexts);
        pod_view.insert(KeyBinding::new(KeyCode::Char('n')), Action::ShowNamespaces);
        pod_view.insert(KeyBinding::new(KeyCode::Char('d')), Action::ShowDeployments);
        bindings.insert(KeyContext::PodView, pod_view);

        let mut deployment_view = HashMap::new();
        deployment_view.insert(KeyBinding::new(KeyCode::Char('p')), Action::ShowPods);
        deployment_view.insert(KeyBinding::new(KeyCode::Char('c')), Action::ShowContexts);
        deployment_view.insert(KeyBinding::new(KeyCode::Char('n')), Action::ShowNamespaces);
        bindings.insert(KeyContext::DeploymentView, deployment_view);

        // Log viewer bindings - less-like navigation
        let mut log_viewer = HashMap::new();
        log_viewer.insert(KeyBinding::new(KeyCode::Char('j')), Action::Down);
        log_viewer.insert(KeyBinding::new(KeyCode::Down), Action::Down);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('k')), Action::Up);
        log_viewer.insert(KeyBinding::new(KeyCode::Up), Action::Up);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('f')), Action::PageDown);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_viewer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('g')), Action::Top);
        log_viewer.insert(KeyBinding::new(KeyCode::Home), Action::Top);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('G')), Action::Bottom);
        log_viewer.insert(KeyBinding::new(KeyCode::End), Action::Bottom);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('f')), Action::Follow);
        bindings.insert(KeyContext::LogViewer, log_viewer);

        Self { bindings }
    }

    /// Look up action for key event in the given view
    pub fn get_action(&self, view: ViewState, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        KeyContext::chain(view)
            .iter()
            .filter_map(|context| self.bindings.get(context))
            .find_map(|context_bindings| context_bindings.get(&binding))
            .copied()
    }

    /// Quit keys win over everything else, in every view
    pub fn is_quit(&self, key: &KeyEvent) -> bool {
        let binding = KeyBinding::from_event(key);
        self.bindings
            .get(&KeyContext::Global)
            .and_then(|global| global.get(&binding))
            == Some(&Action::Quit)
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
