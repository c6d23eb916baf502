/// Everything a key press can ask the controller to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Leave the current view for the pod view
    Back,

    // Navigation
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
    Select,

    // View switches
    ShowContexts,
    ShowNamespaces,
    ShowDeployments,
    ShowPods,

    /// Jump to the end of the log and keep following it
    Follow,
}
