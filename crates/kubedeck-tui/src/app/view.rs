/// The single active view; `Pod` is the hub every other view returns to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewState {
    Context,
    Namespace,
    #[default]
    Pod,
    Deployment,
    Log,
}

impl ViewState {
    pub const ALL: [ViewState; 5] = [
        ViewState::Context,
        ViewState::Namespace,
        ViewState::Pod,
        ViewState::Deployment,
        ViewState::Log,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Context => "Contexts",
            Self::Namespace => "Namespaces",
            Self::Pod => "Pods",
            Self::Deployment => "Deployments",
            Self::Log => "Logs",
        }
    }
}
