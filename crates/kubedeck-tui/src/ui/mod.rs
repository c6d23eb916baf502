pub mod components;
mod layout;
pub mod screens;
mod theme;

pub use layout::Layout;
pub use theme::Theme;

use ratatui::Frame;

use kubedeck_k8s::ControlPlane;

use crate::app::{Controller, ViewState};
use components::{ErrorBanner, StatusBar, view_hints};
use screens::{LogViewerScreen, TableScreen, render_header};

/// Draw the whole screen for the controller's current view
pub fn render<C: ControlPlane>(frame: &mut Frame, controller: &mut Controller<C>) {
    let area = frame.area();
    let (header_area, content_area, status_area) = Layout::main(area);
    let view = controller.view();

    let context = controller
        .context()
        .map(|context| context.name.clone())
        .unwrap_or_else(|| "-".to_string());
    render_header(
        frame,
        header_area,
        &context,
        controller.namespace(),
        view.title(),
    );

    let status = match view {
        ViewState::Pod => {
            TableScreen::render(frame, content_area, controller.pods_mut());
            TableScreen::status(controller.pods())
        }
        ViewState::Deployment => {
            TableScreen::render(frame, content_area, controller.deployments_mut());
            TableScreen::status(controller.deployments())
        }
        ViewState::Context => {
            TableScreen::render(frame, content_area, controller.contexts_mut());
            TableScreen::status(controller.contexts())
        }
        ViewState::Namespace => {
            TableScreen::render(frame, content_area, controller.namespaces_mut());
            TableScreen::status(controller.namespaces())
        }
        ViewState::Log => {
            LogViewerScreen::render(frame, content_area, controller.log_view());
            LogViewerScreen::status(controller.log_view())
        }
    };

    frame.render_widget(StatusBar::new().hints(view_hints(view)).right(status), status_area);

    if let Some(error) = controller.error() {
        frame.render_widget(ErrorBanner::new(error), Layout::banner(area));
    }
}
