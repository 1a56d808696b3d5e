pub mod dashboard_pane;
pub mod details_pane;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod styles;

use crate::app::App;
use crate::persistence::KeyValueStore;
use dashboard_pane::render_dashboard_pane;
use details_pane::render_details_pane;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use ratatui::{text::Span, widgets::Paragraph, Frame};
use styles::status_style;

/// Main render function - draws the entire UI
pub fn render<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let layout = create_layout(f.size());

    render_keybindings(f, layout.keybindings_area);

    render_list_pane(f, app, layout.list_area);
    render_details_pane(f, app, layout.details_area);
    render_dashboard_pane(f, app, layout.dashboard_area);

    if let Some(message) = &app.status_message {
        let status = Paragraph::new(Span::styled(format!(" {}", message), status_style()));
        f.render_widget(status, layout.status_area);
    }
}
