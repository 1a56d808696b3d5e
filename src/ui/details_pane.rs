use crate::app::App;
use crate::domain::{format_clock, format_date, format_time};
use crate::persistence::KeyValueStore;
use crate::ui::styles::{border_style, category_style, idle_style, running_style, title_style};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the live timer for the running task, or the selected task when idle
pub fn render_details_pane<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Timer ", title_style()));

    let mut lines = Vec::new();

    match (app.tracker.active_task(), app.tracker.current_session()) {
        (Some(task), Some(session)) => {
            let color = app.tracker.find_category(&task.category).map(|c| c.color.as_str());
            lines.push(Line::styled(format_time(session.duration), running_style()));
            lines.push(Line::raw(""));
            lines.push(Line::from(vec![
                Span::raw(task.name.clone()),
                Span::raw("  "),
                Span::styled(format!("[{}]", task.category), category_style(color)),
            ]));
            lines.push(Line::styled(
                format!("since {}", format_clock(session.start_time)),
                idle_style(),
            ));
            lines.push(Line::styled(
                format!("total {}", format_time(task.total_time() + session.duration)),
                idle_style(),
            ));
        }
        _ => {
            lines.push(Line::styled(format_time(0), idle_style()));
            lines.push(Line::raw(""));
            match app.selected_task() {
                Some(task) => {
                    lines.push(Line::raw(format!("Press Enter to start \"{}\"", task.name)));
                    lines.push(Line::styled(
                        format!(
                            "{} sessions, created {}",
                            task.sessions().len(),
                            format_date(task.created_at)
                        ),
                        idle_style(),
                    ));
                    if !task.description.is_empty() {
                        lines.push(Line::styled(task.description.clone(), idle_style()));
                    }
                }
                None => lines.push(Line::raw("No timer running")),
            }
        }
    }

    let paragraph = Paragraph::new(lines).block(block).alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}
