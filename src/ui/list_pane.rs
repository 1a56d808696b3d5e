use crate::app::App;
use crate::domain::{format_time, Task};
use crate::persistence::KeyValueStore;
use crate::ui::styles::{border_style, category_style, default_style, idle_style, running_style, selected_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the task list pane
pub fn render_list_pane<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let active_id = app.tracker.active_task().map(|t| t.id.as_str());
    let live = app.tracker.current_session().map(|s| s.duration).unwrap_or(0);

    let tasks = app.visible_tasks();
    let items: Vec<ListItem> = if tasks.is_empty() {
        vec![ListItem::new(Line::styled(
            "  No tasks yet. Add one with `timetrack task add <name>`",
            idle_style(),
        ))]
    } else {
        tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let running = active_id == Some(task.id.as_str());
                let color = app.tracker.find_category(&task.category).map(|c| c.color.as_str());
                let line = create_task_line(task, running, if running { live } else { 0 }, color);
                let style = if idx == app.selected_index {
                    selected_style()
                } else {
                    default_style()
                };
                ListItem::new(line).style(style)
            })
            .collect()
    };

    let title = match &app.category_filter {
        Some(category) => format!(" Tasks [{}] ", category),
        None => " Tasks ".to_string(),
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}

/// Format: ▶ Write report  [work]  00:12:30
fn create_task_line(task: &Task, running: bool, live_seconds: u64, color: Option<&str>) -> Line<'static> {
    let mut spans = Vec::new();

    if running {
        spans.push(Span::styled("▶ ".to_string(), running_style()));
    } else {
        spans.push(Span::raw("  ".to_string()));
    }

    spans.push(Span::raw(task.name.clone()));
    spans.push(Span::raw("  ".to_string()));
    spans.push(Span::styled(format!("[{}]", task.category), category_style(color)));
    spans.push(Span::raw("  ".to_string()));

    // Committed time plus the in-flight session
    let shown = task.total_time() + live_seconds;
    let time_style = if running { running_style() } else { idle_style() };
    spans.push(Span::styled(format!("⏱ {}", format_time(shown)), time_style));

    Line::from(spans)
}
