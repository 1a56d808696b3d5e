use crate::app::App;
use crate::domain::format_time;
use crate::persistence::KeyValueStore;
use crate::stats::WEEKDAY_LABELS;
use crate::ui::styles::{bar_style, border_style, category_style, idle_style, title_style};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph},
    Frame,
};

/// Render totals, top task and category, and minutes per weekday
pub fn render_dashboard_pane<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(7), Constraint::Length(8)])
        .split(area);

    let tracker = &app.tracker;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("This week:  ", title_style()),
            Span::raw(format_time(tracker.weekly_total())),
        ]),
        Line::from(vec![
            Span::styled("This month: ", title_style()),
            Span::raw(format_time(tracker.monthly_total())),
        ]),
    ];

    lines.push(Line::from(vec![
        Span::styled("Top task:   ", title_style()),
        match tracker.most_active_task() {
            Some(task) => Span::raw(format!("{} ({})", task.name, format_time(task.total_time()))),
            None => Span::styled("-", idle_style()),
        },
    ]));

    lines.push(Line::raw(""));
    for total in tracker.total_time_by_category() {
        let color = tracker.find_category(&total.category).map(|c| c.color.as_str());
        lines.push(Line::from(vec![
            Span::styled(format!("● {:<10}", total.category), category_style(color)),
            Span::raw(format_time(total.seconds)),
        ]));
    }

    let summary = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Dashboard ", title_style())),
    );
    f.render_widget(summary, chunks[0]);

    let minutes: Vec<(&str, u64)> = WEEKDAY_LABELS
        .iter()
        .zip(tracker.day_of_week_totals())
        .map(|(label, seconds)| (*label, seconds / 60))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Minutes by weekday ", title_style())),
        )
        .data(minutes.as_slice())
        .bar_width(3)
        .bar_gap(1)
        .bar_style(bar_style());
    f.render_widget(chart, chunks[1]);
}
