use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::status::{describe_remaining, Bulb};
use crate::storage::TaskRepository;
use super::app::{App, InputMode, ViewMode};

pub fn ui<R: TaskRepository>(f: &mut Frame, app: &mut App<R>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Body
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Tasks => render_tasks(f, app, chunks[0]),
        ViewMode::Chart => render_chart(f, app, chunks[0]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Tasks => "q: Quit | ←/→: Employee | a: Add | s: Cycle Status | x: Finish Subtask | o: Sort by Priority | v: Chart",
            ViewMode::Chart => "q: Quit | v: View Tasks",
        },
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };
    let help = match &app.message {
        Some(msg) => format!("{}  ·  {}", msg, help_text),
        None => help_text.to_string(),
    };

    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[1]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
        f.render_widget(Clear, area);

        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(app.add_state.step.prompt()));

        f.render_widget(input, area);
    }
}

fn render_tasks<R: TaskRepository>(f: &mut Frame, app: &mut App<R>, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
        .split(area);

    let rows: Vec<Row> = app
        .tasks
        .iter()
        .map(|t| {
            let (days_left, bulb) = app.indicator(t);

            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.title.clone()),
                Cell::from(t.priority.to_string()),
                Cell::from(t.recurrence.to_string()),
                Cell::from(t.deadline.to_string()),
                Cell::from(describe_remaining(days_left)),
                Cell::from(format!("{} {}", bulb.symbol(), t.status)),
            ]).style(Style::default().fg(bulb_color(bulb)))
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(14),
    ];

    let title = match app.current_employee() {
        Some(e) => format!("Tasks for {} ({}){}", e.name, e.department, if app.by_priority { " · by priority" } else { "" }),
        None => "No employees".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["ID", "Title", "Priority", "Recurrence", "Deadline", "Remaining", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, panes[0], &mut app.state);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(t) = app.selected_task() {
        lines.push(Line::from(format!("Category: {}", t.category.as_deref().unwrap_or("-"))));
        lines.push(Line::from(format!("Description: {}", t.description.as_deref().unwrap_or("-"))));
        if let Some(file) = &t.file_path {
            lines.push(Line::from(format!("Uploaded File: {}", file)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("Subtasks:"));
        if app.subtasks.is_empty() {
            lines.push(Line::from("  none"));
        }
        for s in &app.subtasks {
            let mark = if s.status.is_completed() { "x" } else { " " };
            lines.push(Line::from(format!("  [{}] {} ({})", mark, s.title, s.status)));
        }
    } else {
        lines.push(Line::from("No tasks assigned to this employee."));
    }

    let details = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Details"));
    f.render_widget(details, panes[1]);
}

fn render_chart<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let bars: Vec<Bar> = app
        .counts
        .iter()
        .map(|(name, count)| {
            Bar::default()
                .label(Line::from(name.clone()))
                .value(*count as u64)
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Total Tasks Assigned to Employees"))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

// Same mapping as `commands::bulb_color`, which targets comfy-table colours.
fn bulb_color(bulb: Bulb) -> Color {
    match bulb {
        Bulb::Green => Color::Green,
        Bulb::Yellow => Color::Yellow,
        Bulb::Red => Color::Red,
    }
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
