use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, InputMode};
use crate::commands::HABIT_WEEK;
use crate::dates::{format_nice_date, is_overdue, time_left};
use crate::habits::{current_run, recent_days, streak};
use crate::models::Priority;
use crate::occurrence::Occurrence;
use crate::views::{important_events, upcoming_birthdays, View};

pub fn ui(f: &mut Frame, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)].as_ref())
        .split(f.area());

    render_sidebar(f, app, columns[0]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // View
            Constraint::Length(1), // Carousel progress
            Constraint::Length(3), // Help
        ].as_ref())
        .split(columns[1]);

    match app.view {
        View::Dashboard => render_dashboard(f, app, chunks[0]),
        View::Habits => render_habits(f, app, chunks[0]),
        _ => render_reminders(f, app, chunks[0]),
    }

    let label = if app.paused {
        "paused".to_string()
    } else {
        format!("next: {} in {}s", app.view.next().title(), app.time_left.as_secs() + 1)
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(app.progress())
        .label(label);
    f.render_widget(gauge, chunks[1]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view {
            View::Habits => "q: Quit | ←/→: View | j/k: Move | x: Toggle Today | d: Del | p: Pause",
            View::Dashboard => "q: Quit | ←/→: View | a: Add | p: Pause",
            _ => "q: Quit | ←/→: View | j/k: Move | Space: Done | d: Del | a: Add | p: Pause",
        },
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };
    let help = match &app.status {
        Some(msg) => format!("{} | {}", help_text, msg),
        None => help_text.to_string(),
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let title = match app.add_state.step {
            0 => "Add Reminder: Enter Title",
            1 => "Add Reminder: Enter Due (YYYY-MM-DD or YYYY-MM-DDTHH:MM)",
            2 => "Add Reminder: Enter Category (Optional)",
            3 => "Add Reminder: Enter Priority (low/medium/high)",
            4 => "Add Reminder: Enter Recurrence (daily, weekly, custom 1,3,5 ...)",
            _ => "Add Reminder",
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let stats = app.stats();
    let lines: Vec<Line> = View::CAROUSEL
        .iter()
        .map(|v| {
            let count = stats.count_for(*v).map(|n| format!(" {:>3}", n)).unwrap_or_default();
            let text = format!("{:<15}{}", v.title(), count);
            if *v == app.view {
                Line::from(Span::styled(
                    format!("> {}", text),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {}", text))
            }
        })
        .collect();
    let sidebar = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Remindust"));
    f.render_widget(sidebar, area);
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Green),
    }
}

fn occurrence_rows<'a>(items: &[Occurrence<'_>]) -> Vec<Row<'a>> {
    let now = Local::now();
    items
        .iter()
        .map(|o| {
            let t = o.template;
            let left = time_left(o.due_date, &now);
            let left_style = if is_overdue(o.due_date, false, &now) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(t.title.clone()),
                Cell::from(t.category.clone()),
                Cell::from(t.priority.to_string()).style(priority_style(t.priority)),
                Cell::from(format_nice_date(o.due_date)),
                Cell::from(left).style(left_style),
                Cell::from(t.cost.map(|c| format!("{:.2}", c)).unwrap_or_default()),
            ])
        })
        .collect()
}

fn occurrence_table<'a>(items: &[Occurrence<'_>], title: String) -> Table<'a> {
    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(22),
        Constraint::Length(12),
        Constraint::Length(8),
    ];
    Table::new(occurrence_rows(items), widths)
        .header(Row::new(vec!["Title", "Category", "Priority", "Due", "Time Left", "Cost"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ")
}

fn render_reminders(f: &mut Frame, app: &mut App, area: Rect) {
    let items = app.items();
    let title = format!("{} ({})", app.view.title(), items.len());
    let table = occurrence_table(&items, title);
    drop(items);
    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6), Constraint::Min(6)].as_ref())
        .split(area);

    let stats = app.stats();
    let summary = vec![
        Line::from(format!(
            "Today {}   This week {}   This month {}",
            stats.today, stats.week, stats.month
        )),
        Line::from(format!(
            "Works {}   Shopping {}   Outstanding {}   Habits {}",
            stats.works, stats.shopping, stats.outstanding, stats.habits
        )),
        Line::from(Span::styled(
            Local::now().format("%A, %B %-d  %H:%M").to_string(),
            Style::default().fg(Color::Gray),
        )),
    ];
    let summary = Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title("Dashboard"));
    f.render_widget(summary, chunks[0]);

    let birthdays = upcoming_birthdays(&app.reminders, &Local::now());
    f.render_widget(occurrence_table(&birthdays, "Upcoming Birthdays".to_string()), chunks[1]);

    let events = important_events(&app.reminders);
    f.render_widget(occurrence_table(&events, "Important Events".to_string()), chunks[2]);
}

fn render_habits(f: &mut Frame, app: &mut App, area: Rect) {
    let today = Local::now().date_naive();
    let days = recent_days(today, HABIT_WEEK);

    let mut header = vec!["Habit".to_string()];
    header.extend(days.iter().map(|d| d.format("%a").to_string()));
    header.push("Run".to_string());
    header.push("Streak".to_string());

    let rows: Vec<Row> = app
        .habits
        .iter()
        .map(|h| {
            let mut cells = vec![Cell::from(h.title.clone())];
            for d in &days {
                if h.completed_dates.contains(d) {
                    cells.push(Cell::from("✔").style(Style::default().fg(Color::Green)));
                } else {
                    cells.push(Cell::from("·").style(Style::default().fg(Color::DarkGray)));
                }
            }
            cells.push(Cell::from(current_run(h, today).to_string()));
            cells.push(Cell::from(streak(h).to_string()).style(Style::default().fg(Color::Yellow)));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Min(20)];
    widths.extend(days.iter().map(|_| Constraint::Length(4)));
    widths.push(Constraint::Length(5));
    widths.push(Constraint::Length(7));

    let table = Table::new(rows, widths)
        .header(Row::new(header)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title("Habits"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
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
