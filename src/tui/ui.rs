use crate::tui::app::{App, Mode, Pane};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
};
use vidshelf::core::PIN_LIMIT;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Panes
            Constraint::Length(3), // Status
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let title = Paragraph::new(format!("vidshelf: {}", app.owner()))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(chunks[1]);

    let evicting = matches!(app.mode, Mode::ChooseEviction { .. });
    let pinned_title = if evicting {
        "Pinned: choose one to replace".to_string()
    } else {
        format!("Pinned ({}/{PIN_LIMIT})", app.view.pinned.len())
    };
    let focus = app.focus;
    app.pinned_list
        .render(f, panes[0], &pinned_title, focus == Pane::Pinned || evicting);
    app.recent_list
        .render(f, panes[1], "Recent", focus == Pane::Recent && !evicting);
    app.all_list
        .render(f, panes[2], "Collections", focus == Pane::All && !evicting);

    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, chunks[2]);

    let help = match app.mode {
        Mode::Browse => {
            "[Tab] Pane  [↑↓] Navigate  [Shift+↑↓/K J] Move pin  [p] Pin  [u] Unpin  [Enter] Open  [n] New  [d] Delete  [r] Refresh  [q] Exit"
        }
        Mode::NewCollection => "[Enter] Create  [Esc] Cancel",
        Mode::ChooseEviction { .. } => "[↑↓] Choose  [Enter] Replace  [Esc] Cancel",
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);

    if app.mode == Mode::NewCollection {
        let area = centered(f.area(), 50, 3);
        f.render_widget(Clear, area);
        app.name_input.render(f, area);
    }
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
