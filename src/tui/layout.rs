use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::readable_timestamp;
use crate::tui::app::{TuiApp, View};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, rows[0], colors);

    match app.view {
        View::List => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(rows[1]);
            render_list_pane(frame, app, columns[0], colors);
            render_article(frame, app, columns[1], colors, false);
        }
        View::Detail => render_article(frame, app, rows[1], colors, true),
    }

    render_status_bar(frame, app, rows[2], colors);
}

fn render_header(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let mut spans = vec![Span::styled(
        format!(" newsreel | {} | page {} ", app.feed.mode, app.feed.current_page),
        Style::default().fg(colors.title).add_modifier(Modifier::BOLD),
    )];
    if app.feed.is_offline {
        spans.push(Span::styled(
            " OFFLINE: showing cached articles ",
            Style::default()
                .fg(colors.offline_fg)
                .bg(colors.offline_bg)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let items: Vec<ListItem> = app
        .feed
        .results
        .iter()
        .map(|article| {
            ListItem::new(vec![
                Line::from(article.title.clone()),
                Line::from(vec![
                    Span::styled(
                        article.source_name.clone(),
                        Style::default().fg(colors.metadata_source),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        article.readable_published_at(),
                        Style::default().fg(colors.metadata_date),
                    ),
                ]),
            ])
        })
        .collect();

    let title = format!(
        " Articles ({}) [{}/{}] ",
        app.feed.results.len(),
        app.index + 1,
        app.feed.results.len().max(1)
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.active_border));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selection_bg_active)
                .fg(colors.selection_fg_active)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_article(
    frame: &mut Frame,
    app: &TuiApp,
    area: Rect,
    colors: &ColorConfig,
    focused: bool,
) {
    let border = if focused {
        colors.active_border
    } else {
        colors.inactive_border
    };

    let content = match &app.preview {
        Some(article) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    article.title.clone(),
                    Style::default().fg(colors.title).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Source: {}", article.source_name),
                    Style::default().fg(colors.metadata_source),
                )),
            ];
            if let Some(author) = &article.author {
                lines.push(Line::from(Span::styled(
                    format!("By: {}", author),
                    Style::default().fg(colors.metadata_author),
                )));
            }
            lines.push(Line::from(Span::styled(
                format!("Date: {}", readable_timestamp(&article.published_at)),
                Style::default().fg(colors.metadata_date),
            )));
            lines.push(Line::from(Span::styled(
                format!("Link: {}", article.url),
                Style::default().fg(colors.metadata_link),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(
                "─".repeat(area.width.saturating_sub(2) as usize),
            ));
            lines.push(Line::from(""));

            if let Some(description) = &article.description {
                lines.extend(description.lines().map(|l| Line::from(l.to_string())));
                lines.push(Line::from(""));
            }
            if article.content.is_some() {
                lines.extend(
                    article
                        .display_content()
                        .lines()
                        .map(|l| Line::from(l.to_string())),
                );
            }
            Text::from(lines)
        }
        None => Text::from("No article selected"),
    };

    let block = Block::default()
        .title(if focused { " Article " } else { " Preview " })
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((if focused { app.detail_scroll } else { 0 }, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if app.feed.is_refreshing {
        "Refreshing...".to_string()
    } else if app.feed.is_fetching {
        "Loading more...".to_string()
    } else if app.view == View::Detail {
        "j/k:Scroll  s:Save  o:Open  Esc:Back  q:Quit".to_string()
    } else {
        "j/k:Nav  n:More  R:Refresh  t:Mode  Enter:Read  s:Save  o:Open  q:Quit".to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Article, SyncState};
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &mut TuiApp) -> String {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, app, &ColorConfig::default()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_offline_banner() {
        let mut state = SyncState::default();
        state.is_offline = true;
        let mut app = TuiApp::new(state);

        assert!(rendered(&mut app).contains("OFFLINE"));
    }

    #[test]
    fn test_list_shows_titles() {
        let mut state = SyncState::default();
        state.results = vec![Article::new("https://a.example.com/1", "Markets rally", "").summary()];
        let mut app = TuiApp::new(state);

        let screen = rendered(&mut app);
        assert!(screen.contains("Markets rally"));
        assert!(!screen.contains("OFFLINE"));
    }
}
