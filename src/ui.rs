//! TUI rendering for Lifeline.
//!
//! This module handles all drawing using the `ratatui` crate: a title bar,
//! the status banner, whichever content panel [`UiState::panels`] selects,
//! and a footer with key help.

use crate::app::App;
use crate::render::{RenderedList, ResourceCard};
use crate::state::{LoadingPhase, Severity, UiState};
use ratatui::{prelude::*, widgets::*};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Renders one frame of the TUI based on current application state.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current controller state.
pub fn render(f: &mut Frame, app: &App) {
    let status = app.state.status();
    let banner_height = if status.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.size());

    render_title(f, chunks[0]);

    if let Some(banner) = status {
        let color = severity_color(banner.severity);
        let p = Paragraph::new(banner.text)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(p, chunks[1]);
    }

    let panels = app.state.panels();
    if panels.loading {
        render_loading(f, app, chunks[2]);
    } else if panels.results {
        render_results(f, app, chunks[2]);
    } else if panels.offline {
        render_offline(f, chunks[2]);
    } else {
        render_idle(f, chunks[2]);
    }

    render_footer(f, app, chunks[3]);
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            " LIFELINE ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Emergency resources near you"),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(title, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to find emergency resources near you.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your position is used only for this lookup.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let frame = SPINNER[app.tick_count % SPINNER.len()];
    let step = match app.state {
        UiState::Loading(LoadingPhase::Fetching) => "Step 2/2: contacting the resource service",
        _ => "Step 1/2: locating you",
    };
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}  Searching", frame),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(step, Style::default().fg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Resources Nearby ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let cards = match &app.rendered {
        Some(RenderedList::Cards(cards)) => cards,
        Some(RenderedList::Placeholder(msg)) => {
            let p = Paragraph::new(msg.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(p, area);
            return;
        }
        None => {
            f.render_widget(block, area);
            return;
        }
    };

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| card_item(card, i == app.selected_index))
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn card_item(card: &ResourceCard, selected: bool) -> ListItem<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let name_style = if selected {
        bold.fg(Color::Cyan).bg(Color::Rgb(30, 30, 60))
    } else {
        bold
    };
    let marker = if selected { "▶ " } else { "  " };

    let mut lines = vec![
        Line::from(Span::styled(format!("{}{}", marker, card.name), name_style)),
        Line::from(vec![
            Span::styled("    Type:    ", bold),
            Span::raw(card.kind.clone()),
        ]),
        Line::from(vec![
            Span::styled("    Address: ", bold),
            Span::raw(card.address.clone()),
        ]),
    ];
    if let Some(phone) = &card.phone {
        lines.push(Line::from(vec![
            Span::styled("    Phone:   ", bold),
            Span::styled(
                phone.number.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Span::styled(
                format!("  <{}>", phone.href),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    lines.push(Line::from(Span::styled(
        format!("    {}", card.distance_label()),
        Style::default().fg(Color::Green),
    )));
    lines.push(Line::from(""));

    ListItem::new(lines)
}

fn render_offline(f: &mut Frame, area: Rect) {
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "OFFLINE MODE",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Nearby resources could not be looked up."),
        Line::from("If you are in immediate danger, call your local emergency number (911 / 112)."),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to try again.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(" Offline ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(p, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " Enter find resources   ↑/↓ select   q quit",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(at) = app.last_lookup {
        spans.push(Span::styled(
            format!("   │  Last lookup {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(coords) = app.last_coords {
        spans.push(Span::styled(
            format!("  ({:.4}, {:.4})", coords.latitude, coords.longitude),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    }
}
