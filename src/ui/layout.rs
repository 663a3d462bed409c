use {
    super::renderer,
    crate::{notify::Banner, state::StationView},
    ratatui::{
        layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Wrap},
        Frame,
    },
};

/// Render the station screen
pub fn render_layout(f: &mut Frame, area: Rect, view: &StationView, banner: Option<&Banner>) {
    let chunks = RatLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Code field
            Constraint::Length(1), // Status line
            Constraint::Min(4),    // Banner
            Constraint::Length(4), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_code_field(f, chunks[1], view);
    render_status(f, chunks[2], view);
    if let Some(banner) = banner {
        render_banner(f, chunks[3], banner);
    }
    render_footer(f, chunks[4], view);
}

fn render_header(f: &mut Frame, area: Rect) {
    let text = Line::from(vec![Span::styled(
        "Scanner Code-Barres",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )]);

    let header = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_code_field(f: &mut Frame, area: Rect, view: &StationView) {
    let text = if view.code.is_empty() {
        Span::styled(renderer::PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            view.code.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    };

    let field = Paragraph::new(Line::from(text))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(renderer::field_color(view)))
                .title("NumeroBL"),
        );
    f.render_widget(field, area);
}

fn render_status(f: &mut Frame, area: Rect, view: &StationView) {
    let status = Paragraph::new(Span::styled(
        renderer::status_text(view),
        Style::default().fg(renderer::status_color(view)),
    ))
    .alignment(Alignment::Center);
    f.render_widget(status, area);
}

fn render_banner(f: &mut Frame, area: Rect, banner: &Banner) {
    let color = renderer::banner_color(&banner.result);
    let title = format!(" {} {} ", banner.result.icon(), banner.result.title());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(Color::White).bg(color).add_modifier(Modifier::BOLD),
        ));

    let body = Paragraph::new(banner.result.message.as_str())
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(body, area);
}

fn render_footer(f: &mut Frame, area: Rect, view: &StationView) {
    let text = vec![
        Line::from(vec![
            Span::styled("Scans: ", Style::default().fg(Color::Cyan)),
            Span::raw(view.stats.scans.to_string()),
            Span::raw(" | "),
            Span::styled("OK: ", Style::default().fg(Color::Green)),
            Span::raw(view.stats.successes.to_string()),
            Span::raw(" | "),
            Span::styled("Erreurs: ", Style::default().fg(Color::Red)),
            Span::raw(view.stats.failures.to_string()),
            Span::raw(" | "),
            Span::styled("Dernier scan: ", Style::default().fg(Color::Cyan)),
            Span::raw(renderer::format_scan_time(view.last_scan_at)),
        ]),
        Line::from("Le scan se valide automatiquement | F5: simuler | F8: fermer | Esc: quitter"),
    ];

    let footer = Block::default().borders(Borders::ALL).title("Station");
    f.render_widget(Paragraph::new(text).block(footer), area);
}
