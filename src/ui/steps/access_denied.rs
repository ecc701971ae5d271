use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Shown instead of the wizard when the session acts for another account
pub fn render(frame: &mut Frame, area: Rect, delegate: Option<&str>) {
    let mut lines = vec![
        Line::from(Span::styled(
            "You don't have access to this page",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if let Some(delegate) = delegate {
        lines.push(Line::from(format!(
            "You're signed in as a delegate of {delegate}. Card assignment is restricted."
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to exit",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().title(" Assign card ").borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}
