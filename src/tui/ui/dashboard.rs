//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::styles::{MedicalTheme, LOGO};

/// Dashboard state for rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardState {
    pub model_loaded: bool,
    pub dataset_rows: usize,
}

/// Render the dashboard
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Logo
            Constraint::Length(7), // System status
            Constraint::Min(6),    // Quick actions
        ])
        .split(area);

    let logo = Paragraph::new(LOGO)
        .style(MedicalTheme::subtitle())
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(logo, chunks[0]);

    render_status(f, chunks[1], state);
    render_actions(f, chunks[2]);
}

fn render_status(f: &mut Frame, area: Rect, state: &DashboardState) {
    let model_line = if state.model_loaded {
        Line::from(vec![
            Span::styled("  Model      ", MedicalTheme::text_secondary()),
            Span::styled("● Ready", MedicalTheme::success()),
            Span::styled("  (signature verified)", MedicalTheme::text_muted()),
        ])
    } else {
        Line::from(vec![
            Span::styled("  Model      ", MedicalTheme::text_secondary()),
            Span::styled("● Unavailable", MedicalTheme::danger()),
        ])
    };

    let dataset_line = Line::from(vec![
        Span::styled("  Reference  ", MedicalTheme::text_secondary()),
        Span::styled(
            format!("{} samples loaded", state.dataset_rows),
            MedicalTheme::text(),
        ),
    ]);

    let mode_line = Line::from(vec![
        Span::styled("  Mode       ", MedicalTheme::text_secondary()),
        Span::styled("Local only", MedicalTheme::info()),
        Span::styled("  (no network access)", MedicalTheme::text_muted()),
    ]);

    let text = vec![Line::from(""), model_line, dataset_line, mode_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border())
        .title(Span::styled(" System Status ", MedicalTheme::subtitle()));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn render_actions(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  [N] ", MedicalTheme::key_hint()),
            Span::styled("New risk assessment", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("  [I] ", MedicalTheme::key_hint()),
            Span::styled("View last result", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("  [Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border())
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()));

    f.render_widget(Paragraph::new(text).block(block), area);
}
