//! Inference visualization view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{RiskAssessment, RiskClass};
use crate::tui::styles::MedicalTheme;

/// Inference state
#[derive(Debug, Clone)]
pub enum InferenceState {
    /// Not started
    Idle,
    /// Classifier running (progress is animated, not measured)
    Predicting { progress: f64 },
    /// Completed with result
    Complete { assessment: RiskAssessment },
    /// Error occurred
    Error { message: String },
}

impl Default for InferenceState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Render the inference view
pub fn render_inference(f: &mut Frame, area: Rect, state: &InferenceState) {
    match state {
        InferenceState::Idle => render_idle(f, area),
        InferenceState::Predicting { progress } => render_predicting(f, area, *progress),
        InferenceState::Complete { assessment } => render_result(f, area, assessment),
        InferenceState::Error { message } => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No assessment in progress.",
            MedicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", MedicalTheme::text_muted()),
            Span::styled("N", MedicalTheme::key_hint()),
            Span::styled(" to enter patient data.", MedicalTheme::text_muted()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border())
        .title(Span::styled(" Risk Assessment ", MedicalTheme::subtitle()));

    let p = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(p, area);
}

fn render_predicting(f: &mut Frame, area: Rect, progress: f64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "  Running risk assessment...",
        MedicalTheme::subtitle(),
    )));
    f.render_widget(title, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border_focused())
                .title(Span::styled(" Classifier ", MedicalTheme::text())),
        )
        .gauge_style(MedicalTheme::info())
        .ratio(progress.clamp(0.0, 1.0))
        .label(format!("{:.0}%", progress * 100.0));
    f.render_widget(gauge, chunks[1]);

    let note = Paragraph::new(Line::from(Span::styled(
        "  Computation runs locally; no data leaves this machine.",
        MedicalTheme::text_muted(),
    )));
    f.render_widget(note, chunks[2]);
}

fn render_result(f: &mut Frame, area: Rect, assessment: &RiskAssessment) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Risk class banner
            Constraint::Length(3), // Probability gauge
            Constraint::Length(3), // Probability breakdown
            Constraint::Min(6),    // Recommendation
            Constraint::Length(2), // Metadata
        ])
        .split(area);

    let class = assessment.result.predicted_class;
    let banner_text = match class {
        RiskClass::High => "⚠  HIGH RISK of postoperative anemia",
        RiskClass::Low => "✓  LOWER RISK of postoperative anemia",
    };
    let banner = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(banner_text, MedicalTheme::risk_class(class))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::risk_class(class))
            .title(Span::styled(" Result ", MedicalTheme::title())),
    )
    .alignment(Alignment::Center);
    f.render_widget(banner, chunks[0]);

    let p_high = assessment.result.class_probabilities[1];
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border())
                .title(Span::styled(" P(high risk) ", MedicalTheme::text())),
        )
        .gauge_style(MedicalTheme::gauge(p_high))
        .ratio(p_high.clamp(0.0, 1.0))
        .label(format!("{:.1}%", p_high * 100.0));
    f.render_widget(gauge, chunks[1]);

    let proba = assessment.result.class_probabilities;
    let breakdown = Paragraph::new(Line::from(vec![
        Span::styled("  P(low) = ", MedicalTheme::text_secondary()),
        Span::styled(format!("{:.3}", proba[0]), MedicalTheme::success()),
        Span::styled("    P(high) = ", MedicalTheme::text_secondary()),
        Span::styled(format!("{:.3}", proba[1]), MedicalTheme::danger()),
        Span::styled(
            format!("    confidence {:.1}%", assessment.result.confidence()),
            MedicalTheme::text(),
        ),
    ]));
    f.render_widget(breakdown, chunks[2]);

    let recommendation = Paragraph::new(assessment.recommendation.as_str())
        .style(MedicalTheme::text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border())
                .title(Span::styled(" Recommendation ", MedicalTheme::subtitle())),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(recommendation, chunks[3]);

    let meta = Paragraph::new(Line::from(Span::styled(
        format!(
            "  assessment {}  ·  {}",
            assessment.id,
            assessment.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        MedicalTheme::text_muted(),
    )));
    f.render_widget(meta, chunks[4]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Assessment failed",
            MedicalTheme::danger(),
        )),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text_secondary())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", MedicalTheme::text_muted()),
            Span::styled("N", MedicalTheme::key_hint()),
            Span::styled(" to try again or ", MedicalTheme::text_muted()),
            Span::styled("Esc", MedicalTheme::key_hint()),
            Span::styled(" for the dashboard.", MedicalTheme::text_muted()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(MedicalTheme::danger())
        .title(Span::styled(" Error ", MedicalTheme::danger()));

    let p = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
