//! Patient feature input form.
//!
//! The form is generated from the feature schema, so field order, labels,
//! and hints always match what the classifier expects. Field values are
//! zeroized when the form is cleared.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::schema::FEATURE_SCHEMA;
use crate::domain::FEATURE_COUNT;
use crate::tui::styles::MedicalTheme;

/// A single input field, derived from the schema.
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub value: String,
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        let fields = FEATURE_SCHEMA
            .iter()
            .map(|spec| FormField {
                label: spec.label,
                hint: spec.hint,
                value: String::new(),
            })
            .collect();

        Self {
            fields,
            selected_field: 0,
            error_message: None,
        }
    }
}

impl PatientFormState {
    /// Move to next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add character to current field
    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    /// Remove last character from current field
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
        self.error_message = None;
    }

    /// Clear current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.zeroize();
        self.fields[self.selected_field].value.clear();
    }

    /// Zeroize all entered values.
    ///
    /// Called after submission and on exit so patient data does not
    /// linger in freed buffers.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            field.value.zeroize();
            field.value.clear();
        }
        self.selected_field = 0;
        self.error_message = None;
    }

    /// Load sample data for demo purposes
    pub fn load_sample_data(&mut self) {
        let sample = ["1", "0", "500", "90", "24.5", "2", "110.0", "180.0"];
        for (field, value) in self.fields.iter_mut().zip(sample.iter()) {
            field.value.zeroize();
            field.value.clear();
            field.value.push_str(value);
        }
        self.error_message = None;
    }

    /// Parse the entered text into a raw value vector in schema order.
    ///
    /// Only parsing happens here; range and kind checks belong to the
    /// record validator so the rules live in one place.
    ///
    /// # Errors
    /// Returns a message naming the first field that is empty or not a
    /// number.
    pub fn to_raw_values(&self) -> Result<Vec<f64>, String> {
        let mut raw = Vec::with_capacity(FEATURE_COUNT);
        for field in &self.fields {
            if field.value.is_empty() {
                return Err(format!("{} is required", field.label));
            }
            let value: f64 = field
                .value
                .parse()
                .map_err(|_| format!("{} is not a number", field.label))?;
            raw.push(value);
        }
        Ok(raw)
    }
}

/// Render the patient input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(12),   // Form fields
            Constraint::Length(2), // Error message
            Constraint::Length(2), // Help
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("  Patient Data Entry", MedicalTheme::subtitle()),
        Span::styled(
            "  (values entered locally, never transmitted)",
            MedicalTheme::text_muted(),
        ),
    ]));
    f.render_widget(title, chunks[0]);

    // Two columns, four fields each
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let half = state.fields.len().div_ceil(2);
    render_field_column(f, columns[0], state, 0, half);
    render_field_column(f, columns[1], state, half, state.fields.len());

    if let Some(error) = &state.error_message {
        let error_text = Paragraph::new(Line::from(vec![
            Span::styled("  ⚠ ", MedicalTheme::danger()),
            Span::styled(error.as_str(), MedicalTheme::danger()),
        ]));
        f.render_widget(error_text, chunks[2]);
    }

    let help = Paragraph::new(Line::from(vec![
        Span::styled("  Tab/↓↑", MedicalTheme::key_hint()),
        Span::styled(" navigate  ", MedicalTheme::key_desc()),
        Span::styled("Enter", MedicalTheme::key_hint()),
        Span::styled(" submit  ", MedicalTheme::key_desc()),
        Span::styled("Ctrl+L", MedicalTheme::key_hint()),
        Span::styled(" clear field  ", MedicalTheme::key_desc()),
        Span::styled("F2", MedicalTheme::key_hint()),
        Span::styled(" sample data  ", MedicalTheme::key_desc()),
        Span::styled("Esc", MedicalTheme::key_hint()),
        Span::styled(" back", MedicalTheme::key_desc()),
    ]));
    f.render_widget(help, chunks[3]);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    start: usize,
    end: usize,
) {
    let count = end - start;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Length(3)).collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, idx) in (start..end).enumerate() {
        render_field(f, rows[slot], &state.fields[idx], idx == state.selected_field);
    }
}

fn render_field(f: &mut Frame, area: Rect, field: &FormField, focused: bool) {
    let border_style = if focused {
        MedicalTheme::border_focused()
    } else {
        MedicalTheme::border()
    };

    let label_style = if focused {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(field.label, label_style));

    let cursor = if focused { "█" } else { "" };
    let content = if field.value.is_empty() && !focused {
        Line::from(Span::styled(field.hint, MedicalTheme::text_muted()))
    } else {
        Line::from(vec![
            Span::styled(field.value.as_str(), MedicalTheme::text()),
            Span::styled(cursor, MedicalTheme::focused()),
            Span::styled(
                if field.value.is_empty() {
                    String::new()
                } else {
                    format!("  ({})", field.hint)
                },
                MedicalTheme::text_muted(),
            ),
        ])
    };

    let p = Paragraph::new(content).block(block);
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_is_built_from_schema() {
        let form = PatientFormState::default();
        assert_eq!(form.fields.len(), FEATURE_COUNT);
        assert_eq!(form.fields[0].label, "Type of Anesthesia");
        assert_eq!(form.fields[4].label, "BMI");
        assert_eq!(form.fields[7].label, "Preop Platelet");
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut form = PatientFormState::default();
        assert_eq!(form.selected_field, 0);
        form.prev_field();
        assert_eq!(form.selected_field, FEATURE_COUNT - 1);
        form.next_field();
        assert_eq!(form.selected_field, 0);
    }

    #[test]
    fn test_input_char_filters_non_numeric() {
        let mut form = PatientFormState::default();
        form.input_char('2');
        form.input_char('x');
        form.input_char('4');
        form.input_char('.');
        form.input_char('5');
        assert_eq!(form.fields[0].value, "24.5");
    }

    #[test]
    fn test_to_raw_values_requires_all_fields() {
        let mut form = PatientFormState::default();
        form.load_sample_data();
        form.fields[6].value.clear();

        let err = form.to_raw_values().expect_err("must fail");
        assert!(err.contains("Preop Hemoglobin"));
    }

    #[test]
    fn test_to_raw_values_parses_sample() {
        let mut form = PatientFormState::default();
        form.load_sample_data();

        let raw = form.to_raw_values().expect("parse");
        assert_eq!(raw, vec![1.0, 0.0, 500.0, 90.0, 24.5, 2.0, 110.0, 180.0]);
    }

    #[test]
    fn test_to_raw_values_rejects_garbage() {
        let mut form = PatientFormState::default();
        form.load_sample_data();
        form.fields[2].value = "5-0".to_string();

        let err = form.to_raw_values().expect_err("must fail");
        assert!(err.contains("not a number"));
    }

    #[test]
    fn test_clear_sensitive_wipes_all_fields() {
        let mut form = PatientFormState::default();
        form.load_sample_data();
        form.selected_field = 3;
        form.error_message = Some("stale".to_string());

        form.clear_sensitive();

        assert!(form.fields.iter().all(|f| f.value.is_empty()));
        assert_eq!(form.selected_field, 0);
        assert!(form.error_message.is_none());
    }
}
