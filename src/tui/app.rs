//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Fail-closed artifact loading at startup
//! - Async inference via background worker

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::adapters::{ReferenceDataset, SvmClassifier};
use crate::application::InferenceService;
use crate::domain::FeatureRecord;
use crate::ports::Classifier;

use super::styles::{MedicalTheme, LOGO_SMALL};
use super::ui::{
    dashboard::{render_dashboard, DashboardState},
    inference::{render_inference, InferenceState},
    patient::{render_patient_form, PatientFormState},
    render_disclaimer,
};
use super::worker::{InferenceProgress, InferenceWorker, InferenceWorkerHandle};

/// Environment variable overriding the model artifact directory.
pub const MODEL_PATH_ENV: &str = "TRANSFUSEAI_MODEL_PATH";

/// Environment variable overriding the reference dataset path.
pub const DATA_PATH_ENV: &str = "TRANSFUSEAI_DATA_PATH";

const DEFAULT_MODEL_DIR: &str = "models";
const DEFAULT_DATA_PATH: &str = "data/X_test.csv";

const TICK_RATE: Duration = Duration::from_millis(50);

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
    Inference,
}

/// Main application state.
pub struct App<C>
where
    C: Classifier,
{
    screen: Screen,
    should_quit: bool,
    service: Arc<InferenceService<C>>,
    dataset: ReferenceDataset,
    form: PatientFormState,
    inference: InferenceState,
    worker: Option<InferenceWorkerHandle>,
}

impl App<SvmClassifier> {
    /// Load all artifacts and build the application.
    ///
    /// Fail-closed: a missing or tampered model, or a broken reference
    /// dataset, aborts startup. The TUI never runs in a degraded mode.
    ///
    /// # Errors
    /// Returns an error if the model or dataset cannot be loaded.
    pub fn new() -> Result<Self> {
        let model_dir = PathBuf::from(
            std::env::var(MODEL_PATH_ENV).unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string()),
        );
        let data_path = PathBuf::from(
            std::env::var(DATA_PATH_ENV).unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string()),
        );

        tracing::info!("Loading model artifact from {:?}", model_dir);
        let classifier = SvmClassifier::load(&model_dir)
            .with_context(|| format!("Failed to load model from {}", model_dir.display()))?;

        tracing::info!("Loading reference dataset from {:?}", data_path);
        let dataset = ReferenceDataset::load(&data_path).with_context(|| {
            format!("Failed to load reference dataset from {}", data_path.display())
        })?;

        Ok(Self::with_dependencies(Arc::new(classifier), dataset))
    }
}

impl<C> App<C>
where
    C: Classifier + 'static,
{
    /// Composition root: build the application from loaded dependencies.
    #[must_use]
    pub fn with_dependencies(classifier: Arc<C>, dataset: ReferenceDataset) -> Self {
        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            service: Arc::new(InferenceService::new(classifier)),
            dataset,
            form: PatientFormState::default(),
            inference: InferenceState::default(),
            worker: None,
        }
    }

    /// Run the TUI event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error on terminal I/O failures.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Restore the terminal even if the loop failed.
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|f| self.render(f))?;

            let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == event::KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if last_tick.elapsed() >= TICK_RATE {
                self.tick();
                last_tick = Instant::now();
            }

            if self.should_quit {
                self.form.clear_sensitive();
                return Ok(());
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::PatientForm => self.handle_form_key(key),
            Screen::Inference => self.handle_inference_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q' | 'Q') => self.should_quit = true,
            KeyCode::Char('n' | 'N') => self.open_form(),
            KeyCode::Char('i' | 'I') => self.screen = Screen::Inference,
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.form.clear_sensitive();
                self.screen = Screen::Dashboard;
            }
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::F(2) => self.form.load_sample_data(),
            KeyCode::Char('l' | 'L') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.form.clear_field();
            }
            KeyCode::Char(c) => self.form.input_char(c),
            _ => {}
        }
    }

    fn handle_inference_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('d' | 'D') => self.screen = Screen::Dashboard,
            KeyCode::Char('n' | 'N') => self.open_form(),
            _ => {}
        }
    }

    fn open_form(&mut self) {
        self.form = PatientFormState::default();
        self.screen = Screen::PatientForm;
    }

    /// Parse, validate, and hand the record to the worker.
    ///
    /// The form only parses text into numbers; the record validator owns
    /// the range and kind rules. Entered values are zeroized as soon as
    /// the record is handed off.
    fn submit_form(&mut self) {
        let raw = match self.form.to_raw_values() {
            Ok(raw) => raw,
            Err(message) => {
                self.form.error_message = Some(message);
                return;
            }
        };

        match FeatureRecord::validate(&raw) {
            Ok(record) => {
                self.inference = InferenceState::Predicting { progress: 0.0 };
                self.worker = Some(InferenceWorker::spawn(Arc::clone(&self.service), record));
                self.form.clear_sensitive();
                self.screen = Screen::Inference;
            }
            Err(e) => {
                tracing::warn!("Rejected patient record: {e}");
                self.form.error_message = Some(e.to_string());
            }
        }
    }

    /// Pump worker progress and advance the progress animation.
    fn tick(&mut self) {
        let mut updates = Vec::new();
        if let Some(worker) = &self.worker {
            while let Some(update) = worker.try_recv() {
                updates.push(update);
            }
        }

        for update in updates {
            match update {
                InferenceProgress::Predicting => {}
                InferenceProgress::Complete(assessment) => {
                    self.inference = InferenceState::Complete { assessment };
                    self.worker = None;
                }
                InferenceProgress::Error(message) => {
                    self.inference = InferenceState::Error { message };
                    self.worker = None;
                }
            }
        }

        // The classifier gives no intermediate progress; animate an
        // exponential approach toward 95% so the gauge still moves.
        if let InferenceState::Predicting { progress } = &mut self.inference {
            *progress += (0.95 - *progress) * 0.15;
        }
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(12),
                Constraint::Length(3),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);

        match self.screen {
            Screen::Dashboard => {
                let state = DashboardState {
                    model_loaded: true,
                    dataset_rows: self.dataset.len(),
                };
                render_dashboard(f, chunks[1], &state);
            }
            Screen::PatientForm => render_patient_form(f, chunks[1], &self.form),
            Screen::Inference => render_inference(f, chunks[1], &self.inference),
        }

        render_disclaimer(f, chunks[2]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let screen_name = match self.screen {
            Screen::Dashboard => "Dashboard",
            Screen::PatientForm => "Patient Data",
            Screen::Inference => "Assessment",
        };

        let text = Line::from(vec![
            Span::styled(format!(" {LOGO_SMALL} "), MedicalTheme::header()),
            Span::styled(
                "  Postoperative Anemia Risk",
                MedicalTheme::text_secondary(),
            ),
            Span::styled("  ·  ", MedicalTheme::text_muted()),
            Span::styled(screen_name, MedicalTheme::focused()),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border());

        f.render_widget(Paragraph::new(text).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskClass;
    use crate::ports::InferenceError;
    use std::thread;

    struct FixedClassifier {
        p_high: f64,
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<RiskClass>, InferenceError> {
            Ok(rows
                .iter()
                .map(|_| {
                    if self.p_high >= 0.5 {
                        RiskClass::High
                    } else {
                        RiskClass::Low
                    }
                })
                .collect())
        }

        fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<[f64; 2]>, InferenceError> {
            Ok(rows
                .iter()
                .map(|_| [1.0 - self.p_high, self.p_high])
                .collect())
        }
    }

    fn test_dataset() -> ReferenceDataset {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("X_test.csv");
        std::fs::write(
            &path,
            "type_of_anesthesia,diabetes,transfusion,operate_time,bmi,waiting_time,hb,platelet\n\
             1,0,500,90,24.5,2,110.0,180.0\n",
        )
        .expect("write csv");
        ReferenceDataset::load(&path).expect("load dataset")
    }

    fn test_app() -> App<FixedClassifier> {
        App::with_dependencies(Arc::new(FixedClassifier { p_high: 0.9 }), test_dataset())
    }

    fn press(app: &mut App<FixedClassifier>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_value(app: &mut App<FixedClassifier>, value: &str) {
        for c in value.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_starts_on_dashboard() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Dashboard);
        assert_eq!(app.dataset.len(), 1);
    }

    #[test]
    fn test_navigation_dashboard_to_form_and_back() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::PatientForm);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_quit_from_dashboard() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_submit_empty_form_sets_error() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::PatientForm);
        let message = app.form.error_message.as_deref().expect("error message");
        assert!(message.contains("required"));
    }

    #[test]
    fn test_submit_out_of_range_value_sets_error() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('n'));
        app.form.load_sample_data();
        app.form.fields[4].value = "51.0".to_string();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::PatientForm);
        let message = app.form.error_message.as_deref().expect("error message");
        assert!(message.contains("BMI"));
    }

    #[test]
    fn test_submit_valid_form_runs_assessment() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('n'));
        app.form.load_sample_data();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Inference);
        assert!(app.form.fields.iter().all(|f| f.value.is_empty()));

        for _ in 0..100 {
            app.tick();
            if matches!(app.inference, InferenceState::Complete { .. }) {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        match &app.inference {
            InferenceState::Complete { assessment } => {
                assert_eq!(assessment.result.predicted_class, RiskClass::High);
            }
            other => panic!("expected Complete, got {other:?}"),
        }
        assert!(app.worker.is_none());
    }

    #[test]
    fn test_form_typing_flows_into_fields() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('n'));
        type_value(&mut app, "1");
        press(&mut app, KeyCode::Tab);
        type_value(&mut app, "0");

        assert_eq!(app.form.fields[0].value, "1");
        assert_eq!(app.form.fields[1].value, "0");
    }
}
