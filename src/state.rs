use std::path::Path;

use anyhow::Context;
use booking_freq::analysis::{FrequencyAnalyzer, FrequencyReport, MAX_UPPER_LIMIT};
use booking_freq::data::loader;
use booking_freq::export::{self, ExportFormat};
use booking_freq::{Config, Dataset, ExportError, WindowMode, WindowSelection};

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    /// Nothing went wrong, but there is nothing to show yet.
    Neutral(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Success(s) | Status::Neutral(s) | Status::Error(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    pub analyzer: FrequencyAnalyzer,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// File name of the loaded dataset, for display.
    pub source_name: Option<String>,

    /// Month / range pickers.
    pub selection: WindowSelection,

    pub max_upper: u32,

    /// Result of the last successful run.
    pub report: Option<FrequencyReport>,

    /// Outcome of the last file load.
    pub upload_feedback: Option<Status>,

    /// Outcome of the last run or export.
    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            analyzer: FrequencyAnalyzer::new(&config.analysis.excluded_class),
            max_upper: config.analysis.default_max_upper.clamp(1, MAX_UPPER_LIMIT),
            config,
            dataset: None,
            source_name: None,
            selection: WindowSelection::default(),
            report: None,
            upload_feedback: None,
            status: None,
        }
    }

    /// Ingest a newly loaded dataset and reset the period pickers to it.
    pub fn set_dataset(&mut self, dataset: Dataset, source_name: String) {
        self.selection = WindowSelection::defaults_for(self.selection.mode, &dataset);
        self.dataset = Some(dataset);
        self.source_name = Some(source_name);
        self.report = None;
        self.status = None;
    }

    /// Load a file; on failure the current dataset stays in place.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} bookings ({} periods) from {}",
                    dataset.len(),
                    dataset.periods.len(),
                    path.display()
                );
                self.set_dataset(dataset, name.clone());
                self.upload_feedback = Some(Status::Success(format!("File loaded: {name}")));
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.upload_feedback = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }

    /// Switch analysis type; the pickers go back to the dataset's defaults.
    pub fn set_mode(&mut self, mode: WindowMode) {
        self.selection = match &self.dataset {
            Some(ds) => WindowSelection::defaults_for(mode, ds),
            None => WindowSelection {
                mode,
                ..WindowSelection::default()
            },
        };
    }

    /// Run the analysis for the current selection. Errors leave the previous
    /// report on screen.
    pub fn run_analysis(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.status = Some(Status::Neutral("Load a booking sheet first".into()));
            return;
        };
        let window = self.selection.resolve();

        match self
            .analyzer
            .run_guarded(dataset, window.as_ref(), self.max_upper)
        {
            Ok(Some(report)) => {
                self.report = Some(report);
                self.status = Some(Status::Success("Analysis completed successfully".into()));
            }
            Ok(None) => {
                self.status = Some(Status::Neutral(
                    "Select a period to run the analysis".into(),
                ));
            }
            Err(e) => {
                log::error!("Analysis failed: {e}");
                self.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }

    pub fn export_to(&mut self, path: &Path, format: ExportFormat) {
        self.status = Some(match self.try_export(path, format) {
            Ok(()) => Status::Success(format!("Exported to {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                Status::Error(format!("Error: {e:#}"))
            }
        });
    }

    fn try_export(&self, path: &Path, format: ExportFormat) -> anyhow::Result<()> {
        let report = self.report.as_ref().ok_or(ExportError::NothingToExport)?;
        export::export_report(path, format, report, &self.config.export.sheet_name)
            .with_context(|| format!("exporting to {}", path.display()))
    }
}
