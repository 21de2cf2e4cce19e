use std::path::Path;

use booking_freq::analysis::MAX_UPPER_LIMIT;
use booking_freq::data::loader::SPREADSHEET_EXTENSIONS;
use booking_freq::export::ExportFormat;
use booking_freq::{WindowMode, YearMonth};
use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Status};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Left side panel – window and bucketing controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Booking Frequency");
    ui.separator();

    if ui.button("Open booking sheet…").clicked() {
        open_file_dialog(state);
    }
    ui.label(RichText::new("or drop a file onto the window").weak());
    if let Some(feedback) = &state.upload_feedback {
        status_label(ui, feedback);
    }
    ui.separator();

    // Copy what we need so the pickers can mutate state below.
    let (periods, summary_line, invalid) = match &state.dataset {
        Some(ds) => (
            ds.periods.iter().copied().collect::<Vec<YearMonth>>(),
            format!("{} bookings, {} period(s)", ds.len(), ds.periods.len()),
            ds.invalid_timestamps,
        ),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };
    ui.label(summary_line);
    if invalid > 0 {
        ui.label(RichText::new(format!("{invalid} row(s) without a valid date")).weak());
    }
    ui.add_space(8.0);

    ui.strong("Analysis type");
    let mut mode = state.selection.mode;
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut mode, WindowMode::Monthly, "Monthly");
        ui.radio_value(&mut mode, WindowMode::Range, "Range");
    });
    if mode != state.selection.mode {
        state.set_mode(mode);
    }

    match state.selection.mode {
        WindowMode::Monthly => {
            period_combo(ui, "period", "Period", &mut state.selection.period, &periods);
        }
        WindowMode::Range => {
            period_combo(ui, "start_period", "From", &mut state.selection.start, &periods);
            period_combo(ui, "end_period", "To", &mut state.selection.end, &periods);
            if let (Some(start), Some(end)) = (state.selection.start, state.selection.end) {
                if start > end {
                    ui.label(RichText::new("Start is after end").color(Color32::RED));
                }
            }
        }
    }
    ui.add_space(8.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Max upper bound:");
        ui.add(egui::DragValue::new(&mut state.max_upper).range(1..=MAX_UPPER_LIMIT));
    });
    ui.add_space(8.0);

    if ui.button(RichText::new("Run Analysis").strong()).clicked() {
        state.run_analysis();
    }
    if let Some(status) = &state.status {
        status_label(ui, status);
    }
}

fn period_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    value: &mut Option<YearMonth>,
    periods: &[YearMonth],
) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        let selected = value.map(|p| p.to_string()).unwrap_or_else(|| "Select…".into());
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected)
            .show_ui(ui, |ui: &mut Ui| {
                for p in periods {
                    ui.selectable_value(value, Some(*p), p.to_string());
                }
            });
    });
}

fn status_label(ui: &mut Ui, status: &Status) {
    let color = match status {
        Status::Success(_) => Color32::from_rgb(40, 160, 70),
        Status::Neutral(_) => Color32::GRAY,
        Status::Error(_) => Color32::RED,
    };
    ui.label(RichText::new(status.text()).color(color));
}

// ---------------------------------------------------------------------------
// Central panel – histogram and table
// ---------------------------------------------------------------------------

pub fn results_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if state.dataset.is_some() {
                "Choose a period and press Run Analysis"
            } else {
                "Open a booking sheet to begin  (File → Open…)"
            };
            ui.heading(hint);
        });
        return;
    };

    let mut export_clicked = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Booking Frequency Distribution");
        ui.label(RichText::new(report.window.to_string()).weak());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            export_clicked = ui.button("Export Data (XLSX)").clicked();
        });
    });

    match report.summary {
        Some(s) => ui.label(format!(
            "{} people  ·  Mean: {:.2}  ·  Median: {:.2}",
            s.sample_size, s.mean, s.median
        )),
        None => ui.label("No bookings in the selected period."),
    };

    plot::frequency_histogram(ui, report, state.config.display.plot_height);
    ui.separator();
    table::frequency_table(ui, report);

    if export_clicked {
        export_dialog(state, ExportFormat::Xlsx);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.add_enabled_ui(state.report.is_some(), |ui: &mut Ui| {
                ui.menu_button("Export", |ui: &mut Ui| {
                    for format in ExportFormat::ALL {
                        if ui.button(format.label()).clicked() {
                            export_dialog(state, format);
                            ui.close_menu();
                        }
                    }
                });
            });
        });

        ui.separator();

        if let (Some(name), Some(ds)) = (&state.source_name, &state.dataset) {
            ui.label(format!("{name}: {} bookings", ds.len()));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let mut supported: Vec<&str> = SPREADSHEET_EXTENSIONS.to_vec();
    supported.extend(["csv", "json"]);

    let file = rfd::FileDialog::new()
        .set_title("Open booking sheet")
        .add_filter("Supported files", &supported)
        .add_filter("Spreadsheets", &SPREADSHEET_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_dialog(state: &mut AppState, format: ExportFormat) {
    let default_name = Path::new(&state.config.export.file_name).with_extension(format.extension());
    let file = rfd::FileDialog::new()
        .set_title("Export frequency table")
        .set_file_name(default_name.to_string_lossy())
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path, format);
    }
}
