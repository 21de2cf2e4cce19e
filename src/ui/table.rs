use booking_freq::analysis::FrequencyReport;
use booking_freq::export::HEADERS;
use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

/// The frequency table with one row per bucket. Long detail lists are
/// clipped; hovering shows all of them.
pub fn frequency_table(ui: &mut Ui, report: &FrequencyReport) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(48.0))
        .columns(Column::auto().at_least(72.0), 3)
        .column(Column::remainder().clip(true))
        .header(22.0, |mut header| {
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for b in &report.table.buckets {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(b.bucket.to_string());
                    });
                    for n in [b.student_count, b.cumulative_from_start, b.cumulative_to_end] {
                        row.col(|ui| {
                            ui.label(n.to_string());
                        });
                    }
                    row.col(|ui| {
                        let details = b.details();
                        if details.is_empty() {
                            ui.weak("-");
                        } else {
                            ui.label(details.as_str()).on_hover_text(details.as_str());
                        }
                    });
                });
            }
        });
}
