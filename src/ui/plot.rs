use booking_freq::analysis::{FrequencyBucket, FrequencyReport};
use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, LineStyle, Plot, VLine};

use crate::color;

/// Names listed in a bar's tooltip before the rest are summarised.
const HOVER_NAMES: usize = 25;

// ---------------------------------------------------------------------------
// Frequency histogram (central panel)
// ---------------------------------------------------------------------------

/// Bar per bucket, plus dashed mean and median markers.
pub fn frequency_histogram(ui: &mut Ui, report: &FrequencyReport, height: f32) {
    let table = &report.table;
    let max_upper = table.max_upper;
    let gradient = color::bucket_gradient(table.numeric().len());

    let bars: Vec<Bar> = table
        .buckets
        .iter()
        .zip(gradient.into_iter().chain(std::iter::once(color::overflow_color())))
        .map(|(b, fill)| {
            Bar::new(b.bucket.floor() as f64, b.student_count as f64)
                .name(b.bucket.to_string())
                .fill(fill)
                .width(0.8)
        })
        .collect();

    // Indexed by bar position: bucket n sits at x = n.
    let details: Vec<String> = table.buckets.iter().map(hover_details).collect();
    let chart = BarChart::new(bars)
        .name("Students")
        .element_formatter(Box::new(move |bar: &Bar, _chart: &BarChart| {
            let idx = (bar.argument.round() as usize).saturating_sub(1);
            let people = details.get(idx).map(String::as_str).unwrap_or_default();
            format!(
                "Frequency: {}\nStudents: {}\nDetails: {people}",
                bar.name, bar.value
            )
        }));

    Plot::new("frequency_histogram")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Frequency of Bookings")
        .y_axis_label("Number of Students")
        .x_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if v < 1.0 || v.fract() != 0.0 || v as u32 > max_upper + 1 {
                String::new()
            } else if v as u32 == max_upper + 1 {
                format!(">{max_upper}")
            } else {
                format!("{v}")
            }
        })
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(true)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);

            if let Some(summary) = report.summary {
                plot_ui.vline(
                    VLine::new(summary.mean)
                        .name(format!("Mean: {:.2}", summary.mean))
                        .color(color::MEAN_COLOR)
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
                plot_ui.vline(
                    VLine::new(summary.median)
                        .name(format!("Median: {:.2}", summary.median))
                        .color(color::MEDIAN_COLOR)
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
            }
        });
}

/// The bucket's `"name : id"` list, shortened for a tooltip.
fn hover_details(bucket: &FrequencyBucket) -> String {
    if bucket.people.len() <= HOVER_NAMES {
        return bucket.details();
    }
    let shown: Vec<String> = bucket.people[..HOVER_NAMES]
        .iter()
        .map(ToString::to_string)
        .collect();
    format!(
        "{}, … and {} more",
        shown.join(", "),
        bucket.people.len() - HOVER_NAMES
    )
}
