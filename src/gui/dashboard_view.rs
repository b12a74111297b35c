//! Dashboard View Widget
//! Central scrollable panel: KPI cards, charts and the machine summary table
//! for the current filter selection.

use crate::charts::style::{self, format_pct, format_thousands};
use crate::charts::{color32, ChartPlotter};
use crate::oee::{KpiSummary, OeeSnapshot, TrendStats};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 12.0;
const CHART_HEIGHT: f32 = 320.0;
const NO_DATA_MESSAGE: &str = "No data loaded. Use Browse to open a CSV or Excel file.";
const NO_MATCH_MESSAGE: &str = "No records match the current filters";

/// Renders one [`OeeSnapshot`]; holds no state besides it.
#[derive(Default)]
pub struct DashboardView {
    snapshot: Option<OeeSnapshot>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_snapshot(&mut self, snapshot: OeeSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn snapshot(&self) -> Option<&OeeSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(snapshot) = &self.snapshot else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(NO_DATA_MESSAGE).size(20.0));
            });
            return;
        };

        if snapshot.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(NO_MATCH_MESSAGE).size(18.0));
            });
            return;
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("OEE Production Dashboard").size(24.0).strong());
                ui.add_space(CARD_SPACING);

                Self::draw_kpi_row(ui, &snapshot.kpi);
                Self::draw_quality_warning(ui, snapshot);
                ui.add_space(CARD_SPACING);

                Self::card(ui, &format!("{} OEE Trend", snapshot.bucket.label()), |ui| {
                    ChartPlotter::draw_trend_chart(
                        ui,
                        &snapshot.trend,
                        snapshot.bucket,
                        snapshot.kpi.target,
                        CHART_HEIGHT,
                    );
                    if let Some(stats) = &snapshot.trend_stats {
                        Self::draw_trend_stats(ui, stats);
                    }
                });
                ui.add_space(CARD_SPACING);

                ui.columns(2, |columns| {
                    Self::card(&mut columns[0], "Downtime by Reason (Pareto)", |ui| {
                        if snapshot.pareto.is_empty() {
                            ui.label(RichText::new("No downtime reasons recorded").color(Color32::GRAY));
                        } else {
                            ChartPlotter::draw_pareto_chart(ui, &snapshot.pareto, CHART_HEIGHT);
                        }
                    });
                    Self::card(&mut columns[1], "Average OEE per Machine", |ui| {
                        ChartPlotter::draw_machine_chart(
                            ui,
                            &snapshot.by_machine,
                            snapshot.kpi.target,
                            CHART_HEIGHT,
                        );
                    });
                });
                ui.add_space(CARD_SPACING);

                ui.columns(2, |columns| {
                    Self::card(&mut columns[0], "Availability / Performance / Quality by Shift", |ui| {
                        ChartPlotter::draw_shift_chart(ui, &snapshot.by_shift, CHART_HEIGHT);
                    });
                    Self::card(&mut columns[1], "Overall OEE", |ui| {
                        ChartPlotter::draw_gauge(ui, &snapshot.kpi);
                    });
                });
                ui.add_space(CARD_SPACING);

                Self::card(ui, "Machine Summary", |ui| {
                    ChartPlotter::draw_machine_table(ui, &snapshot.by_machine);
                });
            });
    }

    fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(6.0);
                add_contents(ui);
            });
    }

    fn draw_kpi_row(ui: &mut egui::Ui, kpi: &KpiSummary) {
        let overall = &kpi.overall;
        let delta = kpi.delta_vs_target().map(|d| {
            let color = if d >= 0.0 {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::from_rgb(220, 53, 69)
            };
            (format!("{:+.1}% vs {}", d * 100.0, format_pct(Some(kpi.target))), color)
        });

        ui.columns(6, |columns| {
            Self::kpi_card(&mut columns[0], "Overall OEE", &format_pct(overall.oee), delta);
            Self::kpi_card(&mut columns[1], "Availability", &format_pct(overall.availability), None);
            Self::kpi_card(&mut columns[2], "Performance", &format_pct(overall.performance), None);
            Self::kpi_card(&mut columns[3], "Quality", &format_pct(overall.quality), None);
            Self::kpi_card(&mut columns[4], "Good Parts", &format_thousands(kpi.good_parts), None);
            Self::kpi_card(
                &mut columns[5],
                "Total Downtime",
                &format!("{:.0} min", kpi.downtime_minutes),
                None,
            );
        });
    }

    fn kpi_card(ui: &mut egui::Ui, label: &str, value: &str, delta: Option<(String, Color32)>) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(26.0).strong());
                if let Some((text, color)) = delta {
                    ui.label(RichText::new(text).size(11.0).color(color));
                }
            });
    }

    /// Mention clamped ratios so out-of-range input does not go unnoticed.
    fn draw_quality_warning(ui: &mut egui::Ui, snapshot: &OeeSnapshot) {
        let issues = snapshot.kpi.overall.issues.len()
            + snapshot
                .by_machine
                .iter()
                .map(|g| g.result.issues.len())
                .sum::<usize>();
        if issues > 0 {
            ui.add_space(6.0);
            ui.label(
                RichText::new(format!(
                    "⚠ {} metric value(s) fell outside [0, 1] and were clamped",
                    issues
                ))
                .color(color32(style::CUMULATIVE)),
            );
        }
    }

    fn draw_trend_stats(ui: &mut egui::Ui, stats: &TrendStats) {
        ui.horizontal(|ui| {
            for (label, value) in [
                ("Periods", stats.points.to_string()),
                ("Mean", format_pct(Some(stats.mean))),
                ("Std dev", format!("{:.1} pts", stats.std_dev * 100.0)),
                ("Min", format_pct(Some(stats.min))),
                ("Max", format_pct(Some(stats.max))),
            ] {
                ui.label(RichText::new(format!("{}:", label)).color(Color32::GRAY));
                ui.label(RichText::new(value).strong());
                ui.add_space(CARD_SPACING);
            }
        });
    }
}
