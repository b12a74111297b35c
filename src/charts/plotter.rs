//! Chart Plotter Module
//! Draws the interactive dashboard charts using egui_plot.

use super::style::{self, format_pct, format_ratio, format_thousands, Rgb};
use crate::oee::{GaugeBand, GroupResult, KpiSummary, Metric, ParetoEntry, TimeBucket, TrendPoint};
use egui::{Align2, Color32, FontId, Pos2, RichText, Shape, Stroke};
use egui_plot::{
    AxisHints, Bar, BarChart, GridMark, HLine, HPlacement, Legend, Line, LineStyle, Plot,
    PlotPoints, Points,
};
use std::ops::RangeInclusive;

pub fn color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Draws the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// X axis formatter showing category labels at integer positions.
    fn category_formatter(
        labels: Vec<String>,
    ) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
        move |mark, _range| {
            let idx = mark.value.round();
            if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        }
    }

    fn percent_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
        format!("{:.0}%", mark.value * 100.0)
    }

    fn benchmark_line(target: f64) -> HLine {
        HLine::new(target)
            .color(color32(style::BENCHMARK))
            .width(1.5)
            .style(LineStyle::dashed_loose())
            .name(format!("World Class ({:.0}%)", target * 100.0))
    }

    /// OEE per bucket as a line, with the benchmark.
    pub fn draw_trend_chart(
        ui: &mut egui::Ui,
        points: &[TrendPoint],
        bucket: TimeBucket,
        target: f64,
        height: f32,
    ) {
        let labels: Vec<String> = points
            .iter()
            .map(|p| bucket.format_key(p.bucket_start))
            .collect();
        let series: Vec<[f64; 2]> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.result.oee.map(|oee| [i as f64, oee]))
            .collect();

        Plot::new("oee_trend")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(1.0)
            .legend(Legend::default())
            .x_axis_label("Date")
            .x_axis_formatter(Self::category_formatter(labels))
            .y_axis_formatter(Self::percent_formatter)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(series.clone()))
                        .color(color32(style::TREND))
                        .width(2.0)
                        .name("OEE"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(series))
                        .radius(3.0)
                        .color(color32(style::TREND)),
                );
                plot_ui.hline(Self::benchmark_line(target));
            });
    }

    /// Downtime bars per reason with the cumulative share as a line on the right axis.
    pub fn draw_pareto_chart(ui: &mut egui::Ui, entries: &[ParetoEntry], height: f32) {
        let labels: Vec<String> = entries.iter().map(|e| e.reason.clone()).collect();
        // Cumulative 100 % is drawn at the height of the tallest bar.
        let scale = entries
            .first()
            .map(|e| e.minutes)
            .filter(|m| *m > 0.0)
            .unwrap_or(1.0);

        let bars: Vec<Bar> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                Bar::new(i as f64, e.minutes)
                    .width(0.6)
                    .name(&e.reason)
                    .fill(color32(style::DOWNTIME))
            })
            .collect();
        let cumulative: Vec<[f64; 2]> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| [i as f64, e.cumulative_pct / 100.0 * scale])
            .collect();

        Plot::new("downtime_pareto")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(scale * 1.1)
            .legend(Legend::default())
            .x_axis_formatter(Self::category_formatter(labels))
            .custom_y_axes(vec![
                AxisHints::new_y().label("Downtime (min)"),
                AxisHints::new_y()
                    .label("Cumulative %")
                    .placement(HPlacement::Right)
                    .formatter(move |mark, _range| {
                        format!("{:.0}%", mark.value / scale * 100.0)
                    }),
            ])
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(color32(style::DOWNTIME))
                        .name("Downtime (min)"),
                );
                plot_ui.line(
                    Line::new(PlotPoints::from(cumulative.clone()))
                        .color(color32(style::CUMULATIVE))
                        .width(2.0)
                        .name("Cumulative %"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(cumulative))
                        .radius(3.5)
                        .color(color32(style::CUMULATIVE)),
                );
            });
    }

    /// OEE per machine, colored red to green, with the benchmark.
    pub fn draw_machine_chart(
        ui: &mut egui::Ui,
        groups: &[GroupResult],
        target: f64,
        height: f32,
    ) {
        let labels: Vec<String> = groups.iter().map(|g| g.key.label()).collect();
        let bars: Vec<Bar> = groups
            .iter()
            .enumerate()
            .filter_map(|(i, g)| {
                g.result.oee.map(|oee| {
                    Bar::new(i as f64, oee)
                        .width(0.6)
                        .name(format!("{} {}", g.key.label(), format_pct(Some(oee))))
                        .fill(color32(style::oee_scale(oee)))
                })
            })
            .collect();

        Plot::new("oee_by_machine")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(1.0)
            .legend(Legend::default())
            .x_axis_label("Machine")
            .x_axis_formatter(Self::category_formatter(labels))
            .y_axis_formatter(Self::percent_formatter)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("OEE"));
                plot_ui.hline(Self::benchmark_line(target));
            });
    }

    /// Availability, performance and quality side by side per shift.
    pub fn draw_shift_chart(ui: &mut egui::Ui, groups: &[GroupResult], height: f32) {
        const METRICS: [(Metric, Rgb); 3] = [
            (Metric::Availability, style::AVAILABILITY),
            (Metric::Performance, style::PERFORMANCE),
            (Metric::Quality, style::QUALITY),
        ];
        const BAR_WIDTH: f64 = 0.25;

        let labels: Vec<String> = groups.iter().map(|g| g.key.label()).collect();
        let charts: Vec<BarChart> = METRICS
            .iter()
            .enumerate()
            .map(|(k, (metric, rgb))| {
                let offset = (k as f64 - 1.0) * BAR_WIDTH;
                let bars: Vec<Bar> = groups
                    .iter()
                    .enumerate()
                    .filter_map(|(i, g)| {
                        g.result.metric(*metric).map(|v| {
                            Bar::new(i as f64 + offset, v)
                                .width(BAR_WIDTH * 0.9)
                                .name(format!("{} {}", g.key.label(), metric.label()))
                                .fill(color32(*rgb))
                        })
                    })
                    .collect();
                BarChart::new(bars).color(color32(*rgb)).name(metric.label())
            })
            .collect();

        Plot::new("apq_by_shift")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(1.0)
            .legend(Legend::default())
            .x_axis_label("Shift")
            .x_axis_formatter(Self::category_formatter(labels))
            .y_axis_formatter(Self::percent_formatter)
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    fn gauge_point(center: Pos2, radius: f32, fraction: f64) -> Pos2 {
        let angle = std::f32::consts::PI * (1.0 - fraction.clamp(0.0, 1.0) as f32);
        egui::pos2(center.x + radius * angle.cos(), center.y - radius * angle.sin())
    }

    fn arc_points(center: Pos2, radius: f32, from: f64, to: f64) -> Vec<Pos2> {
        const STEPS: usize = 48;
        (0..=STEPS)
            .map(|i| {
                let t = from + (to - from) * i as f64 / STEPS as f64;
                Self::gauge_point(center, radius, t)
            })
            .collect()
    }

    /// Half-circle gauge of the overall OEE with colored bands and the target marker.
    pub fn draw_gauge(ui: &mut egui::Ui, kpi: &KpiSummary) {
        let desired = egui::vec2(ui.available_width().min(420.0), 230.0);
        let (rect, _response) = ui.allocate_exact_size(desired, egui::Sense::hover());
        let painter = ui.painter_at(rect);

        let radius = (rect.width() / 2.0 - 24.0).min(rect.height() - 70.0).max(10.0);
        let thickness = radius * 0.22;
        let center = egui::pos2(rect.center().x, rect.top() + 20.0 + radius);

        for band in GaugeBand::ALL {
            let (from, to) = band.range(kpi.target);
            if to <= from {
                continue;
            }
            painter.add(Shape::line(
                Self::arc_points(center, radius, from, to),
                Stroke::new(thickness, color32(style::band_color(band))),
            ));
        }

        if let Some(oee) = kpi.overall.oee {
            painter.add(Shape::line(
                Self::arc_points(center, radius, 0.0, oee),
                Stroke::new(thickness * 0.45, color32(style::GAUGE_VALUE)),
            ));
        }

        let inner = Self::gauge_point(center, radius - thickness, kpi.target);
        let outer = Self::gauge_point(center, radius + thickness, kpi.target);
        painter.line_segment([inner, outer], Stroke::new(4.0, color32(style::BENCHMARK)));

        painter.text(
            center - egui::vec2(0.0, radius * 0.3),
            Align2::CENTER_CENTER,
            format_pct(kpi.overall.oee),
            FontId::proportional(30.0),
            ui.visuals().text_color(),
        );

        if let Some(delta) = kpi.delta_vs_target() {
            let color = if delta >= 0.0 {
                Color32::from_rgb(40, 167, 69)
            } else {
                color32(style::BENCHMARK)
            };
            painter.text(
                center + egui::vec2(0.0, 22.0),
                Align2::CENTER_CENTER,
                format!("{:+.1}% vs World Class", delta * 100.0),
                FontId::proportional(14.0),
                color,
            );
        }

        if let Some(band) = kpi.band() {
            painter.text(
                center + egui::vec2(0.0, 42.0),
                Align2::CENTER_CENTER,
                band.label(),
                FontId::proportional(12.0),
                Color32::GRAY,
            );
        }
    }

    /// Per-machine summary table.
    pub fn draw_machine_table(ui: &mut egui::Ui, groups: &[GroupResult]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("machine_summary_table")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for header in [
                            "Machine",
                            "Avg OEE",
                            "Availability",
                            "Performance",
                            "Quality",
                            "Downtime (min)",
                            "Good Parts",
                        ] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for g in groups {
                            let r = &g.result;
                            let oee_color = r
                                .oee
                                .map(|v| color32(style::oee_scale(v)))
                                .unwrap_or(Color32::GRAY);

                            ui.label(RichText::new(g.key.label()).size(11.0));
                            ui.label(RichText::new(format_ratio(r.oee)).size(11.0).color(oee_color));
                            ui.label(RichText::new(format_ratio(r.availability)).size(11.0));
                            ui.label(RichText::new(format_ratio(r.performance)).size(11.0));
                            ui.label(RichText::new(format_ratio(r.quality)).size(11.0));
                            ui.label(
                                RichText::new(format!("{:.1}", r.totals.downtime)).size(11.0),
                            );
                            ui.label(
                                RichText::new(format_thousands(r.totals.good_count)).size(11.0),
                            );
                            ui.end_row();
                        }
                    });
            });
    }
}
