//! Static Chart Renderer
//! Renders the dashboard charts to PNG with plotters for the exported report.
//!
//! Charts produced per snapshot:
//! 1. OEE trend with the world-class line
//! 2. Downtime Pareto (bars + cumulative % on the right axis)
//! 3. OEE by machine
//! 4. Availability / Performance / Quality by shift

use super::style::{self, format_pct, Rgb};
use crate::oee::{GroupResult, Metric, OeeSnapshot, ParetoEntry, TimeBucket, TrendPoint};
use image::{ImageFormat, RgbImage};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Pixel buffer does not match {0}x{1}")]
    Buffer(u32, u32),
}

/// One rendered chart.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub title: String,
    pub png: Vec<u8>,
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Category label at integer mesh positions.
fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Downtime axis top: 10% headroom over the largest bar, at least one minute.
fn pareto_y_max(entries: &[ParetoEntry]) -> f64 {
    entries.first().map(|e| e.minutes).unwrap_or(0.0).max(1.0) * 1.1
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart of a snapshot, in report order.
    pub fn render_dashboard(
        snapshot: &OeeSnapshot,
        width: u32,
        height: u32,
    ) -> Result<Vec<RenderedChart>, RenderError> {
        let target = snapshot.kpi.target;
        let trend_title = format!(
            "{} Average OEE (overall {})",
            snapshot.bucket.label(),
            format_pct(snapshot.kpi.overall.oee)
        );

        Ok(vec![
            RenderedChart {
                png: Self::render_png(width, height, |area| {
                    Self::draw_trend(area, &trend_title, &snapshot.trend, snapshot.bucket, target)
                })?,
                title: trend_title.clone(),
            },
            RenderedChart {
                title: "Downtime by Reason (Pareto)".to_string(),
                png: Self::render_png(width, height, |area| {
                    Self::draw_pareto(area, &snapshot.pareto)
                })?,
            },
            RenderedChart {
                title: "Average OEE per Machine".to_string(),
                png: Self::render_png(width, height, |area| {
                    Self::draw_machines(area, &snapshot.by_machine, target)
                })?,
            },
            RenderedChart {
                title: "Availability / Performance / Quality by Shift".to_string(),
                png: Self::render_png(width, height, |area| {
                    Self::draw_shifts(area, &snapshot.by_shift)
                })?,
            },
        ])
    }

    /// Draw into an RGB buffer and encode it as PNG.
    fn render_png<F>(width: u32, height: u32, draw: F) -> Result<Vec<u8>, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult,
    {
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| RenderError::Draw(e.to_string()))?;
            draw(&root).map_err(|e| RenderError::Draw(e.to_string()))?;
            root.present()
                .map_err(|e| RenderError::Draw(e.to_string()))?;
        }

        let image =
            RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer(width, height))?;
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }

    fn draw_trend(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        title: &str,
        points: &[TrendPoint],
        bucket: TimeBucket,
        target: f64,
    ) -> DrawResult {
        let labels: Vec<String> = points
            .iter()
            .map(|p| bucket.format_key(p.bucket_start))
            .collect();
        let x_max = points.len().max(1) as f64 - 0.5;

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..x_max, 0f64..1.05f64)?;

        chart
            .configure_mesh()
            .x_labels(labels.len().clamp(1, 12))
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_label_formatter(&|y| format!("{:.0}%", y * 100.0))
            .y_desc("OEE")
            .draw()?;

        let series: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.result.oee.map(|oee| (i as f64, oee)))
            .collect();

        chart
            .draw_series(LineSeries::new(series.clone(), rgb(style::TREND).stroke_width(3)))?
            .label("OEE")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], rgb(style::TREND).stroke_width(3)));
        chart.draw_series(
            series
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, rgb(style::TREND).filled())),
        )?;

        Self::draw_benchmark(&mut chart, -0.5, x_max, target)?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_benchmark(
        chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
        x_min: f64,
        x_max: f64,
        target: f64,
    ) -> DrawResult {
        let color = rgb(style::BENCHMARK);
        chart
            .draw_series(LineSeries::new(
                vec![(x_min, target), (x_max, target)],
                color.stroke_width(2),
            ))?
            .label(format!("World Class ({:.0}%)", target * 100.0))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        Ok(())
    }

    fn draw_pareto(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        entries: &[ParetoEntry],
    ) -> DrawResult {
        let labels: Vec<String> = entries.iter().map(|e| e.reason.clone()).collect();
        let x_max = entries.len().max(1) as f64 - 0.5;
        let y_max = pareto_y_max(entries);

        let mut chart = ChartBuilder::on(area)
            .caption("Downtime by Reason (Pareto)", ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..x_max, 0f64..y_max)?
            .set_secondary_coord(-0.5f64..x_max, 0f64..110f64);

        chart
            .configure_mesh()
            .x_labels(labels.len().clamp(1, 12))
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_desc("Downtime (min)")
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_label_formatter(&|y| format!("{:.0}%", y))
            .y_desc("Cumulative %")
            .draw()?;

        let bar_color = rgb(style::DOWNTIME);
        chart
            .draw_series(entries.iter().enumerate().map(|(i, e)| {
                let x = i as f64;
                Rectangle::new([(x - 0.3, 0.0), (x + 0.3, e.minutes)], bar_color.filled())
            }))?
            .label("Downtime (min)")
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], bar_color.filled()));

        let line_color = rgb(style::CUMULATIVE);
        let cumulative: Vec<(f64, f64)> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i as f64, e.cumulative_pct))
            .collect();
        chart
            .draw_secondary_series(LineSeries::new(
                cumulative.clone(),
                line_color.stroke_width(2),
            ))?
            .label("Cumulative %")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color.stroke_width(2)));
        chart.draw_secondary_series(
            cumulative
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, line_color.filled())),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_machines(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        groups: &[GroupResult],
        target: f64,
    ) -> DrawResult {
        let labels: Vec<String> = groups.iter().map(|g| g.key.label()).collect();
        let x_max = groups.len().max(1) as f64 - 0.5;

        let mut chart = ChartBuilder::on(area)
            .caption("Average OEE per Machine", ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..x_max, 0f64..1.05f64)?;

        chart
            .configure_mesh()
            .x_labels(labels.len().clamp(1, 12))
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_label_formatter(&|y| format!("{:.0}%", y * 100.0))
            .x_desc("Machine")
            .y_desc("OEE")
            .draw()?;

        chart.draw_series(groups.iter().enumerate().filter_map(|(i, g)| {
            g.result.oee.map(|oee| {
                let x = i as f64;
                Rectangle::new(
                    [(x - 0.3, 0.0), (x + 0.3, oee)],
                    rgb(style::oee_scale(oee)).filled(),
                )
            })
        }))?;
        chart.draw_series(groups.iter().enumerate().filter_map(|(i, g)| {
            g.result.oee.map(|oee| {
                Text::new(
                    format_pct(Some(oee)),
                    (i as f64 - 0.15, oee + 0.03),
                    ("sans-serif", 16),
                )
            })
        }))?;

        Self::draw_benchmark(&mut chart, -0.5, x_max, target)?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }

    fn draw_shifts(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        groups: &[GroupResult],
    ) -> DrawResult {
        const METRICS: [(Metric, Rgb); 3] = [
            (Metric::Availability, style::AVAILABILITY),
            (Metric::Performance, style::PERFORMANCE),
            (Metric::Quality, style::QUALITY),
        ];
        const BAR_WIDTH: f64 = 0.25;

        let labels: Vec<String> = groups.iter().map(|g| g.key.label()).collect();
        let x_max = groups.len().max(1) as f64 - 0.5;

        let mut chart = ChartBuilder::on(area)
            .caption(
                "Availability / Performance / Quality by Shift",
                ("sans-serif", 26),
            )
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..x_max, 0f64..1.05f64)?;

        chart
            .configure_mesh()
            .x_labels(labels.len().clamp(1, 12))
            .x_label_formatter(&|x| category_label(&labels, *x))
            .y_label_formatter(&|y| format!("{:.0}%", y * 100.0))
            .x_desc("Shift")
            .y_desc("Score")
            .draw()?;

        for (k, (metric, color)) in METRICS.iter().enumerate() {
            let offset = (k as f64 - 1.0) * BAR_WIDTH;
            let color = rgb(*color);
            chart
                .draw_series(groups.iter().enumerate().filter_map(|(i, g)| {
                    g.result.metric(*metric).map(|v| {
                        let x = i as f64 + offset;
                        Rectangle::new(
                            [(x - BAR_WIDTH * 0.45, 0.0), (x + BAR_WIDTH * 0.45, v)],
                            color.filled(),
                        )
                    })
                }))?
                .label(metric.label())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn assert_pngs(charts: &[RenderedChart], width: u32, height: u32) {
        assert_eq!(charts.len(), 4);
        for chart in charts {
            assert!(chart.png.starts_with(PNG_SIGNATURE), "{} is not a PNG", chart.title);
            let decoded = image::load_from_memory(&chart.png).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (width, height));
        }
    }

    #[test]
    fn test_render_dashboard_to_png() {
        let records = vec![
            record("2024-01-01", "M1", "A", 480.0, 60.0, 350, 380, Some("Breakdown")),
            record("2024-01-01", "M2", "B", 480.0, 30.0, 400, 420, Some("Setup")),
            record("2024-01-02", "M1", "B", 480.0, 45.0, 390, 400, Some("Breakdown")),
        ];
        let snapshot = OeeSnapshot::compute(&records, TimeBucket::Day, 0.85);

        let charts = StaticChartRenderer::render_dashboard(&snapshot, 400, 300).unwrap();
        assert_pngs(&charts, 400, 300);
        assert_eq!(charts[1].title, "Downtime by Reason (Pareto)");
    }

    #[test]
    fn test_render_without_downtime_reasons() {
        let records = vec![
            record("2024-01-01", "M1", "A", 480.0, 0.0, 350, 380, None),
            record("2024-01-08", "M2", "A", 480.0, 0.0, 400, 420, None),
        ];
        let snapshot = OeeSnapshot::compute(&records, TimeBucket::Week, 0.85);
        assert!(snapshot.pareto.is_empty());
        assert!((pareto_y_max(&snapshot.pareto) - 1.1).abs() < 1e-12);

        let charts = StaticChartRenderer::render_dashboard(&snapshot, 400, 300).unwrap();
        assert_pngs(&charts, 400, 300);
    }

    #[test]
    fn test_category_label_only_on_integers() {
        let labels = vec!["M1".to_string(), "M2".to_string()];
        assert_eq!(category_label(&labels, 0.0), "M1");
        assert_eq!(category_label(&labels, 1.0), "M2");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }
}
