//! Chart colors and value formatting shared by the live and static charts.

use crate::oee::GaugeBand;

pub type Rgb = (u8, u8, u8);

pub const TREND: Rgb = (0, 204, 150);
pub const DOWNTIME: Rgb = (239, 85, 59);
pub const CUMULATIVE: Rgb = (255, 161, 90);
pub const BENCHMARK: Rgb = (220, 53, 69);
pub const AVAILABILITY: Rgb = (99, 110, 250);
pub const PERFORMANCE: Rgb = (239, 85, 59);
pub const QUALITY: Rgb = (0, 204, 150);
pub const GAUGE_VALUE: Rgb = (0, 204, 150);

/// Red-yellow-green scale for an OEE fraction.
pub fn oee_scale(value: f64) -> Rgb {
    const RED: Rgb = (215, 48, 39);
    const YELLOW: Rgb = (254, 224, 139);
    const GREEN: Rgb = (26, 152, 80);

    let v = value.clamp(0.0, 1.0);
    if v < 0.5 {
        lerp(RED, YELLOW, v / 0.5)
    } else {
        lerp(YELLOW, GREEN, (v - 0.5) / 0.5)
    }
}

fn lerp(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

pub fn band_color(band: GaugeBand) -> Rgb {
    match band {
        GaugeBand::Critical => (255, 68, 68),
        GaugeBand::Fair => (255, 165, 0),
        GaugeBand::Good => (255, 215, 0),
        GaugeBand::WorldClass => (144, 238, 144),
    }
}

/// `87.5%`, or `N/A` for an undefined metric.
pub fn format_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}%", v * 100.0))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Three-decimal fraction for tables, or `N/A`.
pub fn format_ratio(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Whole number with thousands separators.
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting() {
        assert_eq!(format_pct(Some(0.875)), "87.5%");
        assert_eq!(format_pct(None), "N/A");
        assert_eq!(format_ratio(Some(0.72917)), "0.729");
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_oee_scale_endpoints() {
        assert_eq!(oee_scale(0.0), (215, 48, 39));
        assert_eq!(oee_scale(0.5), (254, 224, 139));
        assert_eq!(oee_scale(1.0), (26, 152, 80));
        assert_eq!(oee_scale(2.0), oee_scale(1.0));
    }
}
