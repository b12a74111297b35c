//! Report Export Module
//! Writes the dashboard as a PowerPoint deck: one KPI summary slide followed by
//! chart slides holding up to four rendered charts each (2x2 grid).
//!
//! The package is assembled directly as OOXML parts inside a ZIP archive.

use crate::charts::style::{format_pct, format_thousands};
use crate::charts::RenderedChart;
use crate::oee::{OeeSnapshot, TrendStats};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const REPORT_FILE_NAME: &str = "oee_report.pptx";

const EMU_PER_INCH: i64 = 914_400;
/// 13.333in x 7.5in widescreen slide.
const SLIDE_WIDTH: i64 = 12_192_000;
const SLIDE_HEIGHT: i64 = 6_858_000;
const CHARTS_PER_SLIDE: usize = 4;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    ZipError(#[from] ZipError),
    #[error("Nothing to report: the current selection has no records")]
    Empty,
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

/// A report ready to be written.
#[derive(Debug, Clone)]
pub struct ReportDeck {
    pub title: String,
    /// Bullet lines on the summary slide.
    pub summary: Vec<String>,
    pub charts: Vec<RenderedChart>,
}

impl ReportDeck {
    /// Build the summary lines from a snapshot and attach its rendered charts.
    pub fn from_snapshot(
        title: impl Into<String>,
        snapshot: &OeeSnapshot,
        charts: Vec<RenderedChart>,
    ) -> Result<Self, ReportError> {
        if snapshot.is_empty() {
            return Err(ReportError::Empty);
        }

        let kpi = &snapshot.kpi;
        let overall = &kpi.overall;
        let mut summary = vec![
            format!(
                "OEE: {} ({} vs {} world class)",
                format_pct(overall.oee),
                kpi.delta_vs_target()
                    .map(|d| format!("{:+.1} pts", d * 100.0))
                    .unwrap_or_else(|| "N/A".to_string()),
                format_pct(Some(kpi.target))
            ),
            format!("Availability: {}", format_pct(overall.availability)),
            format!("Performance: {}", format_pct(overall.performance)),
            format!("Quality: {}", format_pct(overall.quality)),
            format!("Good parts: {}", format_thousands(kpi.good_parts)),
            format!("Total downtime: {:.0} min", kpi.downtime_minutes),
            format!("Records: {}", kpi.record_count),
        ];
        if let Some(stats) = &snapshot.trend_stats {
            summary.push(Self::trend_line(snapshot.bucket.label(), stats));
        }
        if let Some(top) = snapshot.pareto.first() {
            summary.push(format!(
                "Top downtime reason: {} ({:.0} min)",
                top.reason, top.minutes
            ));
        }

        Ok(Self {
            title: title.into(),
            summary,
            charts,
        })
    }

    fn trend_line(bucket_label: &str, stats: &TrendStats) -> String {
        format!(
            "{} trend over {} periods: mean {}, min {}, max {}",
            bucket_label,
            stats.points,
            format_pct(Some(stats.mean)),
            format_pct(Some(stats.min)),
            format_pct(Some(stats.max))
        )
    }

    /// Summary slide plus one slide per group of four charts.
    pub fn slide_count(&self) -> usize {
        1 + self.charts.len().div_ceil(CHARTS_PER_SLIDE)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), ReportError> {
        let file = File::create(path)?;
        let mut writer = self.write_to(BufWriter::new(file))?;
        writer.flush()?;

        info!(
            path = %path.display(),
            slides = self.slide_count(),
            charts = self.charts.len(),
            "report written"
        );
        Ok(())
    }

    /// Write the package into any seekable sink and hand the sink back.
    pub fn write_to<W: Write + Seek>(&self, sink: W) -> Result<W, ReportError> {
        let mut zip = ZipWriter::new(sink);
        let options = FileOptions::default();
        let slides = self.slide_count();

        let part = |zip: &mut ZipWriter<W>, name: String, body: &str| -> Result<(), ReportError> {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
            Ok(())
        };

        part(&mut zip, "[Content_Types].xml".into(), &content_types(slides))?;
        part(&mut zip, "_rels/.rels".into(), &package_rels())?;
        part(&mut zip, "docProps/core.xml".into(), &core_props(&self.title))?;
        part(&mut zip, "docProps/app.xml".into(), &app_props(slides))?;
        part(&mut zip, "ppt/presentation.xml".into(), &presentation(slides))?;
        part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels".into(),
            &presentation_rels(slides),
        )?;
        part(&mut zip, "ppt/slideMasters/slideMaster1.xml".into(), &slide_master())?;
        part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
            &relationships(&[
                ("slideLayout", "../slideLayouts/slideLayout1.xml".to_string()),
                ("theme", "../theme/theme1.xml".to_string()),
            ]),
        )?;
        part(&mut zip, "ppt/slideLayouts/slideLayout1.xml".into(), &slide_layout())?;
        part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
            &relationships(&[("slideMaster", "../slideMasters/slideMaster1.xml".to_string())]),
        )?;
        part(&mut zip, "ppt/theme/theme1.xml".into(), &theme())?;

        // Summary slide
        part(
            &mut zip,
            "ppt/slides/slide1.xml".into(),
            &slide(&[
                title_shape(2, &self.title),
                text_shape(3, "Summary", &self.summary, body_frame()),
            ]),
        )?;
        part(
            &mut zip,
            "ppt/slides/_rels/slide1.xml.rels".into(),
            &relationships(&[("slideLayout", "../slideLayouts/slideLayout1.xml".to_string())]),
        )?;

        // Chart slides
        let pages = self.charts.len().div_ceil(CHARTS_PER_SLIDE);
        for (page, charts) in self.charts.chunks(CHARTS_PER_SLIDE).enumerate() {
            let slide_num = page + 2;
            let first_image = page * CHARTS_PER_SLIDE + 1;

            let mut shapes = vec![title_shape(2, &format!("Charts ({}/{})", page + 1, pages))];
            let mut rels = vec![("slideLayout", "../slideLayouts/slideLayout1.xml".to_string())];
            for (i, (chart, frame)) in charts.iter().zip(grid_frames()).enumerate() {
                // rId1 is the layout
                shapes.push(picture_shape(i + 3, i + 2, &chart.title, frame));
                rels.push(("image", format!("../media/image{}.png", first_image + i)));
            }

            part(
                &mut zip,
                format!("ppt/slides/slide{}.xml", slide_num),
                &slide(&shapes),
            )?;
            part(
                &mut zip,
                format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
                &relationships(&rels),
            )?;
        }

        for (idx, chart) in self.charts.iter().enumerate() {
            zip.start_file(format!("ppt/media/image{}.png", idx + 1), options)?;
            zip.write_all(&chart.png)?;
        }

        Ok(zip.finish()?)
    }
}

/// Escape text for XML element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn title_frame() -> Frame {
    Frame {
        x: EMU_PER_INCH / 2,
        y: EMU_PER_INCH / 4,
        cx: SLIDE_WIDTH - EMU_PER_INCH,
        cy: EMU_PER_INCH * 3 / 4,
    }
}

fn body_frame() -> Frame {
    let top = EMU_PER_INCH * 5 / 4;
    Frame {
        x: EMU_PER_INCH / 2,
        y: top,
        cx: SLIDE_WIDTH - EMU_PER_INCH,
        cy: SLIDE_HEIGHT - top - EMU_PER_INCH / 2,
    }
}

/// Top-left, top-right, bottom-left, bottom-right cells under the title.
fn grid_frames() -> [Frame; CHARTS_PER_SLIDE] {
    let area = body_frame();
    let gap = EMU_PER_INCH / 4;
    let cx = (area.cx - gap) / 2;
    let cy = (area.cy - gap) / 2;
    let cell = |col: i64, row: i64| Frame {
        x: area.x + col * (cx + gap),
        y: area.y + row * (cy + gap),
        cx,
        cy,
    };
    [cell(0, 0), cell(1, 0), cell(0, 1), cell(1, 1)]
}

fn xfrm(frame: Frame) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
}

fn paragraph(text: &str, size: u32, bold: bool) -> String {
    format!(
        r#"<a:p><a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        size,
        u8::from(bold),
        escape_xml(text)
    )
}

fn text_shape(id: usize, name: &str, lines: &[String], frame: Frame) -> String {
    let body: String = lines.iter().map(|line| paragraph(line, 2000, false)).collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{body}</p:txBody></p:sp>"#,
        id = id,
        name = escape_xml(name),
        xfrm = xfrm(frame),
        body = body
    )
}

fn title_shape(id: usize, title: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Title"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr anchor="ctr"/><a:lstStyle/>{text}</p:txBody></p:sp>"#,
        id = id,
        xfrm = xfrm(title_frame()),
        text = paragraph(title, 2800, true)
    )
}

fn picture_shape(id: usize, rel_id: usize, description: &str, frame: Frame) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Chart {id}" descr="{descr}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        id = id,
        descr = escape_xml(description),
        rel = rel_id,
        xfrm = xfrm(frame)
    )
}

fn empty_group() -> &'static str {
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#
}

fn slide(shapes: &[String]) -> String {
    format!(
        r#"{XML_DECL}
<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{group}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        group = empty_group(),
        shapes = shapes.concat()
    )
}

/// Relationship part; ids are assigned `rId1..` in order.
fn relationships(targets: &[(&str, String)]) -> String {
    let body: String = targets
        .iter()
        .enumerate()
        .map(|(i, (kind, target))| {
            format!(
                r#"<Relationship Id="rId{}" Type="{REL_BASE}/{}" Target="{}"/>"#,
                i + 1,
                kind,
                target
            )
        })
        .collect();
    format!(r#"{XML_DECL}
<Relationships xmlns="{NS_RELS}">{body}</Relationships>"#)
}

fn package_rels() -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="{NS_RELS}"><Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{REL_BASE}/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

fn content_types(slides: usize) -> String {
    const PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";
    let slide_overrides: String = (1..=slides)
        .map(|i| {
            format!(
                r#"<Override PartName="/ppt/slides/slide{i}.xml" ContentType="{PML}.slide+xml"/>"#
            )
        })
        .collect();
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="{PML}.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{PML}.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="{PML}.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>{slide_overrides}</Types>"#
    )
}

/// Presentation part; rId1 is the master, rId2 the theme, slides follow.
fn presentation(slides: usize) -> String {
    let slide_ids: String = (1..=slides)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 2))
        .collect();
    format!(
        r#"{XML_DECL}
<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="{SLIDE_WIDTH}" cy="{SLIDE_HEIGHT}"/><p:notesSz cx="{SLIDE_HEIGHT}" cy="{SLIDE_WIDTH}"/></p:presentation>"#
    )
}

fn presentation_rels(slides: usize) -> String {
    let mut targets = vec![
        ("slideMaster", "slideMasters/slideMaster1.xml".to_string()),
        ("theme", "theme/theme1.xml".to_string()),
    ];
    targets.extend((1..=slides).map(|i| ("slide", format!("slides/slide{}.xml", i))));
    relationships(&targets)
}

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}
<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{group}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        group = empty_group()
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}
<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{group}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        group = empty_group()
    )
}

fn theme() -> String {
    let color = |name: &str, hex: &str| format!(r#"<a:{name}><a:srgbClr val="{hex}"/></a:{name}>"#);
    let colors: String = [
        ("dk1", "000000"),
        ("lt1", "FFFFFF"),
        ("dk2", "1F2A44"),
        ("lt2", "EEF1F5"),
        ("accent1", "00CC96"),
        ("accent2", "EF553B"),
        ("accent3", "636EFA"),
        ("accent4", "FFA15A"),
        ("accent5", "AB63FA"),
        ("accent6", "19D3F3"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ]
    .iter()
    .map(|&(name, hex)| color(name, hex))
    .collect();

    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let fills = solid.repeat(3);
    let lines: String = [6350, 12700, 19050]
        .iter()
        .map(|w| format!(r#"<a:ln w="{w}">{solid}</a:ln>"#))
        .collect();
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);

    format!(
        r#"{XML_DECL}
<a:theme xmlns:a="{NS_A}" name="OEE"><a:themeElements><a:clrScheme name="OEE">{colors}</a:clrScheme><a:fontScheme name="OEE"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="OEE"><a:fillStyleLst>{fills}</a:fillStyleLst><a:lnStyleLst>{lines}</a:lnStyleLst><a:effectStyleLst>{effects}</a:effectStyleLst><a:bgFillStyleLst>{fills}</a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
    )
}

fn core_props(title: &str) -> String {
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>OEE Dashboard</dc:creator></cp:coreProperties>"#,
        escape_xml(title)
    )
}

fn app_props(slides: usize) -> String {
    format!(
        r#"{XML_DECL}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>OEE Dashboard</Application><PresentationFormat>Widescreen</PresentationFormat><Slides>{slides}</Slides></Properties>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record;
    use crate::oee::{OeeSnapshot, TimeBucket, WORLD_CLASS_OEE};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn chart(title: &str) -> RenderedChart {
        RenderedChart {
            title: title.to_string(),
            png: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn snapshot() -> OeeSnapshot {
        let records = vec![
            record("2024-03-01", "M1", "A", 480.0, 60.0, 380, 400, Some("Changeover")),
            record("2024-03-02", "M2", "B", 480.0, 30.0, 420, 430, Some("Jam & Stop")),
        ];
        OeeSnapshot::compute(&records, TimeBucket::Day, WORLD_CLASS_OEE)
    }

    fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Jam & <Stop>"), "Jam &amp; &lt;Stop&gt;");
        assert_eq!(escape_xml(r#"a"b'c"#), "a&quot;b&apos;c");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_empty_snapshot_is_rejected() {
        let empty = OeeSnapshot::compute(&[], TimeBucket::Day, WORLD_CLASS_OEE);
        assert!(matches!(
            ReportDeck::from_snapshot("OEE", &empty, Vec::new()),
            Err(ReportError::Empty)
        ));
    }

    #[test]
    fn test_summary_lines() {
        let deck = ReportDeck::from_snapshot("OEE", &snapshot(), Vec::new()).unwrap();
        assert!(deck.summary[0].starts_with("OEE: "));
        assert!(deck.summary.iter().any(|l| l == "Good parts: 800"));
        assert!(deck
            .summary
            .iter()
            .any(|l| l == "Top downtime reason: Changeover (60 min)"));
    }

    #[test]
    fn test_slide_grouping() {
        let charts: Vec<_> = (0..5).map(|i| chart(&format!("Chart {}", i))).collect();
        let deck = ReportDeck::from_snapshot("Line 1 & 2", &snapshot(), charts).unwrap();
        assert_eq!(deck.slide_count(), 3);

        let bytes = deck.write_to(Cursor::new(Vec::new())).unwrap().into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        for name in [
            "[Content_Types].xml",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide3.xml",
            "ppt/media/image5.png",
            "ppt/theme/theme1.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }
        assert!(archive.by_name("ppt/slides/slide4.xml").is_err());

        let second = read_part(&mut archive, "ppt/slides/slide2.xml");
        assert_eq!(second.matches("<p:pic>").count(), 4);
        let third_rels = read_part(&mut archive, "ppt/slides/_rels/slide3.xml.rels");
        assert!(third_rels.contains("../media/image5.png"));
        let summary = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(summary.contains("Line 1 &amp; 2"));
        assert!(summary.contains("Good parts: 800"));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REPORT_FILE_NAME);
        let deck = ReportDeck::from_snapshot("OEE", &snapshot(), vec![chart("Trend")]).unwrap();

        deck.write_file(&path).unwrap();

        let archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert!(archive.len() > 10);
    }
}
