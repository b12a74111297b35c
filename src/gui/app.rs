//! OEE Dashboard Main Application
//! Main window with the control panel and the dashboard view.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{
    DataExporter, DataLoader, FileFormat, FilterOptions, ProductionRecord, FILTERED_FILE_NAME,
    TEMPLATE_FILE_NAME,
};
use crate::gui::{ControlPanel, ControlPanelAction, DashboardView};
use crate::oee::OeeSnapshot;
use crate::report::{ReportDeck, REPORT_FILE_NAME};
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info, warn};

const REPORT_TITLE: &str = "OEE Production Report";
const REPORT_CHART_SIZE: (u32, u32) = (1400, 1000);

/// File loading result from background thread
enum LoadResult {
    Complete {
        path: PathBuf,
        records: Vec<ProductionRecord>,
    },
    Error {
        path: PathBuf,
        message: String,
    },
}

/// Main application window.
pub struct OeeDashboardApp {
    config: DashboardConfig,
    loader: DataLoader,
    control_panel: ControlPanel,
    dashboard: DashboardView,
    /// Records passing the current filter, in file order.
    filtered: Vec<ProductionRecord>,

    // Async file loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl OeeDashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(config.default_bucket),
            loader: DataLoader::new(),
            dashboard: DashboardView::new(),
            filtered: Vec::new(),
            load_rx: None,
            config,
        };

        let default_dataset = app.config.default_dataset.clone();
        if default_dataset.exists() {
            app.start_load(default_dataset);
        } else {
            info!(path = %default_dataset.display(), "no default dataset found");
        }
        app
    }

    /// Handle file selection
    fn handle_browse(&mut self) {
        if self.load_rx.is_some() {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Production data", &FileFormat::all_extensions())
            .add_filter("CSV Files", FileFormat::CSV_EXTENSIONS)
            .add_filter("Excel Files", FileFormat::SPREADSHEET_EXTENSIONS)
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Parse the file on a worker thread; the current dataset stays until it succeeds.
    fn start_load(&mut self, path: PathBuf) {
        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.control_panel.is_loading = true;
        self.control_panel
            .set_status(format!("Loading {}...", path.display()));
        info!(path = %path.display(), "loading production data");

        thread::spawn(move || {
            let result = match DataLoader::read_file(&path) {
                Ok(records) => LoadResult::Complete { path, records },
                Err(e) => LoadResult::Error {
                    path,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(result);
        });
    }

    /// Check for file loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { path, records }) => {
                let options = FilterOptions::from_records(&records);
                self.loader.set_records(path, records);
                self.control_panel.set_dataset(
                    self.loader.file_name(),
                    self.loader.row_count(),
                    options,
                );
                self.control_panel.is_loading = false;
                self.control_panel
                    .set_status(format!("Loaded {} records", self.loader.row_count()));
                self.refresh();
            }
            Ok(LoadResult::Error { path, message }) => {
                error!(path = %path.display(), error = %message, "upload rejected");
                self.control_panel.is_loading = false;
                self.control_panel.set_status(format!("Error: {}", message));
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.is_loading = false;
                self.control_panel
                    .set_status("Error: loader stopped unexpectedly");
            }
        }
    }

    /// Re-run the aggregation for the current filter selection.
    fn refresh(&mut self) {
        self.filtered = self.control_panel.filter.apply(self.loader.records());
        self.control_panel.filtered_count = self.filtered.len();

        let snapshot = OeeSnapshot::compute(
            &self.filtered,
            self.control_panel.bucket,
            self.config.world_class_target,
        );
        self.dashboard.set_snapshot(snapshot);
    }

    fn save_dialog(title: &str, file_name: &str, kind: &str, extension: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .add_filter(kind, &[extension])
            .set_file_name(file_name)
            .save_file()
    }

    fn handle_export_filtered(&mut self) {
        let Some(path) = Self::save_dialog("Export filtered data", FILTERED_FILE_NAME, "CSV", "csv")
        else {
            return; // User cancelled
        };

        match DataExporter::write_csv(&self.filtered, &path) {
            Ok(()) => self
                .control_panel
                .set_status(format!("Exported {} records", self.filtered.len())),
            Err(e) => {
                error!(path = %path.display(), error = %e, "filtered export failed");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    fn handle_download_template(&mut self) {
        let Some(path) = Self::save_dialog("Save template", TEMPLATE_FILE_NAME, "CSV", "csv")
        else {
            return;
        };

        let rows = self.config.template_rows;
        match DataExporter::write_template(self.loader.records(), rows, &path) {
            Ok(()) => self
                .control_panel
                .set_status(format!("Exported template to {}", path.display())),
            Err(e) => {
                error!(path = %path.display(), error = %e, "template export failed");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Render charts to memory and pack them into a PowerPoint deck.
    fn handle_export_report(&mut self) {
        let Some(snapshot) = self.dashboard.snapshot() else {
            self.control_panel.set_status("Error: nothing to export");
            return;
        };

        let Some(path) = Self::save_dialog("Export report", REPORT_FILE_NAME, "PowerPoint", "pptx")
        else {
            return;
        };

        match Self::export_report(snapshot, &path) {
            Ok(slides) => {
                self.control_panel
                    .set_status(format!("Exported report: {} slides", slides));
                if let Err(e) = open::that(&path) {
                    warn!(path = %path.display(), error = %e, "could not open report");
                }
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "report export failed");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    fn export_report(snapshot: &OeeSnapshot, path: &Path) -> anyhow::Result<usize> {
        let (width, height) = REPORT_CHART_SIZE;
        let charts = StaticChartRenderer::render_dashboard(snapshot, width, height)?;
        let deck = ReportDeck::from_snapshot(REPORT_TITLE, snapshot, charts)?;
        deck.write_file(path)?;
        Ok(deck.slide_count())
    }
}

impl eframe::App for OeeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.load_rx.is_some() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse(),
                        ControlPanelAction::FilterChanged => self.refresh(),
                        ControlPanelAction::DownloadTemplate => self.handle_download_template(),
                        ControlPanelAction::ExportFiltered => self.handle_export_filtered(),
                        ControlPanelAction::ExportReport => self.handle_export_report(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard.show(ui);
        });
    }
}
