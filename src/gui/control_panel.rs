//! Control Panel Widget
//! Left side panel with the data source, filters and export actions.

use crate::data::{FilterOptions, RecordFilter, DATE_FORMAT};
use crate::oee::TimeBucket;
use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText, ScrollArea};

/// Left side control panel with file selection, filters and exports.
pub struct ControlPanel {
    pub file_name: Option<String>,
    pub row_count: usize,
    pub options: FilterOptions,
    pub filter: RecordFilter,
    pub bucket: TimeBucket,
    pub filtered_count: usize,
    pub status: String,
    pub is_loading: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            file_name: None,
            row_count: 0,
            options: FilterOptions::default(),
            filter: RecordFilter::default(),
            bucket: TimeBucket::default(),
            filtered_count: 0,
            status: "Ready".to_string(),
            is_loading: false,
        }
    }
}

impl ControlPanel {
    pub fn new(bucket: TimeBucket) -> Self {
        Self {
            bucket,
            ..Self::default()
        }
    }

    /// Reset filters to select everything in a freshly loaded dataset.
    pub fn set_dataset(&mut self, file_name: Option<String>, row_count: usize, options: FilterOptions) {
        self.file_name = file_name;
        self.row_count = row_count;
        self.filter = RecordFilter::select_all(&options);
        self.options = options;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn has_data(&self) -> bool {
        self.row_count > 0 && !self.is_loading
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🏭 OEE Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(0, 204, 150)),
            );
            ui.label(
                RichText::new("Availability × Performance × Quality")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = self
                        .file_name
                        .clone()
                        .unwrap_or_else(|| "No file loaded".to_string());
                    ui.label(RichText::new(name).size(12.0).color(if self.file_name.is_some() {
                        Color32::WHITE
                    } else {
                        Color32::GRAY
                    }));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.is_loading, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseFile;
                            }
                        });
                    });
                });
                if self.row_count > 0 {
                    ui.label(
                        RichText::new(format!("{} records", self.row_count))
                            .size(11.0)
                            .color(Color32::GRAY),
                    );
                }
            });

        ui.add_space(5.0);
        ui.add_enabled_ui(self.has_data(), |ui| {
            if ui
                .small_button("⬇ Download template")
                .on_hover_text("First rows of the loaded data as a CSV template")
                .clicked()
            {
                action = ControlPanelAction::DownloadTemplate;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔍 Filters").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.has_data(), |ui| {
            if self.show_filters(ui) {
                action = ControlPanelAction::FilterChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(
            RichText::new(format!(
                "{} of {} records selected",
                self.filtered_count, self.row_count
            ))
            .size(12.0),
        );
        ui.add_space(8.0);

        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.has_data() && self.filtered_count > 0, |ui| {
                let csv_button = egui::Button::new(RichText::new("💾 Export Filtered CSV").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(csv_button).clicked() {
                    action = ControlPanelAction::ExportFiltered;
                }

                ui.add_space(8.0);

                let ppt_button = egui::Button::new(RichText::new("📄 Export Report").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(ppt_button).clicked() {
                    action = ControlPanelAction::ExportReport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        if self.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let status_color = if self.status.starts_with("Error") {
                Color32::from_rgb(220, 53, 69)
            } else if self.status.starts_with("Loaded") || self.status.starts_with("Exported") {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        action
    }

    /// Filter widgets; returns true when the selection changed.
    fn show_filters(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.label("Machines:");
        changed |= Self::checkbox_list(
            ui,
            "machines",
            &self.options.machines,
            &mut self.filter.machines,
        );

        ui.add_space(5.0);
        ui.label("Shifts:");
        changed |= Self::checkbox_list(ui, "shifts", &self.options.shifts, &mut self.filter.shifts);

        ui.add_space(10.0);

        let label_width = 80.0;
        let combo_width = 150.0;
        let dates = &self.options.dates;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Start date:"));
            changed |= Self::date_combo(ui, "start_date", dates, &mut self.filter.start_date, combo_width);
        });
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("End date:"));
            changed |= Self::date_combo(ui, "end_date", dates, &mut self.filter.end_date, combo_width);
        });

        // Keep the range ordered
        if let (Some(start), Some(end)) = (self.filter.start_date, self.filter.end_date) {
            if start > end {
                self.filter.end_date = Some(start);
            }
        }

        ui.add_space(10.0);
        ui.label("Trend bucket:");
        ui.horizontal(|ui| {
            for bucket in TimeBucket::ALL {
                if ui
                    .radio_value(&mut self.bucket, bucket, bucket.label())
                    .changed()
                {
                    changed = true;
                }
            }
        });

        changed
    }

    fn checkbox_list(
        ui: &mut egui::Ui,
        id: &str,
        values: &[String],
        selected: &mut Vec<String>,
    ) -> bool {
        let mut changed = false;

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt(id)
                    .max_height(120.0)
                    .show(ui, |ui| {
                        for value in values {
                            let mut checked = selected.contains(value);
                            if ui.checkbox(&mut checked, value).changed() {
                                if checked {
                                    selected.push(value.clone());
                                } else {
                                    selected.retain(|v| v != value);
                                }
                                changed = true;
                            }
                        }
                    });
            });

        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                *selected = values.to_vec();
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                selected.clear();
                changed = true;
            }
        });

        changed
    }

    fn date_combo(
        ui: &mut egui::Ui,
        id: &str,
        dates: &[NaiveDate],
        value: &mut Option<NaiveDate>,
        width: f32,
    ) -> bool {
        let mut changed = false;
        let text = value
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();

        ComboBox::from_id_salt(id)
            .width(width)
            .selected_text(text)
            .show_ui(ui, |ui| {
                for date in dates {
                    let label = date.format(DATE_FORMAT).to_string();
                    if ui
                        .selectable_label(*value == Some(*date), label)
                        .clicked()
                    {
                        *value = Some(*date);
                        changed = true;
                    }
                }
            });

        changed
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    FilterChanged,
    DownloadTemplate,
    ExportFiltered,
    ExportReport,
}
