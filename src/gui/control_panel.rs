//! Control Panel Widget
//! Left side panel with the campaign files, cleaning options and actions.

use crate::config::ReportConfig;
use egui::{Color32, RichText};
use std::path::{Path, PathBuf};

/// User settings for one analysis run
#[derive(Debug, Default, Clone)]
pub struct UserSettings {
    pub control_path: Option<PathBuf>,
    pub test_path: Option<PathBuf>,
    pub impute_test: bool,
    pub output_dir: PathBuf,
}

impl UserSettings {
    /// Settings pre-filled from a config; paths that do not exist are left empty.
    pub fn from_config(config: &ReportConfig) -> Self {
        let existing = |path: &Path| path.is_file().then(|| path.to_path_buf());
        Self {
            control_path: existing(&config.control_path),
            test_path: existing(&config.test_path),
            impute_test: config.impute_test,
            output_dir: config.output_dir.clone(),
        }
    }

    /// Both campaign files chosen.
    pub fn is_complete(&self) -> bool {
        self.control_path.is_some() && self.test_path.is_some()
    }

    /// Overlay these settings on `base`.
    pub fn apply_to(&self, base: &ReportConfig) -> ReportConfig {
        let mut config = base.clone();
        if let Some(path) = &self.control_path {
            config.control_path = path.clone();
        }
        if let Some(path) = &self.test_path {
            config.test_path = path.clone();
        }
        config.impute_test = self.impute_test;
        config.output_dir = self.output_dir.clone();
        config
    }
}

/// Left side control panel with file selection and processing controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub progress: f32,
    pub status: String,
    /// Charts are available for export.
    pub has_report: bool,
}

impl ControlPanel {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            settings,
            progress: 0.0,
            status: "Ready".to_string(),
            has_report: false,
        }
    }

    fn file_row(ui: &mut egui::Ui, label: &str, path: Option<&PathBuf>) -> bool {
        let mut clicked = false;
        ui.label(RichText::new(label).size(12.0).strong());
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = path
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(if path.is_some() {
                        Color32::WHITE
                    } else {
                        Color32::GRAY
                    }));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            clicked = true;
                        }
                    });
                });
            });
        clicked
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Campaign A/B")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Control vs Test")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Campaign Files =====
        ui.label(RichText::new("📁 Campaign Files").size(14.0).strong());
        ui.add_space(5.0);

        if Self::file_row(ui, "Control campaign", self.settings.control_path.as_ref()) {
            action = ControlPanelAction::BrowseControl;
        }
        ui.add_space(5.0);
        if Self::file_row(ui, "Test campaign", self.settings.test_path.as_ref()) {
            action = ControlPanelAction::BrowseTest;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Cleaning =====
        ui.label(RichText::new("⚙️ Missing Values").size(14.0).strong());
        ui.add_space(5.0);
        ui.label(
            RichText::new("Control gaps are filled with the column mean.")
                .size(11.0)
                .color(Color32::GRAY),
        );
        ui.checkbox(&mut self.settings.impute_test, "Fill test gaps too");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.settings.is_complete(), |ui| {
                let button = egui::Button::new(RichText::new("▶ Run Analysis").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::RunAnalysis;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.has_report, |ui| {
                let export_button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(export_button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });

            ui.add_space(4.0);

            ui.add_enabled_ui(self.settings.output_dir.is_dir(), |ui| {
                if ui.small_button("Open output folder").clicked() {
                    action = ControlPanelAction::OpenOutput;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress (0-100) and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseControl,
    BrowseTest,
    RunAnalysis,
    ExportCharts,
    OpenOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_overlay_config() {
        let base = ReportConfig::default();
        let settings = UserSettings {
            control_path: Some(PathBuf::from("a.csv")),
            test_path: None,
            impute_test: true,
            output_dir: PathBuf::from("out"),
        };
        assert!(!settings.is_complete());

        let config = settings.apply_to(&base);
        assert_eq!(config.control_path, PathBuf::from("a.csv"));
        assert_eq!(config.test_path, base.test_path);
        assert!(config.impute_test);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_missing_files_not_prefilled() {
        let config = ReportConfig {
            control_path: PathBuf::from("/nonexistent/control.csv"),
            ..ReportConfig::default()
        };
        assert!(UserSettings::from_config(&config).control_path.is_none());
    }
}
