//! Campaign A/B Viewer Main Application
//! Main window with control panel and chart viewer.

use crate::config::ReportConfig;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, UserSettings};
use crate::report::AbReport;
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Analysis result from background thread
enum CalcResult {
    Progress(f32, String),
    Complete(Box<AbReport>),
    Error(String),
}

/// PNG export result from background thread
enum ExportResult {
    Complete { dir: PathBuf, files: usize },
    Error(String),
}

/// Main application window.
pub struct CampaignApp {
    config: ReportConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    report: Option<Arc<AbReport>>,

    // Async analysis
    calc_rx: Option<Receiver<CalcResult>>,
    is_calculating: bool,

    // Async export
    export_rx: Option<Receiver<ExportResult>>,
    is_exporting: bool,
}

impl CampaignApp {
    /// Build the app; starts the analysis right away when both files exist.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ReportConfig) -> Self {
        let settings = UserSettings::from_config(&config);
        let autorun = settings.is_complete();

        let mut app = Self {
            config,
            control_panel: ControlPanel::new(settings),
            chart_viewer: ChartViewer::new(),
            report: None,
            calc_rx: None,
            is_calculating: false,
            export_rx: None,
            is_exporting: false,
        };
        if autorun {
            app.start_calculation();
        }
        app
    }

    fn pick_csv(title: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .add_filter("CSV Files", &["csv"])
            .pick_file()
    }

    fn handle_browse_control(&mut self) {
        if let Some(path) = Self::pick_csv("Control campaign") {
            self.control_panel.settings.control_path = Some(path);
        }
    }

    fn handle_browse_test(&mut self) {
        if let Some(path) = Self::pick_csv("Test campaign") {
            self.control_panel.settings.test_path = Some(path);
        }
    }

    /// Start analysis in background thread
    fn start_calculation(&mut self) {
        if self.is_calculating {
            return;
        }
        let config = self.control_panel.settings.apply_to(&self.config);

        self.chart_viewer.clear();
        self.report = None;
        self.control_panel.has_report = false;

        let (tx, rx) = channel();
        self.calc_rx = Some(rx);
        self.is_calculating = true;
        self.control_panel.set_progress(5.0, "Starting analysis...");

        thread::spawn(move || Self::run_calculation(tx, config));
    }

    /// Run the report pipeline (called from background thread)
    fn run_calculation(tx: Sender<CalcResult>, config: ReportConfig) {
        let progress_tx = tx.clone();
        let result = AbReport::build_with_progress(&config, |fraction, stage| {
            let _ = progress_tx.send(CalcResult::Progress(fraction * 100.0, stage.to_string()));
        });

        let message = match result {
            Ok(report) => CalcResult::Complete(Box::new(report)),
            Err(e) => {
                tracing::error!(error = %e, "Analysis failed");
                CalcResult::Error(e.to_string())
            }
        };
        let _ = tx.send(message);
    }

    /// Check for analysis results
    fn check_calculation_results(&mut self) {
        let Some(rx) = self.calc_rx.take() else {
            return;
        };
        let mut should_keep_receiver = true;

        while let Ok(result) = rx.try_recv() {
            match result {
                CalcResult::Progress(progress, status) => {
                    self.control_panel.set_progress(progress, &status);
                }
                CalcResult::Complete(report) => {
                    let count = report.charts.len();
                    self.chart_viewer
                        .set_report(report.charts.clone(), report.totals.clone());
                    self.report = Some(Arc::from(report));
                    self.control_panel.has_report = true;
                    self.control_panel
                        .set_progress(100.0, &format!("Complete! {} charts ready", count));
                    self.is_calculating = false;
                    should_keep_receiver = false;
                }
                CalcResult::Error(error) => {
                    self.control_panel
                        .set_progress(0.0, &format!("Error: {}", error));
                    self.is_calculating = false;
                    should_keep_receiver = false;
                }
            }
        }

        if should_keep_receiver {
            self.calc_rx = Some(rx);
        }
    }

    /// Export charts as PNG files plus summary.json into the chosen folder
    fn handle_export(&mut self) {
        if self.is_exporting {
            return;
        }
        let Some(report) = self.report.clone() else {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_directory(std::env::current_dir().unwrap_or_default())
            .pick_folder()
        else {
            return;
        };
        self.control_panel.settings.output_dir = dir.clone();

        let (width, height) = (self.config.chart_width, self.config.chart_height);
        let (tx, rx) = channel();
        self.export_rx = Some(rx);
        self.is_exporting = true;
        self.control_panel.set_progress(50.0, "Rendering charts...");

        thread::spawn(move || {
            let message = match report.export(&dir, width, height) {
                Ok(files) => ExportResult::Complete {
                    dir,
                    files: files.len(),
                },
                Err(e) => {
                    tracing::error!(error = %e, "Export failed");
                    ExportResult::Error(e.to_string())
                }
            };
            let _ = tx.send(message);
        });
    }

    fn check_export_results(&mut self) {
        let Some(rx) = self.export_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(ExportResult::Complete { dir, files }) => {
                self.control_panel.set_progress(
                    100.0,
                    &format!("Exported {} files to {}", files, dir.display()),
                );
                self.is_exporting = false;
            }
            Ok(ExportResult::Error(error)) => {
                self.control_panel
                    .set_progress(0.0, &format!("Export Error: {}", error));
                self.is_exporting = false;
            }
            Err(TryRecvError::Empty) => self.export_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.control_panel
                    .set_progress(0.0, "Export Error: worker stopped unexpectedly");
                self.is_exporting = false;
            }
        }
    }

    fn handle_open_output(&mut self) {
        let dir = &self.control_panel.settings.output_dir;
        if let Err(e) = open::that(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not open output folder");
            self.control_panel
                .set_progress(self.control_panel.progress, &format!("Error: {}", e));
        }
    }
}

impl eframe::App for CampaignApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_calculation_results();
        self.check_export_results();

        if self.is_calculating || self.is_exporting {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseControl => self.handle_browse_control(),
                        ControlPanelAction::BrowseTest => self.handle_browse_test(),
                        ControlPanelAction::RunAnalysis => self.start_calculation(),
                        ControlPanelAction::ExportCharts => self.handle_export(),
                        ControlPanelAction::OpenOutput => self.handle_open_output(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

/// Open the viewer window.
pub fn run_viewer(config: ReportConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Campaign A/B Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Campaign A/B Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(CampaignApp::new(cc, config)))),
    )
}
