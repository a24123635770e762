//! Chart Viewer Widget
//! Right side scrollable panel for the campaign charts.
//! Supports responsive multi-column layout based on available width.

use crate::charts::{ChartData, ChartPlotter};
use crate::stats::CampaignTotals;
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CARD_HEIGHT: f32 = 470.0;
const CHART_WIDTH: f32 = 640.0;
const PLOT_HEIGHT: f32 = 330.0;

const BORDER_COLOR: Color32 = Color32::from_rgb(100, 149, 237);

/// Scrollable chart display area with responsive multi-column layout.
/// The totals card comes first, then the charts in report order.
#[derive(Default)]
pub struct ChartViewer {
    pub charts: Vec<ChartData>,
    pub totals: Option<CampaignTotals>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.charts.clear();
        self.totals = None;
    }

    pub fn set_report(&mut self, charts: Vec<ChartData>, totals: CampaignTotals) {
        self.charts = charts;
        self.totals = Some(totals);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(totals) = &self.totals else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        // Calculate how many columns fit in available width
        let avail_width = ui.available_width();
        let card_total_width = CHART_WIDTH + CHART_SPACING;
        let num_columns = ((avail_width / card_total_width).floor() as usize).max(1);

        // Slot 0 is the totals card
        let total_items = self.charts.len() + 1;
        let total_rows = total_items.div_ceil(num_columns);
        let row_height = CARD_HEIGHT + CHART_SPACING;
        let charts = &self.charts;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show_rows(ui, row_height, total_rows, |ui, row_range| {
                for row in row_range {
                    ui.horizontal(|ui| {
                        for col in 0..num_columns {
                            let idx = row * num_columns + col;
                            if idx == 0 {
                                Self::draw_totals_card(ui, totals);
                            } else if let Some(chart) = charts.get(idx - 1) {
                                Self::draw_chart_card(ui, idx, chart);
                            } else {
                                continue;
                            }
                            ui.add_space(CHART_SPACING);
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    fn card_frame(ui: &egui::Ui) -> egui::Frame {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, BORDER_COLOR))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
    }

    fn draw_totals_card(ui: &mut egui::Ui, totals: &CampaignTotals) {
        let card_width = CHART_WIDTH - 20.0;
        Self::card_frame(ui).show(ui, |ui| {
            ui.set_width(card_width);
            ui.set_min_height(CARD_HEIGHT - 30.0);
            ui.vertical(|ui| {
                ui.label(
                    RichText::new("Campaign Totals")
                        .size(18.0)
                        .strong()
                        .color(BORDER_COLOR),
                );
                ui.add_space(8.0);
                ChartPlotter::draw_totals_table(ui, totals);
            });
        });
    }

    /// Draw a single chart card with fixed width
    fn draw_chart_card(ui: &mut egui::Ui, number: usize, chart: &ChartData) {
        let card_width = CHART_WIDTH - 20.0;

        Self::card_frame(ui).show(ui, |ui| {
            ui.set_width(card_width);
            ui.set_min_height(CARD_HEIGHT - 30.0);

            ui.vertical(|ui| {
                ui.label(
                    RichText::new(format!("{number}. {}", chart.title()))
                        .size(18.0)
                        .strong()
                        .color(BORDER_COLOR),
                );
                ui.add_space(8.0);

                match chart {
                    ChartData::Scatter(scatter) => {
                        ChartPlotter::draw_scatter_chart(ui, scatter, PLOT_HEIGHT);
                    }
                    ChartData::Pie(pie) => {
                        ui.horizontal(|ui| {
                            ChartPlotter::draw_pie_chart(ui, pie, PLOT_HEIGHT);
                            ui.add_space(10.0);
                            ui.vertical(|ui| ChartPlotter::draw_pie_legend(ui, pie));
                        });
                    }
                }

                ui.add_space(8.0);
                ui.label(RichText::new(chart.commentary()).size(12.0).italics());
            });
        });
    }
}
