//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot and the egui painter.

use crate::charts::model::{
    format_value, marker_radius, PieChart, ScatterChart, MAX_MARKER_RADIUS,
};
use crate::data::schema::Arm;
use crate::stats::CampaignTotals;
use egui::{Align2, Color32, FontId, Pos2, RichText, Shape, Stroke};
use egui_plot::{Legend, Line, Plot, Points};
use std::f64::consts::{PI, TAU};

/// Scatter colors per campaign
pub const CONTROL_COLOR: Color32 = Color32::from_rgb(99, 110, 250); // Blue
pub const TEST_COLOR: Color32 = Color32::from_rgb(239, 85, 59); // Red

/// Pie slice colors, control first
pub const PIE_COLORS: [Color32; 2] = [
    Color32::from_rgb(255, 215, 0),   // Gold
    Color32::from_rgb(144, 238, 144), // Light green
];

/// Largest angle covered by one fan triangle when filling a slice.
const SLICE_STEP: f64 = PI / 72.0;

/// Creates campaign comparison charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for a campaign.
    pub fn arm_color(arm: Arm) -> Color32 {
        match arm {
            Arm::Control => CONTROL_COLOR,
            Arm::Test => TEST_COLOR,
        }
    }

    pub fn pie_color(index: usize) -> Color32 {
        PIE_COLORS[index % PIE_COLORS.len()]
    }

    /// Draw a sized-marker scatter plot with one trend line per campaign.
    pub fn draw_scatter_chart(ui: &mut egui::Ui, chart: &ScatterChart, height: f32) {
        let max_size = chart.max_size();

        Plot::new(format!("scatter_{}", chart.title))
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label(chart.x_label.clone())
            .y_axis_label(chart.y_label.clone())
            .show(ui, |plot_ui| {
                for series in &chart.series {
                    let color = Self::arm_color(series.arm);

                    // One item per point so each marker keeps its own size;
                    // the shared name merges them into one legend entry.
                    for point in &series.points {
                        let radius = marker_radius(point.size, max_size, MAX_MARKER_RADIUS);
                        plot_ui.points(
                            Points::new(vec![[point.x, point.y]])
                                .radius(radius as f32)
                                .filled(true)
                                .color(color.gamma_multiply(0.7))
                                .name(&series.campaign),
                        );
                    }

                    if let Some(trend) = &series.trend {
                        let [(x0, y0), (x1, y1)] = trend.endpoints();
                        plot_ui.line(
                            Line::new(vec![[x0, y0], [x1, y1]])
                                .color(color)
                                .width(2.0)
                                .name(format!("{} trend", series.campaign)),
                        );
                    }
                }
            });
    }

    /// Draw a pie chart with value labels, black outlines and hover percentages.
    pub fn draw_pie_chart(ui: &mut egui::Ui, chart: &PieChart, diameter: f32) {
        let (response, painter) =
            ui.allocate_painter(egui::vec2(diameter, diameter), egui::Sense::hover());
        let center = response.rect.center();
        let radius = diameter / 2.0 - 4.0;

        let angles = chart.slice_angles();
        if angles.is_empty() {
            painter.text(
                center,
                Align2::CENTER_CENTER,
                "No data",
                FontId::proportional(18.0),
                Color32::GRAY,
            );
            return;
        }

        let outline = Stroke::new(3.0, Color32::BLACK);

        for (i, (slice, (start, end))) in chart.slices.iter().zip(angles.iter()).enumerate() {
            let steps = ((end - start) / SLICE_STEP).ceil().max(1.0) as usize;
            let arc: Vec<Pos2> = (0..=steps)
                .map(|k| {
                    let angle = start + (end - start) * k as f64 / steps as f64;
                    Self::polar(center, radius, angle)
                })
                .collect();

            // Fan of thin triangles keeps every shape convex
            for pair in arc.windows(2) {
                painter.add(Shape::convex_polygon(
                    vec![center, pair[0], pair[1]],
                    Self::pie_color(i),
                    Stroke::NONE,
                ));
            }

            let mut border = Vec::with_capacity(arc.len() + 2);
            border.push(center);
            border.extend(arc.iter().copied());
            border.push(center);
            painter.add(Shape::line(border, outline));

            painter.text(
                Self::polar(center, radius * 0.6, (start + end) / 2.0),
                Align2::CENTER_CENTER,
                format_value(slice.value),
                FontId::proportional(18.0),
                Color32::BLACK,
            );
        }

        let hovered = response.hover_pos().and_then(|pos| {
            let offset = pos - center;
            if offset.length() > radius {
                return None;
            }
            let angle = (offset.x as f64).atan2(-(offset.y as f64)).rem_euclid(TAU);
            chart.slice_at_angle(angle)
        });

        if let Some(index) = hovered {
            let percentages = chart.percentages();
            let text = format!(
                "{}\n{:.1}%",
                chart.slices[index].label, percentages[index]
            );
            response.on_hover_text(text);
        }
    }

    /// Legend rows for a pie chart: color square + slice label.
    pub fn draw_pie_legend(ui: &mut egui::Ui, chart: &PieChart) {
        for (i, slice) in chart.slices.iter().enumerate() {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, Self::pie_color(i));
                ui.label(RichText::new(&slice.label).size(12.0));
            });
        }
    }

    /// Point on the circle, `angle` radians clockwise from 12 o'clock.
    fn polar(center: Pos2, radius: f32, angle: f64) -> Pos2 {
        Pos2::new(
            center.x + radius * angle.sin() as f32,
            center.y - radius * angle.cos() as f32,
        )
    }

    /// Draw campaign totals table
    pub fn draw_totals_table(ui: &mut egui::Ui, totals: &CampaignTotals) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("campaign_totals_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        // Headers
                        ui.label(RichText::new("Metric").strong().size(12.0));
                        ui.label(
                            RichText::new(&totals.control_campaign)
                                .strong()
                                .size(12.0)
                                .color(CONTROL_COLOR),
                        );
                        ui.label(
                            RichText::new(&totals.test_campaign)
                                .strong()
                                .size(12.0)
                                .color(TEST_COLOR),
                        );
                        ui.label(RichText::new("Control %").strong().size(12.0));
                        ui.label(RichText::new("Test %").strong().size(12.0));
                        ui.end_row();

                        for metric in &totals.metrics {
                            ui.label(RichText::new(&metric.metric).size(12.0));
                            ui.label(RichText::new(format_value(metric.control)).size(12.0));
                            ui.label(RichText::new(format_value(metric.test)).size(12.0));
                            ui.label(
                                RichText::new(format!("{:.1}", metric.control_share())).size(12.0),
                            );
                            ui.label(RichText::new(format!("{:.1}", metric.test_share())).size(12.0));
                            ui.end_row();
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_clockwise_from_top() {
        let center = Pos2::new(0.0, 0.0);
        let top = ChartPlotter::polar(center, 10.0, 0.0);
        let right = ChartPlotter::polar(center, 10.0, PI / 2.0);

        assert!((top.x - 0.0).abs() < 1e-4 && (top.y + 10.0).abs() < 1e-4);
        assert!((right.x - 10.0).abs() < 1e-4 && right.y.abs() < 1e-4);
    }

    #[test]
    fn test_arm_colors_differ() {
        assert_ne!(
            ChartPlotter::arm_color(Arm::Control),
            ChartPlotter::arm_color(Arm::Test)
        );
        assert_eq!(ChartPlotter::pie_color(2), PIE_COLORS[0]);
    }
}
