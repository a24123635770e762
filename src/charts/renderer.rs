//! Static Chart Renderer
//! Renders charts to PNG bytes with plotters.
//!
//! Layout:
//! - Scatter: caption, mesh with axis descriptions, sized markers per
//!   campaign, trend line per campaign, series legend in the upper left.
//! - Pie: caption, two slices (gold / light green) with labels and
//!   percentages, slice values in the labels.

use crate::charts::model::{
    format_value, marker_radius, ChartData, PieChart, ScatterChart, MAX_MARKER_RADIUS,
};
use crate::data::schema::Arm;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

const CONTROL_RGB: RGBColor = RGBColor(99, 110, 250);
const TEST_RGB: RGBColor = RGBColor(239, 85, 59);
const PIE_RGB: [RGBColor; 2] = [RGBColor(255, 215, 0), RGBColor(144, 238, 144)];
const GRID_RGB: RGBColor = RGBColor(235, 235, 235);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Pixel buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err(err: impl std::fmt::Display) -> RenderError {
    RenderError::Drawing(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a chart into PNG bytes.
    pub fn render_png(chart: &ChartData, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            match chart {
                ChartData::Scatter(scatter) => Self::draw_scatter(&root, scatter)?,
                ChartData::Pie(pie) => Self::draw_pie(&root, pie)?,
            }

            root.present().map_err(draw_err)?;
        }

        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or(RenderError::Buffer { width, height })?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn arm_rgb(arm: Arm) -> RGBColor {
        match arm {
            Arm::Control => CONTROL_RGB,
            Arm::Test => TEST_RGB,
        }
    }

    fn draw_scatter(
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        chart: &ScatterChart,
    ) -> Result<(), RenderError> {
        let (x0, x1, y0, y1) = chart.bounds();
        let max_size = chart.max_size();

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(draw_err)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .light_line_style(&GRID_RGB)
            .draw()
            .map_err(draw_err)?;

        for series in &chart.series {
            let color = Self::arm_rgb(series.arm);

            ctx.draw_series(series.points.iter().map(|p| {
                let radius = marker_radius(p.size, max_size, MAX_MARKER_RADIUS).round() as i32;
                Circle::new((p.x, p.y), radius, color.mix(0.6).filled())
            }))
            .map_err(draw_err)?
            .label(series.campaign.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));

            if let Some(trend) = &series.trend {
                ctx.draw_series(LineSeries::new(trend.endpoints(), color.stroke_width(3)))
                    .map_err(draw_err)?
                    .label(format!("{} trend", series.campaign))
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x - 8, y), (x + 8, y)], color.stroke_width(3))
                    });
            }
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_pie(
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        chart: &PieChart,
    ) -> Result<(), RenderError> {
        let area = root
            .titled(&chart.title, ("sans-serif", 28))
            .map_err(draw_err)?;
        let (width, height) = area.dim_in_pixel();

        if chart.total().is_nan() || chart.total() <= 0.0 {
            area.draw(&Text::new(
                "No data",
                (width as i32 / 2 - 40, height as i32 / 2),
                ("sans-serif", 24).into_font(),
            ))
            .map_err(draw_err)?;
            return Ok(());
        }

        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.32;
        let sizes: Vec<f64> = chart.slices.iter().map(|s| s.value).collect();
        let colors: Vec<RGBColor> = (0..sizes.len()).map(|i| PIE_RGB[i % PIE_RGB.len()]).collect();
        let labels: Vec<String> = chart
            .slices
            .iter()
            .map(|s| format!("{} ({})", s.label, format_value(s.value)))
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 22).into_font().color(&BLACK));
        area.draw(&pie).map_err(draw_err)?;

        Ok(())
    }
}
