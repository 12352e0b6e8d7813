// Chart drawing with plotters
use crate::application::render_job::{ChartRenderer, RenderJob};
use crate::domain::error::GraphError;
use crate::domain::reading::Metric;
use chrono::{DateTime, NaiveDateTime};
use plotters::coord::combinators::BindKeyPoints;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontError;

const FONT: &str = "sans-serif";
/// Tick mark length in pixels. Plotters keeps tick labels twice this far from the axis.
const TICK: u32 = 5;
const GAP: u32 = 4;

/// Draws line charts with `BitMapBackend`; the output format follows the
/// file extension.
#[derive(Debug, Clone, Default)]
pub struct PlottersRenderer;

impl ChartRenderer for PlottersRenderer {
    fn render(&self, job: &RenderJob) -> Result<(), GraphError> {
        draw(job).map_err(|e| GraphError::RenderWrite {
            path: job.path.clone(),
            reason: e.to_string(),
        })
    }
}

fn secs(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp()
}

fn from_secs(s: i64) -> NaiveDateTime {
    DateTime::from_timestamp(s, 0)
        .map(|t| t.naive_utc())
        .unwrap_or_default()
}

/// Plotters only turns text in quarter steps; snap a counter-clockwise angle
/// in degrees to the nearest one.
fn quarter_turn(degrees: f64) -> FontTransform {
    let normalised = degrees.rem_euclid(360.0);
    match ((normalised + 45.0) / 90.0) as u32 % 4 {
        1 => FontTransform::Rotate270,
        2 => FontTransform::Rotate180,
        3 => FontTransform::Rotate90,
        _ => FontTransform::None,
    }
}

/// Anchor that keeps a label entirely below and centred on its point once
/// `turn` is applied. Plotters offsets by the anchor first and rotates about
/// the point afterwards.
fn hanging(turn: &FontTransform) -> Pos {
    match turn {
        FontTransform::None => Pos::new(HPos::Center, VPos::Top),
        FontTransform::Rotate90 => Pos::new(HPos::Left, VPos::Center),
        FontTransform::Rotate180 => Pos::new(HPos::Center, VPos::Bottom),
        FontTransform::Rotate270 => Pos::new(HPos::Right, VPos::Center),
    }
}

fn label_style(size: f64, turn: FontTransform) -> TextStyle<'static> {
    let pos = hanging(&turn);
    TextStyle::from((FONT, size).into_font().transform(turn)).pos(pos)
}

/// Depth below the axis taken by a row of labels, rotation included.
fn label_band<'a>(labels: impl IntoIterator<Item = &'a String>, style: &TextStyle) -> Result<u32, FontError> {
    let mut band = 0;
    for label in labels {
        band = band.max(style.font.box_size(label)?.1);
    }
    Ok(band)
}

/// Padded value range; a fixed default when there is nothing to fit.
fn value_range(values: &[f64], metric: Metric) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return match metric {
            Metric::Humidity => (0.0, 100.0),
            Metric::Temperature => (0.0, 1.0),
        };
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn draw(job: &RenderJob) -> Result<(), Box<dyn std::error::Error>> {
    let style = &job.style;
    let plan = &job.plan;
    let (start, end) = (job.slice.start, job.slice.end);
    let (x0, x1) = (secs(start), secs(end).max(secs(start) + 1));

    let points: Vec<(i64, f64)> = job
        .slice
        .samples()
        .iter()
        .map(|s| (secs(s.timestamp), s.value(job.metric)))
        .collect();
    let values: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (y0, y1) = value_range(&values, job.metric);

    let major: Vec<i64> = plan.major_ticks(start, end).into_iter().map(secs).collect();
    let minor: Vec<i64> = plan.minor_ticks(start, end).into_iter().map(secs).collect();
    let major_labels: Vec<(i64, String)> = major
        .iter()
        .map(|&x| (x, plan.major.label(from_secs(x))))
        .collect();
    let minor_labels: Vec<(i64, String)> = match plan.minor {
        Some(set) => minor.iter().map(|&x| (x, set.label(from_secs(x)))).collect(),
        None => Vec::new(),
    };

    let turn = quarter_turn(plan.rotation.degrees);
    let turned = |rotate: bool| if rotate { turn.clone() } else { FontTransform::None };
    let major_style = label_style(plan.label_sizes.major, turned(plan.rotation.target.major()));
    let minor_style = label_style(plan.label_sizes.minor, turned(plan.rotation.target.minor()));
    let value_style = TextStyle::from((FONT, plan.label_sizes.value).into_font());
    let x_desc_style = TextStyle::from((FONT, style.x_label_size).into_font());
    let y_desc_style = TextStyle::from((FONT, style.y_label_size).into_font())
        .transform(FontTransform::Rotate270)
        .pos(Pos::new(HPos::Center, VPos::Top));

    // Below the plot: tick, major row, minor row, then the axis title
    let major_band = label_band(major_labels.iter().map(|l| &l.1), &major_style)?;
    let minor_band = label_band(minor_labels.iter().map(|l| &l.1), &minor_style)?;
    let minor_depth = if minor_band > 0 { minor_band + GAP } else { 0 };
    let x_desc_height = x_desc_style.font.box_size("Time")?.1;
    let x_area = 2 * TICK + major_band + minor_depth + style.x_label_pad + x_desc_height + GAP;

    // Left of the plot: axis title, then right-aligned value labels
    let mut value_width = 0;
    for v in [y0, (y0 + y1) / 2.0, y1] {
        value_width = value_width.max(value_style.font.box_size(&job.metric.format_value(v))?.0);
    }
    let y_desc_width = y_desc_style.font.box_size(job.metric.name())?.0;
    let y_area = 2 * TICK + value_width + style.y_label_pad + y_desc_width + GAP;

    let root = BitMapBackend::new(&job.path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_axis = (x0..x1)
        .with_key_points(major.clone())
        .with_light_points(minor.clone());

    let mut chart = ChartBuilder::on(&root)
        .caption(job.title(), (FONT, style.title_size).into_font())
        .margin(10)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(x_axis, y0..y1)?;

    let metric = job.metric;
    let y_formatter = move |y: &f64| metric.format_value(*y);

    let minor_grid = if style.minor_grid_line_width == 0 {
        TRANSPARENT.stroke_width(0)
    } else {
        BLACK.mix(0.1).stroke_width(style.minor_grid_line_width)
    };

    // x labels are placed by hand below; the mesh only draws ticks and grid
    chart
        .configure_mesh()
        .x_labels(major.len().max(1))
        .x_label_formatter(&|_: &i64| String::new())
        .y_label_formatter(&y_formatter)
        .y_label_style(value_style)
        .x_desc("Time")
        .axis_desc_style(x_desc_style)
        .bold_line_style(BLACK.mix(0.3).stroke_width(style.major_grid_line_width))
        .light_line_style(minor_grid)
        .set_all_tick_mark_size(TICK)
        .draw()?;

    let (plot_left, plot_bottom) = chart.backend_coord(&(x0, y0));
    let plot_top = chart.backend_coord(&(x0, y1)).1;

    let major_row = plot_bottom + (2 * TICK) as i32;
    for (x, label) in &major_labels {
        let px = chart.backend_coord(&(*x, y0)).0;
        root.draw(&Text::new(label.as_str(), (px, major_row), major_style.clone()))?;
    }
    let minor_row = major_row + (major_band + GAP) as i32;
    for (x, label) in &minor_labels {
        let px = chart.backend_coord(&(*x, y0)).0;
        root.draw(&Text::new(label.as_str(), (px, minor_row), minor_style.clone()))?;
    }

    let y_desc_x = plot_left - y_area as i32;
    root.draw(&Text::new(
        job.metric.name(),
        (y_desc_x, (plot_top + plot_bottom) / 2),
        y_desc_style,
    ))?;

    let color = RGBColor(job.color.0, job.color.1, job.color.2);
    match points.len() {
        0 => {
            let center = ((x0 + x1) / 2, (y0 + y1) / 2.0);
            let text_style = TextStyle::from((FONT, style.title_size).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(std::iter::once(Text::new("No data", center, text_style)))?;
        }
        1 => {
            chart.draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, style.plot_line_width * 3, color.filled())),
            )?;
        }
        _ => {
            chart.draw_series(LineSeries::new(
                points,
                color.stroke_width(style.plot_line_width),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}
