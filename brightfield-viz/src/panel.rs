//! Heatmap panels drawn with plotters.

use crate::colormap::{Colormap, ValueRange};
use crate::figure::{ScaleBar, BAR_COLOR, BOX_COLOR};
use crate::{Error, Result};
use brightfield_core::BoundingBox;
use image::RgbImage;
use ndarray::ArrayView2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Drawing area backed by an in-memory RGB buffer.
pub(crate) type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Width in pixels reserved right of each heatmap for its colorbar.
pub(crate) const COLORBAR_WIDTH: u32 = 80;
/// Pixels above and below the colorbar strip, matching the chart's caption
/// and label areas.
pub(crate) const COLORBAR_INSET: u32 = 40;
const COLORBAR_STRIP: i32 = 20;
const COLORBAR_TICKS: u32 = 5;

/// Upper bound on heatmap cells per side; larger maps are subsampled.
const MAX_CELLS: usize = 256;

/// Renders a `size` figure into an RGB image.
pub(crate) fn render<F>(size: (u32, u32), draw: F) -> Result<RgbImage>
where
    F: FnOnce(&Area<'_>) -> Result<()>,
{
    let (width, height) = size;
    let mut buffer = vec![0_u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| Error::Plot(format!("figure buffer does not hold {width}x{height} pixels")))
}

/// One titled heatmap with a colorbar, optional window outline and scale bar.
pub(crate) struct Panel<'a> {
    pub title: &'a str,
    pub data: ArrayView2<'a, f32>,
    pub colormap: Colormap,
    pub bbox: Option<BoundingBox>,
    pub scalebar: Option<&'a ScaleBar>,
}

impl Panel<'_> {
    /// Draws the panel into `area`. Row 0 of the map is at the top.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn draw(&self, area: &Area<'_>) -> Result<()> {
        let (rows, cols) = self.data.dim();
        if rows == 0 || cols == 0 {
            log::warn!("'{}' has no data", self.title);
            area.titled(self.title, ("sans-serif", 20))?;
            return Ok(());
        }

        let range = ValueRange::of(self.data);
        let (width, _) = area.dim_in_pixel();
        let (map_area, bar_area) = area.split_horizontally(width.saturating_sub(COLORBAR_WIDTH));

        let mut chart = ChartBuilder::on(&map_area)
            .caption(self.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0..cols as f64, rows as f64..0.0)?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(5)
            .y_labels(5)
            .draw()?;

        let stride = rows.max(cols).div_ceil(MAX_CELLS).max(1);
        let data = self.data;
        let colormap = self.colormap;
        chart.draw_series(
            (0..rows)
                .step_by(stride)
                .flat_map(|r| (0..cols).step_by(stride).map(move |c| (r, c)))
                .map(|(r, c)| {
                    let color = colormap.apply(range.normalize(data[[r, c]]));
                    Rectangle::new(
                        [
                            (c as f64, r as f64),
                            ((c + stride).min(cols) as f64, (r + stride).min(rows) as f64),
                        ],
                        color.filled(),
                    )
                }),
        )?;

        if let Some(bbox) = self.bbox {
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (bbox.y0 as f64, bbox.x0 as f64),
                    (bbox.y1 as f64, bbox.x1 as f64),
                ],
                BOX_COLOR.stroke_width(3),
            )))?;
        }

        if let Some(bar) = self.scalebar {
            let length = f64::from(bar.pixel_length(u32::try_from(cols).unwrap_or(u32::MAX)));
            if length > 0.0 {
                let margin = (cols.min(rows) as f64 / 20.0).max(1.0);
                let thickness = (rows as f64 / 50.0).max(1.0);
                let x1 = cols as f64 - margin;
                let x0 = x1 - length;
                let y1 = rows as f64 - margin;
                let y0 = y1 - thickness;
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x0, y0), (x1, y1)],
                    BAR_COLOR.filled(),
                )))?;
                chart.draw_series(std::iter::once(Text::new(
                    bar.label(),
                    ((x0 + x1) / 2.0, y0 - thickness),
                    ("sans-serif", 14)
                        .into_font()
                        .color(&BAR_COLOR)
                        .pos(Pos::new(HPos::Center, VPos::Bottom)),
                )))?;
            } else {
                log::warn!("scale bar shorter than a pixel on '{}'", self.title);
            }
        }

        draw_colorbar(&bar_area, range, self.colormap)
    }
}

/// Vertical gradient strip with value labels, maximum at the top.
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn draw_colorbar(area: &Area<'_>, range: ValueRange, colormap: Colormap) -> Result<()> {
    let (_, height) = area.dim_in_pixel();
    let top = COLORBAR_INSET;
    let bottom = height.saturating_sub(COLORBAR_INSET);
    if bottom <= top {
        return Ok(());
    }
    let span = f64::from(bottom - top);
    let x = 10;

    for py in top..bottom {
        let frac = f64::from(bottom - py) / span;
        let py = py as i32;
        area.draw(&Rectangle::new(
            [(x, py), (x + COLORBAR_STRIP, py + 1)],
            colormap.apply(frac).filled(),
        ))?;
    }
    area.draw(&Rectangle::new(
        [(x, top as i32), (x + COLORBAR_STRIP, bottom as i32)],
        BLACK.stroke_width(1),
    ))?;

    let style = TextStyle::from(("sans-serif", 12).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for tick in 0..=COLORBAR_TICKS {
        let frac = f64::from(tick) / f64::from(COLORBAR_TICKS);
        let py = bottom as i32 - (frac * span).round() as i32;
        area.draw_text(
            &format!("{:.2}", range.value_at(frac)),
            &style,
            (x + COLORBAR_STRIP + 4, py),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use ndarray::Array2;

    fn ramp(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32)
    }

    #[test]
    fn test_colorbar_runs_bottom_to_top() {
        let data = ramp(32, 32);
        let figure = render((400, 300), |root| {
            Panel {
                title: "ramp",
                data: data.view(),
                colormap: Colormap::Viridis,
                bbox: None,
                scalebar: None,
            }
            .draw(root)
        })
        .unwrap();

        let strip_x = 400 - COLORBAR_WIDTH + 15;
        let top = *figure.get_pixel(strip_x, COLORBAR_INSET + 1);
        let bottom = *figure.get_pixel(strip_x, 300 - COLORBAR_INSET - 2);
        let RGBColor(r, g, b) = Colormap::Viridis.apply(1.0);
        let high = Rgb([r, g, b]);
        assert!(top.0.iter().zip(high.0).all(|(&p, h)| p.abs_diff(h) <= 6));
        let RGBColor(r, g, b) = Colormap::Viridis.apply(0.0);
        let low = Rgb([r, g, b]);
        assert!(bottom.0.iter().zip(low.0).all(|(&p, l)| p.abs_diff(l) <= 6));
    }

    #[test]
    fn test_bbox_outline_drawn_in_box_color() {
        let data = Array2::<f32>::zeros((64, 64));
        let bbox = BoundingBox {
            x0: 16,
            x1: 48,
            y0: 32,
            y1: 64,
        };
        let figure = render((400, 400), |root| {
            Panel {
                title: "outline",
                data: data.view(),
                colormap: Colormap::Grayscale,
                bbox: Some(bbox),
                scalebar: None,
            }
            .draw(root)
        })
        .unwrap();

        let RGBColor(r, g, b) = BOX_COLOR;
        let red: Vec<(u32, u32)> = figure
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == [r, g, b])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!red.is_empty());
        // the outline sits in the right half of the map, left of the colorbar
        let map_mid = (400 - COLORBAR_WIDTH) / 2;
        assert!(red.iter().all(|&(x, _)| x >= map_mid - 10 && x < 400 - COLORBAR_WIDTH));
    }

    #[test]
    fn test_scale_bar_drawn_bottom_right() {
        let data = Array2::<f32>::zeros((100, 100));
        let bar = ScaleBar::new(1000.0, 250.0, "nm").unwrap();
        let figure = render((400, 400), |root| {
            Panel {
                title: "bar",
                data: data.view(),
                colormap: Colormap::Grayscale,
                bbox: None,
                scalebar: Some(&bar),
            }
            .draw(root)
        })
        .unwrap();

        // inside the black plotting area only the bar and its label are white
        let white: Vec<(u32, u32)> = figure
            .enumerate_pixels()
            .filter(|(x, y, p)| (70..290).contains(x) && (80..340).contains(y) && p.0 == [255, 255, 255])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!white.is_empty());
        let map_mid = (400 - COLORBAR_WIDTH) / 2;
        assert!(white.iter().all(|&(x, y)| x > map_mid && y > 200));
    }

    #[test]
    fn test_empty_map_only_titled() {
        let data = Array2::<f32>::zeros((0, 8));
        let figure = render((200, 100), |root| {
            Panel {
                title: "empty",
                data: data.view(),
                colormap: Colormap::Viridis,
                bbox: None,
                scalebar: None,
            }
            .draw(root)
        })
        .unwrap();
        assert_eq!(figure.dimensions(), (200, 100));
    }
}
