//! Returns of the episodes, written as a text file and a plot.
use anyhow::Result;
use image::{ImageBuffer, Rgb, RgbImage};
use log::{info, warn};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use steve_core::record::{Record, Recorder};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const MARGIN: u32 = 40;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);

/// Writes `returns.txt` and `returns.png` in a directory.
///
/// Each record must hold `steps` and `returns` arrays of the same length, the
/// cumulative steps and the return at the end of each episode. Every record
/// replaces the files: `returns.txt` lists `step\treturn` per line, and
/// `returns.png` plots the returns smoothed by a box filter against the steps.
pub struct ReturnsLogRecorder {
    dir: PathBuf,
    smoothing: usize,
}

impl ReturnsLogRecorder {
    /// Construct a [`ReturnsLogRecorder`] writing into `dir`.
    ///
    /// `smoothing` is the width of the box filter, typically the number of
    /// episodes between two records.
    pub fn new<P: AsRef<Path>>(dir: P, smoothing: usize) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            smoothing,
        }
    }

    /// Path of the text file.
    pub fn text_path(&self) -> PathBuf {
        self.dir.join("returns.txt")
    }

    /// Path of the plot.
    pub fn plot_path(&self) -> PathBuf {
        self.dir.join("returns.png")
    }

    fn write_text(&self, steps: &[f32], returns: &[f32]) -> Result<()> {
        let mut file = BufWriter::new(File::create(self.text_path())?);
        for (step, value) in steps.iter().zip(returns.iter()) {
            writeln!(file, "{}\t{}", step, value)?;
        }
        file.flush()?;
        Ok(())
    }

    fn write_plot(&self, steps: &[f32], returns: &[f32]) -> Result<()> {
        let smoothed = smooth(returns, self.smoothing);
        plot(steps, &smoothed).save(self.plot_path())?;
        Ok(())
    }

    fn try_write(&self, record: &Record) -> Result<()> {
        let steps = record.get_array1("steps")?;
        let returns = record.get_array1("returns")?;
        let n = steps.len().min(returns.len());
        self.write_text(&steps[..n], &returns[..n])?;
        self.write_plot(&steps[..n], &returns[..n])?;
        info!("Wrote returns of {} episodes to {:?}", n, self.dir);
        Ok(())
    }
}

impl Recorder for ReturnsLogRecorder {
    /// Writes the files, logging failures.
    fn write(&mut self, record: Record) {
        if let Err(e) = self.try_write(&record) {
            warn!("Failed to write returns: {}", e);
        }
    }
}

/// Moving average with a box of `width`, keeping the centered part of the
/// full convolution that is as long as the longer of both inputs.
pub fn smooth(values: &[f32], width: usize) -> Vec<f32> {
    if width <= 1 || values.is_empty() {
        return values.to_vec();
    }

    let n = values.len();
    let start = (n.min(width) - 1) / 2;
    (start..start + n.max(width))
        .map(|k| {
            let lo = (k + 1).saturating_sub(width);
            let hi = k.min(n - 1);
            let sum: f32 = if lo <= hi { values[lo..=hi].iter().sum() } else { 0.0 };
            sum / width as f32
        })
        .collect()
}

fn range(values: &[f32]) -> (f32, f32) {
    let min = values.iter().fold(f32::MAX, |m, v| v.min(m));
    let max = values.iter().fold(-f32::MAX, |m, v| v.max(m));
    if max > min {
        (min, max)
    } else {
        (min - 1.0, min + 1.0)
    }
}

fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
    let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);
    loop {
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Plots `ys` against `xs`.
fn plot(xs: &[f32], ys: &[f32]) -> RgbImage {
    let mut img = ImageBuffer::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let (left, right) = (MARGIN as i64, (WIDTH - MARGIN) as i64);
    let (top, bottom) = (MARGIN as i64, (HEIGHT - MARGIN) as i64);
    draw_line(&mut img, (left, bottom), (right, bottom), AXIS);
    draw_line(&mut img, (left, bottom), (left, top), AXIS);

    let n = xs.len().min(ys.len());
    if n == 0 {
        return img;
    }
    let (x_min, x_max) = range(&xs[..n]);
    let (y_min, y_max) = range(&ys[..n]);
    let to_pixel = |x: f32, y: f32| {
        let px = left as f32 + (x - x_min) / (x_max - x_min) * (right - left) as f32;
        let py = bottom as f32 - (y - y_min) / (y_max - y_min) * (bottom - top) as f32;
        (px.round() as i64, py.round() as i64)
    };

    let mut prev = to_pixel(xs[0], ys[0]);
    for i in 1..n {
        let p = to_pixel(xs[i], ys[i]);
        draw_line(&mut img, prev, p, LINE);
        prev = p;
    }
    img
}
