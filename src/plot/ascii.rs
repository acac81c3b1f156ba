//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output (helpful for golden tests).
//!
//! Plot elements:
//! - treated consumption by day: `o` points joined by a `-` line
//! - replaced outliers: `X` at the original value, `*` at the replacement

use crate::clean::Replacement;
use crate::domain::DayRecord;

/// Render treated consumption by day, marking replaced outliers.
pub fn render_consumption_plot(
    records: &[DayRecord],
    replacements: &[Replacement],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (d_min, d_max) = day_range(records).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = value_range(records, replacements).unwrap_or((0.0, 1.0));
    let xs = Scale::new(d_min, d_max, width);
    let ys = Scale::new(y_min, y_max, height).padded(0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Line first so the markers overlay it.
    let line: Vec<(usize, usize)> = records
        .iter()
        .map(|r| (xs.cell(f64::from(r.day)), ys.row(r.consumption)))
        .collect();
    draw_polyline(&mut grid, &line);
    for &(x, y) in &line {
        grid[y][x] = 'o';
    }

    for rep in replacements.iter().filter(|r| !r.fallback) {
        let x = xs.cell(f64::from(rep.day));
        grid[ys.row(rep.after)][x] = '*';
        grid[ys.row(rep.before)][x] = 'X';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: day=[{d_min:.0}, {d_max:.0}] | consumption=[{:.2}, {:.2}] kWh\n",
        ys.lo, ys.hi
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day_range(records: &[DayRecord]) -> Option<(f64, f64)> {
    let first = f64::from(records.first()?.day);
    let last = f64::from(records.last()?.day);
    if last > first {
        Some((first, last))
    } else {
        Some((first - 1.0, first + 1.0))
    }
}

fn value_range(records: &[DayRecord], replacements: &[Replacement]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let values = records
        .iter()
        .map(|r| r.consumption)
        .chain(replacements.iter().map(|r| r.before));
    for v in values.filter(|v| v.is_finite()) {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        None
    } else if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 1.0, max_y + 1.0))
    }
}

/// Linear mapping from a value range onto `cells` grid positions.
#[derive(Debug, Clone, Copy)]
struct Scale {
    lo: f64,
    hi: f64,
    cells: usize,
}

impl Scale {
    fn new(lo: f64, hi: f64, cells: usize) -> Self {
        Self {
            lo,
            hi,
            cells: cells.max(2),
        }
    }

    /// Widen both ends by `frac` of the span.
    fn padded(self, frac: f64) -> Self {
        let pad = ((self.hi - self.lo).abs() * frac).max(1e-12);
        Self {
            lo: self.lo - pad,
            hi: self.hi + pad,
            ..self
        }
    }

    /// Grid position of `v`, `0` at `lo`.
    fn cell(&self, v: f64) -> usize {
        let u = ((v - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        (u * (self.cells - 1) as f64).round() as usize
    }

    /// Grid row of `v`; rows count down from the top, so `hi` is row 0.
    fn row(&self, v: f64) -> usize {
        self.cells - 1 - self.cell(v)
    }
}

/// Join consecutive points column by column; only blank cells are filled.
///
/// Points come in day order, so x never decreases.
fn draw_polyline(grid: &mut [Vec<char>], points: &[(usize, usize)]) {
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let steps = x1.saturating_sub(x0).max(1);
        for step in 0..=steps {
            let x = (x0 + step).min(x1.max(x0));
            let t = step as f64 / steps as f64;
            let y = (y0 as f64 + t * (y1 as f64 - y0 as f64)).round() as usize;
            if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)).filter(|c| **c == ' ') {
                *cell = '-';
            }
        }
    }
}
