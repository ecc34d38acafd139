//! Histogram tile grids and coordinate meshes.
//!
//! A histogram colorbar is drawn as a grid of unit tiles. Each bin owns one
//! row of tiles along the count axis; the bin's bar occupies as many tiles as
//! the bin has samples. In composite mode a flat color strip of
//! `strip_width` tiles precedes the histogram:
//!
//! ```text
//!  count axis ->   0 .. strip_width | strip_width .. strip_width + hist_width
//!  bin 2           [strip tiles    ] [###      ]
//!  bin 1           [strip tiles    ] [######## ]
//!  bin 0           [strip tiles    ] [####     ]
//! ```
//!
//! The grid is always indexed `(bin, column)`; orientation only changes how
//! the [`CoordinateMesh`] maps those indices onto x and y.

use crate::binning::HistogramCounts;
use crate::error::{Error, Result};
use crate::scale::{LimitsOverride, Norm};
use std::ops::Range;
use tracing::trace;

/// Direction of the colorbar's long (value) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Values run bottom to top; counts run left to right.
    #[default]
    Vertical,
    /// Values run left to right; counts run bottom to top.
    Horizontal,
}

/// Which ends of the colorbar show out-of-range extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extend {
    /// No extensions.
    #[default]
    Neither,
    /// Lower extension only.
    Min,
    /// Upper extension only.
    Max,
    /// Both extensions.
    Both,
}

impl Extend {
    /// Whether the lower extension is drawn.
    #[must_use]
    pub const fn lower(self) -> bool {
        matches!(self, Self::Min | Self::Both)
    }

    /// Whether the upper extension is drawn.
    #[must_use]
    pub const fn upper(self) -> bool {
        matches!(self, Self::Max | Self::Both)
    }

    /// Index range of `len` colorbar values that excludes extension entries.
    #[must_use]
    pub fn inside(self, len: usize) -> Range<usize> {
        let start = usize::from(self.lower()).min(len);
        let end = len.saturating_sub(usize::from(self.upper())).max(start);
        start..end
    }
}

/// Upper bound on the tiles along the count axis of a composite layout.
pub const MAX_COMPOSITE_WIDTH: usize = 1 << 20;

/// Validate a composite-mode histogram fraction.
///
/// # Errors
///
/// Returns [`Error::InvalidFraction`] unless `0 < fraction <= 1`.
pub fn validate_fraction(fraction: f32) -> Result<f32> {
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        Ok(fraction)
    } else {
        Err(Error::InvalidFraction(fraction))
    }
}

/// Widths (in tiles) of the strip and histogram regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    hist_width: usize,
    strip_width: usize,
}

impl StripLayout {
    /// Histogram-only layout: no strip.
    #[must_use]
    pub fn histogram_only(counts: &HistogramCounts) -> Self {
        Self { hist_width: counts.max_count().max(1), strip_width: 0 }
    }

    /// Composite layout where the histogram takes `hist_fraction` of the width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFraction`] unless `0 < hist_fraction <= 1`.
    pub fn composite(counts: &HistogramCounts, hist_fraction: f32) -> Result<Self> {
        Self::from_max_count(counts.max_count(), Some(hist_fraction))
    }

    /// Layout from the tallest bar and an optional composite fraction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFraction`] for a fraction outside `(0, 1]`,
    /// or one so small that the composite width exceeds
    /// [`MAX_COMPOSITE_WIDTH`].
    pub fn from_max_count(max_count: usize, hist_fraction: Option<f32>) -> Result<Self> {
        let hist_width = max_count.max(1);
        let strip_width = match hist_fraction {
            None => 0,
            Some(fraction) => {
                let total = (hist_width as f64 / f64::from(validate_fraction(fraction)?)).ceil();
                if total > MAX_COMPOSITE_WIDTH as f64 {
                    return Err(Error::InvalidFraction(fraction));
                }
                (total as usize).saturating_sub(hist_width)
            }
        };
        Ok(Self { hist_width, strip_width })
    }

    /// Tiles occupied by the longest bar (at least 1).
    #[must_use]
    pub const fn hist_width(&self) -> usize {
        self.hist_width
    }

    /// Tiles reserved for the flat strip.
    #[must_use]
    pub const fn strip_width(&self) -> usize {
        self.strip_width
    }

    /// Total tiles along the count axis.
    #[must_use]
    pub const fn total_width(&self) -> usize {
        self.hist_width + self.strip_width
    }

    /// Columns holding the strip.
    #[must_use]
    pub const fn strip_columns(&self) -> Range<usize> {
        0..self.strip_width
    }

    /// Columns holding the histogram.
    #[must_use]
    pub const fn hist_columns(&self) -> Range<usize> {
        self.strip_width..self.strip_width + self.hist_width
    }
}

/// Region of the grid a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Flat color strip.
    Strip,
    /// Histogram bars.
    Histogram,
}

/// One cell of a [`TileGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Value fed to the colormap; `None` renders with the bad color.
    pub value: Option<f32>,
    /// Whether the tile is drawn.
    pub visible: bool,
    /// Region the tile lies in.
    pub region: Region,
}

/// Value grid plus visibility mask, `bins` rows by `total_width` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    bins: usize,
    layout: StripLayout,
    values: Vec<Option<f32>>,
    visible: Vec<bool>,
}

impl TileGrid {
    /// Number of bins (rows).
    #[must_use]
    pub const fn bins(&self) -> usize {
        self.bins
    }

    /// Number of columns along the count axis.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.layout.total_width()
    }

    /// Strip/histogram widths.
    #[must_use]
    pub const fn layout(&self) -> StripLayout {
        self.layout
    }

    /// Region of a column.
    #[must_use]
    pub fn region(&self, column: usize) -> Region {
        if column < self.layout.strip_width {
            Region::Strip
        } else {
            Region::Histogram
        }
    }

    /// Tile at `(bin, column)`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, bin: usize, column: usize) -> Option<Tile> {
        if bin >= self.bins || column >= self.width() {
            return None;
        }
        let idx = bin * self.width() + column;
        Some(Tile { value: self.values[idx], visible: self.visible[idx], region: self.region(column) })
    }

    /// Whether `(bin, column)` is drawn (false when out of range).
    #[must_use]
    pub fn is_visible(&self, bin: usize, column: usize) -> bool {
        self.get(bin, column).is_some_and(|tile| tile.visible)
    }

    /// Row-major tile values.
    #[must_use]
    pub fn values(&self) -> &[Option<f32>] {
        &self.values
    }

    /// Row-major visibility mask.
    #[must_use]
    pub fn mask(&self) -> &[bool] {
        &self.visible
    }

    /// Number of visible tiles.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }

    /// Transparency encoding of the mask: 0.0 on hidden tiles, `alpha`
    /// (default 1.0) elsewhere. Values are left untouched.
    #[must_use]
    pub fn alpha_grid(&self, alpha: Option<f32>) -> Vec<f32> {
        let alpha = alpha.unwrap_or(1.0);
        self.visible.iter().map(|&v| if v { alpha } else { 0.0 }).collect()
    }
}

/// Build the tile grid for per-bin `counts` and colorbar `values`.
///
/// `values` must already exclude extension entries and match `counts` in
/// length. With `sentinel` set, histogram tiles hold `None` so the renderer
/// uses the colormap's bad color; strip tiles always hold real values.
///
/// # Errors
///
/// Returns [`Error::Rendering`] if `values` and `counts` differ in length.
pub fn build_tile_grid(
    counts: &[usize],
    values: &[f32],
    layout: StripLayout,
    sentinel: bool,
) -> Result<TileGrid> {
    if counts.len() != values.len() {
        return Err(Error::Rendering(format!(
            "{} colorbar values for {} histogram bins",
            values.len(),
            counts.len()
        )));
    }

    let bins = counts.len();
    let width = layout.total_width();
    let mut grid_values = Vec::with_capacity(bins * width);
    let mut visible = Vec::with_capacity(bins * width);

    for (&count, &value) in counts.iter().zip(values) {
        for _ in layout.strip_columns() {
            grid_values.push(Some(value));
            visible.push(true);
        }
        let hist_value = if sentinel { None } else { Some(value) };
        for row in 0..layout.hist_width {
            grid_values.push(hist_value);
            visible.push(row < count);
        }
    }

    trace!(bins, width, strip = layout.strip_width, "built tile grid");
    Ok(TileGrid { bins, layout, values: grid_values, visible })
}

/// Tile boundaries in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMesh {
    orientation: Orientation,
    long: Vec<f32>,
    short: Vec<f32>,
}

impl CoordinateMesh {
    /// Mesh from value-axis boundaries and the count-axis width.
    #[must_use]
    pub fn new(long: Vec<f32>, total_width: usize, orientation: Orientation) -> Self {
        let short = (0..=total_width).map(|i| i as f32).collect();
        Self { orientation, long, short }
    }

    /// Orientation the mesh was built for.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Boundaries along the value axis.
    #[must_use]
    pub fn long_edges(&self) -> &[f32] {
        &self.long
    }

    /// Boundaries along the count axis (`0..=total_width`).
    #[must_use]
    pub fn short_edges(&self) -> &[f32] {
        &self.short
    }

    /// Boundaries along x.
    #[must_use]
    pub fn x_edges(&self) -> &[f32] {
        match self.orientation {
            Orientation::Vertical => &self.short,
            Orientation::Horizontal => &self.long,
        }
    }

    /// Boundaries along y.
    #[must_use]
    pub fn y_edges(&self) -> &[f32] {
        match self.orientation {
            Orientation::Vertical => &self.long,
            Orientation::Horizontal => &self.short,
        }
    }

    /// Full coordinate arrays `(X, Y)`, each `long.len()` by `short.len()`.
    #[must_use]
    pub fn meshgrid(&self) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
        let counts: Vec<Vec<f32>> = self.long.iter().map(|_| self.short.clone()).collect();
        let values: Vec<Vec<f32>> =
            self.long.iter().map(|&y| vec![y; self.short.len()]).collect();
        match self.orientation {
            Orientation::Vertical => (counts, values),
            Orientation::Horizontal => (values, counts),
        }
    }

    /// Data-space bounds `(x0, x1, y0, y1)` of tile `(bin, column)`.
    #[must_use]
    pub fn cell_bounds(&self, bin: usize, column: usize) -> Option<(f32, f32, f32, f32)> {
        let (v0, v1) = (*self.long.get(bin)?, *self.long.get(bin + 1)?);
        let (c0, c1) = (*self.short.get(column)?, *self.short.get(column + 1)?);
        Some(match self.orientation {
            Orientation::Vertical => (c0, c1, v0, v1),
            Orientation::Horizontal => (v0, v1, c0, c1),
        })
    }
}

/// Map proportional positions along the value axis to data coordinates.
///
/// Invertible norms are inverted with their limits temporarily set to
/// `(vmin, vmax)`; listeners see no change and the limits are restored even
/// when the inversion fails. Other norms interpolate linearly.
///
/// # Errors
///
/// Propagates inversion failures from the norm.
pub fn value_coordinates(proportional: &[f32], norm: &mut Norm, vmin: f32, vmax: f32) -> Result<Vec<f32>> {
    if !norm.is_invertible() {
        return Ok(proportional.iter().map(|&y| y * (vmax - vmin) + vmin).collect());
    }

    let guard = LimitsOverride::new(norm, vmin, vmax);
    proportional.iter().map(|&y| guard.inverse(y)).collect()
}

/// Build the coordinate mesh for `total_width` count tiles.
///
/// # Errors
///
/// Propagates inversion failures from the norm.
pub fn build_coordinate_mesh(
    proportional: &[f32],
    norm: &mut Norm,
    (vmin, vmax): (f32, f32),
    total_width: usize,
    orientation: Orientation,
) -> Result<CoordinateMesh> {
    let long = value_coordinates(proportional, norm, vmin, vmax)?;
    Ok(CoordinateMesh::new(long, total_width, orientation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::{histogram, Bins};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_histogram_only_layout() {
        let hist = histogram(&[0.0, 1.0, 1.0, 1.0, 2.0], &Bins::Count(3)).unwrap();
        let layout = StripLayout::histogram_only(&hist);
        assert_eq!(layout.hist_width(), 3);
        assert_eq!(layout.strip_width(), 0);
        assert_eq!(layout.total_width(), 3);
    }

    #[test]
    fn test_composite_half_fraction() {
        let layout = StripLayout::from_max_count(10, Some(0.5)).unwrap();
        assert_eq!(layout.strip_width(), 10);
        assert_eq!(layout.total_width(), 20);
    }

    #[test]
    fn test_composite_rounds_up() {
        // ceil(7 / 0.4) = 18
        let layout = StripLayout::from_max_count(7, Some(0.4)).unwrap();
        assert_eq!(layout.strip_width(), 11);
    }

    #[test]
    fn test_composite_full_fraction_has_no_strip() {
        let layout = StripLayout::from_max_count(5, Some(1.0)).unwrap();
        assert_eq!(layout.strip_width(), 0);
    }

    #[test]
    fn test_composite_width_is_bounded() {
        assert!(matches!(StripLayout::from_max_count(1, Some(1e-12)), Err(Error::InvalidFraction(_))));
        assert!(matches!(StripLayout::from_max_count(MAX_COMPOSITE_WIDTH, Some(0.5)), Err(Error::InvalidFraction(_))));

        let edge = StripLayout::from_max_count(MAX_COMPOSITE_WIDTH / 2, Some(0.5)).unwrap();
        assert_eq!(edge.total_width(), MAX_COMPOSITE_WIDTH);
    }

    #[test]
    fn test_zero_counts_width_one() {
        let layout = StripLayout::from_max_count(0, None).unwrap();
        assert_eq!(layout.hist_width(), 1);
    }

    #[test]
    fn test_invalid_fraction() {
        for bad in [0.0, -0.5, 1.5, f32::NAN, f32::INFINITY] {
            assert!(StripLayout::from_max_count(4, Some(bad)).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_tile_grid_mask() {
        let layout = StripLayout::from_max_count(3, None).unwrap();
        let grid = build_tile_grid(&[1, 3, 0], &[0.5, 1.5, 2.5], layout, false).unwrap();
        assert_eq!(grid.bins(), 3);
        assert_eq!(grid.width(), 3);
        assert_eq!(
            grid.mask(),
            &[true, false, false, true, true, true, false, false, false]
        );
        assert_eq!(grid.get(1, 2).unwrap().value, Some(1.5));
        assert!(grid.get(3, 0).is_none());
        assert_eq!(grid.visible_count(), 4);
    }

    #[test]
    fn test_tile_grid_strip_first() {
        let layout = StripLayout::from_max_count(2, Some(0.5)).unwrap();
        let grid = build_tile_grid(&[2, 0], &[1.0, 2.0], layout, true).unwrap();
        assert_eq!(grid.width(), 4);
        // Strip: always visible, real values.
        for bin in 0..2 {
            for col in 0..2 {
                let tile = grid.get(bin, col).unwrap();
                assert_eq!(tile.region, Region::Strip);
                assert!(tile.visible);
                assert!(tile.value.is_some());
            }
        }
        // Histogram: sentinel values.
        let tile = grid.get(0, 2).unwrap();
        assert_eq!(tile.region, Region::Histogram);
        assert_eq!(tile.value, None);
        assert!(grid.is_visible(0, 3));
        assert!(!grid.is_visible(1, 2));
    }

    #[test]
    fn test_tile_grid_length_mismatch() {
        let layout = StripLayout::from_max_count(1, None).unwrap();
        assert!(build_tile_grid(&[1, 1], &[0.0], layout, false).is_err());
    }

    #[test]
    fn test_alpha_grid() {
        let layout = StripLayout::from_max_count(2, None).unwrap();
        let grid = build_tile_grid(&[1, 2], &[0.0, 1.0], layout, false).unwrap();
        assert_eq!(grid.alpha_grid(Some(0.5)), vec![0.5, 0.0, 0.5, 0.5]);
        assert_eq!(grid.alpha_grid(None), vec![1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_extend_inside() {
        assert_eq!(Extend::Neither.inside(5), 0..5);
        assert_eq!(Extend::Min.inside(5), 1..5);
        assert_eq!(Extend::Max.inside(5), 0..4);
        assert_eq!(Extend::Both.inside(5), 1..4);
        assert_eq!(Extend::Both.inside(1), 1..1);
    }

    #[test]
    fn test_mesh_vertical_and_horizontal() {
        let vertical = CoordinateMesh::new(vec![0.0, 1.0, 2.0], 3, Orientation::Vertical);
        assert_eq!(vertical.x_edges(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(vertical.y_edges(), &[0.0, 1.0, 2.0]);
        assert_eq!(vertical.cell_bounds(1, 2), Some((2.0, 3.0, 1.0, 2.0)));

        let horizontal = CoordinateMesh::new(vec![0.0, 1.0, 2.0], 3, Orientation::Horizontal);
        assert_eq!(horizontal.x_edges(), &[0.0, 1.0, 2.0]);
        assert_eq!(horizontal.y_edges(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(horizontal.cell_bounds(1, 2), Some((1.0, 2.0, 2.0, 3.0)));
        assert_eq!(horizontal.cell_bounds(2, 0), None);
    }

    #[test]
    fn test_meshgrid_swaps_for_horizontal() {
        let mesh = CoordinateMesh::new(vec![5.0, 6.0], 2, Orientation::Vertical);
        let (x, y) = mesh.meshgrid();
        assert_eq!(x, vec![vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]]);
        assert_eq!(y, vec![vec![5.0, 5.0, 5.0], vec![6.0, 6.0, 6.0]]);

        let mesh = CoordinateMesh::new(vec![5.0, 6.0], 2, Orientation::Horizontal);
        let (x, y) = mesh.meshgrid();
        assert_eq!(x, vec![vec![5.0, 5.0, 5.0], vec![6.0, 6.0, 6.0]]);
        assert_eq!(y, vec![vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]]);
    }

    #[test]
    fn test_value_coordinates_linear_restores_norm() {
        let hits = Rc::new(Cell::new(0));
        let mut norm = Norm::linear().with_limits(-100.0, 100.0);
        let counter = Rc::clone(&hits);
        norm.connect(move |_| counter.set(counter.get() + 1));

        let coords = value_coordinates(&[0.0, 0.5, 1.0], &mut norm, 0.0, 10.0).unwrap();
        assert_eq!(coords, vec![0.0, 5.0, 10.0]);
        assert_eq!(norm.limits(), Some((-100.0, 100.0)));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_value_coordinates_log() {
        let mut norm = Norm::log().with_limits(1.0, 10.0);
        let coords = value_coordinates(&[0.0, 0.5, 1.0], &mut norm, 1.0, 100.0).unwrap();
        assert!((coords[1] - 10.0).abs() < 1e-3);
        assert!((coords[2] - 100.0).abs() < 1e-2);
        assert_eq!(norm.limits(), Some((1.0, 10.0)));
    }

    #[test]
    fn test_value_coordinates_error_restores_norm() {
        let mut norm = Norm::log().with_limits(1.0, 10.0);
        let result = value_coordinates(&[0.0, 1.0], &mut norm, -5.0, 10.0);
        assert!(matches!(result, Err(Error::ScaleDomain(_))));
        assert_eq!(norm.limits(), Some((1.0, 10.0)));
        assert!(!norm.callbacks().is_blocked());
    }

    #[test]
    fn test_value_coordinates_boundary_norm_linear() {
        let mut norm = Norm::boundary(vec![0.0, 1.0, 5.0]).unwrap();
        let coords = value_coordinates(&[0.0, 0.5, 1.0], &mut norm, 0.0, 5.0).unwrap();
        assert_eq!(coords, vec![0.0, 2.5, 5.0]);
    }

    #[test]
    fn test_build_coordinate_mesh() {
        let mut norm = Norm::linear().with_limits(0.0, 1.0);
        let mesh = build_coordinate_mesh(
            &[0.0, 0.5, 1.0],
            &mut norm,
            (2.0, 4.0),
            4,
            Orientation::Horizontal,
        )
        .unwrap();
        assert_eq!(mesh.long_edges(), &[2.0, 3.0, 4.0]);
        assert_eq!(mesh.short_edges().len(), 5);
        assert_eq!(mesh.orientation(), Orientation::Horizontal);
    }
}

// ============================================================================
// Property-based tests with proptest
// ============================================================================
