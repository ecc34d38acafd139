//! Colorbar widget.
//!
//! A [`Colorbar`] owns the value processing, axis limits, ticks and drawing
//! of a colorbar. How the colored area is tiled is delegated to a
//! [`MeshProvider`]: [`FlatMesh`] draws the classic one-tile-wide gradient,
//! [`HistogramMesh`](crate::histcolorbar::HistogramMesh) draws a histogram.
//!
//! # Draw cycle
//!
//! [`Colorbar::draw_all`] recomputes everything from the mappable's current
//! norm and colormap:
//!
//! 1. boundaries: provider boundaries (or evenly spaced norm values) plus one
//!    extension boundary per drawn extension;
//! 2. proportional positions of the inside boundaries;
//! 3. coordinate mesh from the provider;
//! 4. ticks;
//! 5. tile grid and tile colors when filled;
//! 6. axes limits: short axis `[0, total_width]`, long axis `[vmin, vmax]`.
//!
//! The result replaces the previous draw only when every step succeeds.

mod options;
mod render;
mod ticks;

pub use options::{ColorbarOptions, Spacing, TickFormat, TickLocation};
pub use ticks::{format_tick, linear_ticks, log_ticks, nice_step, Tick, MAX_TICKS};

use crate::color::Rgba;
use crate::colormap::Colormap;
use crate::error::{Error, Result};
use crate::figure::Axes;
use crate::mappable::ColorMappable;
use crate::mesh::{
    build_coordinate_mesh, build_tile_grid, value_coordinates, CoordinateMesh, Extend,
    Orientation, StripLayout, TileGrid,
};
use crate::scale::{Norm, NormKind};
use std::ops::Range;
use tracing::{debug, trace};

/// Long-axis length of each extension triangle, as a fraction of the interior.
pub const EXTEND_FRACTION: f32 = 0.05;

/// Gradient segments used when the provider has no boundaries of its own.
pub const DEFAULT_SEGMENTS: usize = 256;

/// Per-draw inputs handed to a [`MeshProvider`].
#[derive(Debug, Clone, Copy)]
pub struct MeshRequest<'a> {
    /// Colorbar orientation.
    pub orientation: Orientation,
    /// Drawn extensions.
    pub extend: Extend,
    /// Colorbar values, extension entries included.
    pub values: &'a [f32],
    /// Proportional positions of the inside boundaries.
    pub proportional: &'a [f32],
    /// Lowest inside boundary.
    pub vmin: f32,
    /// Highest inside boundary.
    pub vmax: f32,
}

impl MeshRequest<'_> {
    /// Values with extension entries removed.
    #[must_use]
    pub fn inside_values(&self) -> &[f32] {
        &self.values[self.extend.inside(self.values.len())]
    }
}

/// Computes the tile grid and coordinate mesh for a colorbar.
pub trait MeshProvider {
    /// Inside boundaries to draw over, or `None` to derive them from the norm.
    fn boundaries(&self) -> Option<&[f32]>;

    /// Gradient segments used when [`MeshProvider::boundaries`] is `None`.
    fn segments(&self) -> usize {
        DEFAULT_SEGMENTS
    }

    /// Tiles along the count axis.
    fn total_width(&self) -> usize;

    /// Coordinate mesh for the request.
    ///
    /// # Errors
    ///
    /// Propagates norm inversion failures.
    fn mesh(&self, request: &MeshRequest<'_>, norm: &mut Norm) -> Result<CoordinateMesh> {
        build_coordinate_mesh(
            request.proportional,
            norm,
            (request.vmin, request.vmax),
            self.total_width(),
            request.orientation,
        )
    }

    /// Tile grid for the inside values.
    ///
    /// # Errors
    ///
    /// Returns an error if the request does not fit the provider.
    fn tiles(&self, request: &MeshRequest<'_>) -> Result<TileGrid>;

    /// Widget-local colormap derived from the mappable's.
    fn colormap(&self, base: &Colormap, _alpha: Option<f32>) -> Colormap {
        base.clone()
    }
}

/// Plain gradient: one tile wide, every tile visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatMesh {
    segments: usize,
}

impl FlatMesh {
    /// Gradient with `segments` color steps.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero.
    pub fn new(segments: usize) -> Result<Self> {
        if segments == 0 {
            return Err(Error::InvalidOption("a colorbar needs at least one segment".to_string()));
        }
        Ok(Self { segments })
    }
}

impl Default for FlatMesh {
    fn default() -> Self {
        Self { segments: DEFAULT_SEGMENTS }
    }
}

impl MeshProvider for FlatMesh {
    fn boundaries(&self) -> Option<&[f32]> {
        None
    }

    fn segments(&self) -> usize {
        self.segments
    }

    fn total_width(&self) -> usize {
        1
    }

    fn tiles(&self, request: &MeshRequest<'_>) -> Result<TileGrid> {
        let values = request.inside_values();
        build_tile_grid(&vec![1; values.len()], values, StripLayout::from_max_count(1, None)?, false)
    }
}

/// Everything computed by one draw cycle.
#[derive(Debug, Clone, PartialEq)]
struct DrawState {
    boundaries: Vec<f32>,
    values: Vec<f32>,
    inside: Range<usize>,
    limits: (f32, f32),
    proportional: Vec<f32>,
    mesh: CoordinateMesh,
    grid: Option<TileGrid>,
    colors: Vec<Option<Rgba>>,
    extension_colors: (Option<Rgba>, Option<Rgba>),
    ticks: Vec<Tick>,
    long_inverted: bool,
    cmap: Colormap,
}

/// A colorbar drawn through a [`MeshProvider`].
#[derive(Debug, Clone)]
pub struct Colorbar<P: MeshProvider> {
    provider: P,
    options: ColorbarOptions,
    alpha: Option<f32>,
    state: DrawState,
}

/// Check a widget alpha.
///
/// # Errors
///
/// Returns [`Error::InvalidAlpha`] unless the alpha lies in `[0, 1]`.
pub fn validate_alpha(alpha: Option<f32>) -> Result<()> {
    match alpha {
        Some(a) if !(0.0..=1.0).contains(&a) => Err(Error::InvalidAlpha(a)),
        _ => Ok(()),
    }
}

impl<P: MeshProvider> Colorbar<P> {
    /// Create a colorbar in `axes` describing `mappable` and draw it.
    ///
    /// # Errors
    ///
    /// Returns an error for inconsistent options, an alpha outside `[0, 1]`,
    /// or a failed draw.
    pub fn new<M: ColorMappable + ?Sized>(
        provider: P,
        axes: &mut Axes,
        mappable: &mut M,
        options: ColorbarOptions,
        alpha: Option<f32>,
    ) -> Result<Self> {
        options.validate()?;
        validate_alpha(alpha)?;
        let state = compute(&provider, &options, alpha, axes, mappable)?;
        Ok(Self { provider, options, alpha, state })
    }

    /// Recompute the colorbar from the mappable's current norm and colormap.
    ///
    /// On error the previous draw is kept and `axes` is untouched.
    ///
    /// # Errors
    ///
    /// Propagates value-processing and norm failures.
    pub fn draw_all<M: ColorMappable + ?Sized>(&mut self, axes: &mut Axes, mappable: &mut M) -> Result<()> {
        self.state = compute(&self.provider, &self.options, self.alpha, axes, mappable)?;
        Ok(())
    }

    /// The mesh provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Options the colorbar was built with.
    #[must_use]
    pub fn options(&self) -> &ColorbarOptions {
        &self.options
    }

    /// Widget alpha.
    #[must_use]
    pub const fn alpha(&self) -> Option<f32> {
        self.alpha
    }

    /// Orientation of the long axis.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.options.resolved_orientation()
    }

    /// Change the axis label; takes effect on the next render.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.options.label = label.into();
    }

    /// Widget-local colormap of the last draw.
    #[must_use]
    pub fn colormap(&self) -> &Colormap {
        &self.state.cmap
    }

    /// Boundaries, extension boundaries included.
    #[must_use]
    pub fn boundaries(&self) -> &[f32] {
        &self.state.boundaries
    }

    /// Colorbar values, extension values included.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.state.values
    }

    /// Index range of [`Colorbar::values`] that excludes extensions.
    #[must_use]
    pub fn inside(&self) -> Range<usize> {
        self.state.inside.clone()
    }

    /// Value range of the inside boundaries.
    #[must_use]
    pub const fn limits(&self) -> (f32, f32) {
        self.state.limits
    }

    /// Proportional positions of the inside boundaries.
    #[must_use]
    pub fn proportional(&self) -> &[f32] {
        &self.state.proportional
    }

    /// Coordinate mesh of the last draw.
    #[must_use]
    pub fn mesh(&self) -> &CoordinateMesh {
        &self.state.mesh
    }

    /// Tile grid of the last draw (`None` when not filled).
    #[must_use]
    pub fn tile_grid(&self) -> Option<&TileGrid> {
        self.state.grid.as_ref()
    }

    /// Row-major tile colors; `None` for hidden tiles.
    #[must_use]
    pub fn tile_colors(&self) -> &[Option<Rgba>] {
        &self.state.colors
    }

    /// Colors of the lower and upper extensions, when drawn.
    #[must_use]
    pub const fn extension_colors(&self) -> (Option<Rgba>, Option<Rgba>) {
        self.state.extension_colors
    }

    /// Ticks of the last draw.
    #[must_use]
    pub fn ticks(&self) -> &[Tick] {
        &self.state.ticks
    }

    /// Whether the long axis was inverted at the last draw.
    #[must_use]
    pub const fn long_inverted(&self) -> bool {
        self.state.long_inverted
    }
}

fn compute<P, M>(
    provider: &P,
    options: &ColorbarOptions,
    alpha: Option<f32>,
    axes: &mut Axes,
    mappable: &mut M,
) -> Result<DrawState>
where
    P: MeshProvider,
    M: ColorMappable + ?Sized,
{
    ensure_scaled(mappable);
    let cmap = provider.colormap(mappable.colormap(), alpha);
    let orientation = options.resolved_orientation();
    let extend = options.extend;
    let log = matches!(mappable.norm().kind(), NormKind::Log);

    let inner = match provider.boundaries() {
        Some(boundaries) => boundaries.to_vec(),
        None => derived_boundaries(mappable.norm_mut(), provider.segments())?,
    };
    if inner.len() < 2 {
        return Err(Error::Rendering("colorbar needs at least two boundaries".to_string()));
    }

    let (boundaries, values) = with_extensions(&inner, extend, log);
    let inside = extend.inside(values.len());
    let limits = (inner[0], inner[inner.len() - 1]);
    let proportional = proportional_positions(&inner, mappable.norm(), options.spacing)?;

    let request = MeshRequest {
        orientation,
        extend,
        values: &values,
        proportional: &proportional,
        vmin: limits.0,
        vmax: limits.1,
    };
    let mesh = provider.mesh(&request, mappable.norm_mut())?;
    let ticks = locate_ticks(options, mappable.norm(), &inner, &proportional, limits)?;

    let (grid, colors) = if options.filled {
        let grid = provider.tiles(&request)?;
        let colors = tile_colors(&grid, &cmap, mappable.norm(), alpha)?;
        (Some(grid), colors)
    } else {
        (None, Vec::new())
    };

    let extension_colors = (
        extend.lower().then(|| apply_alpha(cmap.under(), alpha)),
        extend.upper().then(|| apply_alpha(cmap.over(), alpha)),
    );

    let total_width = provider.total_width() as f32;
    let long_inverted = match orientation {
        Orientation::Vertical => axes.y_inverted(),
        Orientation::Horizontal => axes.x_inverted(),
    };
    let (lower, upper) = if long_inverted { (limits.1, limits.0) } else { limits };
    match orientation {
        Orientation::Vertical => {
            axes.set_xlim(0.0, total_width);
            axes.set_ylim(lower, upper);
        }
        Orientation::Horizontal => {
            axes.set_ylim(0.0, total_width);
            axes.set_xlim(lower, upper);
        }
    }

    debug!(
        bins = inner.len() - 1,
        vmin = limits.0,
        vmax = limits.1,
        total_width,
        filled = options.filled,
        "colorbar drawn"
    );

    Ok(DrawState {
        boundaries,
        values,
        inside,
        limits,
        proportional,
        mesh,
        grid,
        colors,
        extension_colors,
        ticks,
        long_inverted,
        cmap,
    })
}

/// Give an unscaled norm limits: the data extent, else a unit range.
fn ensure_scaled<M: ColorMappable + ?Sized>(mappable: &mut M) {
    if mappable.norm().is_scaled() {
        return;
    }
    let data = mappable.array().to_vec();
    let norm = mappable.norm_mut();
    norm.autoscale_none(&data);
    if !norm.is_scaled() {
        let (lo, hi) = if matches!(norm.kind(), NormKind::Log) { (1.0, 10.0) } else { (0.0, 1.0) };
        trace!(lo, hi, "no finite data, using default colorbar limits");
        norm.set_limits(lo, hi);
    }
}

/// Expand a degenerate or reversed range.
fn nonsingular(vmin: f32, vmax: f32) -> (f32, f32) {
    if !vmin.is_finite() || !vmax.is_finite() {
        return (0.0, 1.0);
    }
    let (lo, hi) = if vmin <= vmax { (vmin, vmax) } else { (vmax, vmin) };
    if hi - lo > f32::EPSILON * lo.abs().max(hi.abs()) {
        return (lo, hi);
    }
    if lo == 0.0 {
        (-0.1, 0.1)
    } else {
        (lo - 0.1 * lo.abs(), hi + 0.1 * hi.abs())
    }
}

fn derived_boundaries(norm: &mut Norm, segments: usize) -> Result<Vec<f32>> {
    if let NormKind::Boundary { boundaries } = norm.kind() {
        return Ok(boundaries.clone());
    }
    let (vmin, vmax) = norm.limits().unwrap_or((0.0, 1.0));
    let (lo, hi) = nonsingular(vmin, vmax);
    let segments = segments.max(1);
    let t: Vec<f32> = (0..=segments).map(|i| i as f32 / segments as f32).collect();
    value_coordinates(&t, norm, lo, hi)
}

fn extension_boundary(near: f32, next: f32, log: bool) -> f32 {
    if log && near > 0.0 && next > 0.0 {
        near * near / next
    } else {
        near - (next - near)
    }
}

/// Add extension boundaries and compute bin-center values.
fn with_extensions(inner: &[f32], extend: Extend, log: bool) -> (Vec<f32>, Vec<f32>) {
    let n = inner.len();
    let mut boundaries = Vec::with_capacity(n + 2);
    let mut values = Vec::with_capacity(n + 1);

    if extend.lower() {
        let b = extension_boundary(inner[0], inner[1], log);
        boundaries.push(b);
        values.push(b);
    }
    boundaries.extend_from_slice(inner);
    values.extend(inner.windows(2).map(|w| 0.5 * (w[0] + w[1])));
    if extend.upper() {
        let b = extension_boundary(inner[n - 1], inner[n - 2], log);
        boundaries.push(b);
        values.push(b);
    }
    (boundaries, values)
}

fn uniform_positions(n: usize) -> Vec<f32> {
    let last = n.saturating_sub(1).max(1) as f32;
    (0..n).map(|i| i as f32 / last).collect()
}

/// Rescale `ys` so the first maps to 0 and the last to 1.
fn rescaled(ys: &[f32]) -> Option<Vec<f32>> {
    let (first, last) = (*ys.first()?, *ys.last()?);
    let span = last - first;
    if !span.is_finite() || span == 0.0 {
        return None;
    }
    Some(ys.iter().map(|&y| (y - first) / span).collect())
}

/// Positions of the inside boundaries along the long axis, in `[0, 1]`.
fn proportional_positions(inner: &[f32], norm: &Norm, spacing: Spacing) -> Result<Vec<f32>> {
    let by_value = || rescaled(inner).unwrap_or_else(|| uniform_positions(inner.len()));
    match norm.kind() {
        NormKind::Boundary { .. } if spacing == Spacing::Uniform => Ok(uniform_positions(inner.len())),
        NormKind::Boundary { .. } | NormKind::Identity => Ok(by_value()),
        NormKind::Linear | NormKind::Log => {
            let ys = inner.iter().map(|&b| norm.normalize(b)).collect::<Result<Vec<_>>>()?;
            if ys.iter().any(|y| !y.is_finite()) {
                return Err(Error::ScaleDomain(
                    "colorbar boundaries fall outside the norm's domain".to_string(),
                ));
            }
            Ok(rescaled(&ys).unwrap_or_else(by_value))
        }
    }
}

/// Piecewise-linear interpolation of `x` over increasing `xs`.
fn interpolate(x: f32, xs: &[f32], ys: &[f32]) -> Option<f32> {
    let (first, last) = (*xs.first()?, *xs.last()?);
    if x < first || x > last {
        return None;
    }
    let i = xs.partition_point(|&b| b <= x).clamp(1, xs.len() - 1);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 0.0 };
    Some(ys[i - 1] + t * (ys[i] - ys[i - 1]))
}

fn tick_position(
    value: f32,
    norm: &Norm,
    inner: &[f32],
    proportional: &[f32],
    (vmin, vmax): (f32, f32),
) -> Result<Option<f32>> {
    match norm.kind() {
        NormKind::Linear | NormKind::Log => {
            let (n0, n1, v) = (norm.normalize(vmin)?, norm.normalize(vmax)?, norm.normalize(value)?);
            let t = (v - n0) / (n1 - n0);
            Ok(t.is_finite().then_some(t).or_else(|| interpolate(value, inner, proportional)))
        }
        NormKind::Boundary { .. } | NormKind::Identity => Ok(interpolate(value, inner, proportional)),
    }
}

fn locate_ticks(
    options: &ColorbarOptions,
    norm: &Norm,
    inner: &[f32],
    proportional: &[f32],
    limits: (f32, f32),
) -> Result<Vec<Tick>> {
    let (lo, hi) = (limits.0.min(limits.1), limits.0.max(limits.1));
    let values: Vec<f32> = match (&options.ticks, norm.kind()) {
        (Some(explicit), _) => explicit.iter().copied().filter(|t| (lo..=hi).contains(t)).collect(),
        (None, NormKind::Log) => log_ticks(lo, hi, MAX_TICKS),
        (None, NormKind::Boundary { boundaries }) if options.spacing == Spacing::Uniform => {
            let stride = boundaries.len().div_ceil(MAX_TICKS).max(1);
            boundaries.iter().copied().step_by(stride).collect()
        }
        (None, _) => linear_ticks(lo, hi, MAX_TICKS).0,
    };

    let step = values
        .windows(2)
        .map(|w| f64::from((w[1] - w[0]).abs()))
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    let step = if step.is_finite() { step } else { 0.0 };

    let mut ticks = Vec::with_capacity(values.len());
    for value in values {
        if let Some(position) = tick_position(value, norm, inner, proportional, limits)? {
            ticks.push(Tick { value, position, label: format_tick(value, options.format, step) });
        }
    }
    Ok(ticks)
}

fn apply_alpha(color: Rgba, alpha: Option<f32>) -> Rgba {
    match alpha {
        // An all-zero color stays invisible regardless of alpha.
        Some(a) if color != Rgba::TRANSPARENT => color.with_alpha_f32(a),
        _ => color,
    }
}

fn tile_colors(grid: &TileGrid, cmap: &Colormap, norm: &Norm, alpha: Option<f32>) -> Result<Vec<Option<Rgba>>> {
    grid.values()
        .iter()
        .zip(grid.mask())
        .map(|(value, &visible)| {
            if !visible {
                return Ok(None);
            }
            let color = match value {
                Some(v) => cmap.map(norm.normalize(*v)?),
                None => cmap.bad(),
            };
            Ok(Some(apply_alpha(color, alpha)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::mappable::ScalarMappable;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn axes() -> Axes {
        Axes::new(Rect::new(0.0, 0.0, 0.1, 1.0))
    }

    fn mappable(data: Vec<f32>) -> ScalarMappable {
        ScalarMappable::new(data, Colormap::greyscale(), Norm::linear())
    }

    #[test]
    fn test_flat_colorbar() {
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 10.0]);
        let cb = Colorbar::new(FlatMesh::new(4).unwrap(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();

        assert_eq!(cb.boundaries(), &[0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(cb.values(), &[1.25, 3.75, 6.25, 8.75]);
        assert_eq!(cb.limits(), (0.0, 10.0));
        assert_eq!(cb.proportional(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(ax.xlim(), (0.0, 1.0));
        assert_eq!(ax.ylim(), (0.0, 10.0));

        let grid = cb.tile_grid().unwrap();
        assert_eq!((grid.bins(), grid.width()), (4, 1));
        assert_eq!(cb.tile_colors().len(), 4);
        assert!(cb.tile_colors().iter().all(Option::is_some));
        assert!(!cb.ticks().is_empty());
    }

    #[test]
    fn test_extensions() {
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 4.0]);
        let cb = Colorbar::new(
            FlatMesh::new(2).unwrap(),
            &mut ax,
            &mut m,
            ColorbarOptions::new().extend(Extend::Both),
            None,
        )
        .unwrap();

        assert_eq!(cb.boundaries(), &[-2.0, 0.0, 2.0, 4.0, 6.0]);
        assert_eq!(cb.values().len(), 4);
        assert_eq!(cb.inside(), 1..3);
        assert_eq!(cb.limits(), (0.0, 4.0));
        assert_eq!(cb.tile_grid().unwrap().bins(), 2);
        assert_eq!(cb.extension_colors(), (Some(Rgba::BLACK), Some(Rgba::WHITE)));
    }

    #[test]
    fn test_horizontal_limits() {
        let mut ax = axes();
        let mut m = mappable(vec![1.0, 3.0]);
        let opts = ColorbarOptions::new().orientation(Orientation::Horizontal);
        let cb = Colorbar::new(FlatMesh::default(), &mut ax, &mut m, opts, None).unwrap();
        assert_eq!(ax.xlim(), (1.0, 3.0));
        assert_eq!(ax.ylim(), (0.0, 1.0));
        assert_eq!(cb.mesh().orientation(), Orientation::Horizontal);
    }

    #[test]
    fn test_inverted_long_axis() {
        let mut ax = axes();
        ax.invert_yaxis();
        let mut m = mappable(vec![0.0, 5.0]);
        let cb = Colorbar::new(FlatMesh::default(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        assert!(cb.long_inverted());
        assert_eq!(ax.ylim(), (5.0, 0.0));
    }

    #[test]
    fn test_log_norm_boundaries() {
        let mut ax = axes();
        let mut m = ScalarMappable::new(vec![1.0, 100.0], Colormap::viridis(), Norm::log());
        let cb = Colorbar::new(FlatMesh::new(2).unwrap(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        assert_relative_eq!(cb.boundaries()[1], 10.0, max_relative = 1e-4);
        assert_relative_eq!(cb.proportional()[1], 0.5, epsilon = 1e-5);
        let decades: Vec<f32> = cb.ticks().iter().map(|t| t.value).collect();
        assert_eq!(decades, vec![1.0, 10.0, 100.0]);
        assert_relative_eq!(cb.ticks()[1].position, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_boundary_norm_uniform_spacing() {
        let mut ax = axes();
        let norm = Norm::boundary(vec![0.0, 1.0, 10.0]).unwrap();
        let mut m = ScalarMappable::new(vec![0.5, 5.0], Colormap::greyscale(), norm);
        let cb = Colorbar::new(FlatMesh::default(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        assert_eq!(cb.proportional(), &[0.0, 0.5, 1.0]);
        assert_eq!(cb.mesh().long_edges(), &[0.0, 5.0, 10.0]);
        assert_relative_eq!(cb.ticks()[1].position, 0.5);

        let opts = ColorbarOptions::new().spacing(Spacing::Proportional);
        let cb = Colorbar::new(FlatMesh::default(), &mut ax, &mut m, opts, None).unwrap();
        assert_relative_eq!(cb.proportional()[1], 0.1);
    }

    #[test]
    fn test_draw_all_leaves_norm_untouched() {
        let hits = Rc::new(Cell::new(0));
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 1.0]);
        let counter = Rc::clone(&hits);
        m.norm_mut().connect(move |_| counter.set(counter.get() + 1));

        let mut cb = Colorbar::new(FlatMesh::default(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        cb.draw_all(&mut ax, &mut m).unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(m.norm().limits(), Some((0.0, 1.0)));
    }

    #[test]
    fn test_redraw_follows_norm() {
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 1.0]);
        let mut cb = Colorbar::new(FlatMesh::new(2).unwrap(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        m.set_clim(-1.0, 3.0);
        cb.draw_all(&mut ax, &mut m).unwrap();
        assert_eq!(cb.limits(), (-1.0, 3.0));
        assert_eq!(ax.ylim(), (-1.0, 3.0));
    }

    #[test]
    fn test_failed_redraw_keeps_previous_state() {
        let mut ax = axes();
        let mut m = ScalarMappable::new(vec![1.0, 10.0], Colormap::viridis(), Norm::log());
        let mut cb = Colorbar::new(FlatMesh::new(2).unwrap(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        let before = cb.boundaries().to_vec();
        let ylim = ax.ylim();

        m.set_clim(-1.0, 10.0);
        assert!(cb.draw_all(&mut ax, &mut m).is_err());
        assert_eq!(cb.boundaries(), before.as_slice());
        assert_eq!(ax.ylim(), ylim);
    }

    #[test]
    fn test_unfilled_has_no_tiles() {
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 1.0]);
        let cb = Colorbar::new(
            FlatMesh::default(),
            &mut ax,
            &mut m,
            ColorbarOptions::new().filled(false),
            None,
        )
        .unwrap();
        assert!(cb.tile_grid().is_none());
        assert!(cb.tile_colors().is_empty());
    }

    #[test]
    fn test_no_finite_data_uses_unit_range() {
        let mut ax = axes();
        let mut m = mappable(vec![f32::NAN]);
        let cb = Colorbar::new(FlatMesh::new(2).unwrap(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        assert_eq!(cb.limits(), (0.0, 1.0));
    }

    #[test]
    fn test_constant_data_expanded() {
        let mut ax = axes();
        let mut m = mappable(vec![5.0, 5.0]);
        let cb = Colorbar::new(FlatMesh::new(2).unwrap(), &mut ax, &mut m, ColorbarOptions::new(), None).unwrap();
        assert_relative_eq!(cb.limits().0, 4.5);
        assert_relative_eq!(cb.limits().1, 5.5);
    }

    #[test]
    fn test_explicit_ticks_filtered() {
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 10.0]);
        let opts = ColorbarOptions::new().ticks(vec![-5.0, 2.0, 7.0, 20.0]).format(TickFormat::Decimals(1));
        let cb = Colorbar::new(FlatMesh::default(), &mut ax, &mut m, opts, None).unwrap();
        let labels: Vec<&str> = cb.ticks().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["2.0", "7.0"]);
        assert_relative_eq!(cb.ticks()[0].position, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_alpha_and_options() {
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 1.0]);
        assert!(matches!(
            Colorbar::new(FlatMesh::default(), &mut ax, &mut m, ColorbarOptions::new(), Some(1.5)),
            Err(Error::InvalidAlpha(_))
        ));
        assert!(FlatMesh::new(0).is_err());
    }

    #[test]
    fn test_alpha_applied_to_tiles() {
        let mut ax = axes();
        let mut m = mappable(vec![0.0, 1.0]);
        let cb = Colorbar::new(FlatMesh::new(2).unwrap(), &mut ax, &mut m, ColorbarOptions::new(), Some(0.5)).unwrap();
        assert!(cb.tile_colors().iter().flatten().all(|c| c.a == 128));
    }

    #[test]
    fn test_interpolate() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [0.0, 0.5, 1.0];
        assert_eq!(interpolate(2.0, &xs, &ys), Some(0.75));
        assert_eq!(interpolate(3.0, &xs, &ys), Some(1.0));
        assert_eq!(interpolate(-1.0, &xs, &ys), None);
    }

    #[test]
    fn test_nonsingular() {
        assert_eq!(nonsingular(0.0, 0.0), (-0.1, 0.1));
        assert_eq!(nonsingular(2.0, 1.0), (1.0, 2.0));
        assert_eq!(nonsingular(f32::NAN, 1.0), (0.0, 1.0));
    }
}
