//! Histogram colorbars.
//!
//! A [`HistColorbar`] is a [`Colorbar`] whose tiles form a histogram of the
//! mappable's data: every bin becomes one row of tiles, and a bin with `k`
//! samples shows `k` of them. In composite mode (`separate_hist`) a flat
//! gradient strip precedes the bars so the plain color scale stays readable.
//!
//! # Example
//!
//! ```
//! use histcolorbar::prelude::*;
//!
//! let mut fig = Figure::new(640, 480).unwrap();
//! let ax = fig.add_subplot();
//! let data: Vec<f32> = (0..500).map(|i| ((i * 37) % 101) as f32).collect();
//! let mut image = ScalarMappable::from_data(data).with_axes(ax);
//!
//! let config = HistColorbarConfig::new().bins(Bins::Count(20)).separate_hist(true);
//! let (hcb, cax) = histcolorbar(&mut fig, &mut image, None, None, &LayoutOptions::new(), config).unwrap();
//!
//! assert_eq!(hcb.counts().bin_count(), 20);
//! assert_eq!(fig.current_axes(), Some(ax));
//! assert_ne!(cax, ax);
//! ```

use crate::binning::{histogram, Bins, HistogramCounts};
use crate::color::Rgba;
use crate::colorbar::{validate_alpha, Colorbar, ColorbarOptions, MeshProvider, MeshRequest};
use crate::colormap::Colormap;
use crate::error::Result;
use crate::figure::{make_axes, Axes, AxesId, Figure, LayoutOptions, Location};
use crate::framebuffer::Framebuffer;
use crate::geometry::Rect;
use crate::mappable::ColorMappable;
use crate::mesh::{build_tile_grid, validate_fraction, StripLayout, TileGrid};
use crate::output::SvgEncoder;
use tracing::{debug, warn};

/// Default share of the width taken by the histogram in composite mode.
pub const DEFAULT_HIST_FRACTION: f32 = 0.5;

/// Histogram-specific construction parameters plus the colorbar options
/// they are forwarded with.
#[derive(Debug, Clone, PartialEq)]
pub struct HistColorbarConfig {
    /// Binning directive.
    pub bins: Bins,
    /// Draw a flat gradient strip next to the histogram.
    pub separate_hist: bool,
    /// Share of the width taken by the histogram when `separate_hist` is set.
    pub hist_fraction: f32,
    /// Solid color for the histogram bars instead of the colormap.
    pub hist_color: Option<Rgba>,
    /// Widget alpha in `[0, 1]`.
    pub alpha: Option<f32>,
    /// Options forwarded to the colorbar.
    pub colorbar: ColorbarOptions,
}

impl Default for HistColorbarConfig {
    fn default() -> Self {
        Self {
            bins: Bins::default(),
            separate_hist: false,
            hist_fraction: DEFAULT_HIST_FRACTION,
            hist_color: None,
            alpha: None,
            colorbar: ColorbarOptions::new(),
        }
    }
}

impl HistColorbarConfig {
    /// Defaults: automatic bins, histogram only, colormap-colored bars.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binning directive.
    #[must_use]
    pub fn bins(mut self, bins: impl Into<Bins>) -> Self {
        self.bins = bins.into();
        self
    }

    /// Toggle the composite layout.
    #[must_use]
    pub fn separate_hist(mut self, separate_hist: bool) -> Self {
        self.separate_hist = separate_hist;
        self
    }

    /// Set the histogram's share of the width in composite mode.
    #[must_use]
    pub fn hist_fraction(mut self, hist_fraction: f32) -> Self {
        self.hist_fraction = hist_fraction;
        self
    }

    /// Draw the bars in a single color.
    #[must_use]
    pub fn hist_color(mut self, color: Rgba) -> Self {
        self.hist_color = Some(color);
        self
    }

    /// Set the widget alpha.
    #[must_use]
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Replace the forwarded colorbar options.
    #[must_use]
    pub fn colorbar(mut self, options: ColorbarOptions) -> Self {
        self.colorbar = options;
        self
    }

    /// Check every parameter without touching any data.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid bins, a fraction outside `(0, 1]`, an
    /// alpha outside `[0, 1]`, or inconsistent colorbar options.
    pub fn validate(&self) -> Result<()> {
        self.bins.validate()?;
        validate_fraction(self.hist_fraction)?;
        validate_alpha(self.alpha)?;
        self.colorbar.validate()
    }
}

/// [`MeshProvider`] drawing histogram bars, optionally behind a flat strip.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramMesh {
    counts: HistogramCounts,
    layout: StripLayout,
    hist_color: Option<Rgba>,
}

impl HistogramMesh {
    /// Provider for precomputed counts.
    #[must_use]
    pub fn new(counts: HistogramCounts, layout: StripLayout, hist_color: Option<Rgba>) -> Self {
        Self { counts, layout, hist_color }
    }

    /// Bin edges and counts.
    #[must_use]
    pub fn counts(&self) -> &HistogramCounts {
        &self.counts
    }

    /// Strip and histogram widths.
    #[must_use]
    pub const fn layout(&self) -> StripLayout {
        self.layout
    }

    /// Override color of the bars.
    #[must_use]
    pub const fn hist_color(&self) -> Option<Rgba> {
        self.hist_color
    }
}

impl MeshProvider for HistogramMesh {
    fn boundaries(&self) -> Option<&[f32]> {
        Some(self.counts.edges())
    }

    fn total_width(&self) -> usize {
        self.layout.total_width()
    }

    fn tiles(&self, request: &MeshRequest<'_>) -> Result<TileGrid> {
        build_tile_grid(
            self.counts.counts(),
            request.inside_values(),
            self.layout,
            self.hist_color.is_some(),
        )
    }

    /// Copies the base colormap; with an override color, the copy's bad
    /// color becomes the override. Widget alpha is applied per tile.
    fn colormap(&self, base: &Colormap, _alpha: Option<f32>) -> Colormap {
        let mut cmap = base.clone();
        if let Some(color) = self.hist_color {
            cmap.set_bad(color);
        }
        cmap
    }
}

/// A colorbar showing the distribution of the mapped values.
#[derive(Debug, Clone)]
pub struct HistColorbar {
    colorbar: Colorbar<HistogramMesh>,
    separate_hist: bool,
    hist_fraction: f32,
}

impl HistColorbar {
    /// Histogram the mappable's data and draw into `axes`.
    ///
    /// The data is read once; later redraws reuse the counts and follow only
    /// norm and colormap changes.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from [`HistColorbarConfig::validate`], and
    /// normalization errors from the first draw.
    pub fn new<M: ColorMappable + ?Sized>(
        axes: &mut Axes,
        mappable: &mut M,
        config: HistColorbarConfig,
    ) -> Result<Self> {
        config.validate()?;
        let counts = histogram(mappable.array(), &config.bins)?;
        let layout = if config.separate_hist {
            StripLayout::composite(&counts, config.hist_fraction)?
        } else {
            StripLayout::histogram_only(&counts)
        };

        debug!(
            bins = counts.bin_count(),
            hist_width = layout.hist_width(),
            strip_width = layout.strip_width(),
            hist_color = ?config.hist_color,
            "building histogram colorbar"
        );

        let provider = HistogramMesh::new(counts, layout, config.hist_color);
        let colorbar = Colorbar::new(provider, axes, mappable, config.colorbar, config.alpha)?;
        Ok(Self { colorbar, separate_hist: config.separate_hist, hist_fraction: config.hist_fraction })
    }

    /// Recompute from the current norm and colormap.
    ///
    /// # Errors
    ///
    /// Propagates normalization errors; the previous state is kept on error.
    pub fn draw_all<M: ColorMappable + ?Sized>(&mut self, axes: &mut Axes, mappable: &mut M) -> Result<()> {
        self.colorbar.draw_all(axes, mappable)
    }

    /// Underlying colorbar.
    #[must_use]
    pub fn colorbar(&self) -> &Colorbar<HistogramMesh> {
        &self.colorbar
    }

    /// Underlying colorbar, mutably.
    pub fn colorbar_mut(&mut self) -> &mut Colorbar<HistogramMesh> {
        &mut self.colorbar
    }

    /// Bin edges and counts.
    #[must_use]
    pub fn counts(&self) -> &HistogramCounts {
        self.colorbar.provider().counts()
    }

    /// Strip and histogram widths.
    #[must_use]
    pub fn layout(&self) -> StripLayout {
        self.colorbar.provider().layout()
    }

    /// Tiles occupied by the tallest bar.
    #[must_use]
    pub fn hist_width(&self) -> usize {
        self.layout().hist_width()
    }

    /// Tiles of the flat strip (0 unless composite).
    #[must_use]
    pub fn strip_width(&self) -> usize {
        self.layout().strip_width()
    }

    /// Total tiles along the count axis.
    #[must_use]
    pub fn total_width(&self) -> usize {
        self.layout().total_width()
    }

    /// Whether a flat strip is drawn.
    #[must_use]
    pub const fn separate_hist(&self) -> bool {
        self.separate_hist
    }

    /// Histogram share of the width in composite mode.
    #[must_use]
    pub const fn hist_fraction(&self) -> f32 {
        self.hist_fraction
    }

    /// Override color of the bars.
    #[must_use]
    pub fn hist_color(&self) -> Option<Rgba> {
        self.colorbar.provider().hist_color()
    }

    /// Tile grid of the last draw (`None` when unfilled).
    #[must_use]
    pub fn tile_grid(&self) -> Option<&TileGrid> {
        self.colorbar.tile_grid()
    }

    /// Per-tile transparency: 0.0 on hidden tiles, the widget alpha elsewhere.
    #[must_use]
    pub fn alpha_grid(&self) -> Option<Vec<f32>> {
        self.tile_grid().map(|grid| grid.alpha_grid(self.colorbar.alpha()))
    }

    /// Rasterize into a pixel rectangle.
    ///
    /// # Errors
    ///
    /// Returns an error if `rect` is empty.
    pub fn render(&self, fb: &mut Framebuffer, rect: Rect) -> Result<()> {
        self.colorbar.render(fb, rect)
    }

    /// Rasterize into the pixel rectangle of `cax` in `fig`.
    ///
    /// # Errors
    ///
    /// Returns an error if `cax` is not in `fig` or its rectangle is empty.
    pub fn render_axes(&self, fb: &mut Framebuffer, fig: &Figure, cax: AxesId) -> Result<()> {
        self.colorbar.render(fb, fig.pixel_rect(cax)?)
    }

    /// Append vector elements to an SVG document.
    #[must_use]
    pub fn to_svg(&self, svg: SvgEncoder, rect: Rect) -> SvgEncoder {
        self.colorbar.to_svg(svg, rect)
    }
}

/// Add a histogram colorbar for `mappable` to `fig`.
///
/// With `cax` the colorbar is drawn into those axes. Otherwise space is taken
/// from `ax`, else the mappable's axes, else the current axes (with a
/// warning), on the side named by the colorbar `location` (right for vertical,
/// bottom for horizontal). The current axes are restored afterwards and the
/// figure is marked stale.
///
/// Returns the widget and the axes it was drawn into.
///
/// # Errors
///
/// Returns configuration errors before the figure is modified, and
/// normalization errors from the first draw.
pub fn histcolorbar<M: ColorMappable + ?Sized>(
    fig: &mut Figure,
    mappable: &mut M,
    cax: Option<AxesId>,
    ax: Option<AxesId>,
    layout: &LayoutOptions,
    mut config: HistColorbarConfig,
) -> Result<(HistColorbar, AxesId)> {
    config.validate()?;

    let (cax, restore) = match cax {
        Some(cax) => {
            fig.axes(cax)?;
            (cax, None)
        }
        None => {
            let parent = match ax.or_else(|| mappable.axes()) {
                Some(parent) => parent,
                None => {
                    warn!("unable to determine axes to steal space for the histogram colorbar; using the current axes");
                    fig.gca()
                }
            };
            let current = fig.gca();
            let location = config
                .colorbar
                .location
                .unwrap_or_else(|| Location::for_orientation(config.colorbar.resolved_orientation()));
            layout.validate(location)?;

            let cax = make_axes(fig, parent, location, layout)?;
            fig.axes_mut(cax)?.set_grid(false);
            config.colorbar = config.colorbar.resolve_location(location);
            (cax, Some(current))
        }
    };

    let hcb = HistColorbar::new(fig.axes_mut(cax)?, mappable, config)?;
    if let Some(current) = restore {
        fig.sca(current)?;
    }
    fig.set_stale(true);
    Ok((hcb, cax))
}
