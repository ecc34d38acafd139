//! Figures, axes, and colorbar space stealing.
//!
//! Axes positions are figure fractions with the origin at the bottom-left,
//! the same convention used for placing colorbars next to their parents.
//! [`Figure::pixel_rect`] converts a position to framebuffer pixels.

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::mesh::Orientation;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Default subplot position (left, bottom, width, height).
const SUBPLOT_RECT: Rect = Rect::new(0.125, 0.11, 0.775, 0.77);

/// Handle to an [`Axes`] owned by a [`Figure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxesId(usize);

impl AxesId {
    /// Position of the axes in the figure's axes list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A rectangular plotting region with data limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    position: Rect,
    xlim: (f32, f32),
    ylim: (f32, f32),
    anchor: (f32, f32),
    box_aspect: Option<f32>,
    grid: bool,
    label: String,
}

impl Axes {
    /// Axes at a figure-fraction position with unit limits.
    #[must_use]
    pub fn new(position: Rect) -> Self {
        Self {
            position,
            xlim: (0.0, 1.0),
            ylim: (0.0, 1.0),
            anchor: (0.5, 0.5),
            box_aspect: None,
            grid: false,
            label: String::new(),
        }
    }

    /// Set the label used to identify the axes.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Axes label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Position in figure fractions.
    #[must_use]
    pub const fn position(&self) -> Rect {
        self.position
    }

    /// Move the axes.
    pub fn set_position(&mut self, position: Rect) {
        self.position = position;
    }

    /// X limits as `(left, right)`.
    #[must_use]
    pub const fn xlim(&self) -> (f32, f32) {
        self.xlim
    }

    /// Y limits as `(bottom, top)`.
    #[must_use]
    pub const fn ylim(&self) -> (f32, f32) {
        self.ylim
    }

    /// Set x limits; `left > right` inverts the axis.
    pub fn set_xlim(&mut self, left: f32, right: f32) {
        self.xlim = (left, right);
    }

    /// Set y limits; `bottom > top` inverts the axis.
    pub fn set_ylim(&mut self, bottom: f32, top: f32) {
        self.ylim = (bottom, top);
    }

    /// Whether the x axis runs right to left.
    #[must_use]
    pub fn x_inverted(&self) -> bool {
        self.xlim.0 > self.xlim.1
    }

    /// Whether the y axis runs top to bottom.
    #[must_use]
    pub fn y_inverted(&self) -> bool {
        self.ylim.0 > self.ylim.1
    }

    /// Flip the x axis direction.
    pub fn invert_xaxis(&mut self) {
        self.xlim = (self.xlim.1, self.xlim.0);
    }

    /// Flip the y axis direction.
    pub fn invert_yaxis(&mut self) {
        self.ylim = (self.ylim.1, self.ylim.0);
    }

    /// Anchor used when the box aspect shrinks the axes.
    #[must_use]
    pub const fn anchor(&self) -> (f32, f32) {
        self.anchor
    }

    /// Set the anchor.
    pub fn set_anchor(&mut self, anchor: (f32, f32)) {
        self.anchor = anchor;
    }

    /// Fixed `height / width` ratio, if any.
    #[must_use]
    pub const fn box_aspect(&self) -> Option<f32> {
        self.box_aspect
    }

    /// Fix the `height / width` ratio.
    pub fn set_box_aspect(&mut self, aspect: Option<f32>) {
        self.box_aspect = aspect;
    }

    /// Whether grid lines are shown.
    #[must_use]
    pub const fn grid(&self) -> bool {
        self.grid
    }

    /// Show or hide grid lines.
    pub fn set_grid(&mut self, visible: bool) {
        self.grid = visible;
    }
}

/// A drawing surface holding axes.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    axes: Vec<Axes>,
    current: Option<AxesId>,
    stale: bool,
}

impl Figure {
    /// Create an empty figure of `width` by `height` pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self { width, height, axes: Vec::new(), current: None, stale: false })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Add axes and make them current.
    pub fn add_axes(&mut self, axes: Axes) -> AxesId {
        let id = AxesId(self.axes.len());
        self.axes.push(axes);
        self.current = Some(id);
        self.stale = true;
        id
    }

    /// Add axes at the default subplot position.
    pub fn add_subplot(&mut self) -> AxesId {
        self.add_axes(Axes::new(SUBPLOT_RECT))
    }

    /// Number of axes.
    #[must_use]
    pub fn axes_count(&self) -> usize {
        self.axes.len()
    }

    /// Look up axes.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this figure.
    pub fn axes(&self, id: AxesId) -> Result<&Axes> {
        self.axes.get(id.0).ok_or_else(|| unknown_axes(id))
    }

    /// Look up axes mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this figure.
    pub fn axes_mut(&mut self, id: AxesId) -> Result<&mut Axes> {
        self.axes.get_mut(id.0).ok_or_else(|| unknown_axes(id))
    }

    /// Current axes, if any.
    #[must_use]
    pub const fn current_axes(&self) -> Option<AxesId> {
        self.current
    }

    /// Current axes, creating a subplot when there are none.
    pub fn gca(&mut self) -> AxesId {
        match self.current {
            Some(id) => id,
            None => self.add_subplot(),
        }
    }

    /// Make `id` the current axes.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this figure.
    pub fn sca(&mut self, id: AxesId) -> Result<()> {
        self.axes(id)?;
        self.current = Some(id);
        Ok(())
    }

    /// Whether the figure needs redrawing.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Mark the figure as needing (or not needing) a redraw.
    pub fn set_stale(&mut self, stale: bool) {
        self.stale = stale;
    }

    /// Pixel rectangle of an axes, with its box aspect applied.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this figure.
    pub fn pixel_rect(&self, id: AxesId) -> Result<Rect> {
        let axes = self.axes(id)?;
        let (w, h) = (self.width as f32, self.height as f32);
        let pos = axes.position();
        let rect = Rect::new(pos.x * w, (1.0 - pos.bottom()) * h, pos.width * w, pos.height * h);
        Ok(match axes.box_aspect() {
            // Pixel rows grow downwards, so the vertical anchor flips.
            Some(aspect) => rect.fit_aspect(aspect, (axes.anchor.0, 1.0 - axes.anchor.1)),
            None => rect,
        })
    }
}

impl batuta_common::display::WithDimensions for Figure {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.stale = true;
    }
}

fn unknown_axes(id: AxesId) -> Error {
    Error::InvalidOption(format!("axes {} does not belong to this figure", id.0))
}

// ============================================================================
// Space stealing
// ============================================================================

/// Side of the parent axes a colorbar is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Left of the parent (vertical colorbar).
    Left,
    /// Right of the parent (vertical colorbar).
    Right,
    /// Above the parent (horizontal colorbar).
    Top,
    /// Below the parent (horizontal colorbar).
    Bottom,
}

impl Location {
    /// Default location for an orientation.
    #[must_use]
    pub const fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Vertical => Self::Right,
            Orientation::Horizontal => Self::Bottom,
        }
    }

    /// Orientation implied by the location.
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Vertical,
            Self::Top | Self::Bottom => Orientation::Horizontal,
        }
    }

    /// Colorbar anchor within its slot.
    #[must_use]
    pub const fn anchor(self) -> (f32, f32) {
        match self {
            Self::Left => (1.0, 0.5),
            Self::Right => (0.0, 0.5),
            Self::Top => (0.5, 0.0),
            Self::Bottom => (0.5, 1.0),
        }
    }

    /// Parent anchor after shrinking.
    #[must_use]
    pub const fn parent_anchor(self) -> (f32, f32) {
        match self {
            Self::Left => (0.0, 0.5),
            Self::Right => (1.0, 0.5),
            Self::Top => (0.5, 1.0),
            Self::Bottom => (0.5, 0.0),
        }
    }

    /// Default gap between parent and colorbar, as a parent fraction.
    #[must_use]
    pub const fn default_pad(self) -> f32 {
        match self {
            Self::Left => 0.10,
            Self::Right | Self::Top => 0.05,
            Self::Bottom => 0.15,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(Error::InvalidOption(format!("unknown colorbar location '{other}'"))),
        }
    }
}

/// Layout-only parameters for placing a colorbar beside its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Fraction of the parent taken by the colorbar.
    pub fraction: f32,
    /// Scale of the colorbar's long side.
    pub shrink: f32,
    /// Long-to-short side ratio.
    pub aspect: f32,
    /// Gap to the parent; defaults per location.
    pub pad: Option<f32>,
    /// Colorbar anchor; defaults per location.
    pub anchor: Option<(f32, f32)>,
    /// Parent anchor; defaults per location.
    pub panchor: Option<(f32, f32)>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self { fraction: 0.15, shrink: 1.0, aspect: 20.0, pad: None, anchor: None, panchor: None }
    }
}

impl LayoutOptions {
    /// Default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fraction.
    #[must_use]
    pub fn fraction(mut self, fraction: f32) -> Self {
        self.fraction = fraction;
        self
    }

    /// Set the shrink factor.
    #[must_use]
    pub fn shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    /// Set the aspect ratio.
    #[must_use]
    pub fn aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Set the padding.
    #[must_use]
    pub fn pad(mut self, pad: f32) -> Self {
        self.pad = Some(pad);
        self
    }

    /// Set the colorbar anchor.
    #[must_use]
    pub fn anchor(mut self, anchor: (f32, f32)) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Set the parent anchor.
    #[must_use]
    pub fn panchor(mut self, panchor: (f32, f32)) -> Self {
        self.panchor = Some(panchor);
        self
    }

    /// Check ranges for a given location.
    ///
    /// # Errors
    ///
    /// Returns an error when a parameter is out of range or the colorbar and
    /// its pad would consume the whole parent.
    pub fn validate(&self, location: Location) -> Result<()> {
        let pad = self.pad.unwrap_or(location.default_pad());
        if !(self.fraction.is_finite() && self.fraction > 0.0 && self.fraction < 1.0) {
            return Err(Error::InvalidOption(format!("fraction must be in (0, 1), got {}", self.fraction)));
        }
        if !(self.shrink.is_finite() && self.shrink > 0.0 && self.shrink <= 1.0) {
            return Err(Error::InvalidOption(format!("shrink must be in (0, 1], got {}", self.shrink)));
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return Err(Error::InvalidOption(format!("aspect must be positive, got {}", self.aspect)));
        }
        if !(pad.is_finite() && pad >= 0.0 && self.fraction + pad < 1.0) {
            return Err(Error::InvalidOption(format!(
                "pad {pad} with fraction {} leaves no room for the parent axes",
                self.fraction
            )));
        }
        Ok(())
    }
}

/// Shrink `parent` and create colorbar axes in the freed space.
///
/// The new axes become current; callers restore the previous current axes.
///
/// # Errors
///
/// Returns an error for invalid layout options or an unknown parent.
pub fn make_axes(
    fig: &mut Figure,
    parent: AxesId,
    location: Location,
    layout: &LayoutOptions,
) -> Result<AxesId> {
    layout.validate(location)?;
    let fraction = layout.fraction;
    let pad = layout.pad.unwrap_or(location.default_pad());
    let anchor = layout.anchor.unwrap_or(location.anchor());
    let panchor = layout.panchor.unwrap_or(location.parent_anchor());

    let pb = fig.axes(parent)?.position();
    let (slot, remaining) = match location {
        Location::Left => {
            let (slot, _, rest) = pb.split_x(fraction, fraction + pad);
            (slot, rest)
        }
        Location::Right => {
            let (rest, _, slot) = pb.split_x(1.0 - fraction - pad, 1.0 - fraction);
            (slot, rest)
        }
        Location::Bottom => {
            let (slot, _, rest) = pb.split_y(fraction, fraction + pad);
            (slot, rest)
        }
        Location::Top => {
            let (rest, _, slot) = pb.split_y(1.0 - fraction - pad, 1.0 - fraction);
            (slot, rest)
        }
    };

    let (cbar_rect, box_aspect) = match location.orientation() {
        Orientation::Vertical => (slot.shrunk(1.0, layout.shrink).anchored(anchor, &slot), layout.aspect),
        Orientation::Horizontal => (slot.shrunk(layout.shrink, 1.0).anchored(anchor, &slot), 1.0 / layout.aspect),
    };

    let parent_axes = fig.axes_mut(parent)?;
    parent_axes.set_position(remaining);
    parent_axes.set_anchor(panchor);

    let mut cax = Axes::new(cbar_rect).with_label("<colorbar>");
    cax.set_anchor(anchor);
    cax.set_box_aspect(Some(box_aspect));
    let id = fig.add_axes(cax);

    debug!(
        parent = parent.index(),
        cax = id.index(),
        %location,
        fraction,
        pad,
        "stole colorbar space"
    );
    Ok(id)
}
