//! Pass-through colorbar options.

use crate::error::{Error, Result};
use crate::figure::Location;
use crate::mesh::{Extend, Orientation};
use std::str::FromStr;

/// Side of the colorbar that carries ticks and the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickLocation {
    /// Right for vertical, bottom for horizontal.
    #[default]
    Auto,
    /// Left side (vertical only).
    Left,
    /// Right side (vertical only).
    Right,
    /// Top side (horizontal only).
    Top,
    /// Bottom side (horizontal only).
    Bottom,
}

impl From<Location> for TickLocation {
    fn from(location: Location) -> Self {
        match location {
            Location::Left => Self::Left,
            Location::Right => Self::Right,
            Location::Top => Self::Top,
            Location::Bottom => Self::Bottom,
        }
    }
}

impl FromStr for TickLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(Error::InvalidOption(format!("unknown tick location '{other}'"))),
        }
    }
}

/// How discrete boundaries are spaced along the long axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    /// Every bin gets the same length.
    #[default]
    Uniform,
    /// Bin length is proportional to its data extent.
    Proportional,
}

impl FromStr for Spacing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "proportional" => Ok(Self::Proportional),
            other => Err(Error::InvalidOption(format!("unknown spacing '{other}'"))),
        }
    }
}

/// Tick label formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickFormat {
    /// Decimals derived from the tick step.
    #[default]
    Auto,
    /// Fixed number of decimals.
    Decimals(usize),
    /// Scientific notation with the given mantissa decimals.
    Scientific(usize),
}

impl FromStr for TickFormat {
    type Err = Error;

    /// Parses `auto`, `%.Nf` / `.Nf`, or `%.Ne` / `.Ne`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let body = s.trim_start_matches('%').trim_start_matches('{').trim_start_matches(':');
        let body = body.trim_end_matches('}');
        let invalid = || Error::InvalidOption(format!("unsupported tick format '{s}'"));
        let digits = body.strip_prefix('.').ok_or_else(invalid)?;
        let (n, kind) = digits.split_at(digits.len().saturating_sub(1));
        let n: usize = n.parse().map_err(|_| invalid())?;
        match kind {
            "f" => Ok(Self::Decimals(n)),
            "e" => Ok(Self::Scientific(n)),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" => Ok(Self::Vertical),
            "horizontal" => Ok(Self::Horizontal),
            other => Err(Error::InvalidOption(format!("unknown orientation '{other}'"))),
        }
    }
}

impl FromStr for Extend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neither" => Ok(Self::Neither),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "both" => Ok(Self::Both),
            other => Err(Error::InvalidOption(format!("unknown extend '{other}'"))),
        }
    }
}

/// Options forwarded to the colorbar substrate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorbarOptions {
    /// Orientation; derived from `location` when unset.
    pub orientation: Option<Orientation>,
    /// Placement side; implies orientation and tick location.
    pub location: Option<Location>,
    /// Side carrying ticks.
    pub tick_location: TickLocation,
    /// Boundary spacing for discrete norms.
    pub spacing: Spacing,
    /// Explicit tick values.
    pub ticks: Option<Vec<f32>>,
    /// Tick label format.
    pub format: TickFormat,
    /// Draw lines between bins.
    pub drawedges: bool,
    /// Whether the tile grid is drawn at all.
    pub filled: bool,
    /// Axis label.
    pub label: String,
    /// Out-of-range extensions.
    pub extend: Extend,
}

impl ColorbarOptions {
    /// Defaults: vertical, filled, no extensions.
    #[must_use]
    pub fn new() -> Self {
        Self { filled: true, ..Self::default() }
    }

    /// Set the orientation.
    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Set the location.
    #[must_use]
    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the tick side.
    #[must_use]
    pub fn tick_location(mut self, tick_location: TickLocation) -> Self {
        self.tick_location = tick_location;
        self
    }

    /// Set the spacing.
    #[must_use]
    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set explicit ticks.
    #[must_use]
    pub fn ticks(mut self, ticks: Vec<f32>) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Set the tick format.
    #[must_use]
    pub fn format(mut self, format: TickFormat) -> Self {
        self.format = format;
        self
    }

    /// Toggle bin divider lines.
    #[must_use]
    pub fn drawedges(mut self, drawedges: bool) -> Self {
        self.drawedges = drawedges;
        self
    }

    /// Toggle tile drawing.
    #[must_use]
    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    /// Set the axis label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the extensions.
    #[must_use]
    pub fn extend(mut self, extend: Extend) -> Self {
        self.extend = extend;
        self
    }

    /// Check option consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if both `location` and `orientation` are set, or the
    /// tick side does not fit the orientation.
    pub fn validate(&self) -> Result<()> {
        if self.location.is_some() && self.orientation.is_some() {
            return Err(Error::InvalidOption(
                "location and orientation are mutually exclusive".to_string(),
            ));
        }
        let ok = match (self.resolved_orientation(), self.tick_location) {
            (_, TickLocation::Auto) => true,
            (Orientation::Vertical, side) => matches!(side, TickLocation::Left | TickLocation::Right),
            (Orientation::Horizontal, side) => matches!(side, TickLocation::Top | TickLocation::Bottom),
        };
        if !ok {
            return Err(Error::InvalidOption(format!(
                "tick location {:?} does not fit a {:?} colorbar",
                self.tick_location,
                self.resolved_orientation()
            )));
        }
        if let Some(ticks) = &self.ticks {
            if ticks.iter().any(|t| !t.is_finite()) {
                return Err(Error::InvalidOption("ticks must be finite".to_string()));
            }
        }
        Ok(())
    }

    /// Orientation after applying `location`.
    #[must_use]
    pub fn resolved_orientation(&self) -> Orientation {
        match (self.location, self.orientation) {
            (Some(location), _) => location.orientation(),
            (None, Some(orientation)) => orientation,
            (None, None) => Orientation::Vertical,
        }
    }

    /// Concrete tick side.
    #[must_use]
    pub fn resolved_tick_location(&self) -> TickLocation {
        match (self.tick_location, self.location) {
            (TickLocation::Auto, Some(location)) => location.into(),
            (TickLocation::Auto, None) => match self.resolved_orientation() {
                Orientation::Vertical => TickLocation::Right,
                Orientation::Horizontal => TickLocation::Bottom,
            },
            (side, _) => side,
        }
    }

    /// Replace `location` with the orientation and tick side it implies.
    #[must_use]
    pub fn resolve_location(mut self, location: Location) -> Self {
        self.location = None;
        self.orientation = Some(location.orientation());
        if self.tick_location == TickLocation::Auto {
            self.tick_location = location.into();
        }
        self
    }
}
