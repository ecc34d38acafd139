//! YAML configuration for histogram colorbars.
//!
//! A document is a single flat mapping, the same shape as the keyword
//! arguments of [`histcolorbar`](crate::histcolorbar::histcolorbar). The
//! layout keys `fraction`, `pad`, `shrink`, `aspect`, `anchor` and `panchor`
//! go to [`LayoutOptions`]; everything else configures the widget.
//!
//! ```yaml
//! bins: fd            # count, rule name, or explicit edges
//! separate_hist: true
//! hist_fraction: 0.4
//! hist_color: "#333333"
//! location: right
//! extend: both
//! label: Elevation (m)
//! fraction: 0.12
//! shrink: 0.8
//! ```

use crate::binning::Bins;
use crate::color::Rgba;
use crate::colorbar::ColorbarOptions;
use crate::error::{Error, Result};
use crate::figure::LayoutOptions;
use crate::histcolorbar::{HistColorbarConfig, DEFAULT_HIST_FRACTION};
use serde::Deserialize;
use std::path::Path;

/// Binning directive as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BinsSpec {
    /// `bins: 20`
    Count(usize),
    /// `bins: [0, 10, 50, 100]`
    Edges(Vec<f32>),
    /// `bins: sturges`
    Name(String),
}

impl TryFrom<BinsSpec> for Bins {
    type Error = Error;

    fn try_from(spec: BinsSpec) -> Result<Self> {
        match spec {
            BinsSpec::Count(count) => Ok(Self::Count(count)),
            BinsSpec::Edges(edges) => Ok(Self::Edges(edges)),
            BinsSpec::Name(name) => name.parse(),
        }
    }
}

/// Flat option document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistColorbarDocument {
    /// Binning directive (default `auto`).
    #[serde(default)]
    pub bins: Option<BinsSpec>,

    /// Draw a flat strip next to the histogram.
    #[serde(default)]
    pub separate_hist: bool,

    /// Histogram share of the width in composite mode.
    #[serde(default = "default_hist_fraction")]
    pub hist_fraction: f32,

    /// Solid bar color (hex or name).
    #[serde(default)]
    pub hist_color: Option<String>,

    /// Widget alpha.
    #[serde(default)]
    pub alpha: Option<f32>,

    /// `vertical` or `horizontal`.
    #[serde(default)]
    pub orientation: Option<String>,

    /// `left`, `right`, `top` or `bottom`.
    #[serde(default)]
    pub location: Option<String>,

    /// Tick side.
    #[serde(default = "default_ticklocation")]
    pub ticklocation: String,

    /// `uniform` or `proportional`.
    #[serde(default = "default_spacing")]
    pub spacing: String,

    /// Explicit tick values.
    #[serde(default)]
    pub ticks: Option<Vec<f32>>,

    /// Tick label format such as `%.2f`.
    #[serde(default)]
    pub format: Option<String>,

    /// Lines between bins.
    #[serde(default)]
    pub drawedges: bool,

    /// Draw the tiles.
    #[serde(default = "default_filled")]
    pub filled: bool,

    /// Axis label.
    #[serde(default)]
    pub label: String,

    /// `neither`, `min`, `max` or `both`.
    #[serde(default = "default_extend")]
    pub extend: String,

    /// Share of the parent axes given to the colorbar.
    #[serde(default = "default_fraction")]
    pub fraction: f32,

    /// Gap to the parent axes.
    #[serde(default)]
    pub pad: Option<f32>,

    /// Long-side scale.
    #[serde(default = "default_shrink")]
    pub shrink: f32,

    /// Long-to-short ratio.
    #[serde(default = "default_aspect")]
    pub aspect: f32,

    /// Colorbar anchor `[x, y]`.
    #[serde(default)]
    pub anchor: Option<(f32, f32)>,

    /// Parent anchor `[x, y]`.
    #[serde(default)]
    pub panchor: Option<(f32, f32)>,
}

fn default_hist_fraction() -> f32 {
    DEFAULT_HIST_FRACTION
}
fn default_ticklocation() -> String {
    "auto".to_string()
}
fn default_spacing() -> String {
    "uniform".to_string()
}
fn default_filled() -> bool {
    true
}
fn default_extend() -> String {
    "neither".to_string()
}
fn default_fraction() -> f32 {
    LayoutOptions::default().fraction
}
fn default_shrink() -> f32 {
    LayoutOptions::default().shrink
}
fn default_aspect() -> f32 {
    LayoutOptions::default().aspect
}

impl HistColorbarDocument {
    /// Parses a document from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the line number if parsing fails,
    /// including for unknown keys.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads a document from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Layout-only options.
    #[must_use]
    pub fn layout(&self) -> LayoutOptions {
        LayoutOptions {
            fraction: self.fraction,
            shrink: self.shrink,
            aspect: self.aspect,
            pad: self.pad,
            anchor: self.anchor,
            panchor: self.panchor,
        }
    }

    /// Widget options, with every string field parsed.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown names, malformed colors or formats, and
    /// anything [`HistColorbarConfig::validate`] rejects.
    pub fn config(&self) -> Result<HistColorbarConfig> {
        let mut colorbar = ColorbarOptions::new()
            .tick_location(self.ticklocation.parse()?)
            .spacing(self.spacing.parse()?)
            .drawedges(self.drawedges)
            .filled(self.filled)
            .label(self.label.clone())
            .extend(self.extend.parse()?);
        if let Some(orientation) = &self.orientation {
            colorbar = colorbar.orientation(orientation.parse()?);
        }
        if let Some(location) = &self.location {
            colorbar = colorbar.location(location.parse()?);
        }
        if let Some(ticks) = &self.ticks {
            colorbar = colorbar.ticks(ticks.clone());
        }
        if let Some(format) = &self.format {
            colorbar = colorbar.format(format.parse()?);
        }

        let config = HistColorbarConfig {
            bins: self.bins.clone().map(Bins::try_from).transpose()?.unwrap_or_default(),
            separate_hist: self.separate_hist,
            hist_fraction: self.hist_fraction,
            hist_color: self.hist_color.as_deref().map(Rgba::parse).transpose()?,
            alpha: self.alpha,
            colorbar,
        };
        config.validate()?;
        Ok(config)
    }

    /// Split into layout and widget options.
    ///
    /// # Errors
    ///
    /// See [`HistColorbarDocument::config`].
    pub fn split(&self) -> Result<(LayoutOptions, HistColorbarConfig)> {
        Ok((self.layout(), self.config()?))
    }
}
