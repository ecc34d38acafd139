//! Color-mappable data sources.
//!
//! A colorbar never owns the data it describes. It reads samples, the
//! colormap and the norm from a [`ColorMappable`], and borrows the norm
//! mutably only for scoped limit overrides.

use crate::color::Rgba;
use crate::colormap::Colormap;
use crate::error::Result;
use crate::figure::AxesId;
use crate::scale::Norm;

/// Anything that maps scalar data to colors.
pub trait ColorMappable {
    /// Sample values (may contain non-finite entries).
    fn array(&self) -> &[f32];

    /// Colormap used for the data.
    fn colormap(&self) -> &Colormap;

    /// Normalization shared with describing colorbars.
    fn norm(&self) -> &Norm;

    /// Mutable normalization access.
    fn norm_mut(&mut self) -> &mut Norm;

    /// Axes the data is drawn in, if any.
    fn axes(&self) -> Option<AxesId> {
        None
    }

    /// Map a data value to a color through the norm and colormap.
    ///
    /// # Errors
    ///
    /// Returns an error if the norm cannot normalize the value.
    fn to_rgba(&self, value: f32) -> Result<Rgba> {
        Ok(self.colormap().map(self.norm().normalize(value)?))
    }
}

/// Plain data + colormap + norm.
#[derive(Debug)]
pub struct ScalarMappable {
    data: Vec<f32>,
    cmap: Colormap,
    norm: Norm,
    axes: Option<AxesId>,
}

impl ScalarMappable {
    /// Create a mappable; unset norm limits are filled from the data.
    #[must_use]
    pub fn new(data: Vec<f32>, cmap: Colormap, mut norm: Norm) -> Self {
        norm.autoscale_none(&data);
        Self { data, cmap, norm, axes: None }
    }

    /// Create with the default colormap and a linear norm.
    #[must_use]
    pub fn from_data(data: Vec<f32>) -> Self {
        Self::new(data, Colormap::default(), Norm::linear())
    }

    /// Attach the mappable to an axes.
    #[must_use]
    pub fn with_axes(mut self, axes: AxesId) -> Self {
        self.axes = Some(axes);
        self
    }

    /// Replace the colormap.
    pub fn set_colormap(&mut self, cmap: Colormap) {
        self.cmap = cmap;
    }

    /// Replace the norm, autoscaling it to the data when unset.
    pub fn set_norm(&mut self, mut norm: Norm) {
        norm.autoscale_none(&self.data);
        self.norm = norm;
    }

    /// Change the color limits.
    pub fn set_clim(&mut self, vmin: f32, vmax: f32) {
        self.norm.set_limits(vmin, vmax);
    }
}

impl ColorMappable for ScalarMappable {
    fn array(&self) -> &[f32] {
        &self.data
    }

    fn colormap(&self) -> &Colormap {
        &self.cmap
    }

    fn norm(&self) -> &Norm {
        &self.norm
    }

    fn norm_mut(&mut self) -> &mut Norm {
        &mut self.norm
    }

    fn axes(&self) -> Option<AxesId> {
        self.axes
    }
}
