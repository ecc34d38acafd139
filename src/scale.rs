//! Normalization of data values to the `[0, 1]` interval consumed by a
//! [`Colormap`](crate::colormap::Colormap).
//!
//! A [`Norm`] is shared between a mappable and every colorbar that describes
//! it. Listeners registered with [`Norm::connect`] observe limit changes.
//! [`LimitsOverride`] changes the limits for the duration of a scope with
//! notifications blocked, and restores them when dropped.

use crate::error::{Error, Result};
use std::fmt;
use std::ops::Deref;
use tracing::trace;

/// How a [`Norm`] maps values to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub enum NormKind {
    /// Linear between vmin and vmax.
    Linear,
    /// Base-10 logarithmic between vmin and vmax (both positive).
    Log,
    /// Discrete regions between explicit boundaries.
    Boundary {
        /// Strictly increasing boundaries.
        boundaries: Vec<f32>,
    },
    /// Values are already normalized.
    Identity,
}

/// Limit change delivered to norm listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormChange {
    /// New lower limit.
    pub vmin: f32,
    /// New upper limit.
    pub vmax: f32,
}

type Listener = Box<dyn FnMut(&NormChange)>;

/// Listener registry with a block counter.
#[derive(Default)]
pub struct NormCallbacks {
    listeners: Vec<Listener>,
    blocked: usize,
}

impl NormCallbacks {
    fn emit(&mut self, change: &NormChange) {
        if self.blocked > 0 {
            trace!(vmin = change.vmin, vmax = change.vmax, "norm change suppressed");
            return;
        }
        for listener in &mut self.listeners {
            listener(change);
        }
    }

    /// Whether notifications are currently suppressed.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked > 0
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for NormCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormCallbacks")
            .field("listeners", &self.listeners.len())
            .field("blocked", &self.blocked)
            .finish()
    }
}

/// Value normalization with optional limits and change notification.
#[derive(Debug)]
pub struct Norm {
    kind: NormKind,
    limits: Option<(f32, f32)>,
    callbacks: NormCallbacks,
}

impl Norm {
    fn with_kind(kind: NormKind) -> Self {
        Self { kind, limits: None, callbacks: NormCallbacks::default() }
    }

    /// Linear normalization without limits (autoscaled on first use).
    #[must_use]
    pub fn linear() -> Self {
        Self::with_kind(NormKind::Linear)
    }

    /// Logarithmic normalization without limits.
    #[must_use]
    pub fn log() -> Self {
        Self::with_kind(NormKind::Log)
    }

    /// Identity normalization (values already in `[0, 1]`).
    #[must_use]
    pub fn identity() -> Self {
        let mut norm = Self::with_kind(NormKind::Identity);
        norm.limits = Some((0.0, 1.0));
        norm
    }

    /// Boundary normalization over explicit region boundaries.
    ///
    /// # Errors
    ///
    /// Returns an error unless there are at least two finite, strictly
    /// increasing boundaries.
    pub fn boundary(boundaries: Vec<f32>) -> Result<Self> {
        if boundaries.len() < 2 {
            return Err(Error::ScaleDomain("boundary norm needs at least two boundaries".to_string()));
        }
        if boundaries.iter().any(|b| !b.is_finite()) || boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::ScaleDomain(
                "boundaries must be finite and strictly increasing".to_string(),
            ));
        }
        let limits = (boundaries[0], boundaries[boundaries.len() - 1]);
        let mut norm = Self::with_kind(NormKind::Boundary { boundaries });
        norm.limits = Some(limits);
        Ok(norm)
    }

    /// Set initial limits without notifying listeners.
    #[must_use]
    pub fn with_limits(mut self, vmin: f32, vmax: f32) -> Self {
        self.limits = Some((vmin, vmax));
        self
    }

    /// The normalization kind.
    #[must_use]
    pub fn kind(&self) -> &NormKind {
        &self.kind
    }

    /// Current limits, if scaled.
    #[must_use]
    pub fn limits(&self) -> Option<(f32, f32)> {
        self.limits
    }

    /// Whether limits have been set.
    #[must_use]
    pub fn is_scaled(&self) -> bool {
        self.limits.is_some()
    }

    /// Whether [`Norm::inverse`] is defined for this kind.
    ///
    /// Boundary and identity norms are not inverted; callers interpolate
    /// linearly between the limits instead.
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        matches!(self.kind, NormKind::Linear | NormKind::Log)
    }

    /// Set the limits, notifying listeners unless blocked.
    pub fn set_limits(&mut self, vmin: f32, vmax: f32) {
        let changed = self.limits != Some((vmin, vmax));
        self.limits = Some((vmin, vmax));
        if changed {
            self.callbacks.emit(&NormChange { vmin, vmax });
        }
    }

    /// Fill unset limits from the finite extent of `data`.
    pub fn autoscale_none(&mut self, data: &[f32]) {
        if self.limits.is_some() {
            return;
        }
        let mut finite = data.iter().copied().filter(|v| v.is_finite());
        let Some(first) = finite.next() else {
            return;
        };
        let (lo, hi) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        self.set_limits(lo, hi);
    }

    /// Register a listener for limit changes.
    pub fn connect(&mut self, listener: impl FnMut(&NormChange) + 'static) {
        self.callbacks.listeners.push(Box::new(listener));
    }

    /// The listener registry.
    #[must_use]
    pub fn callbacks(&self) -> &NormCallbacks {
        &self.callbacks
    }

    fn scaled_limits(&self) -> Result<(f32, f32)> {
        self.limits.ok_or_else(|| Error::ScaleDomain("norm limits are not set".to_string()))
    }

    /// Map a value to `[0, 1]` (values outside the limits fall outside).
    ///
    /// Values a log norm cannot represent map to NaN, the missing-data value.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits are unset or invalid for the kind.
    pub fn normalize(&self, value: f32) -> Result<f32> {
        let (vmin, vmax) = self.scaled_limits()?;
        match &self.kind {
            NormKind::Linear => {
                if vmin > vmax {
                    return Err(Error::ScaleDomain("vmin must be less or equal to vmax".to_string()));
                }
                if vmin == vmax {
                    return Ok(0.0);
                }
                Ok((value - vmin) / (vmax - vmin))
            }
            NormKind::Log => {
                if vmin <= 0.0 || vmax <= 0.0 {
                    return Err(Error::ScaleDomain("Log norm limits must be positive".to_string()));
                }
                if vmin > vmax {
                    return Err(Error::ScaleDomain("vmin must be less or equal to vmax".to_string()));
                }
                if value <= 0.0 {
                    return Ok(f32::NAN);
                }
                if vmin == vmax {
                    return Ok(0.0);
                }
                let (lo, hi) = (vmin.log10(), vmax.log10());
                Ok((value.log10() - lo) / (hi - lo))
            }
            NormKind::Boundary { boundaries } => {
                let regions = boundaries.len() - 1;
                if value < boundaries[0] {
                    return Ok(-1.0);
                }
                if value >= boundaries[regions] {
                    return Ok(2.0);
                }
                let index = boundaries.partition_point(|&b| b <= value).saturating_sub(1);
                Ok((index as f32 + 0.5) / regions as f32)
            }
            NormKind::Identity => Ok(value),
        }
    }

    /// Map a normalized position back to a data value.
    ///
    /// # Errors
    ///
    /// Returns an error for non-invertible kinds, unset limits, or log limits
    /// that are not positive.
    pub fn inverse(&self, t: f32) -> Result<f32> {
        let (vmin, vmax) = self.scaled_limits()?;
        match &self.kind {
            NormKind::Linear => Ok(vmin + t * (vmax - vmin)),
            NormKind::Log => {
                if vmin <= 0.0 || vmax <= 0.0 {
                    return Err(Error::ScaleDomain("Log norm limits must be positive".to_string()));
                }
                Ok(vmin * (vmax / vmin).powf(t))
            }
            NormKind::Boundary { .. } | NormKind::Identity => {
                Err(Error::ScaleDomain("norm is not invertible".to_string()))
            }
        }
    }
}

/// Scoped override of a norm's limits.
///
/// While the guard lives, the norm reports the overridden limits and emits no
/// change notifications. Dropping the guard restores the previous limits and
/// re-enables notifications, on every exit path.
#[derive(Debug)]
pub struct LimitsOverride<'a> {
    norm: &'a mut Norm,
    saved: Option<(f32, f32)>,
}

impl<'a> LimitsOverride<'a> {
    /// Block notifications and set temporary limits.
    pub fn new(norm: &'a mut Norm, vmin: f32, vmax: f32) -> Self {
        norm.callbacks.blocked += 1;
        let saved = norm.limits;
        norm.set_limits(vmin, vmax);
        Self { norm, saved }
    }
}

impl Deref for LimitsOverride<'_> {
    type Target = Norm;

    fn deref(&self) -> &Norm {
        &*self.norm
    }
}

impl Drop for LimitsOverride<'_> {
    fn drop(&mut self) {
        self.norm.limits = self.saved;
        self.norm.callbacks.blocked -= 1;
    }
}
