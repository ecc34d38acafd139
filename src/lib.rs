//! # histcolorbar
//!
//! Histogram colorbars: a colorbar whose tiles show how the mapped data is
//! distributed across the colormap.
//!
//! Built on the [trueno](https://crates.io/crates/trueno) core library. The
//! data extent is found with trueno vector reductions, each bin becomes a
//! row (or column) of the colorbar, and only as many tiles are filled as
//! that bin's count calls for. The result is a colormap legend and a
//! histogram in one widget.
//!
//! ## Features
//!
//! - **Histogram binning**: bin counts, explicit edges, or automatic rules
//!   (`auto`, `fd`, `doane`, `scott`, `stone`, `rice`, `sturges`, `sqrt`)
//! - **Composite mode**: histogram next to a flat colormap strip
//! - **Space stealing**: carve the colorbar axes out of a parent axes
//! - **Multiple Outputs**: PNG and SVG rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use histcolorbar::prelude::*;
//!
//! let data: Vec<f32> = (0..500).map(|i| (i as f32 * 0.37).sin() * 10.0).collect();
//! let mut fig = Figure::new(640, 480)?;
//! let ax = fig.add_subplot();
//! let mut image = ScalarMappable::from_data(data).with_axes(ax);
//! image.set_colormap(Colormap::magma());
//!
//! let config = HistColorbarConfig::new().bins(Bins::Count(24)).separate_hist(true);
//! let (cbar, cax) = histcolorbar(&mut fig, &mut image, None, None, &LayoutOptions::new(), config)?;
//!
//! let mut fb = Framebuffer::new(640, 480)?;
//! fb.clear(Rgba::WHITE);
//! cbar.render_axes(&mut fb, &fig, cax)?;
//! let png = PngEncoder::to_bytes(&fb)?;
//! assert!(!png.is_empty());
//! # Ok::<(), histcolorbar::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: trueno parallel backends
//! - `config`: YAML option documents
//! - `telemetry`: default `tracing` subscriber
//! - `full`: All features enabled

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types.
pub mod color;

/// Named colormaps with under/over/bad colors.
pub mod colormap;

/// Normalization and scale functions.
pub mod scale;

/// Histogram binning.
pub mod binning;

/// Tile grids and coordinate meshes.
pub mod mesh;

/// Data-to-color mapping objects.
pub mod mappable;

// ============================================================================
// Colorbar Modules
// ============================================================================

/// Generic colorbar substrate.
pub mod colorbar;

/// Histogram colorbar widget and entry point.
pub mod histcolorbar;

/// Figures, axes, and colorbar space stealing.
pub mod figure;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Core framebuffer for pixel rendering.
pub mod framebuffer;

/// Geometric primitives (points, lines, rectangles).
pub mod geometry;

/// Rasterization primitives.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

// ============================================================================
// Optional Modules
// ============================================================================

/// YAML option documents.
#[cfg(feature = "config")]
#[cfg_attr(docsrs, doc(cfg(feature = "config")))]
pub mod config;

/// Tracing subscriber setup.
pub mod telemetry;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for histcolorbar operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use histcolorbar::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::binning::{BinRule, Bins, HistogramCounts};
    pub use crate::color::Rgba;
    pub use crate::colorbar::{
        Colorbar, ColorbarOptions, FlatMesh, MeshProvider, Spacing, TickFormat, TickLocation,
    };
    pub use crate::colormap::Colormap;
    pub use crate::error::{Error, Result};
    pub use crate::figure::{make_axes, Axes, AxesId, Figure, LayoutOptions, Location};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::geometry::{Line, Point, Rect};
    pub use crate::histcolorbar::{
        histcolorbar, HistColorbar, HistColorbarConfig, HistogramMesh,
    };
    pub use crate::mappable::{ColorMappable, ScalarMappable};
    pub use crate::mesh::{Extend, Orientation, StripLayout, TileGrid};
    pub use crate::output::{PngEncoder, SvgEncoder};
    pub use crate::scale::{Norm, NormKind};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
