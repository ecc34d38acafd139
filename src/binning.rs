//! Histogram binning.
//!
//! Supports fixed bin counts, explicit edges, and the automatic bin-width
//! rules of `numpy.histogram_bin_edges` (Sturges, Scott, Freedman-Diaconis,
//! Doane, Rice, square root, Stone, and `auto`).
//!
//! Non-finite samples (NaN, ±Inf) are dropped before anything else happens.
//!
//! # References
//!
//! - Sturges, H. A. (1926). "The Choice of a Class Interval." JASA 21(153).
//! - Scott, D. W. (1979). "On Optimal and Data-Based Histograms." Biometrika 66(3).
//! - Freedman, D., & Diaconis, P. (1981). "On the histogram as a density estimator."
//! - Doane, D. P. (1976). "Aesthetic Frequency Classifications." The American Statistician 30(4).

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};
use trueno::Vector;

/// Upper limit on the number of bins a directive may produce.
pub const MAX_BINS: usize = 1 << 20;

/// Automatic bin-width rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinRule {
    /// Minimum of Sturges and Freedman-Diaconis (Sturges when the IQR is zero).
    #[default]
    Auto,
    /// Freedman-Diaconis rule: 2 * IQR / n^(1/3)
    FreedmanDiaconis,
    /// Doane's skewness-corrected Sturges rule.
    Doane,
    /// Scott's rule: (24 * sqrt(pi) / n)^(1/3) * std
    Scott,
    /// Stone's leave-one-out cross-validation estimate.
    Stone,
    /// Rice rule: ptp / (2 * n^(1/3))
    Rice,
    /// Sturges' rule: ptp / (log2(n) + 1)
    Sturges,
    /// Square-root rule: ptp / sqrt(n)
    Sqrt,
}

impl BinRule {
    /// Canonical name of the rule.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::FreedmanDiaconis => "fd",
            Self::Doane => "doane",
            Self::Scott => "scott",
            Self::Stone => "stone",
            Self::Rice => "rice",
            Self::Sturges => "sturges",
            Self::Sqrt => "sqrt",
        }
    }

    /// Bin width suggested for `data` over `range`. Zero means "one bin".
    fn width(self, data: &[f32], range: (f64, f64)) -> f64 {
        let n = data.len() as f64;
        match self {
            Self::Sturges => ptp(data) / (n.log2() + 1.0),
            Self::Sqrt => ptp(data) / n.sqrt(),
            Self::Rice => ptp(data) / (2.0 * n.cbrt()),
            Self::Scott => (24.0 * std::f64::consts::PI.sqrt() / n).cbrt() * std_dev(data),
            Self::FreedmanDiaconis => {
                let iqr = percentile(data, 75.0) - percentile(data, 25.0);
                2.0 * iqr * n.powf(-1.0 / 3.0)
            }
            Self::Doane => doane_width(data),
            Self::Stone => stone_width(data, range),
            Self::Auto => {
                let fd = Self::FreedmanDiaconis.width(data, range);
                let sturges = Self::Sturges.width(data, range);
                if fd > 0.0 {
                    fd.min(sturges)
                } else {
                    sturges
                }
            }
        }
    }
}

impl fmt::Display for BinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "fd" | "freedman-diaconis" => Ok(Self::FreedmanDiaconis),
            "doane" => Ok(Self::Doane),
            "scott" => Ok(Self::Scott),
            "stone" => Ok(Self::Stone),
            "rice" => Ok(Self::Rice),
            "sturges" => Ok(Self::Sturges),
            "sqrt" => Ok(Self::Sqrt),
            other => Err(Error::InvalidBins(format!("unknown binning rule '{other}'"))),
        }
    }
}

/// Binning directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    /// Fixed number of equal-width bins over the data range.
    Count(usize),
    /// Explicit edges, including the rightmost edge.
    Edges(Vec<f32>),
    /// Automatic bin-width rule.
    Rule(BinRule),
}

impl Default for Bins {
    fn default() -> Self {
        Self::Rule(BinRule::Auto)
    }
}

impl From<usize> for Bins {
    fn from(count: usize) -> Self {
        Self::Count(count)
    }
}

impl From<Vec<f32>> for Bins {
    fn from(edges: Vec<f32>) -> Self {
        Self::Edges(edges)
    }
}

impl From<BinRule> for Bins {
    fn from(rule: BinRule) -> Self {
        Self::Rule(rule)
    }
}

impl FromStr for Bins {
    type Err = Error;

    /// Parses an integer bin count or a rule name.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<usize>() {
            Ok(count) => Ok(Self::Count(count)),
            Err(_) => s.parse::<BinRule>().map(Self::Rule),
        }
    }
}

impl Bins {
    /// Check the directive independently of any data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBins`] for a zero or excessive count, or for
    /// edges that are fewer than two, non-finite, or not strictly increasing.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Count(0) => Err(Error::InvalidBins("bin count must be positive".to_string())),
            Self::Count(count) if *count > MAX_BINS => {
                Err(Error::InvalidBins(format!("bin count {count} exceeds {MAX_BINS}")))
            }
            Self::Count(_) | Self::Rule(_) => Ok(()),
            Self::Edges(edges) => {
                if edges.len() < 2 {
                    return Err(Error::InvalidBins("at least two bin edges are required".to_string()));
                }
                if edges.iter().any(|e| !e.is_finite()) {
                    return Err(Error::InvalidBins("bin edges must be finite".to_string()));
                }
                if edges.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(Error::InvalidBins("bins must increase monotonically".to_string()));
                }
                Ok(())
            }
        }
    }
}

/// Bin edges and per-bin counts of a sample array.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramCounts {
    edges: Vec<f32>,
    counts: Vec<usize>,
    excluded: usize,
}

impl HistogramCounts {
    /// Bin edges (one more than the number of bins).
    #[must_use]
    pub fn edges(&self) -> &[f32] {
        &self.edges
    }

    /// Per-bin counts.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of bins.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    /// Midpoint of each bin.
    #[must_use]
    pub fn centers(&self) -> Vec<f32> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Largest bin count (zero when every bin is empty).
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Number of non-finite samples dropped before binning.
    #[must_use]
    pub const fn excluded(&self) -> usize {
        self.excluded
    }
}

/// Copy of `data` without NaN and infinite values.
#[must_use]
pub fn finite_samples(data: &[f32]) -> Vec<f32> {
    data.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Compute bin edges for already finite samples.
///
/// # Errors
///
/// Returns [`Error::InvalidBins`] if the directive is invalid or resolves to
/// more than [`MAX_BINS`] bins.
pub fn histogram_bin_edges(finite: &[f32], bins: &Bins) -> Result<Vec<f32>> {
    bins.validate()?;

    let (first, last) = outer_edges(finite);
    let n_bins = match bins {
        Bins::Edges(edges) => return Ok(edges.clone()),
        Bins::Count(count) => *count,
        Bins::Rule(rule) => {
            if finite.is_empty() {
                1
            } else {
                let width = rule.width(finite, (first, last));
                if width > 0.0 && width.is_finite() {
                    let n = ((last - first) / width).ceil();
                    if n > MAX_BINS as f64 {
                        return Err(Error::InvalidBins(format!(
                            "rule '{rule}' produced {n} bins, more than {MAX_BINS}"
                        )));
                    }
                    (n as usize).max(1)
                } else {
                    1
                }
            }
        }
    };

    Ok(linspace(first, last, n_bins))
}

/// Histogram `samples` with the given directive.
///
/// Non-finite samples are excluded. Counts cover `[edge[i], edge[i+1])`
/// with the last bin closed; samples outside explicit edges are not counted.
///
/// # Errors
///
/// Returns [`Error::InvalidBins`] if the directive is invalid.
pub fn histogram(samples: &[f32], bins: &Bins) -> Result<HistogramCounts> {
    let finite = finite_samples(samples);
    let excluded = samples.len() - finite.len();
    let edges = histogram_bin_edges(&finite, bins)?;
    let counts = count_into(&edges, &finite);

    if finite.is_empty() {
        warn!(samples = samples.len(), "no finite samples to histogram");
    }
    debug!(
        samples = samples.len(),
        excluded,
        bins = counts.len(),
        max_count = counts.iter().copied().max().unwrap_or(0),
        "computed histogram"
    );

    Ok(HistogramCounts { edges, counts, excluded })
}

// ============================================================================
// Internals
// ============================================================================

fn count_into(edges: &[f32], samples: &[f32]) -> Vec<usize> {
    let bins = edges.len() - 1;
    let (lo, hi) = (edges[0], edges[bins]);
    let mut counts = vec![0usize; bins];
    for &x in samples {
        if x < lo || x > hi {
            continue;
        }
        let index = edges.partition_point(|&e| e <= x).saturating_sub(1).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

fn linspace(first: f64, last: f64, n_bins: usize) -> Vec<f32> {
    let mut edges: Vec<f32> = (0..=n_bins)
        .map(|i| (first + (last - first) * i as f64 / n_bins as f64) as f32)
        .collect();
    edges[n_bins] = last as f32;
    edges
}

fn extent(data: &[f32]) -> Option<(f32, f32)> {
    if data.is_empty() {
        return None;
    }
    let v = Vector::from_vec(data.to_vec());
    match (v.min(), v.max()) {
        (Ok(lo), Ok(hi)) => Some((lo, hi)),
        _ => Some(data.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        })),
    }
}

/// Outer range of the histogram: data extent, (0, 1) when empty, and
/// widened by 0.5 on each side when constant.
fn outer_edges(finite: &[f32]) -> (f64, f64) {
    match extent(finite) {
        None => (0.0, 1.0),
        Some((lo, hi)) if lo == hi => (f64::from(lo) - 0.5, f64::from(hi) + 0.5),
        Some((lo, hi)) => (f64::from(lo), f64::from(hi)),
    }
}

fn ptp(data: &[f32]) -> f64 {
    extent(data).map_or(0.0, |(lo, hi)| f64::from(hi) - f64::from(lo))
}

fn mean(data: &[f32]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().map(|&x| f64::from(x)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation.
fn std_dev(data: &[f32]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let variance =
        data.iter().map(|&x| (f64::from(x) - m).powi(2)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(data: &[f32], q: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f32::total_cmp);
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    f64::from(sorted[lo]) + (f64::from(sorted[hi]) - f64::from(sorted[lo])) * frac
}

fn doane_width(data: &[f32]) -> f64 {
    let n = data.len() as f64;
    if data.len() <= 2 {
        return 0.0;
    }
    let sg1 = (6.0 * (n - 2.0) / ((n + 1.0) * (n + 3.0))).sqrt();
    let sigma = std_dev(data);
    if sigma <= 0.0 {
        return 0.0;
    }
    let m = mean(data);
    let g1 = data.iter().map(|&x| ((f64::from(x) - m) / sigma).powi(3)).sum::<f64>() / n;
    ptp(data) / (1.0 + n.log2() + (1.0 + g1.abs() / sg1).log2())
}

fn stone_width(data: &[f32], range: (f64, f64)) -> f64 {
    let n = data.len();
    let spread = ptp(data);
    if n <= 1 || spread == 0.0 {
        return 0.0;
    }

    let cost = |n_bins: usize| {
        let hh = spread / n_bins as f64;
        let edges = linspace(range.0, range.1, n_bins);
        let sum_sq: f64 = count_into(&edges, data)
            .iter()
            .map(|&c| {
                let p = c as f64 / n as f64;
                p * p
            })
            .sum();
        (2.0 - (n as f64 + 1.0) * sum_sq) / hh
    };

    let upper = 100usize.max((n as f64).sqrt() as usize);
    let mut best = (1, cost(1));
    for n_bins in 2..=upper {
        let c = cost(n_bins);
        if c < best.1 {
            best = (n_bins, c);
        }
    }
    if best.0 == upper {
        warn!(upper, "stone rule reached the bin search upper bound");
    }
    spread / best.0 as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    #[test]
    fn test_fixed_count() {
        let hist = histogram(&[1.0, 2.0, 3.0, 4.0, 5.0], &Bins::Count(4)).unwrap();
        assert_eq!(hist.edges(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(hist.counts(), &[1, 1, 1, 2]);
        assert_eq!(hist.total(), 5);
    }

    #[test]
    fn test_last_bin_closed() {
        let hist = histogram(&[0.0, 1.0, 1.0], &Bins::Edges(vec![0.0, 0.5, 1.0])).unwrap();
        assert_eq!(hist.counts(), &[1, 2]);
    }

    #[test]
    fn test_explicit_edges_exclude_outside() {
        let hist = histogram(&[-5.0, 0.1, 0.2, 0.9, 7.0], &Bins::Edges(vec![0.0, 0.5, 1.0])).unwrap();
        assert_eq!(hist.counts(), &[2, 1]);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_auto_ramp_matches_numpy() {
        // numpy.histogram(np.arange(100), bins='auto') has 8 bins.
        let hist = histogram(&ramp(100), &Bins::default()).unwrap();
        assert_eq!(hist.bin_count(), 8);
        assert_eq!(hist.edges()[0], 0.0);
        assert_eq!(hist.edges()[8], 99.0);
        assert_eq!(hist.total(), 100);
    }

    #[test]
    fn test_sturges_ramp() {
        // 99 / (log2(100) + 1) = 12.95 -> ceil(99 / 12.95) = 8
        let edges = histogram_bin_edges(&ramp(100), &Bins::Rule(BinRule::Sturges)).unwrap();
        assert_eq!(edges.len(), 9);
    }

    #[test]
    fn test_sqrt_rule() {
        // 49 / sqrt(50) = 6.93 -> ceil(7.07) = 8 bins
        let edges = histogram_bin_edges(&ramp(50), &Bins::Rule(BinRule::Sqrt)).unwrap();
        assert_eq!(edges.len(), 9);
    }

    #[test]
    fn test_rice_rule() {
        // ptp / (2 * 100^(1/3)) = 10.66 -> 10 bins
        let edges = histogram_bin_edges(&ramp(100), &Bins::Rule(BinRule::Rice)).unwrap();
        assert_eq!(edges.len(), 11);
    }

    #[test]
    fn test_every_rule_produces_valid_edges() {
        let data: Vec<f32> = (0..500).map(|i| ((i * 37) % 101) as f32 * 0.5).collect();
        for rule in [
            BinRule::Auto,
            BinRule::FreedmanDiaconis,
            BinRule::Doane,
            BinRule::Scott,
            BinRule::Stone,
            BinRule::Rice,
            BinRule::Sturges,
            BinRule::Sqrt,
        ] {
            let hist = histogram(&data, &Bins::Rule(rule)).unwrap();
            assert!(hist.bin_count() >= 1, "rule {rule}");
            assert_eq!(hist.total(), data.len(), "rule {rule}");
        }
    }

    #[test]
    fn test_constant_data_single_bin() {
        let hist = histogram(&[10.0; 25], &Bins::default()).unwrap();
        assert_eq!(hist.bin_count(), 1);
        assert_eq!(hist.counts(), &[25]);
        assert_eq!(hist.edges(), &[9.5, 10.5]);
        assert_eq!(hist.max_count(), 25);
    }

    #[test]
    fn test_empty_data() {
        let hist = histogram(&[], &Bins::default()).unwrap();
        assert_eq!(hist.bin_count(), 1);
        assert_eq!(hist.edges(), &[0.0, 1.0]);
        assert_eq!(hist.max_count(), 0);

        let hist = histogram(&[f32::NAN, f32::INFINITY], &Bins::Count(5)).unwrap();
        assert_eq!(hist.bin_count(), 5);
        assert_eq!(hist.total(), 0);
        assert_eq!(hist.excluded(), 2);
    }

    #[test]
    fn test_non_finite_excluded() {
        let mut data = ramp(100);
        data[0] = f32::NAN;
        data[55] = f32::INFINITY;
        data[70] = f32::NEG_INFINITY;
        let dirty = histogram(&data, &Bins::default()).unwrap();
        let clean = histogram(&finite_samples(&data), &Bins::default()).unwrap();
        assert_eq!(dirty.edges(), clean.edges());
        assert_eq!(dirty.counts(), clean.counts());
        assert_eq!(dirty.excluded(), 3);
    }

    #[test]
    fn test_centers() {
        let hist = histogram(&[0.0, 4.0], &Bins::Count(2)).unwrap();
        assert_eq!(hist.centers(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_invalid_directives() {
        assert!(matches!(Bins::Count(0).validate(), Err(Error::InvalidBins(_))));
        assert!(Bins::Count(MAX_BINS + 1).validate().is_err());
        assert!(Bins::Edges(vec![1.0]).validate().is_err());
        assert!(Bins::Edges(vec![0.0, 2.0, 1.0]).validate().is_err());
        assert!(Bins::Edges(vec![0.0, 1.0, 1.0]).validate().is_err());
        assert!(Bins::Edges(vec![0.0, f32::NAN]).validate().is_err());
        assert!(histogram(&[1.0], &Bins::Count(0)).is_err());
    }

    #[test]
    fn test_parse_bins() {
        assert_eq!("12".parse::<Bins>().unwrap(), Bins::Count(12));
        assert_eq!("fd".parse::<Bins>().unwrap(), Bins::Rule(BinRule::FreedmanDiaconis));
        assert_eq!("Auto".parse::<Bins>().unwrap(), Bins::Rule(BinRule::Auto));
        assert!("blocks".parse::<Bins>().is_err());
    }

    #[test]
    fn test_percentile_linear() {
        let data = ramp(100);
        assert!((percentile(&data, 25.0) - 24.75).abs() < 1e-9);
        assert!((percentile(&data, 75.0) - 74.25).abs() < 1e-9);
    }

    #[test]
    fn test_doane_small_samples() {
        assert_eq!(doane_width(&[1.0, 2.0]), 0.0);
        assert_eq!(doane_width(&[3.0, 3.0, 3.0]), 0.0);
    }
}

// ============================================================================
// Property-based tests with proptest
// ============================================================================
