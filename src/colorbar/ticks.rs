//! Tick location and label formatting for the colorbar's long axis.

use super::options::TickFormat;

/// Upper bound on automatically located ticks.
pub const MAX_TICKS: usize = 9;

/// A tick on the long axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Data value.
    pub value: f32,
    /// Position along the long axis in `[0, 1]`.
    pub position: f32,
    /// Formatted label.
    pub label: String,
}

/// Round a raw step up to 1, 2, 5 or 10 times a power of ten.
#[must_use]
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let pow10 = 10.0_f64.powf(raw.log10().floor());
    let norm = raw / pow10;
    let mult = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    mult * pow10
}

/// Evenly stepped ticks covering `[vmin, vmax]`, at most `max_ticks` of them.
///
/// Returns the ticks and the step between them.
#[must_use]
pub fn linear_ticks(vmin: f32, vmax: f32, max_ticks: usize) -> (Vec<f32>, f64) {
    let (lo, hi) = (f64::from(vmin.min(vmax)), f64::from(vmin.max(vmax)));
    if !lo.is_finite() || !hi.is_finite() {
        return (Vec::new(), 0.0);
    }
    if lo == hi {
        return (vec![vmin], 0.0);
    }

    let intervals = max_ticks.max(2) - 1;
    let step = nice_step((hi - lo) / intervals as f64);
    let first = (lo / step).ceil();
    let tolerance = step * 1e-9;

    let ticks = (0..)
        .map(|k| (first + f64::from(k)) * step)
        .take_while(|&v| v <= hi + tolerance)
        .map(|v| if v.abs() < tolerance { 0.0 } else { v as f32 })
        .collect();
    (ticks, step)
}

/// Decade ticks for a logarithmic axis.
///
/// Falls back to [`linear_ticks`] when fewer than two decades are covered.
#[must_use]
pub fn log_ticks(vmin: f32, vmax: f32, max_ticks: usize) -> Vec<f32> {
    let (lo, hi) = (vmin.min(vmax), vmin.max(vmax));
    if lo <= 0.0 || !hi.is_finite() {
        return linear_ticks(vmin, vmax, max_ticks).0;
    }
    let first = (f64::from(lo).log10() - 1e-6).ceil() as i32;
    let last = (f64::from(hi).log10() + 1e-6).floor() as i32;
    if last - first < 1 {
        return linear_ticks(vmin, vmax, max_ticks).0;
    }

    let decades = (last - first + 1) as usize;
    let stride = decades.div_ceil(max_ticks.max(1)).max(1);
    (first..=last)
        .step_by(stride)
        .map(|exp| 10.0_f64.powi(exp) as f32)
        .collect()
}

/// Format a tick value. `step` is the spacing used to choose decimals in
/// [`TickFormat::Auto`].
#[must_use]
pub fn format_tick(value: f32, format: TickFormat, step: f64) -> String {
    let label = match format {
        TickFormat::Auto => {
            let decimals = if step > 0.0 && step < 1.0 {
                ((-step.log10()) - 1e-9).ceil().clamp(0.0, 6.0) as usize
            } else {
                0
            };
            format!("{value:.decimals$}")
        }
        TickFormat::Decimals(decimals) => format!("{value:.decimals$}"),
        TickFormat::Scientific(decimals) => format!("{value:.decimals$e}"),
    };

    match label.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nice_step() {
        assert_relative_eq!(nice_step(1.25), 2.0);
        assert_relative_eq!(nice_step(0.3), 0.5);
        assert_relative_eq!(nice_step(7.0), 10.0);
        assert_relative_eq!(nice_step(100.0), 100.0);
        assert_relative_eq!(nice_step(-1.0), 1.0);
    }

    #[test]
    fn test_linear_ticks() {
        let (ticks, step) = linear_ticks(0.0, 10.0, MAX_TICKS);
        assert_relative_eq!(step, 2.0);
        assert_eq!(ticks, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_linear_ticks_fractional() {
        let (ticks, _) = linear_ticks(0.0, 1.0, MAX_TICKS);
        assert_eq!(ticks.len(), 6);
        assert_relative_eq!(ticks[3], 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_ticks_offset_range() {
        let (ticks, _) = linear_ticks(-3.3, 7.1, MAX_TICKS);
        assert!(ticks.len() <= MAX_TICKS);
        assert!(ticks.iter().all(|&t| (-3.3..=7.1).contains(&t)));
        assert!(ticks.contains(&0.0));
    }

    #[test]
    fn test_linear_ticks_degenerate() {
        assert_eq!(linear_ticks(4.0, 4.0, MAX_TICKS).0, vec![4.0]);
        assert!(linear_ticks(f32::NAN, 1.0, MAX_TICKS).0.is_empty());
    }

    #[test]
    fn test_log_ticks() {
        assert_eq!(log_ticks(1.0, 1000.0, MAX_TICKS), vec![1.0, 10.0, 100.0, 1000.0]);
        let narrow = log_ticks(2.0, 8.0, MAX_TICKS);
        assert!(!narrow.is_empty());
        assert!(narrow.iter().all(|&t| (2.0..=8.0).contains(&t)));
    }

    #[test]
    fn test_log_ticks_stride() {
        let ticks = log_ticks(1e-10, 1e10, 5);
        assert!(ticks.len() <= 5);
        assert_relative_eq!(ticks[0], 1e-10, max_relative = 1e-5);
    }

    #[test]
    fn test_format_auto() {
        assert_eq!(format_tick(0.2, TickFormat::Auto, 0.2), "0.2");
        assert_eq!(format_tick(0.1, TickFormat::Auto, 0.1), "0.1");
        assert_eq!(format_tick(0.05, TickFormat::Auto, 0.05), "0.05");
        assert_eq!(format_tick(40.0, TickFormat::Auto, 20.0), "40");
    }

    #[test]
    fn test_format_fixed_and_scientific() {
        assert_eq!(format_tick(1.23456, TickFormat::Decimals(2), 1.0), "1.23");
        assert_eq!(format_tick(1500.0, TickFormat::Scientific(1), 1.0), "1.5e3");
    }

    #[test]
    fn test_format_negative_zero() {
        assert_eq!(format_tick(-0.0001, TickFormat::Decimals(1), 1.0), "0.0");
    }
}
