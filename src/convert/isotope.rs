use crate::toolkit::ToolkitError;

/// Coverage used when the caller passes no probability (isodist) or zero.
pub const FULL_COVERAGE: f64 = 0.9999;

/// Coverage used by the isotope plot when the caller passes none.
pub const PLOT_COVERAGE: f64 = 0.95;

/// Resolves the requested coverage probability; zero selects full coverage.
pub fn coverage(requested: Option<f64>, default: f64) -> f64 {
    match requested {
        Some(p) if p > 0.0 => p,
        Some(_) => FULL_COVERAGE,
        None => default,
    }
}

/// Checks the solver output and orders the peaks by ascending mass.
pub fn sorted_peaks(
    masses: Vec<f64>,
    probs: Vec<f64>,
) -> Result<(Vec<f64>, Vec<f64>), ToolkitError> {
    if masses.len() != probs.len() {
        return Err(ToolkitError::Protocol(format!(
            "isotope solver returned {} masses but {} probabilities",
            masses.len(),
            probs.len()
        )));
    }
    if let Some(bad) = probs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(ToolkitError::Protocol(format!(
            "isotope solver returned probability {} outside [0, 1]",
            bad
        )));
    }
    if masses.iter().any(|m| !m.is_finite()) {
        return Err(ToolkitError::Protocol(
            "isotope solver returned a non-finite mass".into(),
        ));
    }

    let mut peaks: Vec<(f64, f64)> = masses.into_iter().zip(probs).collect();
    peaks.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(peaks.into_iter().unzip())
}
