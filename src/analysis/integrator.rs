//! Velocity-time integration over one cycle.

/// Composite trapezoidal integral of `samples` with a fixed step `dt`.
///
/// Each velocity is clamped to zero first, so reverse flow and noise below
/// zero never subtract from the result. Returns `None` for buffers with
/// fewer than two samples, which have no interval to integrate.
pub fn integrate_cycle(samples: &[f64], dt: f64) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }

    let integral = samples
        .windows(2)
        .map(|pair| (pair[0].max(0.0) + pair[1].max(0.0)) / 2.0 * dt)
        .sum();

    Some(integral)
}
