/// Geometric cooling schedule over sweeps.
///
/// Schedule
///     T(s) = T_max * (T_min / T_max)^(s / (S - 1))
/// so that T(0) = T_max and T(S-1) = T_min exactly. A single-sweep
/// schedule stays at T_max.
pub(crate) fn temperature(t_max: f64, t_min: f64, num_sweeps: usize, sweep: usize) -> f64 {
    debug_assert!(t_max > 0.0 && t_min > 0.0, "temperatures must be > 0");
    debug_assert!(sweep < num_sweeps, "sweep index out of schedule");

    if num_sweeps <= 1 {
        return t_max;
    }
    t_max * (t_min / t_max).powf(sweep as f64 / (num_sweeps - 1) as f64)
}
