//! Watchdog capability.

/// Bare watchdog primitives.
///
/// The watchdog stays disabled for the whole duration of a load and is only
/// re-armed at successful finalization; a load left waiting for an absent
/// host stalls the boot instead of resetting.
pub trait Watchdog {
    /// Disables the watchdog.
    fn disable(&mut self);

    /// Enables the watchdog.
    fn enable(&mut self);

    /// Services the watchdog counter.
    fn service(&mut self);
}
