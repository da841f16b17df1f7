//! Board capability.

/// Platform-specific one-shot collaborators of the boot decision.
pub trait Board {
    /// Header-phase receive budget in poll iterations.
    ///
    /// Calibrated proxy for elapsed time at the nominal system clock; no
    /// hardware timer runs while the loader waits.
    const HEADER_POLL_ITERATIONS: u32 = 3_000_000;

    /// One-shot clock/PLL and peripheral-clock bring-up.
    ///
    /// Must have completed, with a stable system clock, before the
    /// transport is configured.
    fn clock_init(&mut self);

    /// Missing-clock detect status.
    fn clock_fault(&self) -> bool;

    /// Copies the loader's code image into the reserved RAM execution
    /// window, word for word over a fixed extent.
    ///
    /// The loader erases the region it was loaded from; it must execute
    /// from memory disjoint from the region being reprogrammed.
    fn stage_loader(&mut self);

    /// Halts in place. No safe recovery path exists once the clock has
    /// failed.
    fn halt(&self) -> !;
}
