//! Boot decision and relocation.
//!
//! Runs first out of reset. Either the persistent boot state says a
//! completed image exists and no reload was requested, in which case the
//! device boots normally, or the loader is staged into its RAM execution
//! window and invoked. The final one-way control transfer is left to the
//! platform entry point, which consumes the returned [`Boot`] value.

use canboot_shared as shared;

use crate::{
    board::Board, flash::Flash, loader::Loader, poll::PollBudget, store::BootStore,
    transport::Transport, watchdog::Watchdog,
};

/// Final disposition of one boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Boot {
    /// Transfer control to the program at this entry address.
    Application(u32),
    /// Hard load failure: branch to the platform fallback vector.
    Fallback,
}

/// Decides whether to boot the application or accept a new image, and runs
/// the loader if so.
///
/// The Boot Sentinel alone does not skip the loader: it is cross-checked
/// against the Mode Key, so a single corrupted flag cannot strand the
/// device. With the sentinel armed and the key consumed, every subsequent
/// boot deterministically returns the application entry.
pub fn decide_and_boot<B, T, F, W, S>(
    board: &mut B,
    transport: &mut T,
    flash: &mut F,
    watchdog: &mut W,
    store: &mut S,
) -> Boot
where
    B: Board,
    T: Transport,
    F: Flash,
    W: Watchdog,
    S: BootStore,
{
    if store.sentinel() == shared::SENTINEL_SUCCESS && store.mode_key() != shared::MODE_KEY {
        // A completed image exists and no reload was requested.
        log::info!("application image present, booting");
        return Boot::Application(shared::APPLICATION_ENTRY);
    }

    log::info!("load requested, staging loader");
    board.clock_init();
    board.stage_loader();
    watchdog.disable();

    if board.clock_fault() {
        // Continuing at an unspecified clock rate risks corrupting the
        // very memory being reprogrammed.
        log::error!("missing clock detected, halting");
        board.halt();
    }

    transport.configure();

    let budget = PollBudget::iterations(B::HEADER_POLL_ITERATIONS);
    let entry = Loader::new(transport, flash, watchdog, store, budget).run();

    if entry == shared::HARD_FAIL_ENTRY {
        Boot::Fallback
    } else {
        Boot::Application(entry)
    }
}
