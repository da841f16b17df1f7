//! Persistent boot store.
//!
//! The two sentinel values the boot decision runs on, behind explicit
//! read/write operations instead of scattered fixed-address accesses. The
//! addresses themselves are configuration constants in `canboot-shared`.

/// Access to the persisted Boot Sentinel and Mode Key regions.
pub trait BootStore {
    /// Reads the Boot Sentinel word.
    ///
    /// Equals [`canboot_shared::SENTINEL_SUCCESS`] only after a fully
    /// validated image has been committed.
    fn sentinel(&self) -> u16;

    /// Reads the four Mode Key words.
    fn mode_key(&self) -> [u16; 4];

    /// Overwrites the Mode Key region with four zero words, so the loader
    /// is not re-entered on the next boot.
    fn consume_mode_key(&mut self);

    /// Programs the Boot Sentinel to its success value.
    ///
    /// Called exactly once, after all application data is committed. A
    /// program failure here is not reported; the next boot simply re-enters
    /// the loader.
    fn mark_success(&mut self);
}
