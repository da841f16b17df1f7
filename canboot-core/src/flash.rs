//! Non-volatile storage capability.

/// Erasing a sector failed.
#[derive(Clone, Copy, Debug)]
pub struct EraseError;

/// Programming one or more words failed.
#[derive(Clone, Copy, Debug)]
pub struct ProgramError;

/// Erase/program primitives of the program memory being reloaded.
///
/// Addresses are device word addresses; the loader advances its cursor by
/// exactly one per programmed word. Geometry mapping (byte addressing,
/// page layout) is the adapter's concern.
pub trait Flash {
    /// Erases one program-memory sector.
    fn erase_sector(&mut self, sector: u8) -> Result<(), EraseError>;

    /// Programs `words` starting at word address `addr`.
    ///
    /// The destination must have been erased. A failure may leave part of
    /// the range written; there is no rollback.
    fn program(&mut self, addr: u32, words: &[u16]) -> Result<(), ProgramError>;
}
