//! Device address map.
//!
//! The wire protocol addresses program memory in 16-bit words of the
//! target's word-addressed space; this binding places the reprogrammable
//! window at a fixed offset in on-chip flash, two bytes per word.

use canboot_shared as shared;

/// First word address of the reprogrammable window.
pub const WINDOW_START: u32 = 0x003E_8000;

/// Last word address of the reprogrammable window (exclusive).
pub const WINDOW_END: u32 = 0x003F_8000;

/// Byte address in on-chip flash backing the start of the window.
pub const USER_FLASH_START: u32 = 0x0800_4000;

/// Byte address of the end of the user flash region (exclusive).
pub const USER_FLASH_END: u32 =
    USER_FLASH_START + (WINDOW_END - WINDOW_START) * 2;

/// Maps a protocol word address into an on-chip byte address.
pub fn byte_addr(word_addr: u32) -> u32 {
    USER_FLASH_START + word_addr.wrapping_sub(WINDOW_START) * 2
}

/// Byte address of the Boot Sentinel word.
pub fn sentinel_addr() -> u32 {
    byte_addr(shared::SENTINEL_ADDR)
}
