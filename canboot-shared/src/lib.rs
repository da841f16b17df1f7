//
// canboot: CAN boot-time firmware loader
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

//! canboot shared code.
//!
//! Wire-level definitions shared between the device-side loader engine
//! (`canboot-core`) and the host-side image tool (`canboot-pack`): the frame
//! codec, the status codes reported on the status channel and the fixed
//! addresses, keys and message identifiers of the bootload protocol.

#![no_std]

pub mod codec;
pub mod status;

pub use status::Status;

/// Key value expected as word 0 of the image header.
pub const IMAGE_KEY: u16 = 0x08AA;

/// Reserved header words following the key, received and discarded.
pub const RESERVED_WORDS: usize = 8;

/// Total header length in words: key, reserved words, entry address
/// high/low halves and the first block size.
pub const HEADER_WORDS: usize = 1 + RESERVED_WORDS + 2 + 1;

/// Expected Mode Key value.
///
/// The loader is re-entered on boot only while the persisted key region
/// holds exactly these four words; a successful load zeroes them.
pub const MODE_KEY: [u16; 4] = [0x4142, 0x4B53, 0x5543, 0x4B53];

/// Device word address of the Mode Key region.
pub const MODE_KEY_ADDR: u32 = 0x0000_07FC;

/// Device word address of the Boot Sentinel.
pub const SENTINEL_ADDR: u32 = 0x003F_6000;

/// Boot Sentinel value marking a fully committed image.
pub const SENTINEL_SUCCESS: u16 = 0xAAAA;

/// Entry point of the application image in program memory.
pub const APPLICATION_ENTRY: u32 = 0x003F_7FF6;

/// Distinguished loader return value meaning "abort to the safety fallback".
///
/// Never a valid application entry address.
pub const HARD_FAIL_ENTRY: u32 = 0x003D_7820;

/// Entry address returned after a program-primitive failure.
///
/// Distinct from [`HARD_FAIL_ENTRY`]: the caller jumps here like an
/// ordinary entry point.
pub const FALLBACK_LOAD_ENTRY: u32 = 0x003D_7800;

/// Program-memory sector erased before an image is accepted.
pub const APPLICATION_SECTOR: u8 = 0;

/// Standard identifier of the host-to-device data channel.
pub const DATA_MSG_ID: u16 = 0x1;

/// Standard identifier of the device-to-host status channel.
pub const STATUS_MSG_ID: u16 = 0x2;
