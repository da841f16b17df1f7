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

//! canboot protocol engine.
//!
//! The hardware-independent half of the bootloader: the boot decision, the
//! image loader state machine and the capabilities they consume. Every
//! peripheral the loader touches (bus transport, non-volatile storage,
//! watchdog, clock and relocation plumbing) is behind a trait, so the engine
//! carries no hardware-specific state and runs unchanged against the
//! register-level adapters of `canboot-fw` or against in-memory fakes in the
//! test suite.

#![no_std]

pub mod board;
pub mod boot;
pub mod flash;
pub mod loader;
pub mod poll;
pub mod store;
pub mod transport;
pub mod watchdog;
