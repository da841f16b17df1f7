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

//! canboot firmware for STM32F103.

#![no_std]
#![no_main]

mod board;
mod can;
mod clock;
mod flash;
mod map;
mod relocate;
mod store;
mod watchdog;

use defmt_rtt as _;
use panic_probe as _;

use cortex_m_rt::entry;

use canboot_core::boot::{decide_and_boot, Boot};
use canboot_shared as shared;

#[entry]
fn main() -> ! {
    defmt::info!("canboot {}", env!("CARGO_PKG_VERSION"));
    defmt::info!("data id:     0x{:x}", shared::DATA_MSG_ID);
    defmt::info!("status id:   0x{:x}", shared::STATUS_MSG_ID);
    defmt::info!("user flash:  0x{:08x} - 0x{:08x}", map::USER_FLASH_START, map::USER_FLASH_END);

    let mut board = board::FwBoard::new();
    let mut transport = can::Can::new();
    let mut flash = flash::FlashBank::new();
    let mut watchdog = watchdog::Iwdg::new();
    let mut store = store::Store::new();

    let boot = decide_and_boot(&mut board, &mut transport, &mut flash, &mut watchdog, &mut store);
    defmt::info!("boot disposition: {}", boot);

    match boot {
        Boot::Application(entry) => start(map::byte_addr(entry)),
        // No fallback image exists on this binding; a reset gives the
        // host another attempt.
        Boot::Fallback => cortex_m::peripheral::SCB::sys_reset(),
    }
}

/// Transfers control to the vector table at `address`. One-way.
fn start(address: u32) -> ! {
    defmt::info!("starting program at 0x{:08x}", address);
    unsafe {
        let cp = cortex_m::Peripherals::steal();
        cp.SCB.vtor.write(address);
        cortex_m::asm::bootload(address as *const u32);
    }
}
