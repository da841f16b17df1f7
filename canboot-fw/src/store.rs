//! Persistent boot store binding.
//!
//! The Boot Sentinel lives in the reprogrammable flash window and is
//! written with the same program primitive as application data. The Mode
//! Key lives in battery-backed backup registers, where the application
//! writes it before requesting a reload by software reset.

use core::ptr;
use stm32f1::stm32f103::Peripherals;

use canboot_core::store::BootStore;
use canboot_shared as shared;

use crate::{flash::FlashBank, map};

/// First backup data register holding the Mode Key.
const MODE_KEY_REG: usize = 1;

/// Sentinel and Mode Key access.
pub struct Store {
    dp: Peripherals,
}

impl Store {
    /// Enables backup domain access and takes the store.
    pub fn new() -> Self {
        let dp = unsafe { Peripherals::steal() };
        dp.RCC.apb1enr.modify(|_, w| w.pwren().enabled().bkpen().enabled());
        Self { dp }
    }

    fn write_key_word(&mut self, reg: usize, data: u16) {
        self.dp.PWR.cr.modify(|_, w| w.dbp().set_bit());
        self.dp.BKP.dr[reg].write(|w| w.d().bits(data));
        self.dp.PWR.cr.modify(|_, w| w.dbp().clear_bit());
    }
}

impl BootStore for Store {
    fn sentinel(&self) -> u16 {
        unsafe { ptr::read_volatile(map::sentinel_addr() as *const u16) }
    }

    fn mode_key(&self) -> [u16; 4] {
        let mut key = [0; 4];
        for (i, word) in key.iter_mut().enumerate() {
            *word = self.dp.BKP.dr[MODE_KEY_REG + i].read().d().bits();
        }
        key
    }

    fn consume_mode_key(&mut self) {
        for i in 0..4 {
            self.write_key_word(MODE_KEY_REG + i, 0);
        }
    }

    fn mark_success(&mut self) {
        // The loader's own flash handle is done programming by the time
        // finalize runs; a short-lived handle re-unlocks for this word.
        let mut flash = FlashBank::new();
        if flash.write(map::sentinel_addr(), shared::SENTINEL_SUCCESS).is_err() {
            defmt::warn!("sentinel program failed; loader will re-enter on next boot");
        }
    }
}
