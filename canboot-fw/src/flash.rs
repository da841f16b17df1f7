//! Flash driver.

use core::ptr;
use stm32f1::stm32f103::Peripherals;

use canboot_core::flash::{EraseError, ProgramError};

use crate::map;

/// Flash erase/program binding.
///
/// Unlocks the flash controller lazily on first use and locks it again on
/// drop. Exclusive use is by construction: there is exactly one flow of
/// control from reset to the final jump.
pub struct FlashBank {
    dp: Peripherals,
    unlocked: bool,
}

/// Page size of the high-density parts this binding targets.
pub const PAGE_SIZE: u32 = 0x800;

impl FlashBank {
    pub fn new() -> Self {
        let dp = unsafe { Peripherals::steal() };
        Self { dp, unlocked: false }
    }

    fn unlock(&mut self) -> Result<(), ()> {
        if self.unlocked {
            return Ok(());
        }
        if self.dp.FLASH.cr.read().lock().bit_is_set() {
            self.dp.FLASH.keyr.write(|w| unsafe { w.key().bits(0x45670123) });
            self.dp.FLASH.keyr.write(|w| unsafe { w.key().bits(0xCDEF89AB) });
            cortex_m::asm::nop();

            if self.dp.FLASH.cr.read().lock().bit_is_set() {
                return Err(());
            }
        }
        self.unlocked = true;
        Ok(())
    }

    fn wait_idle(&self) {
        cortex_m::asm::nop();
        while self.dp.FLASH.sr.read().bsy().bit_is_set() {}
        cortex_m::asm::nop();
    }

    fn clear_state(&self) {
        self.dp.FLASH.sr.modify(|_, w| w.eop().set_bit().wrprterr().set_bit().pgerr().set_bit());
        cortex_m::asm::nop();
    }

    /// Erases the flash page containing `addr` and verifies it is blank.
    pub fn erase_page(&mut self, addr: u32) -> Result<(), EraseError> {
        self.unlock().map_err(|_| EraseError)?;

        let page = addr / PAGE_SIZE * PAGE_SIZE;
        self.wait_idle();
        self.clear_state();

        self.dp.FLASH.cr.modify(|_, w| w.per().set_bit());
        self.dp.FLASH.ar.write(|w| w.far().variant(page));
        self.dp.FLASH.cr.modify(|_, w| w.strt().set_bit());
        self.wait_idle();
        self.dp.FLASH.cr.modify(|_, w| w.per().clear_bit());

        for addr in (page..page + PAGE_SIZE).step_by(4) {
            let data = unsafe { ptr::read_volatile(addr as *const u32) };
            if data != 0xffff_ffff {
                return Err(EraseError);
            }
        }
        Ok(())
    }

    /// Programs the halfword at byte address `addr` and reads it back.
    pub fn write(&mut self, addr: u32, data: u16) -> Result<(), ProgramError> {
        self.unlock().map_err(|_| ProgramError)?;

        self.wait_idle();
        self.clear_state();

        self.dp.FLASH.cr.modify(|_, w| w.pg().set_bit());
        unsafe { ptr::write_volatile(addr as *mut u16, data) };
        self.wait_idle();

        while self.dp.FLASH.sr.read().eop().bit_is_clear() {}
        self.dp.FLASH.cr.modify(|_, w| w.pg().clear_bit());
        cortex_m::asm::nop();

        let readback = unsafe { ptr::read_volatile(addr as *const u16) };
        if readback == data {
            Ok(())
        } else {
            Err(ProgramError)
        }
    }
}

impl canboot_core::flash::Flash for FlashBank {
    fn erase_sector(&mut self, sector: u8) -> Result<(), EraseError> {
        defmt::info!("erasing sector {}", sector);
        for page in (map::USER_FLASH_START..map::USER_FLASH_END).step_by(PAGE_SIZE as usize) {
            self.erase_page(page)?;
        }
        Ok(())
    }

    fn program(&mut self, addr: u32, words: &[u16]) -> Result<(), ProgramError> {
        for (i, word) in words.iter().enumerate() {
            self.write(map::byte_addr(addr + i as u32), *word)?;
        }
        Ok(())
    }
}

impl Drop for FlashBank {
    fn drop(&mut self) {
        if self.unlocked {
            self.dp.FLASH.cr.write(|w| w.lock().set_bit());
            cortex_m::asm::nop();
        }
    }
}
