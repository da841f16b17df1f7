//! Board binding.

use canboot_core::board::Board;

use crate::{clock, relocate};

/// The one supported board.
pub struct FwBoard;

impl FwBoard {
    pub fn new() -> Self {
        Self
    }
}

impl Board for FwBoard {
    fn clock_init(&mut self) {
        clock::init();
    }

    fn clock_fault(&self) -> bool {
        clock::fault()
    }

    fn stage_loader(&mut self) {
        relocate::stage();
    }

    fn halt(&self) -> ! {
        defmt::error!("halted");
        loop {
            cortex_m::asm::nop();
        }
    }
}
