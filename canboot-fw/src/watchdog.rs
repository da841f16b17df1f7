//! Watchdog binding (IWDG).

use stm32f1::stm32f103::Peripherals;

use canboot_core::watchdog::Watchdog;

/// Independent watchdog with a timeout of roughly 6.5 seconds.
pub struct Iwdg {
    armed: bool,
}

impl Iwdg {
    pub fn new() -> Self {
        Self { armed: false }
    }
}

impl Watchdog for Iwdg {
    fn disable(&mut self) {
        // The independent watchdog cannot be stopped once running; it is
        // simply never started before the load finishes.
        self.armed = false;
    }

    fn enable(&mut self) {
        let dp = unsafe { Peripherals::steal() };
        dp.IWDG.kr.write(|w| w.key().enable());
        dp.IWDG.pr.write(|w| w.pr().divide_by64());
        dp.IWDG.rlr.write(|w| w.rl().bits(0xfff));
        dp.IWDG.kr.write(|w| w.key().start());
        self.armed = true;
    }

    fn service(&mut self) {
        if !self.armed {
            return;
        }
        let dp = unsafe { Peripherals::steal() };
        dp.IWDG.kr.write(|w| w.key().reset());
    }
}
