//! Clock bring-up.

use stm32f1::stm32f103::Peripherals;

/// One-shot system clock initialization: HSE with PLL to 72 MHz, APB1 at
/// 36 MHz, clock security system armed, bus and pin clocks for the
/// transport enabled.
pub fn init() {
    let dp = unsafe { Peripherals::steal() };

    dp.RCC.cr.modify(|_, w| w.hseon().set_bit());
    while dp.RCC.cr.read().hserdy().bit_is_clear() {}

    // Two wait states for 72 MHz.
    dp.FLASH.acr.modify(|_, w| unsafe { w.latency().bits(0b010) });

    // PLL = HSE * 9, APB1 = SYSCLK / 2.
    dp.RCC.cfgr.modify(|_, w| unsafe {
        w.ppre1().bits(0b100).pllsrc().set_bit().pllmul().bits(0b0111)
    });
    dp.RCC.cr.modify(|_, w| w.pllon().set_bit());
    while dp.RCC.cr.read().pllrdy().bit_is_clear() {}

    dp.RCC.cfgr.modify(|_, w| unsafe { w.sw().bits(0b10) });
    while dp.RCC.cfgr.read().sws().bits() != 0b10 {}

    // Missing-HSE detection.
    dp.RCC.cr.modify(|_, w| w.csson().set_bit());

    // Transport clocks and pins: CAN on PA11/PA12.
    dp.RCC.apb1enr.modify(|_, w| w.canen().enabled());
    dp.RCC.apb2enr.modify(|_, w| w.iopaen().enabled().afioen().enabled());
    dp.GPIOA.crh.modify(|_, w| w.mode12().output50().cnf12().alt_push_pull());
}

/// Missing-clock detect: set once the clock security system has seen the
/// HSE fail and switched to the backup oscillator.
pub fn fault() -> bool {
    let dp = unsafe { Peripherals::steal() };
    dp.RCC.cir.read().cssf().bit_is_set()
}
