//! bxCAN transport binding.

use stm32f1::stm32f103::Peripherals;

use canboot_core::{
    poll::PollBudget,
    transport::{RecvTimeout, Transport},
};
use canboot_shared::{codec::Frame, Status, DATA_MSG_ID, STATUS_MSG_ID};

/// The two-mailbox transport endpoint over bxCAN.
///
/// Receive FIFO 0 is filtered down to the data identifier; transmit
/// mailbox 0 is dedicated to the status identifier.
pub struct Can {
    dp: Peripherals,
}

impl Can {
    pub fn new() -> Self {
        Self { dp: unsafe { Peripherals::steal() } }
    }

    /// Requests transmission of mailbox 0 and busy-waits for the
    /// acknowledge, then clears it.
    fn transmit_and_wait(&mut self) {
        self.dp.CAN1.tx[0].tir.modify(|_, w| w.txrq().set_bit());
        while self.dp.CAN1.tsr.read().rqcp0().bit_is_clear() {}
        self.dp.CAN1.tsr.write(|w| w.rqcp0().set_bit());
    }
}

impl Transport for Can {
    fn configure(&mut self) {
        let can = &self.dp.CAN1;

        // Leave sleep, enter initialization mode.
        can.mcr.modify(|_, w| w.sleep().clear_bit().inrq().set_bit());
        while can.msr.read().inak().bit_is_clear() {}

        // 500 kbit/s at 36 MHz APB1: prescaler 9, 8 time quanta per bit.
        can.btr.write(|w| unsafe { w.brp().bits(8).ts1().bits(5).ts2().bits(0).sjw().bits(0) });

        can.mcr.modify(|_, w| w.inrq().clear_bit());
        while can.msr.read().inak().bit_is_set() {}

        // Single 32-bit id/mask filter: FIFO 0 accepts only the data
        // identifier, all bits must match.
        can.fmr.modify(|_, w| w.finit().set_bit());
        can.fa1r.modify(|_, w| w.fact0().clear_bit());
        can.fs1r.modify(|_, w| w.fsc0().set_bit());
        can.fm1r.modify(|_, w| w.fbm0().clear_bit());
        can.fb[0].fr1.write(|w| unsafe { w.bits(u32::from(DATA_MSG_ID) << 21) });
        can.fb[0].fr2.write(|w| unsafe { w.bits(0xFFFF_FFFE) });
        can.fa1r.modify(|_, w| w.fact0().set_bit());
        can.fmr.modify(|_, w| w.finit().clear_bit());

        // Pre-arm the transmit mailbox with the status identifier and a
        // fixed-length payload; the heartbeat retransmits it as-is.
        can.tx[0].tir.write(|w| unsafe { w.stid().bits(STATUS_MSG_ID).txrq().clear_bit() });
        can.tx[0].tdtr.write(|w| unsafe { w.dlc().bits(Frame::LEN as u8) });
        can.tx[0].tdlr.reset();
        can.tx[0].tdhr.reset();

        defmt::info!("transport configured: rx id 0x{:x}, tx id 0x{:x}", DATA_MSG_ID, STATUS_MSG_ID);
    }

    fn receive(&mut self, budget: PollBudget) -> Result<Frame, RecvTimeout> {
        let pending = budget.poll(|| {
            (self.dp.CAN1.rf0r.read().fmp0().bits() != 0).then_some(())
        });
        if pending.is_none() {
            return Err(RecvTimeout);
        }

        let data = self.dp.CAN1.rx[0].rdlr.read().bits();
        let frame = Frame::parse(data.to_le_bytes());

        // Release the FIFO entry.
        self.dp.CAN1.rf0r.modify(|_, w| w.rfom0().set_bit());

        Ok(frame)
    }

    fn send_status(&mut self, status: Status) {
        // Code transmitted most significant byte first.
        let payload = (status as u32).to_be_bytes();
        self.dp.CAN1.tx[0].tdlr.write(|w| unsafe { w.bits(u32::from_le_bytes(payload)) });
        self.transmit_and_wait();
    }

    fn heartbeat(&mut self) {
        self.transmit_and_wait();
    }
}
