//! Image loader state machine.
//!
//! A linear pipeline with no backward transitions: erase the target sector,
//! receive and validate the image header, program each block word by word,
//! then finalize the persistent boot state. The only tolerated retry is the
//! header-phase receive timeout, which nudges the host and keeps waiting.

use canboot_shared::{self as shared, codec, codec::Frame, Status};

use crate::{
    flash::Flash,
    poll::PollBudget,
    store::BootStore,
    transport::{RecvTimeout, Transport},
    watchdog::Watchdog,
};

/// Terminal fault of one load attempt.
enum LoadError {
    Erase,
    Sequence,
    BadKey,
    Program,
}

impl LoadError {
    /// Status code reported on the wire and entry address returned to the
    /// boot decision.
    fn report(&self) -> (Status, u32) {
        match self {
            LoadError::Erase => (Status::EraseFailed, shared::HARD_FAIL_ENTRY),
            LoadError::Sequence => (Status::SequenceFault, shared::HARD_FAIL_ENTRY),
            LoadError::BadKey => (Status::BadKey, shared::HARD_FAIL_ENTRY),
            LoadError::Program => (Status::ProgramFailed, shared::FALLBACK_LOAD_ENTRY),
        }
    }
}

/// The protocol engine for one load attempt.
pub struct Loader<'a, T, F, W, S> {
    transport: &'a mut T,
    flash: &'a mut F,
    watchdog: &'a mut W,
    store: &'a mut S,
    header_budget: PollBudget,
    expected_seq: u16,
}

impl<'a, T, F, W, S> Loader<'a, T, F, W, S>
where
    T: Transport,
    F: Flash,
    W: Watchdog,
    S: BootStore,
{
    /// Creates a loader over an already configured transport.
    pub fn new(
        transport: &'a mut T,
        flash: &'a mut F,
        watchdog: &'a mut W,
        store: &'a mut S,
        header_budget: PollBudget,
    ) -> Self {
        Self { transport, flash, watchdog, store, header_budget, expected_seq: 0 }
    }

    /// Receives, validates and commits one image.
    ///
    /// Returns the entry address of the loaded image, or one of the
    /// distinguished failure addresses. Every failure is reported on the
    /// status channel before returning, leaving the transport clean for a
    /// host retry after reset.
    pub fn run(mut self) -> u32 {
        match self.load() {
            Ok(entry) => {
                log::info!("load complete, entry 0x{:08x}", entry);
                entry
            }
            Err(err) => {
                let (status, entry) = err.report();
                log::warn!("load aborted with status 0x{:08x}", status as u32);
                self.transport.send_status(status);
                entry
            }
        }
    }

    fn load(&mut self) -> Result<u32, LoadError> {
        if self.flash.erase_sector(shared::APPLICATION_SECTOR).is_err() {
            log::error!("sector erase failed");
            return Err(LoadError::Erase);
        }

        let (entry, mut size) = self.header()?;
        log::info!("image header: entry 0x{:08x}, first block {} words", entry, size);

        while size != 0 {
            // Destination address, high half first. Only read for a
            // nonzero size; a zero size terminates the stream before it.
            let hi = self.recv_word()?;
            let lo = self.recv_word()?;
            let mut cursor = codec::join(hi, lo);
            log::info!("block: {} words at 0x{:08x}", size, cursor);

            for _ in 0..size {
                let data = self.recv_word()?;
                if self.flash.program(cursor, &[data]).is_err() {
                    log::error!("program failed at 0x{:08x}", cursor);
                    return Err(LoadError::Program);
                }
                cursor += 1;
            }

            size = self.recv_word()?;
        }

        self.finalize();
        Ok(entry)
    }

    /// Receives the 12 header words: key, reserved words, entry address
    /// halves and the first block size.
    fn header(&mut self) -> Result<(u32, u16), LoadError> {
        let mut entry = 0u32;
        let mut size = 0u16;

        for i in 0..shared::HEADER_WORDS {
            let word = self.recv_header_word()?;
            match i {
                0 if word != shared::IMAGE_KEY => {
                    log::warn!("bad image key 0x{:04x}", word);
                    return Err(LoadError::BadKey);
                }
                0 => (),
                9 => entry = u32::from(word) << 16,
                10 => entry |= u32::from(word),
                11 => size = word,
                // Reserved words, discarded.
                _ => (),
            }
        }

        Ok((entry, size))
    }

    /// Header-phase receive: the host may be slow to start, so a timeout
    /// nudges it with a heartbeat and keeps waiting.
    fn recv_header_word(&mut self) -> Result<u16, LoadError> {
        loop {
            match self.transport.receive(self.header_budget) {
                Ok(frame) => return self.check(frame),
                Err(RecvTimeout) => {
                    log::debug!("header receive timeout, heartbeat");
                    self.transport.heartbeat();
                }
            }
        }
    }

    /// Block-phase receive: the host is the sole required actor here, so
    /// the wait is unbounded.
    fn recv_word(&mut self) -> Result<u16, LoadError> {
        loop {
            if let Ok(frame) = self.transport.receive(PollBudget::unbounded()) {
                return self.check(frame);
            }
        }
    }

    /// Enforces the strictly consecutive, 1-indexed global sequence
    /// counter shared by the entire frame stream.
    fn check(&mut self, frame: Frame) -> Result<u16, LoadError> {
        self.expected_seq = self.expected_seq.wrapping_add(1);
        if frame.seq != self.expected_seq {
            log::warn!("sequence fault: got {}, expected {}", frame.seq, self.expected_seq);
            return Err(LoadError::Sequence);
        }
        Ok(frame.word)
    }

    /// Final bookkeeping once every block is committed: consume the Mode
    /// Key, arm the Boot Sentinel, report success and re-arm the watchdog.
    fn finalize(&mut self) {
        self.store.consume_mode_key();
        self.store.mark_success();
        self.transport.send_status(Status::Success);
        self.watchdog.enable();
        self.watchdog.service();
    }
}
