//! Boot decision and loader tests against in-memory peripherals.

use std::collections::VecDeque;

use canboot_core::{
    board::Board,
    boot::{decide_and_boot, Boot},
    flash::{EraseError, Flash, ProgramError},
    poll::PollBudget,
    store::BootStore,
    transport::{RecvTimeout, Transport},
    watchdog::Watchdog,
};
use canboot_shared::{self as shared, codec::Frame, Status};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scripted bus endpoint. A `None` entry makes one bounded receive expire.
#[derive(Default)]
struct BusEndpoint {
    queue: VecDeque<Option<Frame>>,
    statuses: Vec<Status>,
    heartbeats: u32,
    configured: u32,
}

impl BusEndpoint {
    fn scripted(entries: Vec<Option<Frame>>) -> Self {
        Self { queue: entries.into(), ..Self::default() }
    }
}

impl Transport for BusEndpoint {
    fn configure(&mut self) {
        self.configured += 1;
    }

    fn receive(&mut self, budget: PollBudget) -> Result<Frame, RecvTimeout> {
        match self.queue.pop_front() {
            Some(Some(frame)) => Ok(frame),
            Some(None) => {
                assert_ne!(budget, PollBudget::unbounded(), "unbounded receive would stall");
                Err(RecvTimeout)
            }
            None => panic!("receive beyond scripted stream"),
        }
    }

    fn send_status(&mut self, status: Status) {
        self.statuses.push(status);
    }

    fn heartbeat(&mut self) {
        self.heartbeats += 1;
    }
}

#[derive(Default)]
struct MemFlash {
    erased: Vec<u8>,
    programmed: Vec<(u32, u16)>,
    fail_erase: bool,
    fail_program_at: Option<u32>,
}

impl Flash for MemFlash {
    fn erase_sector(&mut self, sector: u8) -> Result<(), EraseError> {
        if self.fail_erase {
            return Err(EraseError);
        }
        self.erased.push(sector);
        Ok(())
    }

    fn program(&mut self, addr: u32, words: &[u16]) -> Result<(), ProgramError> {
        for (i, word) in words.iter().enumerate() {
            let addr = addr + i as u32;
            if self.fail_program_at == Some(addr) {
                return Err(ProgramError);
            }
            self.programmed.push((addr, *word));
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct MemStore {
    sentinel: u16,
    mode_key: [u16; 4],
}

impl MemStore {
    /// Mass-erased device: sentinel unset, key region blank.
    fn factory() -> Self {
        Self { sentinel: 0xFFFF, mode_key: [0xFFFF; 4] }
    }

    /// After a successful load: sentinel armed, key consumed.
    fn loaded() -> Self {
        Self { sentinel: shared::SENTINEL_SUCCESS, mode_key: [0; 4] }
    }

    /// Application requested a reload: sentinel armed, key written.
    fn reload_requested() -> Self {
        Self { sentinel: shared::SENTINEL_SUCCESS, mode_key: shared::MODE_KEY }
    }
}

impl BootStore for MemStore {
    fn sentinel(&self) -> u16 {
        self.sentinel
    }

    fn mode_key(&self) -> [u16; 4] {
        self.mode_key
    }

    fn consume_mode_key(&mut self) {
        self.mode_key = [0; 4];
    }

    fn mark_success(&mut self) {
        self.sentinel = shared::SENTINEL_SUCCESS;
    }
}

#[derive(Default)]
struct TestWatchdog {
    enabled: bool,
    disables: u32,
    services: u32,
}

impl Watchdog for TestWatchdog {
    fn disable(&mut self) {
        self.enabled = false;
        self.disables += 1;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn service(&mut self) {
        self.services += 1;
    }
}

#[derive(Default)]
struct TestBoard {
    clock_fault: bool,
    clock_inits: u32,
    staged: u32,
}

impl Board for TestBoard {
    const HEADER_POLL_ITERATIONS: u32 = 8;

    fn clock_init(&mut self) {
        self.clock_inits += 1;
    }

    fn clock_fault(&self) -> bool {
        self.clock_fault
    }

    fn stage_loader(&mut self) {
        self.staged += 1;
    }

    fn halt(&self) -> ! {
        panic!("halt");
    }
}

/// Frames `words` with the global sequence counter starting at 1.
fn counted(words: &[u16]) -> Vec<Option<Frame>> {
    words
        .iter()
        .enumerate()
        .map(|(i, &word)| Some(Frame { seq: (i + 1) as u16, word }))
        .collect()
}

/// Word stream of a complete image: header, blocks, zero terminator.
fn image(entry: u32, blocks: &[(u32, &[u16])]) -> Vec<u16> {
    let mut words = vec![shared::IMAGE_KEY];
    words.extend([0u16; shared::RESERVED_WORDS]);
    words.push((entry >> 16) as u16);
    words.push(entry as u16);
    for (dest, payload) in blocks {
        words.push(payload.len() as u16);
        words.push((dest >> 16) as u16);
        words.push(*dest as u16);
        words.extend_from_slice(payload);
    }
    words.push(0);
    words
}

struct Rig {
    board: TestBoard,
    transport: BusEndpoint,
    flash: MemFlash,
    watchdog: TestWatchdog,
    store: MemStore,
}

impl Rig {
    fn new(store: MemStore, entries: Vec<Option<Frame>>) -> Self {
        Self {
            board: TestBoard::default(),
            transport: BusEndpoint::scripted(entries),
            flash: MemFlash::default(),
            watchdog: TestWatchdog::default(),
            store,
        }
    }

    fn boot(&mut self) -> Boot {
        decide_and_boot(
            &mut self.board,
            &mut self.transport,
            &mut self.flash,
            &mut self.watchdog,
            &mut self.store,
        )
    }
}

#[test]
fn boots_application_without_invoking_loader() {
    init_logs();
    let mut rig = Rig::new(MemStore::loaded(), Vec::new());

    assert_eq!(rig.boot(), Boot::Application(shared::APPLICATION_ENTRY));
    assert_eq!(rig.transport.configured, 0);
    assert_eq!(rig.board.clock_inits, 0);
    assert_eq!(rig.board.staged, 0);
}

#[test]
fn any_mode_key_word_mismatch_skips_loader() {
    init_logs();
    for i in 0..4 {
        let mut store = MemStore::reload_requested();
        store.mode_key[i] ^= 0x0001;
        let mut rig = Rig::new(store, Vec::new());

        assert_eq!(rig.boot(), Boot::Application(shared::APPLICATION_ENTRY));
        assert_eq!(rig.transport.configured, 0);
    }
}

#[test]
fn reload_request_enters_loader() {
    init_logs();
    let words = image(0x0030_0000, &[]);
    let mut rig = Rig::new(MemStore::reload_requested(), counted(&words));

    assert_eq!(rig.boot(), Boot::Application(0x0030_0000));
    assert_eq!(rig.transport.configured, 1);
    assert_eq!(rig.board.clock_inits, 1);
    assert_eq!(rig.board.staged, 1);
    assert_eq!(rig.watchdog.disables, 1);
}

#[test]
fn unset_sentinel_enters_loader() {
    init_logs();
    let words = image(0x0030_0000, &[]);
    let mut rig = Rig::new(MemStore::factory(), counted(&words));

    assert_eq!(rig.boot(), Boot::Application(0x0030_0000));
    assert_eq!(rig.transport.configured, 1);
}

#[test]
fn zero_size_first_block_finalizes_immediately() {
    init_logs();
    let words = image(0xAABB_CCDD, &[]);
    let mut rig = Rig::new(MemStore::factory(), counted(&words));

    assert_eq!(rig.boot(), Boot::Application(0xAABB_CCDD));
    assert!(rig.flash.programmed.is_empty());
    assert_eq!(rig.flash.erased, vec![shared::APPLICATION_SECTOR]);
    assert_eq!(rig.store.sentinel, shared::SENTINEL_SUCCESS);
    assert_eq!(rig.store.mode_key, [0; 4]);
    assert_eq!(rig.transport.statuses, vec![Status::Success]);
    assert!(rig.watchdog.enabled);
    assert_eq!(rig.watchdog.services, 1);
}

#[test]
fn two_block_image_programs_words_in_order() {
    init_logs();
    let words = image(0x0030_0000, &[(0x003F_8000, &[0x1111, 0x2222])]);
    let mut rig = Rig::new(MemStore::factory(), counted(&words));

    assert_eq!(rig.boot(), Boot::Application(0x0030_0000));
    assert_eq!(rig.flash.programmed, vec![(0x003F_8000, 0x1111), (0x003F_8001, 0x2222)]);
    assert_eq!(rig.transport.statuses, vec![Status::Success]);
    assert_eq!(rig.store.sentinel, shared::SENTINEL_SUCCESS);
}

#[test]
fn duplicated_message_aborts_with_sequence_fault() {
    init_logs();
    let words = image(0x0030_0000, &[(0x003F_8000, &[0x1111])]);
    let mut frames = counted(&words);
    // Duplicate the counter of the third message.
    frames[2] = Some(Frame { seq: 2, word: words[2] });
    let mut rig = Rig::new(MemStore::factory(), frames);

    assert_eq!(rig.boot(), Boot::Fallback);
    assert_eq!(rig.transport.statuses, vec![Status::SequenceFault]);
    assert_ne!(rig.store.sentinel, shared::SENTINEL_SUCCESS);
}

#[test]
fn bad_key_aborts_before_reserved_words() {
    init_logs();
    let mut words = image(0x0030_0000, &[]);
    words[0] = 0x1234;
    let total = words.len();
    let mut rig = Rig::new(MemStore::factory(), counted(&words));

    assert_eq!(rig.boot(), Boot::Fallback);
    assert_eq!(rig.transport.statuses, vec![Status::BadKey]);
    // Only the key word was consumed.
    assert_eq!(rig.transport.queue.len(), total - 1);
}

#[test]
fn erase_failure_hard_fails_before_any_receive() {
    init_logs();
    let words = image(0x0030_0000, &[]);
    let total = words.len();
    let mut rig = Rig::new(MemStore::factory(), counted(&words));
    rig.flash.fail_erase = true;

    assert_eq!(rig.boot(), Boot::Fallback);
    assert_eq!(rig.transport.statuses, vec![Status::EraseFailed]);
    assert_eq!(rig.transport.queue.len(), total);
}

#[test]
fn program_failure_returns_fallback_load_without_finalize() {
    init_logs();
    let words = image(0x0030_0000, &[(0x003F_8000, &[0x1111, 0x2222])]);
    let mut rig = Rig::new(MemStore::factory(), counted(&words));
    rig.flash.fail_program_at = Some(0x003F_8000);

    assert_eq!(rig.boot(), Boot::Application(shared::FALLBACK_LOAD_ENTRY));
    assert_eq!(rig.transport.statuses, vec![Status::ProgramFailed]);
    // Mode Key and sentinel untouched.
    assert_eq!(rig.store.sentinel, MemStore::factory().sentinel);
    assert_eq!(rig.store.mode_key, MemStore::factory().mode_key);
    assert!(!rig.watchdog.enabled);
}

#[test]
fn header_timeout_nudges_host_and_keeps_waiting() {
    init_logs();
    let words = image(0xAABB_CCDD, &[]);
    let mut entries = vec![None, None];
    entries.extend(counted(&words));
    let mut rig = Rig::new(MemStore::factory(), entries);

    assert_eq!(rig.boot(), Boot::Application(0xAABB_CCDD));
    assert_eq!(rig.transport.heartbeats, 2);
    assert_eq!(rig.transport.statuses, vec![Status::Success]);
}

#[test]
fn successful_load_is_idempotent_across_boots() {
    init_logs();
    let words = image(0xAABB_CCDD, &[]);
    let mut rig = Rig::new(MemStore::factory(), counted(&words));
    assert_eq!(rig.boot(), Boot::Application(0xAABB_CCDD));

    // Every subsequent boot goes straight to the application.
    for _ in 0..3 {
        assert_eq!(rig.boot(), Boot::Application(shared::APPLICATION_ENTRY));
    }
    assert_eq!(rig.transport.configured, 1);
}

#[test]
#[should_panic(expected = "halt")]
fn clock_fault_halts() {
    init_logs();
    let mut rig = Rig::new(MemStore::factory(), Vec::new());
    rig.board.clock_fault = true;
    let _ = rig.boot();
}
