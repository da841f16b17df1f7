//! Transport endpoint capability.

use canboot_shared::{codec::Frame, Status};

use crate::poll::PollBudget;

/// No message arrived within the receive budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecvTimeout;

/// A fixed-rate bus interface reduced to the two channels the protocol
/// needs: the inbound data channel and the outbound status channel.
///
/// Implementations do not retry on timeout; whether a timeout means "nudge
/// the host" or "abort" is the loader's decision.
pub trait Transport {
    /// One-time setup: clear all mailbox and flag state, program the fixed
    /// bit timing and leave exactly two mailboxes armed, one for the data
    /// identifier and one for the status identifier with
    /// all-bits-must-match acceptance.
    fn configure(&mut self);

    /// Busy-waits for the next data-channel message within `budget`.
    fn receive(&mut self, budget: PollBudget) -> Result<Frame, RecvTimeout>;

    /// Loads `status` into the status mailbox, requests transmission and
    /// busy-waits for the transmit-acknowledge flag before clearing it.
    fn send_status(&mut self, status: Status);

    /// Re-requests transmission of the status mailbox and clears the
    /// acknowledge flag.
    ///
    /// Used as the header-phase timeout nudge: the host listens for this
    /// message to learn that the loader is up and waiting.
    fn heartbeat(&mut self);
}
