//! The continuation ledger.
//!
//! When a logical command straddles two read windows, a scanner cannot
//! finish its token. Instead of blocking, it records a
//! [`ContinuationState`] describing how much of the current window must be
//! re-presented, returns control to the driver, and is retried from
//! scratch once more bytes are available. The ledger is plain state
//! storage: it performs no I/O and owns no buffer.

/// What kind of parse was interrupted at the window boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContKind {
    /// No continuation pending.
    #[default]
    None,
    /// A command (or its declared payload) was cut off mid-way.
    MidCommand,
    /// An unrecognized sequence was being skipped when the window ended.
    UnknownSequence,
    /// A multi-byte prefix (introducer or UEL) was partially matched.
    PrefixPending,
}

/// Backtrack state recorded when a window ends mid-token.
///
/// `backtrack` is always `<= 0`: the driver must re-present the last
/// `|backtrack|` bytes of the current window before any newly read bytes,
/// so the interrupted token can be retried from scratch. A value of `0` is
/// legal for payload continuations that consumed their whole window and
/// simply need more data (`download_remaining > 0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContinuationState {
    /// Kind of interrupted parse.
    pub kind: ContKind,
    /// Non-positive byte count the driver must re-present.
    pub backtrack: i64,
    /// Number of prefix bytes already matched (see `prefix`).
    pub prefix_len: usize,
    /// First bytes of a partially matched multi-byte sequence; used to
    /// verify the driver honoured the re-present contract.
    pub prefix: [u8; 2],
    /// Payload bytes already consumed before this continuation.
    pub partial_data_len: usize,
    /// Bytes of a declared binary download still to be consumed.
    pub download_remaining: u64,
}

impl ContinuationState {
    /// A continuation that re-presents the entire unconsumed tail.
    ///
    /// `remaining` must be the byte count left in the window at the point
    /// of failure; none of it counts as consumed.
    pub fn backtrack_of(kind: ContKind, remaining: usize) -> Self {
        Self {
            kind,
            backtrack: -(remaining as i64),
            ..Self::default()
        }
    }

    /// A partially matched multi-byte prefix at the window end.
    ///
    /// `matched` is the prefix bytes seen so far (its leading two bytes are
    /// retained for contract verification); `remaining` is the unconsumed
    /// tail length, which equals the matched length here.
    pub fn prefix_pending(matched: &[u8], remaining: usize) -> Self {
        let mut prefix = [0u8; 2];
        let keep = matched.len().min(2);
        prefix[..keep].copy_from_slice(&matched[..keep]);
        Self {
            kind: ContKind::PrefixPending,
            backtrack: -(remaining as i64),
            prefix_len: matched.len(),
            prefix,
            ..Self::default()
        }
    }

    /// A mid-download continuation: the window is fully consumed and
    /// `remaining` payload bytes are still owed. `seen` is the running
    /// count of payload bytes consumed so far.
    pub fn download(remaining: u64, seen: usize) -> Self {
        Self {
            kind: ContKind::MidCommand,
            backtrack: 0,
            partial_data_len: seen,
            download_remaining: remaining,
            ..Self::default()
        }
    }

    /// Whether no continuation is pending.
    pub fn is_none(&self) -> bool {
        self.kind == ContKind::None
    }
}

/// Session-scoped storage for the pending continuation.
///
/// Written by scanners at a window boundary; taken and cleared by the
/// dispatcher at the top of the next call.
#[derive(Debug, Default)]
pub struct ContinuationLedger {
    state: ContinuationState,
}

impl ContinuationLedger {
    /// Record that the current window ends mid-token.
    ///
    /// `delta` must equal `-(remaining)` at the point of failure.
    pub fn set_backtrack(&mut self, kind: ContKind, delta: i64) {
        debug_assert!(delta <= 0, "backtrack delta must be non-positive");
        self.state = ContinuationState {
            kind,
            backtrack: delta,
            ..ContinuationState::default()
        };
    }

    /// Record a fully populated continuation state.
    pub fn record(&mut self, state: ContinuationState) {
        debug_assert!(state.backtrack <= 0);
        self.state = state;
    }

    /// The pending continuation, without clearing it.
    pub fn get(&self) -> ContinuationState {
        self.state
    }

    /// Take the pending continuation, leaving the ledger clear.
    pub fn take(&mut self) -> ContinuationState {
        std::mem::take(&mut self.state)
    }

    /// Clear any pending continuation.
    pub fn reset(&mut self) {
        self.state = ContinuationState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtrack_of_negates_remaining() {
        let c = ContinuationState::backtrack_of(ContKind::MidCommand, 7);
        assert_eq!(c.backtrack, -7);
        assert_eq!(c.kind, ContKind::MidCommand);
        assert!(!c.is_none());
    }

    #[test]
    fn prefix_pending_keeps_two_bytes() {
        let c = ContinuationState::prefix_pending(b"\x1B%-12", 5);
        assert_eq!(c.kind, ContKind::PrefixPending);
        assert_eq!(c.backtrack, -5);
        assert_eq!(c.prefix_len, 5);
        assert_eq!(c.prefix, [0x1B, b'%']);
    }

    #[test]
    fn download_allows_zero_backtrack() {
        let c = ContinuationState::download(100, 24);
        assert_eq!(c.backtrack, 0);
        assert_eq!(c.download_remaining, 100);
        assert_eq!(c.partial_data_len, 24);
    }

    #[test]
    fn take_clears_the_ledger() {
        let mut ledger = ContinuationLedger::default();
        ledger.set_backtrack(ContKind::UnknownSequence, -3);
        let taken = ledger.take();
        assert_eq!(taken.kind, ContKind::UnknownSequence);
        assert_eq!(taken.backtrack, -3);
        assert!(ledger.get().is_none());
    }

    #[test]
    fn reset_clears_state() {
        let mut ledger = ContinuationLedger::default();
        ledger.record(ContinuationState::download(5, 0));
        ledger.reset();
        assert!(ledger.get().is_none());
    }
}
