/// Opaque-data scanner with UEL detection for non-PJL languages.
mod binary;
/// Continuation ledger: backtrack state across window boundaries.
pub mod cont;
/// Session state and the top-level dispatch loop.
pub mod dispatch;
/// The PJL command grammar.
mod pjl;
/// The driver-supplied byte window.
pub mod window;
