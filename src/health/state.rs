//! Store connection state machine.
//!
//! # States
//! - Disconnected: no handle installed, requests get 503
//! - Connecting: an attempt is in flight
//! - Connected: handle installed and serving
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: manager starts an attempt
//! Connecting → Connected: attempt succeeded, handle installed
//! Connecting → Disconnected: attempt failed (backoff, retry)
//! Connected → Disconnected: a handler or the liveness ping saw the
//!                           connection fail; the manager reconnects
//! ```

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl From<u8> for ConnectionState {
    fn from(val: u8) -> Self {
        match val {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }
}
