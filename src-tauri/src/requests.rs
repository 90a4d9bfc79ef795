use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Serializes the outbound request of one form.
///
/// Each submission takes a [`Ticket`] via [`RequestGate::begin`], which
/// cancels whatever request is still running for the same form. A response
/// may only be published while its ticket is still the installed one, so a
/// slow request that was superseded can neither overwrite newer results nor
/// clear the newer request's loading flag.
#[derive(Clone, Default)]
pub struct RequestGate {
    inner: Arc<Mutex<GateState>>,
}

#[derive(Default)]
struct GateState {
    next_serial: u64,
    active: Option<ActiveRequest>,
}

struct ActiveRequest {
    serial: u64,
    token: CancellationToken,
}

pub struct Ticket {
    pub token: CancellationToken,
    serial: u64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new request, cancelling the previous one if it is still
    /// in flight.
    pub async fn begin(&self) -> Ticket {
        let mut gate = self.inner.lock().await;

        if let Some(prev) = gate.active.take() {
            debug!("superseding in-flight request #{}", prev.serial);
            prev.token.cancel();
        }

        gate.next_serial += 1;
        let serial = gate.next_serial;
        let token = CancellationToken::new();
        gate.active = Some(ActiveRequest {
            serial,
            token: token.clone(),
        });

        Ticket { token, serial }
    }

    /// Retires the ticket. Returns true when the ticket was still the
    /// installed one, meaning its result is current and may be published.
    pub async fn finish(&self, ticket: &Ticket) -> bool {
        let mut gate = self.inner.lock().await;
        match &gate.active {
            Some(active) if active.serial == ticket.serial => {
                gate.active = None;
                true
            }
            _ => false,
        }
    }

    /// Cancels the in-flight request, if any. Used by resets; the cancelled
    /// ticket can no longer finish.
    pub async fn cancel_active(&self) {
        let mut gate = self.inner.lock().await;
        if let Some(prev) = gate.active.take() {
            debug!("cancelling in-flight request #{}", prev.serial);
            prev.token.cancel();
        }
    }
}
