use crate::domain::message::BufferedMessage;
use crate::domain::ports::HostRuntimeBox;
use crate::error::BridgeError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct GateState {
    ready: bool,
    buffer: Vec<BufferedMessage>,
}

/// Holds host-bound messages until the host runtime reports that it is ready.
///
/// Before readiness every message is buffered in submission order. [`mark_ready`]
/// flips the gate once and drains the buffer; afterwards messages go straight to
/// the host. Delivery after readiness is at-most-once: a failed delivery is logged
/// and dropped, never re-buffered.
///
/// The host is always called outside the state lock, so a host callback that
/// enqueues again cannot deadlock the gate.
///
/// [`mark_ready`]: ReadinessGate::mark_ready
pub struct ReadinessGate {
    host: HostRuntimeBox,
    state: Mutex<GateState>,
}

impl ReadinessGate {
    pub fn new(host: HostRuntimeBox) -> Self {
        Self {
            host,
            state: Mutex::new(GateState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        self.state().ready
    }

    /// Number of messages waiting for readiness.
    pub fn pending(&self) -> usize {
        self.state().buffer.len()
    }

    pub fn enqueue_or_deliver(&self, message: BufferedMessage) {
        {
            let mut state = self.state();
            if !state.ready {
                debug!(
                    target_object = %message.target,
                    method = %message.method,
                    "Host not ready, buffering message"
                );
                state.buffer.push(message);
                return;
            }
        }
        self.deliver(&message);
    }

    /// Marks the host ready and flushes. Repeated calls only flush.
    pub fn mark_ready(&self) {
        let first = {
            let mut state = self.state();
            let first = !state.ready;
            state.ready = true;
            first
        };
        if first {
            info!("Host runtime ready");
        }
        self.flush();
    }

    /// Delivers every buffered message in order.
    ///
    /// The buffer is detached as a whole before delivery starts, so messages
    /// enqueued while draining are never sent twice.
    pub fn flush(&self) {
        let batch = {
            let mut state = self.state();
            if !state.ready || state.buffer.is_empty() {
                return;
            }
            std::mem::take(&mut state.buffer)
        };
        debug!(count = batch.len(), "Flushing buffered messages");
        for message in &batch {
            self.deliver(message);
        }
    }

    /// Detaches undelivered messages, used at session teardown.
    pub fn drain_pending(&self) -> Vec<BufferedMessage> {
        std::mem::take(&mut self.state().buffer)
    }

    fn deliver(&self, message: &BufferedMessage) {
        if let Err(e) = self.try_deliver(message) {
            error!(error = %e, "Dropping host message");
        }
    }

    fn try_deliver(&self, message: &BufferedMessage) -> Result<(), BridgeError> {
        if !self.host.is_available() {
            warn!("Host message channel not available");
            return Err(BridgeError::DeliveryFailed {
                target: message.target.clone(),
                method: message.method.clone(),
                reason: "host channel unavailable".to_string(),
            });
        }
        self.host
            .deliver(&message.target, &message.method, &message.body)
            .map_err(|e| match e {
                BridgeError::DeliveryFailed { .. } => e,
                other => BridgeError::DeliveryFailed {
                    target: message.target.clone(),
                    method: message.method.clone(),
                    reason: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::RecordingHost;

    fn msg(i: usize) -> BufferedMessage {
        BufferedMessage::new("SocketManager", "OnSocketMessage", format!("event|{{\"n\":{}}}", i))
    }

    #[test]
    fn test_buffers_until_ready_then_flushes_in_order() {
        let host = RecordingHost::new();
        let gate = ReadinessGate::new(Box::new(host.clone()));

        for i in 0..5 {
            gate.enqueue_or_deliver(msg(i));
        }
        assert!(host.deliveries().is_empty());
        assert_eq!(gate.pending(), 5);

        gate.mark_ready();

        let bodies: Vec<String> = host.deliveries().into_iter().map(|m| m.body).collect();
        let expected: Vec<String> = (0..5).map(|i| msg(i).body).collect();
        assert_eq!(bodies, expected);
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn test_after_ready_bypasses_buffer() {
        let host = RecordingHost::new();
        let gate = ReadinessGate::new(Box::new(host.clone()));
        gate.mark_ready();

        gate.enqueue_or_deliver(msg(1));
        assert_eq!(host.deliveries().len(), 1);
        assert_eq!(gate.pending(), 0);

        gate.flush();
        assert_eq!(host.deliveries().len(), 1);
    }

    #[test]
    fn test_mark_ready_twice_does_not_redeliver() {
        let host = RecordingHost::new();
        let gate = ReadinessGate::new(Box::new(host.clone()));
        gate.enqueue_or_deliver(msg(1));
        gate.enqueue_or_deliver(msg(2));

        gate.mark_ready();
        gate.mark_ready();
        gate.flush();

        assert_eq!(host.deliveries().len(), 2);
    }

    #[test]
    fn test_flush_before_ready_is_noop() {
        let host = RecordingHost::new();
        let gate = ReadinessGate::new(Box::new(host.clone()));
        gate.enqueue_or_deliver(msg(1));
        gate.flush();

        assert!(host.deliveries().is_empty());
        assert_eq!(gate.pending(), 1);
    }

    #[test]
    fn test_failed_delivery_does_not_halt_flush() {
        let host = RecordingHost::new().failing_on("bad");
        let gate = ReadinessGate::new(Box::new(host.clone()));
        gate.enqueue_or_deliver(msg(1));
        gate.enqueue_or_deliver(BufferedMessage::new("X", "Y", "bad"));
        gate.enqueue_or_deliver(msg(3));

        gate.mark_ready();

        let bodies: Vec<String> = host.deliveries().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec![msg(1).body, msg(3).body]);
        // Dropped, not re-buffered.
        assert_eq!(gate.pending(), 0);
    }

    #[test]
    fn test_unavailable_host_drops_after_ready() {
        let host = RecordingHost::new();
        host.set_available(false);
        let gate = ReadinessGate::new(Box::new(host.clone()));
        gate.mark_ready();

        gate.enqueue_or_deliver(msg(1));
        host.set_available(true);
        gate.flush();

        assert!(host.deliveries().is_empty());
    }

    #[test]
    fn test_drain_pending() {
        let host = RecordingHost::new();
        let gate = ReadinessGate::new(Box::new(host.clone()));
        gate.enqueue_or_deliver(msg(1));

        let drained = gate.drain_pending();
        assert_eq!(drained, vec![msg(1)]);
        gate.mark_ready();
        assert!(host.deliveries().is_empty());
    }
}
