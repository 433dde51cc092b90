use std::sync::{Condvar, Mutex};

/// Single-slot readiness gate.
///
/// At most one notification is pending at any moment: signaling an
/// already-signaled gate is a no-op, so back-to-back notifications do not
/// queue. The gate stays open once signaled until a consumer explicitly
/// resets it, which means a waiter arriving after the signal fired still
/// proceeds without blocking. Built for exactly one waiting consumer; the
/// surrounding channel enforces that.
pub struct LineGate {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl LineGate {
    pub fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Open the gate and release one waiter. No-op while a prior signal is
    /// still unconsumed.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock().unwrap();
        *signaled = true;
        self.cond.notify_one();
    }

    /// Block until the gate is open. Does not consume the signal.
    pub fn wait_signaled(&self) {
        let mut signaled = self.signaled.lock().unwrap();
        while !*signaled {
            signaled = self.cond.wait(signaled).unwrap();
        }
    }

    /// Consume the pending signal, closing the gate again.
    pub fn reset(&self) {
        let mut signaled = self.signaled.lock().unwrap();
        *signaled = false;
    }

    pub fn is_signaled(&self) -> bool {
        *self.signaled.lock().unwrap()
    }
}

impl Default for LineGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn signal_before_wait_does_not_block() {
        let gate = LineGate::new();
        gate.signal();
        gate.wait_signaled();
        assert!(gate.is_signaled());
        gate.reset();
        assert!(!gate.is_signaled());
    }

    #[test]
    fn waiter_is_released_by_signal() {
        let gate = Arc::new(LineGate::new());
        let (tx, rx) = mpsc::channel();
        let waiter = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                gate.wait_signaled();
                gate.reset();
                tx.send(()).unwrap();
            })
        };
        // The waiter should still be parked.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        gate.signal();
        rx.recv_timeout(Duration::from_secs(2)).expect("released");
        waiter.join().unwrap();
    }

    #[test]
    fn double_signal_leaves_one_pending_notification() {
        let gate = LineGate::new();
        gate.signal();
        gate.signal();
        gate.wait_signaled();
        gate.reset();
        // The second signal did not queue.
        assert!(!gate.is_signaled());
    }
}
