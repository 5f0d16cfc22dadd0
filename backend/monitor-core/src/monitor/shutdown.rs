use std::future::pending;

use tokio::sync::watch;

/// External request to close the listener and abandon readiness waits.
///
/// If the sending side is dropped without requesting shutdown, the signal
/// never fires.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Create a signal and the sender that triggers it.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (sender, receiver) = watch::channel(false);
        (sender, Self { receiver })
    }

    /// A signal that can never fire.
    pub fn never() -> Self {
        let (_sender, signal) = Self::channel();
        signal
    }

    pub fn is_requested(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once shutdown has been requested.
    pub async fn requested(&mut self) {
        let fired = self.receiver.wait_for(|requested| *requested).await.is_ok();
        if !fired {
            pending::<()>().await;
        }
    }
}
