use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Host dropped its readiness notifier without becoming ready")]
    NotReady,

    #[error("Host message channel is closed")]
    Closed,

    #[error("Failed to encode host payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Runtime host addressed by fire-and-forget messages
///
/// `send_message` must not block or wait for the host to handle the message.
pub trait RuntimeHost: Send + Sync {
    fn send_message(&self, target: &str, method: &str, payload: String) -> Result<(), HostError>;
}

/// A message as queued for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMessage {
    pub target: String,
    pub method: String,
    pub payload: String,
}

/// Host reached through an unbounded channel drained by the host's own task
#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<HostMessage>,
}

impl ChannelHost {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RuntimeHost for ChannelHost {
    fn send_message(&self, target: &str, method: &str, payload: String) -> Result<(), HostError> {
        self.tx
            .send(HostMessage {
                target: target.to_string(),
                method: method.to_string(),
                payload,
            })
            .map_err(|_| HostError::Closed)
    }
}

/// Held by the host bootstrap; fired once the host can take messages
#[derive(Debug)]
pub struct ReadyNotifier(oneshot::Sender<()>);

impl ReadyNotifier {
    pub fn notify(self) {
        // Receiver gone means nobody is waiting to deliver anything.
        let _ = self.0.send(());
    }
}

/// Awaited by the bridge before it sends anything
#[derive(Debug)]
pub struct ReadySignal(oneshot::Receiver<()>);

impl ReadySignal {
    /// Resolve when the host is ready, or fail if its bootstrap gave up.
    pub async fn wait(self) -> Result<(), HostError> {
        self.0.await.map_err(|_| HostError::NotReady)
    }
}

pub fn ready_channel() -> (ReadyNotifier, ReadySignal) {
    let (tx, rx) = oneshot::channel();
    (ReadyNotifier(tx), ReadySignal(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropped_notifier_fails_the_signal() {
        let (notifier, signal) = ready_channel();
        drop(notifier);
        assert!(matches!(signal.wait().await, Err(HostError::NotReady)));
    }

    #[test]
    fn closed_channel_reports_closed() {
        let (host, rx) = ChannelHost::new();
        drop(rx);
        let result = host.send_message("Handler", "Method", "{}".to_string());
        assert!(matches!(result, Err(HostError::Closed)));
    }
}
