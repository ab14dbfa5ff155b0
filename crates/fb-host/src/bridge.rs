use std::sync::Arc;

use fb_auth::HandshakeResult;
use tracing::{debug, info, instrument, warn};

use crate::host::{HostError, ReadySignal, RuntimeHost};

/// Host-side object and method receiving the identity payload
pub const HOST_HANDLER: &str = "DiscordLoginDataHandler";
pub const HOST_METHOD: &str = "SetDiscordLoginData";

/// What happened to the handshake result
#[derive(Debug)]
pub enum Delivery {
    /// Identity handed to the host
    Sent,
    /// Nothing to send; the host runs as a guest
    Skipped,
    /// Host never became ready or refused the message
    Failed(HostError),
}

/// Hands the handshake result to the runtime host, once, after it is ready.
///
/// Only an authenticated result produces a message. Unauthenticated and failed
/// handshakes send nothing and the host keeps its guest defaults.
pub struct RuntimeBridge {
    host: Arc<dyn RuntimeHost>,
}

impl RuntimeBridge {
    pub fn new(host: Arc<dyn RuntimeHost>) -> Self {
        Self { host }
    }

    #[instrument(skip_all)]
    pub async fn deliver(self, result: HandshakeResult, ready: ReadySignal) -> Delivery {
        debug!("Waiting for runtime host readiness");
        if let Err(e) = ready.wait().await {
            warn!("Identity not delivered: {}", e);
            return Delivery::Failed(e);
        }

        let HandshakeResult::Authenticated(record) = result else {
            info!("No identity to deliver, host stays in guest mode");
            return Delivery::Skipped;
        };

        let sent = serde_json::to_string(&record)
            .map_err(HostError::from)
            .and_then(|payload| self.host.send_message(HOST_HANDLER, HOST_METHOD, payload));

        match sent {
            Ok(()) => {
                info!(user_id = %record.user_id, "Delivered identity to runtime host");
                Delivery::Sent
            }
            Err(e) => {
                warn!("Identity not delivered: {}", e);
                Delivery::Failed(e)
            }
        }
    }
}
