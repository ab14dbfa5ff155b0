use std::future::Future;

use fb_auth::{HandshakeOrchestrator, HandshakeState};
use fb_host::{Delivery, RuntimeBridge, ready_channel};
use tracing::{error, info, instrument};

/// What a launch did, for logging and tests
#[derive(Debug)]
pub struct LaunchReport {
    pub trail: Vec<HandshakeState>,
    pub delivery: Delivery,
    pub host_started: bool,
}

/// Run the identity handshake and the host bootstrap side by side.
///
/// The bridge only fires after both the handshake has produced its result
/// and `host_bootstrap` has completed, whichever finishes first. A failed
/// bootstrap leaves the host unready and the bridge gives up quietly.
#[instrument(skip_all)]
pub async fn launch<B>(
    orchestrator: HandshakeOrchestrator,
    bridge: RuntimeBridge,
    host_bootstrap: B,
) -> LaunchReport
where
    B: Future<Output = anyhow::Result<()>>,
{
    let (notifier, ready) = ready_channel();

    let handshake = async {
        let outcome = orchestrator.run().await;
        let delivery = bridge.deliver(outcome.result, ready).await;
        (outcome.trail, delivery)
    };

    let host = async {
        match host_bootstrap.await {
            Ok(()) => {
                info!("Runtime host ready");
                notifier.notify();
                true
            }
            Err(e) => {
                error!("Runtime host failed to start: {:#}", e);
                drop(notifier);
                false
            }
        }
    };

    let ((trail, delivery), host_started) = tokio::join!(handshake, host);
    LaunchReport {
        trail,
        delivery,
        host_started,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppConfig;
    use std::sync::Arc;
    use std::time::Duration;

    use fb_auth::{HandshakeConfig, HandshakeState, StaticSdk, detect};
    use fb_host::{ChannelHost, HostError};
    use tempfile::TempDir;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> HandshakeConfig {
        let origin = Url::parse(&server.uri()).unwrap();
        HandshakeConfig::new("app", &origin)
            .unwrap()
            .with_api_base(origin)
    }

    async fn mount_identity(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "7",
                "username": "bobby",
                "global_name": "Robert",
                "avatar": null,
                "discriminator": "0"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/@me/guilds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "42", "name": "Cat Club" }])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/@me/guilds/42/member"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nick": "Bob" })))
            .mount(server)
            .await;
    }

    async fn mount_exchange(server: &MockServer, status: u16) {
        Mock::given(method("POST"))
            .and(path("/.proxy/aws/Authenticate"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "access_token": "tok" })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn standalone_launch_starts_host_without_identity() {
        let server = MockServer::start().await;
        let (host, mut rx) = ChannelHost::new();
        let sdk = Arc::new(StaticSdk::new("code"));

        let report = launch(
            HandshakeOrchestrator::new(detect(""), config(&server), sdk.clone()),
            RuntimeBridge::new(Arc::new(host)),
            async { Ok(()) },
        )
        .await;

        assert!(report.host_started);
        assert!(matches!(report.delivery, Delivery::Skipped));
        assert_eq!(report.trail.last(), Some(&HandshakeState::Idle));
        assert!(sdk.authorize_calls().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn embedded_launch_delivers_guild_identity() {
        let server = MockServer::start().await;
        mount_exchange(&server, 200).await;
        mount_identity(&server).await;
        let (host, mut rx) = ChannelHost::new();
        let sdk = Arc::new(StaticSdk::new("code").in_scope("42"));

        let report = launch(
            HandshakeOrchestrator::new(detect("?frame_id=abc&guild_id=42"), config(&server), sdk),
            RuntimeBridge::new(Arc::new(host)),
            async { Ok(()) },
        )
        .await;

        assert!(matches!(report.delivery, Delivery::Sent));
        let message = rx.try_recv().unwrap();
        let payload: serde_json::Value = serde_json::from_str(&message.payload).unwrap();
        assert_eq!(payload["displayName"], "Bob");
        assert_eq!(payload["scopeId"], "42");
        assert_eq!(payload["scopeName"], "Cat Club");
        assert_eq!(payload["userId"], "7");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn slow_host_still_receives_identity_after_ready() {
        let server = MockServer::start().await;
        mount_exchange(&server, 200).await;
        mount_identity(&server).await;
        let (host, mut rx) = ChannelHost::new();
        let sdk = Arc::new(StaticSdk::new("code").in_scope("42"));

        let report = launch(
            HandshakeOrchestrator::new(detect("frame_id=abc"), config(&server), sdk),
            RuntimeBridge::new(Arc::new(host)),
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                // Handshake is long done; nothing may have reached the host yet
                assert!(rx.try_recv().is_err());
                Ok(())
            },
        )
        .await;

        assert!(matches!(report.delivery, Delivery::Sent));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn exchange_failure_still_starts_host() {
        let server = MockServer::start().await;
        mount_exchange(&server, 500).await;
        let (host, mut rx) = ChannelHost::new();
        let sdk = Arc::new(StaticSdk::new("code").in_scope("42"));

        let report = launch(
            HandshakeOrchestrator::new(detect("frame_id=abc"), config(&server), sdk),
            RuntimeBridge::new(Arc::new(host)),
            async { Ok(()) },
        )
        .await;

        assert!(report.host_started);
        assert!(matches!(report.delivery, Delivery::Skipped));
        assert_eq!(report.trail.last(), Some(&HandshakeState::Done));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn resolution_failure_still_starts_host() {
        let server = MockServer::start().await;
        mount_exchange(&server, 200).await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "401: Unauthorized" })))
            .mount(&server)
            .await;
        let (host, mut rx) = ChannelHost::new();
        let sdk = Arc::new(StaticSdk::new("code").in_scope("42"));

        let report = launch(
            HandshakeOrchestrator::new(detect("frame_id=abc"), config(&server), sdk),
            RuntimeBridge::new(Arc::new(host)),
            async { Ok(()) },
        )
        .await;

        assert!(report.host_started);
        assert!(matches!(report.delivery, Delivery::Skipped));
        assert!(report.trail.contains(&HandshakeState::ResolvingIdentity));
        assert_eq!(report.trail.last(), Some(&HandshakeState::Done));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn launch_from_config_without_client_id_starts_host() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            "[auth]\norigin = \"https://1234.discordsays.com\"\n\n[host]\nproduct_name = \"Meow Wars\"\n",
        )
        .await
        .unwrap();
        let config = AppConfig::load(&path).await.unwrap();

        for (query, last) in [
            ("?foo=1", HandshakeState::Idle),
            ("?frame_id=abc&guild_id=42", HandshakeState::Done),
        ] {
            let (host, mut rx) = ChannelHost::new();
            let sdk = Arc::new(StaticSdk::new("code").in_scope("42"));
            let report = launch(
                config.orchestrator(detect(query), sdk.clone()),
                RuntimeBridge::new(Arc::new(host)),
                async { Ok(()) },
            )
            .await;

            assert!(report.host_started, "query {query}");
            assert!(matches!(report.delivery, Delivery::Skipped));
            assert_eq!(report.trail.last(), Some(&last));
            assert!(sdk.authorize_calls().is_empty());
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn failed_host_bootstrap_is_not_fatal() {
        let server = MockServer::start().await;
        mount_exchange(&server, 200).await;
        mount_identity(&server).await;
        let (host, mut rx) = ChannelHost::new();
        let sdk = Arc::new(StaticSdk::new("code").in_scope("42"));

        let report = launch(
            HandshakeOrchestrator::new(detect("frame_id=abc"), config(&server), sdk),
            RuntimeBridge::new(Arc::new(host)),
            async { Err(anyhow::anyhow!("wasm instantiation failed")) },
        )
        .await;

        assert!(!report.host_started);
        assert!(matches!(report.delivery, Delivery::Failed(HostError::NotReady)));
        assert!(rx.try_recv().is_err());
    }
}
