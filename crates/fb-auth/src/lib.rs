//! Embedded-launch authentication and identity resolution
//!
//! This crate implements the identity handshake an application runs when it
//! is launched inside an embedding platform's frame.
//!
//! # Handshake Flow
//!
//! 1. Launch detection from the page query (`frame_id` marker)
//! 2. SDK `ready` + `authorize` for a one-time authorization code
//! 3. Code exchange through the backend proxy for an access token
//! 4. Identity resolution: user, launch guild, nickname and avatar
//!
//! Any failure after detection degrades to an unauthenticated result instead
//! of an error, so the runtime host can always start.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fb_auth::{detect, HandshakeConfig, HandshakeOrchestrator, HandshakeResult, StaticSdk};
//! use url::Url;
//!
//! # async fn example() -> Result<(), url::ParseError> {
//! let origin = Url::parse("https://app.example/")?;
//! let ctx = detect("?instance_id=abc");
//! let config = HandshakeConfig::new("1234", &origin)?;
//!
//! let outcome = HandshakeOrchestrator::new(ctx, config, Arc::new(StaticSdk::new("code")))
//!     .run()
//!     .await;
//!
//! // Standalone launch: no handshake, no identity
//! assert!(matches!(outcome.result, HandshakeResult::Unauthenticated));
//! # Ok(())
//! # }
//! # tokio_test::block_on(example()).unwrap();
//! ```
//!
//! # Important Notes
//!
//! - Access tokens are wiped on drop and never logged or persisted
//! - Pick one [`ResolutionStrategy`] per deployment; strategies are never mixed

pub mod client;
pub mod config;
pub mod detect;
pub mod errors;
pub mod handshake;
pub mod identity;
pub mod models;
pub mod sdk;
pub mod token;

// Re-export main types
pub use client::{IdentityApi, TokenExchangeClient};
pub use config::{HandshakeConfig, HttpTimeouts, ResolutionStrategy};
pub use detect::{detect, LaunchContext};
pub use errors::{HandshakeError, ResolutionError, Result, SdkError, TransportError};
pub use handshake::{HandshakeOrchestrator, HandshakeOutcome, HandshakeResult, HandshakeState};
pub use identity::{IdentityRecord, IdentityResolver};
pub use models::{ApiUser, AuthenticatedUser, AuthorizeRequest};
pub use sdk::{EmbeddingSdk, StaticSdk};
pub use token::{AccessToken, AuthorizationCode};
