pub mod assets;
mod bridge;
pub mod config;
mod host;

pub use assets::HostAssets;
pub use bridge::{Delivery, HOST_HANDLER, HOST_METHOD, RuntimeBridge};
pub use config::HostConfig;
pub use host::{
    ChannelHost, HostError, HostMessage, ReadyNotifier, ReadySignal, RuntimeHost, ready_channel,
};
