// MIT License - Copyright (c) 2026 garnet-bridge contributors
// garnet-bridge
//
//! # garnet-bridge
//!
//! State synchronization for Garnet alarm panels.
//!
//! Push reports (SIA DC-09 frames with a Contact-ID body) arrive on a UDP
//! socket shared by every configured panel. Authoritative status snapshots
//! come from the Garnet Control cloud API. [`GarnetPanel`] merges both into
//! one device store and notifies subscribers of every change.
//!
//! ## Quick Start
//!
//! ```no_run
//! use garnet_bridge::{ArmMode, GarnetPanel, ListenerRegistry, PanelConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PanelConfig::builder()
//!         .email("user@example.com")
//!         .password("secret")
//!         .system_id("a10050008d96")
//!         .account("1234")
//!         .build();
//!
//!     let registry = ListenerRegistry::new();
//!     let mut panel = GarnetPanel::connect(config, &registry).await?;
//!
//!     let mut events = panel.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     panel.arm_partition(1, ArmMode::Home).await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     panel.disconnect();
//!     Ok(())
//! }
//! ```

pub mod comm;
pub mod config;
pub mod constants;
pub mod devices;
pub mod error;
pub mod event;
pub mod frame;
pub mod liveness;
pub mod panel;
pub mod protocol;
pub mod status;
pub mod store;
pub mod transport;

// Re-exports for convenience
pub use comm::GarnetComm;
pub use config::{ArmMode, PanelConfig, PanelConfigBuilder};
pub use devices::{
    ButtonAction, Device, DeviceId, DeviceKind, DeviceState, EmergencyType, LinkState,
    OutputState, PanelInfo, PartitionState, Permissions, SystemInfo, ZoneFlags,
};
pub use error::{GarnetError, Result};
pub use event::{EventReceiver, PanelEvent};
pub use frame::SiaFrame;
pub use panel::GarnetPanel;
pub use protocol::{SiaAction, SiaMessage};
pub use status::PanelStatus;
pub use store::DeviceStore;
pub use transport::{ListenerRegistry, SiaListener};
