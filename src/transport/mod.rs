// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Cloud HTTP and local UDP transports

pub mod http;
pub mod models;
pub mod session;
pub mod udp;

pub use http::ApiClient;
pub use session::{SequenceCounter, Session};
pub use udp::{ListenerRegistry, SiaListener};
