// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Panel connection configuration

use std::time::Duration;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_MS, DEFAULT_KEEPALIVE_INTERVAL,
    DEFAULT_REFRESH_INTERVAL, DEFAULT_UDP_PORT, MIN_KEEPALIVE_INTERVAL, MIN_REFRESH_INTERVAL,
    TOKEN_LIFETIME,
};

/// Arm mode for partition arming commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmMode {
    /// Full/away arm ("away" wire command)
    Away,
    /// Partial/home arm ("delayed" wire command)
    Home,
}

impl ArmMode {
    /// The path segment of the arm command.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Away => "away",
            Self::Home => "delayed",
        }
    }

    /// Parse a domain mode string. "home" is a home arm; anything else arms away.
    pub fn from_mode(mode: &str) -> Self {
        if mode.eq_ignore_ascii_case("home") {
            Self::Home
        } else {
            Self::Away
        }
    }
}

/// Configuration for connecting to a Garnet panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Garnet Control account email
    pub email: String,
    /// Garnet Control account password
    pub password: String,
    /// Panel identifier in Garnet Control (e.g. "a10050008d96")
    pub system_id: String,
    /// SIA account the panel's communicator reports with
    pub account: String,
    /// Cloud API base URL
    pub api_base_url: String,
    /// Panel-side command timeout sent in request bodies (ms)
    pub api_timeout_ms: u64,
    /// Local HTTP request timeout
    pub http_timeout: Duration,
    /// UDP port of the shared SIA listener
    pub udp_port: u16,
    /// Expected period between communicator reports
    pub keepalive_interval: Duration,
    /// Period of the status poll (zero disables polling)
    pub refresh_interval: Duration,
    /// Status attempts at connect before giving up
    pub connect_retries: u32,
    /// Fixed delay between connect attempts
    pub connect_retry_delay: Duration,
    /// Session token lifetime before a silent re-login
    pub token_lifetime: Duration,
    /// Capacity of the per-account push queue
    pub push_queue_capacity: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            system_id: String::new(),
            account: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_timeout_ms: DEFAULT_API_TIMEOUT_MS,
            http_timeout: Duration::from_secs(30),
            udp_port: DEFAULT_UDP_PORT,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            connect_retries: 5,
            connect_retry_delay: Duration::from_secs(3),
            token_lifetime: TOKEN_LIFETIME,
            push_queue_capacity: 64,
        }
    }
}

impl PanelConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> PanelConfigBuilder {
        PanelConfigBuilder::default()
    }

    /// Controller name used to derive device unique keys.
    pub fn controller_name(&self) -> String {
        self.account.replace('.', "_")
    }
}

/// Builder for PanelConfig.
#[derive(Debug, Clone, Default)]
pub struct PanelConfigBuilder {
    config: PanelConfig,
}

impl PanelConfigBuilder {
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.config.email = email.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn system_id(mut self, system_id: impl Into<String>) -> Self {
        self.config.system_id = system_id.into();
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.config.account = account.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn api_timeout_ms(mut self, ms: u64) -> Self {
        self.config.api_timeout_ms = ms;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn udp_port(mut self, port: u16) -> Self {
        self.config.udp_port = port;
        self
    }

    /// Keepalive period; values under 60 seconds are raised to 60.
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.config.keepalive_interval = interval.max(MIN_KEEPALIVE_INTERVAL);
        self
    }

    /// Poll period; zero disables polling, other values are raised to at least 10 seconds.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = if interval.is_zero() {
            Duration::ZERO
        } else {
            interval.max(MIN_REFRESH_INTERVAL)
        };
        self
    }

    pub fn connect_retries(mut self, retries: u32) -> Self {
        self.config.connect_retries = retries;
        self
    }

    pub fn connect_retry_delay(mut self, delay: Duration) -> Self {
        self.config.connect_retry_delay = delay;
        self
    }

    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.config.token_lifetime = lifetime;
        self
    }

    pub fn push_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.push_queue_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> PanelConfig {
        self.config
    }
}
