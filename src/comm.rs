// MIT License - Copyright (c) 2026 garnet-bridge contributors
// Garnet Control session client

use std::future::Future;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::config::{ArmMode, PanelConfig};
use crate::devices::{EmergencyType, OutputState, Permissions, SystemInfo};
use crate::error::{GarnetError, Result};
use crate::status::PanelStatus;
use crate::transport::models::{
    CommandRequest, EmergencyPartition, EmergencyRequest, EmergencyResponse, StatusResponse,
};
use crate::transport::{ApiClient, SequenceCounter, Session};

/// Mutable session state. Every API call runs under its lock, so commands
/// reach the panel one at a time and see a consistent sequence number.
#[derive(Debug, Default)]
struct CommState {
    session: Session,
    seq: SequenceCounter,
    user_name: Option<String>,
    system: Option<SystemInfo>,
}

/// Authenticated access to one panel through the Garnet Control cloud.
///
/// Handles login, token expiry, a single transparent re-login when the
/// cloud rejects a token, the command sequence counter and permission
/// checks. Busy/unresponsive panels surface as retryable errors; only
/// [`GarnetComm::connect`] retries them internally.
pub struct GarnetComm {
    config: PanelConfig,
    api: ApiClient,
    state: Mutex<CommState>,
}

impl GarnetComm {
    pub fn new(config: PanelConfig) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self {
            config,
            api,
            state: Mutex::new(CommState::default()),
        })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Log in, load the system programming and read the first status.
    ///
    /// The status read is retried `connect_retries` times with a fixed
    /// delay while the panel is busy; anything else fails immediately.
    pub async fn connect(&self) -> Result<(SystemInfo, PanelStatus)> {
        let info = {
            let mut state = self.state.lock().await;
            self.fetch_system_info_locked(&mut state).await?
        };

        let attempts = self.config.connect_retries.max(1);
        let mut attempt = 1;
        let status = loop {
            match self.get_state().await {
                Ok(status) => break status,
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(
                        "Status attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, attempts, e, self.config.connect_retry_delay
                    );
                    sleep(self.config.connect_retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            "Connected to {} {} ({})",
            info.panel.model_name, info.panel.id, info.panel.name
        );
        Ok((info, status))
    }

    /// Read the panel status. Does not advance the sequence counter.
    pub async fn get_state(&self) -> Result<PanelStatus> {
        let mut state = self.state.lock().await;
        self.get_state_locked(&mut state).await
    }

    /// Arm `partition` (1-based).
    ///
    /// The status is read first; the arm is refused with `OpenZones` while
    /// any configured zone is open.
    pub async fn arm_system(&self, partition: u32, mode: ArmMode) -> Result<PanelStatus> {
        let mut state = self.state.lock().await;
        if !permissions_of(&state)?.arm {
            return Err(GarnetError::PermissionDenied { action: "arm" });
        }

        let current = self.get_state_locked(&mut state).await?;
        let mask = state.system.as_ref().map_or(u32::MAX, SystemInfo::zone_mask);
        let open = current.open_zones(mask);
        if open != 0 {
            warn!("Partition {} not armed, open zones {:#010x}", partition, open);
            return Err(GarnetError::OpenZones { mask: open });
        }

        let command = format!("arm/{}", mode.command());
        self.send_command_locked(&mut state, &command, Some(partition))
            .await
    }

    pub async fn disarm_system(&self, partition: u32) -> Result<PanelStatus> {
        let mut state = self.state.lock().await;
        if !permissions_of(&state)?.disarm {
            return Err(GarnetError::PermissionDenied { action: "disarm" });
        }
        self.send_command_locked(&mut state, "disarm", Some(partition))
            .await
    }

    /// Switch the wired siren on or off.
    pub async fn horn_control(&self, mode: OutputState) -> Result<PanelStatus> {
        let mut state = self.state.lock().await;
        if !permissions_of(&state)?.horn {
            return Err(GarnetError::PermissionDenied {
                action: "operate the siren",
            });
        }
        let command = if mode.is_on() { "set_bell" } else { "unset_bell" };
        self.send_command_locked(&mut state, command, None).await
    }

    /// Report an emergency against a partition.
    pub async fn report_emergency(
        &self,
        kind: EmergencyType,
        partition: u32,
        partition_name: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let api = &self.api;
        let system_id = self.config.system_id.as_str();
        let timeout = self.config.api_timeout_ms;

        let resp = self
            .with_session(&mut state, |token, _seq| async move {
                let body = EmergencyRequest {
                    partition: EmergencyPartition {
                        name: partition_name,
                        number: partition,
                        enabled: true,
                        edited_name: partition_name,
                    },
                    emergency_type: kind.code(),
                    timeout,
                };
                api.post_command::<_, EmergencyResponse>(&token, system_id, "emergency", &body)
                    .await
            })
            .await?;
        info!("Emergency {} reported on partition {}", kind.name(), partition);
        debug!("Emergency response: {:?}", resp.message.map(|m| m.response));
        Ok(())
    }

    /// Display name of the logged-in user.
    pub async fn user_name(&self) -> Option<String> {
        self.state.lock().await.user_name.clone()
    }

    pub async fn permissions(&self) -> Permissions {
        let state = self.state.lock().await;
        state
            .system
            .as_ref()
            .map(|s| s.permissions)
            .unwrap_or_default()
    }

    pub async fn system_info(&self) -> Option<SystemInfo> {
        self.state.lock().await.system.clone()
    }

    async fn login_locked(&self, state: &mut CommState) -> Result<()> {
        info!("Logging in to Garnet Control");
        let resp = self
            .api
            .login(&self.config.email, &self.config.password)
            .await?;
        state.session.store(resp.access_token, Instant::now());
        state.seq.reset();
        if state.user_name.is_none()
            && let Some(user) = resp.user_data
        {
            let name = user.display_name();
            info!("Logged in as {}", name);
            state.user_name = Some(name);
        }
        Ok(())
    }

    /// Current token, logging in first when it is missing or expired.
    async fn ensure_token(&self, state: &mut CommState) -> Result<String> {
        if state
            .session
            .is_expired_at(Instant::now(), self.config.token_lifetime)
        {
            if state.session.token().is_some() {
                debug!("Session token expired");
            }
            self.login_locked(state).await?;
        }
        state
            .session
            .token()
            .map(str::to_string)
            .ok_or(GarnetError::NotConnected)
    }

    /// Run `call` with a valid token and the current sequence value.
    ///
    /// A rejected token triggers one re-login and one retry; a second
    /// rejection is returned to the caller.
    async fn with_session<T, F, Fut>(&self, state: &mut CommState, mut call: F) -> Result<T>
    where
        F: FnMut(String, String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut relogin_budget = 1u8;
        loop {
            let token = self.ensure_token(state).await?;
            match call(token, state.seq.current()).await {
                Err(e) if e.is_auth_expired() && relogin_budget > 0 => {
                    relogin_budget -= 1;
                    warn!("{}. Logging in again", e);
                    state.session.invalidate();
                }
                result => return result,
            }
        }
    }

    async fn fetch_system_info_locked(&self, state: &mut CommState) -> Result<SystemInfo> {
        let api = &self.api;
        let system_id = self.config.system_id.as_str();
        let system = self
            .with_session(state, |token, _seq| async move {
                api.get_system(&token, system_id).await
            })
            .await?;

        if system.id != self.config.system_id {
            return Err(GarnetError::SystemNotFound {
                system_id: self.config.system_id.clone(),
            });
        }

        let info = SystemInfo::from(system);
        debug!(
            "System {} has {} partitions and {} zones",
            info.panel.id,
            info.partitions.len(),
            info.zones.len()
        );
        state.system = Some(info.clone());
        Ok(info)
    }

    async fn get_state_locked(&self, state: &mut CommState) -> Result<PanelStatus> {
        let api = &self.api;
        let system_id = self.config.system_id.as_str();
        let timeout = self.config.api_timeout_ms;
        let resp = self
            .with_session(state, |token, seq| async move {
                let body = CommandRequest {
                    seq,
                    part_number: None,
                    timeout,
                };
                api.post_command::<_, StatusResponse>(&token, system_id, "state", &body)
                    .await
            })
            .await?;
        debug!("Status: {}", resp.message.status);
        PanelStatus::parse(&resp.message.status)
    }

    /// Send a mutating command and decode the status it returns. The
    /// sequence counter advances once the cloud accepts the command.
    async fn send_command_locked(
        &self,
        state: &mut CommState,
        command: &str,
        partition: Option<u32>,
    ) -> Result<PanelStatus> {
        let api = &self.api;
        let system_id = self.config.system_id.as_str();
        let timeout = self.config.api_timeout_ms;
        let resp = self
            .with_session(state, |token, seq| async move {
                let body = CommandRequest {
                    seq,
                    part_number: partition.map(|p| p.to_string()),
                    timeout,
                };
                api.post_command::<_, StatusResponse>(&token, system_id, command, &body)
                    .await
            })
            .await?;
        state.seq.advance();
        info!("Command {} accepted", command);
        debug!("Status: {}", resp.message.status);
        PanelStatus::parse(&resp.message.status)
    }
}

fn permissions_of(state: &CommState) -> Result<Permissions> {
    state
        .system
        .as_ref()
        .map(|s| s.permissions)
        .ok_or(GarnetError::NotConnected)
}
