//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity.  The actuators never depend on it: when the network is
//! missing the feeder runs in manual mode, where no commands arrive but
//! running windows still expire on schedule.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests, with
//!   the link state driven by [`WifiAdapter::set_sim_link`].
//!
//! ## Connection policy
//!
//! The boot connect checks link status a bounded number of times
//! (`wifi_connect_attempts` × `wifi_attempt_interval_ms`) and then gives
//! up into manual mode.  Afterwards [`ConnectivityPort::poll`] never
//! blocks: it watches the link and re-issues a connect on an exponential
//! backoff (2 s → 4 s → 8 s … capped at 60 s).

use core::fmt;
use log::{error, info, warn};

use crate::app::clock::Timestamp;
use crate::app::deadline::Deadline;
use crate::config::FeederConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    AlreadyConnected,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::AlreadyConnected => write!(f, "already connected to AP"),
        }
    }
}

impl From<ConnectivityError> for CommsError {
    fn from(_: ConnectivityError) -> Self {
        CommsError::WifiConnectFailed
    }
}

pub trait ConnectivityPort {
    /// Bounded, blocking initial connect.
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    /// Non-blocking link supervision; call once per loop iteration.
    fn poll(&mut self, now: Timestamp);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    /// Boot connect gave up; retries continue in the background.
    ManualMode,
}

const MIN_BACKOFF_MS: u32 = 2_000;
const MAX_BACKOFF_MS: u32 = 60_000;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    connect_attempts: u8,
    attempt_interval_ms: u32,
    backoff_ms: u32,
    next_retry: Deadline,
    retries: u32,
    #[cfg(target_os = "espidf")]
    driver: Option<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    pub fn new(connect_attempts: u8, attempt_interval_ms: u32) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            connect_attempts: connect_attempts.max(1),
            attempt_interval_ms,
            backoff_ms: MIN_BACKOFF_MS,
            next_retry: Deadline::unset(),
            retries: 0,
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            sim_link_up: true,
        }
    }

    pub fn from_config(config: &FeederConfig) -> Self {
        Self::new(config.wifi_connect_attempts, config.wifi_attempt_interval_ms)
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_manual_mode(&self) -> bool {
        self.state == WifiState::ManualMode
    }

    /// Background reconnect attempts made by `poll` so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Hand over the station driver built from the modem peripheral.
    #[cfg(target_os = "espidf")]
    pub fn attach_driver(&mut self, driver: EspWifi<'static>) {
        self.driver = Some(driver);
    }

    /// Simulation: bring the access point up or down.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }

    fn schedule_retry(&mut self, now: Timestamp) {
        self.next_retry.arm(self.backoff_ms, now);
        self.backoff_ms = self.backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        let ssid = self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?;
        let password = self
            .password
            .as_str()
            .try_into()
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let Some(wifi) = self.driver.as_mut() else {
            error!("WiFi(espidf): no driver attached");
            return Err(ConnectivityError::ConnectionFailed);
        };

        let cfg = Configuration::Client(ClientConfiguration {
            ssid,
            password,
            auth_method,
            ..Default::default()
        });
        wifi.set_configuration(&cfg).map_err(|e| {
            error!("WiFi(espidf): set_configuration failed: {}", e);
            ConnectivityError::ConnectionFailed
        })?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|e| {
                error!("WiFi(espidf): start failed: {}", e);
                ConnectivityError::ConnectionFailed
            })?;
        }
        wifi.connect().map_err(|e| {
            warn!("WiFi(espidf): connect request failed: {}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        info!("WiFi(sim): connect requested for '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Some(wifi) = self.driver.as_mut() {
            wifi.disconnect().ok();
            wifi.stop().ok();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&self) -> bool {
        self.driver.as_ref().is_some_and(|wifi| {
            wifi.is_connected().unwrap_or(false) && wifi.sta_netif().is_up().unwrap_or(false)
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&self) -> bool {
        self.sim_link_up && !self.ssid.is_empty()
    }

    #[cfg(target_os = "espidf")]
    fn platform_delay_ms(ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_delay_ms(ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            self.state = WifiState::ManualMode;
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;

        if let Err(e) = self.platform_begin() {
            error!("WiFi: connection failed: {}", e);
            self.state = WifiState::ManualMode;
            return Err(e);
        }

        for attempt in 1..=self.connect_attempts {
            if self.platform_link_up() {
                self.state = WifiState::Connected;
                self.backoff_ms = MIN_BACKOFF_MS;
                self.next_retry.clear();
                info!("WiFi: connected after {} check(s)", attempt);
                return Ok(());
            }
            Self::platform_delay_ms(self.attempt_interval_ms);
        }

        warn!(
            "WiFi: no link after {} checks, continuing in manual mode",
            self.connect_attempts
        );
        self.state = WifiState::ManualMode;
        Err(ConnectivityError::ConnectionFailed)
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        self.next_retry.clear();
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    fn poll(&mut self, now: Timestamp) {
        match self.state {
            WifiState::Connected => {
                if !self.platform_link_up() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.state = WifiState::Reconnecting { attempt: 0 };
                    self.backoff_ms = MIN_BACKOFF_MS;
                    self.schedule_retry(now);
                }
            }
            WifiState::Reconnecting { .. } | WifiState::ManualMode => {
                // Nothing to join until credentials are set.
                if self.ssid.is_empty() {
                    self.next_retry.clear();
                    return;
                }
                if self.platform_link_up() {
                    self.state = WifiState::Connected;
                    self.backoff_ms = MIN_BACKOFF_MS;
                    self.next_retry.clear();
                    info!("WiFi: reconnected");
                    return;
                }
                if !self.next_retry.is_armed() {
                    self.schedule_retry(now);
                    return;
                }
                if self.next_retry.is_expired(now) {
                    let attempt = match self.state {
                        WifiState::Reconnecting { attempt } => attempt + 1,
                        _ => 1,
                    };
                    info!("WiFi: reconnect attempt {} (next backoff {}ms)", attempt, self.backoff_ms);
                    self.retries = self.retries.saturating_add(1);
                    if self.platform_begin().is_err() {
                        warn!("WiFi: reconnect attempt {} failed", attempt);
                    }
                    if self.state != WifiState::ManualMode {
                        self.state = WifiState::Reconnecting { attempt };
                    }
                    self.schedule_retry(now);
                }
            }
            WifiState::Disconnected | WifiState::Connecting => {}
        }
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
