//! System configuration parameters
//!
//! All tunable parameters for the PetFeeder system.  The defaults are the
//! values the device ships with; a JSON override document can replace
//! any subset of them at provisioning time.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Longest window the wrap-tolerant clock comparison can track (2^31 ms).
const MAX_TRACKABLE_WINDOW_MS: u64 = 1 << 31;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    // --- Water relay ---
    /// Minimum water window, applied even at 0% (milliseconds)
    pub water_base_ms: u32,
    /// Extra water window per percent point (milliseconds)
    pub water_per_percent_ms: u32,

    // --- Food servo ---
    /// Minimum food window (milliseconds)
    pub food_base_ms: u32,
    /// Extra food window per percent point (milliseconds)
    pub food_per_percent_ms: u32,
    /// Time the servo holds each of its two positions while dispensing
    pub food_swing_period_ms: u32,
    /// Resting angle (degrees)
    pub servo_neutral_deg: u8,
    /// Position A, held on even phases (degrees)
    pub servo_position_a_deg: u8,
    /// Position B, held on odd phases (degrees)
    pub servo_position_b_deg: u8,
    /// Pulse width at 0° (microseconds)
    pub servo_min_pulse_us: u16,
    /// Pulse width at 180° (microseconds)
    pub servo_max_pulse_us: u16,
    /// Servo PWM frame rate (Hz)
    pub servo_frequency_hz: u32,

    // --- Liveness ---
    /// Task watchdog timeout (seconds)
    pub watchdog_timeout_secs: u32,
    /// Sleep between control loop iterations (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Network ---
    /// Status checks before giving up on the boot-time connection
    pub wifi_connect_attempts: u8,
    /// Delay between status checks (milliseconds)
    pub wifi_attempt_interval_ms: u32,
    /// Smart-home device name bound to the water relay
    pub water_device_name: heapless::String<32>,
    /// Smart-home device name bound to the food servo
    pub food_device_name: heapless::String<32>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            // Water
            water_base_ms: 60_000,
            water_per_percent_ms: 1_000,

            // Food
            food_base_ms: 1_000,
            food_per_percent_ms: 100,
            food_swing_period_ms: 1_000,
            servo_neutral_deg: 90,
            servo_position_a_deg: 120,
            servo_position_b_deg: 60,
            servo_min_pulse_us: 1_000,
            servo_max_pulse_us: 2_000,
            servo_frequency_hz: 50,

            // Liveness
            watchdog_timeout_secs: 5,
            control_loop_interval_ms: 1,
            telemetry_interval_secs: 60,

            // Network
            wifi_connect_attempts: 20,
            wifi_attempt_interval_ms: 500,
            water_device_name: name("Cat Water"),
            food_device_name: name("Cat Food"),
        }
    }
}

fn name(s: &str) -> heapless::String<32> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}

/// Errors from loading or validating a [`FeederConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document is not valid JSON for this schema.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

impl FeederConfig {
    /// Parse a JSON override document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Longest window a 100% water command can produce (milliseconds).
    pub fn max_water_window_ms(&self) -> u64 {
        self.water_base_ms as u64 + 100 * self.water_per_percent_ms as u64
    }

    /// Longest window a 100% food command can produce (milliseconds).
    pub fn max_food_window_ms(&self) -> u64 {
        self.food_base_ms as u64 + 100 * self.food_per_percent_ms as u64
    }

    /// Reject values the control loop cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_water_window_ms() >= MAX_TRACKABLE_WINDOW_MS {
            return Err(ConfigError::ValidationFailed("water window exceeds clock half-range"));
        }
        if self.max_food_window_ms() >= MAX_TRACKABLE_WINDOW_MS {
            return Err(ConfigError::ValidationFailed("food window exceeds clock half-range"));
        }
        if self.food_swing_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("food_swing_period_ms must be > 0"));
        }
        for deg in [
            self.servo_neutral_deg,
            self.servo_position_a_deg,
            self.servo_position_b_deg,
        ] {
            if deg > 180 {
                return Err(ConfigError::ValidationFailed("servo angle above 180 degrees"));
            }
        }
        if self.servo_min_pulse_us >= self.servo_max_pulse_us {
            return Err(ConfigError::ValidationFailed("servo pulse range is empty"));
        }
        if self.servo_frequency_hz == 0
            || u64::from(self.servo_max_pulse_us) * u64::from(self.servo_frequency_hz) >= 1_000_000
        {
            return Err(ConfigError::ValidationFailed("servo pulse does not fit in PWM frame"));
        }
        if self.watchdog_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed("watchdog_timeout_secs must be > 0"));
        }
        if self.control_loop_interval_ms == 0
            || u64::from(self.control_loop_interval_ms) * 2 >= u64::from(self.watchdog_timeout_secs) * 1000
        {
            return Err(ConfigError::ValidationFailed(
                "control loop interval must be below half the watchdog timeout",
            ));
        }
        if self.telemetry_interval_secs == 0
            || u64::from(self.telemetry_interval_secs) * 1000 >= MAX_TRACKABLE_WINDOW_MS
        {
            return Err(ConfigError::ValidationFailed(
                "telemetry interval must be > 0 and below clock half-range",
            ));
        }
        if self.water_device_name.is_empty() || self.food_device_name.is_empty() {
            return Err(ConfigError::ValidationFailed("device names must not be empty"));
        }
        if self.water_device_name == self.food_device_name {
            return Err(ConfigError::ValidationFailed("device names must differ"));
        }
        Ok(())
    }
}
