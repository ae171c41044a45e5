//! GPIO / peripheral pin assignments for the PetFeeder board (ESP32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Water relay
// ---------------------------------------------------------------------------

/// Digital output: HIGH = relay closed (water pump powered).
pub const WATER_RELAY_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Food servo
// ---------------------------------------------------------------------------

/// LEDC PWM output for the food-dispenser servo signal line.
pub const FOOD_SERVO_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// On-board LED: lit during boot and while WiFi is connected.
pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  14-bit gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
