//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements         | Connects to              |
//! |-----------------|--------------------|--------------------------|
//! | `hardware`      | ActuatorPort       | Relay GPIO, servo LEDC   |
//! | `log_sink`      | EventSink          | Serial log output        |
//! | `time`          | ClockPort          | ESP32 system timer       |
//! | `wifi`          | ConnectivityPort   | ESP-IDF WiFi STA         |
//! | `command_queue` | (channel)          | embassy-sync channel     |
//! | `smart_home`    | (delivery)         | Voice-assistant devices  |

pub mod command_queue;
pub mod hardware;
pub mod log_sink;
pub mod smart_home;
pub mod time;
pub mod wifi;
