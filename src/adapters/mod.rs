//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements   | Connects to                 |
//! |------------------|--------------|-----------------------------|
//! | `motor`          | ActuatorPort | Dual H-bridge (GPIO + LEDC) |
//! | `log_sink`       | EventSink    | Serial log output           |
//! | `config_store`   | ConfigPort   | RAM / NVS postcard blob     |
//! | `uart_transport` | Transport    | IMU telemetry UART          |

pub mod config_store;
pub mod log_sink;
pub mod motor;
pub mod uart_transport;
