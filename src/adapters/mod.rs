//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements              | Connects to                 |
//! |------------|-------------------------|-----------------------------|
//! | `hardware` | DisplayPort, SirenPort  | LCD + siren drivers         |
//! | `log_sink` | EventSink               | Serial log output           |
//! | `sim`      | SerialPort              | In-memory pipe (host)       |
//! | `uart`     | SerialPort              | ESP-IDF UART driver         |

pub mod hardware;
pub mod log_sink;
pub mod sim;
#[cfg(feature = "espidf")]
pub mod uart;
