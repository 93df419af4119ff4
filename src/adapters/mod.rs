//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements         | Connects to                   |
//! |---------------|--------------------|-------------------------------|
//! | `config_file` | ConfigPort         | JSON file on disk             |
//! | `http_sink`   | SinkPort           | Local HTTP API (POST JSON)    |
//! | `log_sink`    | EventSink          | `log` facade / env_logger     |
//! | `sense_hat`   | SensorPort         | IIO sysfs (LPS25H, HTS221)    |
//! |               | IndicatorPort      | 8×8 LED framebuffer           |
//! | `simulated`   | SensorPort         | Synthetic readings            |
//! |               | IndicatorPort      | Log output only               |
//! | `time`        | ClockPort          | Local wall clock / test clock |

pub mod config_file;
pub mod http_sink;
pub mod log_sink;
pub mod sense_hat;
pub mod simulated;
pub mod time;
