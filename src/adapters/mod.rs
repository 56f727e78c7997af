//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                   |
//! |-------------|-------------------|-------------------------------|
//! | `sqlite`    | StorePort         | SQLite file / in-memory DB    |
//! | `kv`        | KvPort            | JSON file / in-memory map     |
//! | `notifier`  | NotificationPort  | Log output + pending table    |
//! | `time`      | ClockPort         | Local wall clock / fixed time |
//! | `log_sink`  | EventSink         | Log output / recorded events  |

pub mod kv;
pub mod log_sink;
pub mod notifier;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod time;
