//! Telemetry ingestion: transport, framing and the read loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Telemetry stack                       │
//! │                                                          │
//! │  ┌───────────┐   ┌──────────┐   ┌─────────────────────┐  │
//! │  │ Transport │──▶│  Parser  │──▶│ Read loop           │  │
//! │  │ (trait)   │   │ (fields) │   │ → RoverService      │  │
//! │  └───────────┘   └──────────┘   └─────────────────────┘  │
//! │                                   ▲                      │
//! │                       channels ───┘ (cancel, commands)   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod parser;
pub mod read_loop;
pub mod transport;
