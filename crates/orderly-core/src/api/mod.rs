//! Orderly REST API client.
//!
//! ```text
//! OrderlyClient ── validate ──► TypedMessageBuilder ──► SignatureProvider
//!       │                                                     │
//!       │ (unsigned / keyed endpoints)                        ▼
//!       │                                                assemble()
//!       ▼                                                     │
//!   Dispatcher ◄───────────── public / keyed route ───────────┘
//! ```

pub mod account;
pub mod assembler;
pub mod client;
pub mod http;
pub mod wallet;

pub use account::DAILY_VOLUME_MAX_DAYS;
pub use assembler::{assemble, merge_extras, DispatchRoute, RESERVED_KEYS};
pub use client::OrderlyClient;
pub use http::{Dispatcher, HttpDispatcher, OrderlyKeyCredentials};
