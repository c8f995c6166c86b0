//! Adapters between backends and the pool.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                     TaggedPool                         │
//! └───────────────────────────┬────────────────────────────┘
//!                             │ PoolStore
//!                             ▼
//! ┌───────────────────────────────────────────────────────┐
//! │  BackendAdapter ─────► Backend (fetch/save/delete)    │
//! │                 ─────► Flushable (flush_all), if any  │
//! └───────────────────────────────────────────────────────┘
//! ```

mod backend;

pub use backend::BackendAdapter;
