//! # Mindsprout Core Library
//!
//! This library provides the progress-tracking engine for the Mindsprout
//! meditation app. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary; any GUI surface is a thin skin
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Progress**: A pure fold over the append-only session history that
//!   maintains total practice minutes and a calendar-day streak
//! - **Milestones**: A static threshold table mapping cumulative minutes to
//!   growth stages
//! - **Storage**: SQLite-backed key/value store and TOML-based configuration
//! - **Gateway**: The shared store plus a payload-less change signal -- the
//!   only channel between the writer process and the read-only widget process
//! - **Snapshot**: The reader-side materialized view with an explicit
//!   invalidation-driven refresh cycle
//!
//! ## Key Components
//!
//! - [`ProgressTracker`]: Writer-side handle; records sessions and commits
//! - [`SyncGateway`]: Durable shared store with degraded local fallback
//! - [`SnapshotProvider`]: Reader-side view over the gateway
//! - [`MilestoneTable`]: Growth stage resolution

pub mod error;
pub mod gateway;
pub mod milestone;
pub mod progress;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod tracker;

pub use error::{ConfigError, EngineError, Result, StoreError};
pub use gateway::{ChangeSignal, SignalWatcher, SyncGateway};
pub use milestone::{MilestoneStage, MilestoneTable, StageResolution};
pub use progress::AggregateState;
pub use session::Session;
pub use snapshot::{RefreshState, Snapshot, SnapshotProvider};
pub use storage::{Config, ProgressStore};
pub use tracker::ProgressTracker;
