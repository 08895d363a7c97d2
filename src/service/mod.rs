//! Service module providing multi-tournament support with an async actor model.
//!
//! This module implements:
//! - TournamentActor: async actor owning one tournament's engine state
//! - TournamentDirectory: spawns actors and routes by tournament id
//! - Message-based communication with tokio channels
//! - Subscriber notifications for match and round progress
//!
//! ## Architecture
//!
//! Each tournament runs in a separate Tokio task with an mpsc message
//! inbox. Everything that mutates one tournament's state flows through
//! its inbox, so concurrent result submissions are serialized without
//! locks, while independent tournaments progress in parallel.
//!
//! ## Example
//!
//! ```ignore
//! use dilemma_arena::coordinator::LocalSessionLauncher;
//! use dilemma_arena::service::TournamentDirectory;
//! use dilemma_arena::tournament::TournamentSettings;
//! use std::sync::Arc;
//!
//! let directory = TournamentDirectory::new(
//!     TournamentSettings::default(),
//!     Arc::new(LocalSessionLauncher),
//! );
//! let (tournament, handle) = directory.create_tournament(lobby).await?;
//! handle.start().await??;
//! ```

pub mod actor;
pub mod manager;
pub mod messages;

pub use actor::{TournamentActor, TournamentHandle};
pub use manager::TournamentDirectory;
pub use messages::{TournamentMessage, TournamentNotification};
