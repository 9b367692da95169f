//! # Core Application Logic
//!
//! This module contains ideabot's business logic. It talks to the outside
//! world only through the `GenerationProvider`, `Messenger` and `IdeaStore`
//! seams, so every step can be exercised with test doubles.
//!
//! ```text
//!        ┌──────────────┐
//!        │   pipeline   │  one linear pass per invocation
//!        └──────┬───────┘
//!     ┌─────────┼──────────┬───────────┐
//!     ▼         ▼          ▼           ▼
//!  inference  delivery   store       idea
//!  (LLM API)  (Telegram) (SQLite)  (marker)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: TOML + env + CLI resolution and component construction
//! - [`idea`]: extracting the idea from generated text
//! - [`pipeline`]: the run state machine
//! - [`store`]: the append-only idea table

pub mod config;
pub mod idea;
pub mod pipeline;
pub mod store;
