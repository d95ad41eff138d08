//! Elevate: a personal habit and task tracker with an AI coach.
//!
//! All user data (habits, tasks, coach memory, assistant settings, profile) is
//! held in one [`store::AppStore`] and mirrored key-by-key into a [`storage::Storage`]
//! backend, SQLite on disk by default. The coach chat flow builds a system
//! instruction from a snapshot of that data and talks to a Gemini-style
//! generative API; some exchanges are condensed into memories fed back into
//! later prompts.
//!
//! # Modules
//!
//! - [`config`]: TOML configuration with environment overrides
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`storage`]: the key/value port and its SQLite and in-memory adapters
//! - [`store`]: data model, mutators, backup import/export, derived statistics
//! - [`ai`]: the generative client trait and its HTTP implementation
//! - [`chat`]: system instruction, memory capture, transcript, and the [`chat::Coach`] service
//! - [`speech`]: text-to-speech decoding and playback
//! - [`avatar`]: avatar images as `data:` URLs

pub mod ai;
pub mod avatar;
pub mod chat;
pub mod config;
pub mod db;
pub mod speech;
pub mod storage;
pub mod store;
