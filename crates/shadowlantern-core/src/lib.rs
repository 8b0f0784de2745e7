//! # Shadow Lantern Core Library
//!
//! This library provides the core logic for Shadow Lantern, a self-discovery
//! companion: guided diagnoses surface a person's values, and a habit tracker
//! with evolving monsters helps them live by those values. The CLI binary is
//! a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Progression**: Stage tables mapping completion counts to evolution
//!   stages, for habit monsters and the value spirit
//! - **Habit**: Single-habit tracker with streaks and reward-habituation tests
//! - **Diagnosis**: Phase state machine plus the built-in flows (shadow
//!   interrogation, unfinished sentences, career interview, lantern) and
//!   the value card sort
//! - **Interpret**: Adapter to an external text-generation service that always
//!   degrades to a static fallback result
//! - **Storage**: Key-value document persistence (SQLite or memory) and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: Streaks, totals and habituation state
//! - [`DiagnosisSession`]: Ordered phases with response quotas
//! - [`Interpreter`]: Analysis with model/fallback provenance
//! - [`AppContext`]: All stores loaded together from a [`KvStore`]

pub mod action_log;
pub mod app;
pub mod collection;
pub mod date_key;
pub mod diagnosis;
pub mod error;
pub mod habit;
pub mod interpret;
pub mod lantern;
pub mod progression;
pub mod reflection;
pub mod storage;
pub mod values;

pub use action_log::{ActionLog, GoalStatus, LifeArea, TodayGoal};
pub use app::AppContext;
pub use collection::{CollectionArchive, CollectionEntry, CollectionStats, NewCollectionEntry};
pub use date_key::{Clock, DateKey, FixedClock, SystemClock};
pub use diagnosis::{
    CardChoice, CardSort, CardSortResult, CardSortStep, ChatTurn, Conversation, DiagnosisHistory,
    DiagnosisRecord, DiagnosisSession, FlowKind, PhaseResponses, PhaseSpec, SessionStatus,
    Transition,
};
pub use error::{ConfigError, CoreError, DatabaseError, InterpretError, Result, ValidationError};
pub use habit::{CompletionOutcome, HabitSettings, HabitTracker, HabituationMode};
pub use interpret::{Analysis, AnalysisSource, GeminiClient, Interpreter, TextGenerator};
pub use lantern::{LanternStep, LanternStore, ValueLantern};
pub use progression::{ProgressionSnapshot, Stage, StageTable, ValueSpirit};
pub use reflection::{ReflectionEntry, ReflectionInput, ReflectionKind, ReflectionLog};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use values::{ValueCard, ValueCategory};
