//! dealflow - stage and deal completion propagation
//!
//! Keeps the task → stage → deal hierarchy of rental and builder pipelines
//! consistent as task statuses change. This library provides:
//! - Data models for tasks, stages, deals and stage assignments
//! - A `Store` collaborator trait with a SQLite implementation and per-table change feed
//! - The completion engine: stage/deal gates, direct projection, reopen and resync cascades
//! - Configuration and a small command line front end
//!
//! # Example
//!
//! ```no_run
//! use dealflow::cascade::CompletionEngine;
//! use dealflow::models::TaskStatus;
//! use dealflow::store::SqliteStore;
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! let engine = CompletionEngine::new(&store);
//! if let Ok(Some(result)) = engine.apply_task_status("task-id", TaskStatus::Completed) {
//!     println!("stage completed: {}", result.stage_completed);
//! }
//! ```

pub mod cascade;
pub mod cli;
pub mod config;
pub mod db;
pub mod models;
pub mod repo;
pub mod store;
pub mod utils;
