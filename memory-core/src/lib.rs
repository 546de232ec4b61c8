#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unused_self)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::borrowed_box)]
#![allow(clippy::float_cmp)]
#![allow(clippy::ref_option)]

//! # Memory Core
//!
//! Core types and algorithms for a goal-seeking learning agent
//! evaluation system: a progressive cognitive test catalog, an LLM
//! grader, a five-type memory coordinator, deterministic long-horizon
//! stress generation, a matrix runner across agents, a failure-mode
//! analyzer, and a self-improvement control loop.
//!
//! ## Module Organization
//!
//! - [`types`]: closed-set vocabularies and the test catalog data model
//! - [`catalog`]: the static L1-L12 test-level registry
//! - [`error`]: the crate-wide error taxonomy
//! - [`grader`]: LLM-based answer grading
//! - [`memory`]: the five-type memory coordinator and storage backend trait
//! - [`subprocess`]: the agent subprocess wire protocol
//! - [`agent`]: the in-process [`Agent`](agent::Agent) trait and reference implementation
//! - [`harness`]: the progressive evaluation harness
//! - [`longhorizon`]: deterministic long-horizon dialogue/quiz generation and scoring
//! - [`matrix`]: the cross-agent matrix runner
//! - [`analyzer`]: the failure-mode taxonomy and error analyzer
//! - [`selfimprove`]: the self-improvement control loop
//! - [`evaluation`]: quality, performance, reliability, and comparison evaluators for the memory backend
//! - [`settings`]: configuration loading

pub mod agent;
pub mod analyzer;
pub mod catalog;
pub mod error;
pub mod evaluation;
pub mod grader;
pub mod harness;
pub mod longhorizon;
pub mod matrix;
pub mod memory;
pub mod selfimprove;
pub mod settings;
pub mod subprocess;
pub mod types;

pub use error::{Error, Result};
pub use types::{ArticlePhase, ReasoningType, TestArticle, TestLevel, TestQuestion};
