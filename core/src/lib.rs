//! A library for compiling declarative tracing blueprints into trace trees.
//!
//! A caller describes services, the tasks each service performs,
//! parent/child and link relationships across services, per-task events,
//! and rules that conditionally mark a task as failed, annotate it, add an
//! event, or drop its subtree. [`Simulator::run`] compiles that description
//! into one or more trace trees and hands the result to a pluggable
//! [`Adapter`].

#[macro_use]
extern crate serde;

pub mod blueprint;
pub mod condition;
pub mod config;
pub mod doc;
pub mod duration;
pub mod effect;
pub mod error;
pub mod external_id;
pub mod kind;
pub mod resource;
pub mod rule;
pub mod simulator;
pub mod span;
pub mod task;

pub use blueprint::{Blueprint, ServiceBlueprint, ServiceSpec, TaskSpec};
pub use condition::{Condition, EvaluationResult};
pub use config::Config;
pub use doc::BlueprintDoc;
pub use duration::{Delay, DurationExpr, TaskDuration};
pub use effect::Effect;
pub use error::TraceSimError;
pub use external_id::ExternalId;
pub use kind::Kind;
pub use resource::Resource;
pub use rule::ConditionalRule;
pub use simulator::{Adapter, NoOpAdapter, Simulator};
pub use span::{SpanEvent, SpanId, SpanNode, SpanRef, Status, TraceId};
pub use task::{TaskDefinition, TaskEvent, TaskNode};
