//! claimflow-core -- page-flow state machine for the benefits portal.
//!
//! The portal walks claimants and employers through an ordered sequence
//! of form pages. This crate owns the declarative page graph, transition
//! resolution, validation-issue routing, and derived step status. The
//! rendering/routing/API layers live elsewhere: they hand this core the
//! current route, the form field values, and the outstanding validation
//! issues, and get back a target route and a status per step.
//!
//! Everything here is pure, synchronous computation. The graph is loaded
//! once, validated, and injected explicitly into every entry point, so
//! the claimant and employer flows coexist without shared state.

pub mod fieldpath;
pub mod graph;
pub mod issue;
pub mod route;
pub mod step;

pub use fieldpath::{is_field_relevant, is_rule_relevant, parse_path, Segment};
pub use graph::{
    EventContext, FlowGraph, FlowGraphBuilder, GraphError, Page, PageMeta, Resolver, StepDef,
    Target,
};
pub use issue::{filter_relevant_issues, Issue, CONFLICTING_LEAVE_RULES};
pub use route::{resolve_transition, route_with_params, RouteError};
pub use step::{
    evaluate_steps, status_of, step_status, steps_from_graph, StatusContext, Step, StepStatus,
};

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
