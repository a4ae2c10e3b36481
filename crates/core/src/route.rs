//! Transition resolution: current route + event name -> next route.
//!
//! Pure lookup over the flow graph. Failures here mean broken page-flow
//! wiring (a missing page or an event nobody wired), which is a build-time
//! defect in the flow config, never a recoverable runtime condition.

use std::collections::BTreeMap;

use crate::graph::{EventContext, FlowGraph, Target};

/// A requested transition could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("page '{page}' is not in the flow graph")]
    UnknownPage { page: String },

    #[error("event '{event}' is not wired on page '{page}'")]
    UndefinedEvent { page: String, event: String },
}

/// Compute the next route for `event` fired from `current_route`.
///
/// Literal targets are returned as-is; resolver targets are invoked with
/// `context` (an empty context when `None`). Idempotent: identical inputs
/// always produce identical results.
pub fn resolve_transition(
    graph: &FlowGraph,
    current_route: &str,
    event: &str,
    context: Option<&EventContext>,
) -> Result<String, RouteError> {
    let page = graph.page(current_route).ok_or_else(|| RouteError::UnknownPage {
        page: current_route.to_string(),
    })?;
    let target = page.transition(event).ok_or_else(|| RouteError::UndefinedEvent {
        page: current_route.to_string(),
        event: event.to_string(),
    })?;
    Ok(match target {
        Target::Page(route) => route.clone(),
        Target::Resolve(resolver) => {
            let empty = EventContext::new();
            resolver(context.unwrap_or(&empty))
        }
    })
}

/// Append query parameters to a resolved route, in key order so the same
/// parameters always produce the same string. An empty map returns the
/// route unchanged. Values are appended verbatim; callers own any
/// percent-encoding (this core has no URL surface of its own).
pub fn route_with_params(route: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return route.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("{}?{}", route, query.join("&"))
}
