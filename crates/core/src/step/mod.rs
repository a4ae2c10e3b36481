//! Derived step status over the flow graph.
//!
//! A step is a logical grouping of pages in the wizard ("Verify ID",
//! "Enter leave details"). Its status is recomputed from scratch on every
//! evaluation from three inputs: the statuses of the steps it depends on,
//! the outstanding validation issues, and the current field values. There
//! is no terminal state; a completed step regresses to in-progress when a
//! later edit surfaces new issues against its fields.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fieldpath::{is_field_relevant, is_rule_relevant};
use crate::graph::FlowGraph;
use crate::issue::Issue;


/// Completion status of one step. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Completed,
    /// A depended-on step is not yet completed. Takes precedence over
    /// everything the step's own fields say.
    Disabled,
}

/// Runtime inputs to status derivation: the current form field values
/// (keyed by concrete field path) and the outstanding validation issues.
#[derive(Debug, Clone, Default)]
pub struct StatusContext {
    pub field_values: BTreeMap<String, Value>,
    pub issues: Vec<Issue>,
}

impl StatusContext {
    pub fn new(field_values: BTreeMap<String, Value>, issues: Vec<Issue>) -> Self {
        StatusContext {
            field_values,
            issues,
        }
    }
}

/// A step assembled from the graph: its member pages in declaration
/// order, the union of the fields and rules those pages declare, and the
/// names of the steps it depends on.
#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub pages: Vec<String>,
    pub depends_on: Vec<String>,
    pub fields: Vec<String>,
    pub applicable_rules: Vec<String>,
}

/// Assemble every declared step from the graph, in declaration order.
/// Member pages keep graph order; fields and rules are deduplicated
/// preserving first occurrence.
pub fn steps_from_graph(graph: &FlowGraph) -> Vec<Step> {
    graph
        .steps()
        .iter()
        .map(|def| {
            let mut pages = Vec::new();
            let mut fields: Vec<String> = Vec::new();
            let mut rules: Vec<String> = Vec::new();
            for page in graph.pages() {
                if page.meta.step.as_deref() == Some(def.name.as_str()) {
                    pages.push(page.route.clone());
                    for field in &page.meta.fields {
                        if !fields.contains(field) {
                            fields.push(field.clone());
                        }
                    }
                    for rule in &page.meta.applicable_rules {
                        if !rules.contains(rule) {
                            rules.push(rule.clone());
                        }
                    }
                }
            }
            Step {
                name: def.name.clone(),
                pages,
                depends_on: def.depends_on.clone(),
                fields,
                applicable_rules: rules,
            }
        })
        .collect()
}

/// Status of a single step, with dependencies evaluated recursively
/// against the same context. First match wins:
///
/// 1. any dependency not completed (unknown names count as not
///    completed) -> `Disabled`;
/// 2. no outstanding issue touches an owned field or rule -> `Completed`;
/// 3. any owned field holds a non-blank value -> `InProgress`;
/// 4. otherwise -> `NotStarted`.
pub fn status_of(step: &Step, all_steps: &[Step], ctx: &StatusContext) -> StepStatus {
    let mut in_path = HashSet::new();
    status_rec(step, all_steps, ctx, &mut in_path)
}

/// Evaluate every step in the graph, in declaration order. This is the
/// checklist/progress view the portal renders.
pub fn evaluate_steps(graph: &FlowGraph, ctx: &StatusContext) -> Vec<(String, StepStatus)> {
    let steps = steps_from_graph(graph);
    steps
        .iter()
        .map(|step| (step.name.clone(), status_of(step, &steps, ctx)))
        .collect()
}

/// Status of the named step, or `None` if the graph does not declare it.
pub fn step_status(graph: &FlowGraph, name: &str, ctx: &StatusContext) -> Option<StepStatus> {
    let steps = steps_from_graph(graph);
    steps
        .iter()
        .find(|s| s.name == name)
        .map(|step| status_of(step, &steps, ctx))
}

fn status_rec(
    step: &Step,
    all_steps: &[Step],
    ctx: &StatusContext,
    in_path: &mut HashSet<String>,
) -> StepStatus {
    // Graph validation rejects dependency cycles; a revisit here still
    // conservatively counts as not completed.
    if !in_path.insert(step.name.clone()) {
        return StepStatus::Disabled;
    }

    for dep in &step.depends_on {
        let completed = match all_steps.iter().find(|s| s.name == *dep) {
            Some(dep_step) => status_rec(dep_step, all_steps, ctx, in_path) == StepStatus::Completed,
            None => false,
        };
        if !completed {
            in_path.remove(&step.name);
            return StepStatus::Disabled;
        }
    }

    in_path.remove(&step.name);
    own_status(step, ctx)
}

/// Status from the step's own fields and rules, ignoring dependencies.
fn own_status(step: &Step, ctx: &StatusContext) -> StepStatus {
    let touched = ctx.issues.iter().any(|issue| match issue {
        Issue::Field { field, .. } => is_field_relevant(field, &step.fields),
        Issue::Rule { rule, .. } => is_rule_relevant(rule, &step.applicable_rules),
    });
    if !touched {
        return StepStatus::Completed;
    }

    let started = ctx
        .field_values
        .iter()
        .any(|(path, value)| !is_blank(value) && is_field_relevant(path, &step.fields));
    if started {
        StepStatus::InProgress
    } else {
        StepStatus::NotStarted
    }
}

/// An unfilled model field: JSON null, empty array, or empty object.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
