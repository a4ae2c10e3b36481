//! The declarative page-flow graph for the multi-step application wizard.
//!
//! A graph is an ordered list of pages (one per screen, named by route)
//! plus an ordered list of step definitions (logical groupings of pages
//! with dependencies). The graph is loaded once from a JSON config, or
//! built programmatically, validated, and never mutated afterwards. It is
//! passed explicitly into every entry point so the claimant and employer
//! flows can coexist in one process and be tested in isolation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Parameters attached to a transition event, used by resolver targets
/// for conditional branching.
pub type EventContext = BTreeMap<String, Value>;

/// Computes a transition target from event parameters.
pub type Resolver = Arc<dyn Fn(&EventContext) -> String + Send + Sync>;

// ──────────────────────────────────────────────
// Graph model
// ──────────────────────────────────────────────

/// The target of a named transition.
#[derive(Clone)]
pub enum Target {
    /// A literal route, checked for referential integrity at load time.
    Page(String),
    /// A resolver invoked with the event context. Resolver output is not
    /// statically checkable and may leave the graph (e.g. hand off from
    /// the claimant flow to the employer flow).
    Resolve(Resolver),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Page(route) => f.debug_tuple("Page").field(route).finish(),
            Target::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

/// Step membership and issue-routing metadata for one page.
#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    /// Name of the step this page belongs to, if any.
    pub step: Option<String>,
    /// Field paths this page collects (may carry `[*]` wildcards).
    pub fields: Vec<String>,
    /// Business-rule names whose issues this page displays.
    pub applicable_rules: Vec<String>,
}

/// One node in the flow graph: a single screen, named by its route.
#[derive(Debug, Clone)]
pub struct Page {
    pub route: String,
    pub meta: PageMeta,
    /// Named outgoing transitions, in declaration order.
    pub transitions: Vec<(String, Target)>,
}

impl Page {
    pub fn new(route: impl Into<String>) -> Self {
        Page {
            route: route.into(),
            meta: PageMeta::default(),
            transitions: Vec::new(),
        }
    }

    pub fn in_step(mut self, step: &str) -> Self {
        self.meta.step = Some(step.to_string());
        self
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.meta.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn rules(mut self, rules: &[&str]) -> Self {
        self.meta.applicable_rules = rules.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Wire `event` to a literal target route.
    pub fn on(mut self, event: &str, target: &str) -> Self {
        self.transitions
            .push((event.to_string(), Target::Page(target.to_string())));
        self
    }

    /// Wire `event` to a resolver computing the target from event context.
    pub fn on_resolve<F>(mut self, event: &str, resolver: F) -> Self
    where
        F: Fn(&EventContext) -> String + Send + Sync + 'static,
    {
        self.transitions
            .push((event.to_string(), Target::Resolve(Arc::new(resolver))));
        self
    }

    /// Look up a transition by event name.
    pub fn transition(&self, event: &str) -> Option<&Target> {
        self.transitions
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, target)| target)
    }
}

/// A logical grouping of pages with optional dependencies on other steps.
#[derive(Debug, Clone)]
pub struct StepDef {
    pub name: String,
    pub depends_on: Vec<String>,
}

/// A validated, immutable page-flow graph.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    pages: Vec<Page>,
    steps: Vec<StepDef>,
}

impl FlowGraph {
    pub fn builder() -> FlowGraphBuilder {
        FlowGraphBuilder {
            pages: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Pages in declaration order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Step definitions in declaration order.
    pub fn steps(&self) -> &[StepDef] {
        &self.steps
    }

    /// Look up a page by route.
    pub fn page(&self, route: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.route == route)
    }

    /// Look up a step definition by name.
    pub fn step(&self, name: &str) -> Option<&StepDef> {
        self.steps.iter().find(|s| s.name == name)
    }
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Configuration errors reported when a graph is loaded or built. These
/// indicate broken page-flow wiring and surface before any routing runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate page route '{route}'")]
    DuplicateRoute { route: String },

    #[error("duplicate step name '{name}'")]
    DuplicateStep { name: String },

    #[error("transition '{event}' on page '{page}' targets undeclared page '{target}'")]
    DanglingTarget {
        page: String,
        event: String,
        target: String,
    },

    #[error("page '{page}' belongs to undeclared step '{step}'")]
    UnknownStep { page: String, step: String },

    #[error("step '{step}' depends on undeclared step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("step dependencies are not acyclic: cycle involving [{steps}]")]
    DependencyCycle { steps: String },

    #[error("flow config: {0}")]
    Config(String),
}

// ──────────────────────────────────────────────
// Builder
// ──────────────────────────────────────────────

/// Programmatic graph construction, used by tests and by flows that need
/// resolver transitions (the JSON config can only express literal targets).
pub struct FlowGraphBuilder {
    pages: Vec<Page>,
    steps: Vec<StepDef>,
}

impl FlowGraphBuilder {
    pub fn step(mut self, name: &str, depends_on: &[&str]) -> Self {
        self.steps.push(StepDef {
            name: name.to_string(),
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
        });
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    pub fn build(self) -> Result<FlowGraph, GraphError> {
        let graph = FlowGraph {
            pages: self.pages,
            steps: self.steps,
        };
        validate(&graph)?;
        Ok(graph)
    }
}

// ──────────────────────────────────────────────
// Config loading
// ──────────────────────────────────────────────

impl FlowGraph {
    /// Load a graph from a JSON config document.
    ///
    /// Expected shape:
    ///
    /// ```json
    /// {
    ///   "pages": [
    ///     {
    ///       "route": "/applications/start",
    ///       "step": "start",
    ///       "fields": ["claimant.first_name"],
    ///       "applicable_rules": [],
    ///       "transitions": { "CREATE_CLAIM": "/applications/checklist" }
    ///     }
    ///   ],
    ///   "steps": [
    ///     { "name": "verify_id", "depends_on": [] }
    ///   ]
    /// }
    /// ```
    ///
    /// All transition targets in config form are literal routes; resolver
    /// transitions are only expressible through [`FlowGraph::builder`].
    pub fn from_config(config: &Value) -> Result<FlowGraph, GraphError> {
        let pages_arr = config
            .get("pages")
            .and_then(|p| p.as_array())
            .ok_or_else(|| GraphError::Config("missing 'pages' array".to_string()))?;

        let mut pages = Vec::with_capacity(pages_arr.len());
        for obj in pages_arr {
            pages.push(parse_page(obj)?);
        }

        let mut steps = Vec::new();
        if let Some(steps_arr) = config.get("steps").and_then(|s| s.as_array()) {
            for obj in steps_arr {
                steps.push(parse_step_def(obj)?);
            }
        }

        let graph = FlowGraph { pages, steps };
        validate(&graph)?;
        Ok(graph)
    }
}

fn required_str(obj: &Value, field: &str) -> Result<String, GraphError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| GraphError::Config(format!("missing '{}' field", field)))
}

fn string_list(obj: &Value, field: &str) -> Result<Vec<String>, GraphError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(|s| s.to_string()).ok_or_else(|| {
                    GraphError::Config(format!("'{}' entries must be strings", field))
                })
            })
            .collect(),
        Some(_) => Err(GraphError::Config(format!(
            "'{}' must be an array of strings",
            field
        ))),
    }
}

fn parse_page(obj: &Value) -> Result<Page, GraphError> {
    let route = required_str(obj, "route")?;
    let step = obj
        .get("step")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let fields = string_list(obj, "fields")?;
    let applicable_rules = string_list(obj, "applicable_rules")?;

    let mut transitions = Vec::new();
    if let Some(map) = obj.get("transitions") {
        let map = map.as_object().ok_or_else(|| {
            GraphError::Config(format!("'transitions' on page '{}' must be an object", route))
        })?;
        for (event, target) in map {
            let target = target.as_str().ok_or_else(|| {
                GraphError::Config(format!(
                    "transition '{}' on page '{}' must target a route string",
                    event, route
                ))
            })?;
            transitions.push((event.clone(), Target::Page(target.to_string())));
        }
    }

    Ok(Page {
        route,
        meta: PageMeta {
            step,
            fields,
            applicable_rules,
        },
        transitions,
    })
}

fn parse_step_def(obj: &Value) -> Result<StepDef, GraphError> {
    Ok(StepDef {
        name: required_str(obj, "name")?,
        depends_on: string_list(obj, "depends_on")?,
    })
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

/// Referential-integrity checks over a constructed graph. Every literal
/// transition target, step membership, and step dependency must name a
/// declared page/step, and the step dependency graph must be acyclic.
fn validate(graph: &FlowGraph) -> Result<(), GraphError> {
    for (i, page) in graph.pages.iter().enumerate() {
        if graph.pages[..i].iter().any(|p| p.route == page.route) {
            return Err(GraphError::DuplicateRoute {
                route: page.route.clone(),
            });
        }
    }
    for (i, step) in graph.steps.iter().enumerate() {
        if graph.steps[..i].iter().any(|s| s.name == step.name) {
            return Err(GraphError::DuplicateStep {
                name: step.name.clone(),
            });
        }
    }

    for page in &graph.pages {
        for (event, target) in &page.transitions {
            if let Target::Page(route) = target {
                if graph.page(route).is_none() {
                    return Err(GraphError::DanglingTarget {
                        page: page.route.clone(),
                        event: event.clone(),
                        target: route.clone(),
                    });
                }
            }
        }
        if let Some(step) = &page.meta.step {
            if graph.step(step).is_none() {
                return Err(GraphError::UnknownStep {
                    page: page.route.clone(),
                    step: step.clone(),
                });
            }
        }
    }

    for step in &graph.steps {
        for dep in &step.depends_on {
            if graph.step(dep).is_none() {
                return Err(GraphError::UnknownDependency {
                    step: step.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    detect_dependency_cycle(graph)
}

/// Kahn's algorithm over the step dependency edges. Any step left
/// unprocessed sits on a cycle.
fn detect_dependency_cycle(graph: &FlowGraph) -> Result<(), GraphError> {
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    for step in &graph.steps {
        in_degree.entry(step.name.as_str()).or_insert(0);
    }
    for step in &graph.steps {
        // A repeated name in depends_on is still one edge; the decrement
        // below fires once per unique dependency name.
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for dep in &step.depends_on {
            if seen.insert(dep.as_str()) {
                // dep -> step edge; dangling deps were rejected above
                *in_degree.entry(step.name.as_str()).or_insert(0) += 1;
                in_degree.entry(dep.as_str()).or_insert(0);
            }
        }
    }

    let mut queue: Vec<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&name, _)| name)
        .collect();
    let mut processed = 0usize;
    while let Some(name) = queue.pop() {
        processed += 1;
        for step in &graph.steps {
            if step.depends_on.iter().any(|d| d.as_str() == name) {
                let deg = in_degree.get_mut(step.name.as_str()).ok_or_else(|| {
                    GraphError::Config(format!(
                        "internal error: step '{}' not found in in-degree map",
                        step.name
                    ))
                })?;
                *deg -= 1;
                if *deg == 0 {
                    queue.push(step.name.as_str());
                }
            }
        }
    }

    if processed < graph.steps.len() {
        let mut cyclic: Vec<&str> = in_degree
            .iter()
            .filter(|(_, &d)| d > 0)
            .map(|(&name, _)| name)
            .collect();
        cyclic.sort_unstable();
        return Err(GraphError::DependencyCycle {
            steps: cyclic.join(", "),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_page_config() -> Value {
        json!({
            "pages": [
                {
                    "route": "/applications/start",
                    "step": "start",
                    "transitions": { "CREATE_CLAIM": "/applications/checklist" }
                },
                {
                    "route": "/applications/checklist",
                    "step": "start"
                }
            ],
            "steps": [ { "name": "start", "depends_on": [] } ]
        })
    }

    #[test]
    fn loads_a_literal_config() {
        let graph = FlowGraph::from_config(&two_page_config()).unwrap();
        assert_eq!(graph.pages().len(), 2);
        let start = graph.page("/applications/start").unwrap();
        assert!(matches!(
            start.transition("CREATE_CLAIM"),
            Some(Target::Page(route)) if route == "/applications/checklist"
        ));
        assert_eq!(start.meta.step.as_deref(), Some("start"));
    }

    #[test]
    fn rejects_dangling_transition_target() {
        let config = json!({
            "pages": [
                {
                    "route": "/a",
                    "transitions": { "NEXT": "/nowhere" }
                }
            ]
        });
        let err = FlowGraph::from_config(&config).unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingTarget {
                page: "/a".to_string(),
                event: "NEXT".to_string(),
                target: "/nowhere".to_string(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_routes_and_steps() {
        let config = json!({
            "pages": [ { "route": "/a" }, { "route": "/a" } ]
        });
        assert_eq!(
            FlowGraph::from_config(&config).unwrap_err(),
            GraphError::DuplicateRoute {
                route: "/a".to_string()
            }
        );

        let err = FlowGraph::builder()
            .step("verify_id", &[])
            .step("verify_id", &[])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateStep {
                name: "verify_id".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_step_membership_and_dependency() {
        let err = FlowGraph::builder()
            .page(Page::new("/a").in_step("missing"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownStep {
                page: "/a".to_string(),
                step: "missing".to_string(),
            }
        );

        let err = FlowGraph::builder()
            .step("upload_docs", &["verify_id"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownDependency {
                step: "upload_docs".to_string(),
                dependency: "verify_id".to_string(),
            }
        );
    }

    #[test]
    fn rejects_cyclic_step_dependencies() {
        let err = FlowGraph::builder()
            .step("a", &["b"])
            .step("b", &["a"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DependencyCycle {
                steps: "a, b".to_string()
            }
        );
    }

    #[test]
    fn repeated_dependency_entries_are_one_edge_not_a_cycle() {
        let graph = FlowGraph::builder()
            .step("verify_id", &[])
            .step("upload_docs", &["verify_id", "verify_id"])
            .build()
            .unwrap();
        assert_eq!(
            graph.step("upload_docs").unwrap().depends_on,
            vec!["verify_id", "verify_id"]
        );

        let config = json!({
            "pages": [],
            "steps": [
                { "name": "verify_id", "depends_on": [] },
                { "name": "upload_docs", "depends_on": ["verify_id", "verify_id"] }
            ]
        });
        assert!(FlowGraph::from_config(&config).is_ok());
    }

    #[test]
    fn builder_accepts_resolver_transitions() {
        let graph = FlowGraph::builder()
            .page(Page::new("/start").on_resolve("CONTINUE", |ctx| {
                if ctx.get("is_employer").and_then(|v| v.as_bool()) == Some(true) {
                    "/employers/welcome".to_string()
                } else {
                    "/applications/checklist".to_string()
                }
            }))
            .page(Page::new("/applications/checklist"))
            .build()
            .unwrap();
        assert!(matches!(
            graph.page("/start").unwrap().transition("CONTINUE"),
            Some(Target::Resolve(_))
        ));
    }
}
