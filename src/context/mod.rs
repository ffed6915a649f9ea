//! Run-scoped execution context and macro resolution.
//!
//! Every step instance owns an [`InstanceContext`]: a string-keyed JSON
//! document addressed with dotted paths (`tc.order.id`), the project the run
//! belongs to, and a leaf [`SubContext`] that remembers which context it was
//! spawned from. [`TemplateEngine`] expands macro expressions in condition
//! values and parsing-rule expressions against that context.

mod template;

pub use template::{TemplateEngine, TemplateError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Path prefix addressing the leaf sub-context instead of the main values.
pub const SUB_CONTEXT_PREFIX: &str = "sp";

/// Identifier of a context instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Creates a new random context identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric project identifier used for settings lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u64);

impl ProjectId {
    /// Wraps a raw project number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw project number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique project identifier handed to transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectUuid(Uuid);

impl ProjectUuid {
    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProjectUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leaf context of a single step, linked back to the context it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubContext {
    id: ContextId,
    parent_id: ContextId,
    values: Map<String, Value>,
}

impl SubContext {
    fn spawned_from(parent_id: ContextId) -> Self {
        Self {
            id: ContextId::new(),
            parent_id,
            values: Map::new(),
        }
    }

    /// Returns the sub-context identifier.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// Returns the identifier of the context this one was spawned from.
    #[must_use]
    pub const fn parent_id(&self) -> ContextId {
        self.parent_id
    }

    /// Returns the sub-context values.
    #[must_use]
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// String-keyed execution context owned by one run or step instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceContext {
    id: ContextId,
    values: Map<String, Value>,
    project_id: Option<ProjectId>,
    project_uuid: Option<ProjectUuid>,
    sub_context: Option<SubContext>,
}

impl Default for InstanceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceContext {
    /// Creates an empty context that belongs to no project.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ContextId::new(),
            values: Map::new(),
            project_id: None,
            project_uuid: None,
            sub_context: None,
        }
    }

    /// Binds the context to a project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId, project_uuid: ProjectUuid) -> Self {
        self.project_id = Some(project_id);
        self.project_uuid = Some(project_uuid);
        self
    }

    /// Sets a value at a dotted path and returns the context.
    #[must_use]
    pub fn with_value(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    /// Creates the context of a child step.
    ///
    /// The child receives a copy of this context's values and project
    /// binding, and a fresh sub-context pointing back at this context.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            id: ContextId::new(),
            values: self.values.clone(),
            project_id: self.project_id,
            project_uuid: self.project_uuid,
            sub_context: Some(SubContext::spawned_from(self.id)),
        }
    }

    /// Returns the context identifier.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// Returns the owning project identifier.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the owning project UUID.
    #[must_use]
    pub const fn project_uuid(&self) -> Option<ProjectUuid> {
        self.project_uuid
    }

    /// Returns the leaf sub-context, if this is a step context.
    #[must_use]
    pub const fn sub_context(&self) -> Option<&SubContext> {
        self.sub_context.as_ref()
    }

    /// Returns the top-level values.
    #[must_use]
    pub const fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Looks a value up by dotted path.
    ///
    /// Paths starting with `sp.` are resolved in the sub-context.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let (root, rest) = self.root_for(path);
        let mut segments = rest.split('.');
        let first = segments.next()?;
        let mut current = root?.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns whether a value exists at the path.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Returns the value at the path rendered as a plain string.
    #[must_use]
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).map(value_to_string)
    }

    /// Writes a value at a dotted path, creating intermediate objects.
    pub fn insert(&mut self, path: &str, value: impl Into<Value>) {
        let (target, remainder) = match path.strip_prefix("sp.") {
            Some(rest) => {
                let parent_id = self.id;
                let sub = self
                    .sub_context
                    .get_or_insert_with(|| SubContext::spawned_from(parent_id));
                (&mut sub.values, rest)
            }
            None => (&mut self.values, path),
        };
        insert_path(target, remainder, value.into());
    }

    /// Builds the document macro expressions are rendered against.
    #[must_use]
    pub fn template_scope(&self) -> Value {
        let mut scope = self.values.clone();
        if let Some(sub) = &self.sub_context {
            scope.insert(
                SUB_CONTEXT_PREFIX.to_owned(),
                Value::Object(sub.values.clone()),
            );
        }
        Value::Object(scope)
    }

    fn root_for<'a>(&self, path: &'a str) -> (Option<&Map<String, Value>>, &'a str) {
        match path.strip_prefix("sp.") {
            Some(rest) => (self.sub_context.as_ref().map(|sub| &sub.values), rest),
            None => (Some(&self.values), path),
        }
    }
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            root.insert(path.to_owned(), value);
        }
        Some((head, tail)) => {
            let entry = root
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, tail, value);
            }
        }
    }
}

/// Renders a JSON value the way context comparisons see it.
///
/// Strings are returned without quotes, `null` as an empty string, and
/// everything else as compact JSON.
#[must_use]
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
