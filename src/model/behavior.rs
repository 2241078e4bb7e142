use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::behavior::{BehaviorPlugin, BuilderModifier, ModifierTarget};
use crate::error::{ModelError, Result};

/// A behavior attached to a database or a table: the plugin that implements
/// it plus the parameters of this particular instance.
#[derive(Clone)]
pub struct Behavior {
    name: String,
    id: String,
    parameters: BTreeMap<String, String>,
    table: Option<String>,
    executed: bool,
    plugin: Arc<dyn BehaviorPlugin>,
}

impl Behavior {
    /// Create an instance whose id is its name. Plugin defaults are applied
    /// first so that user parameters override them.
    pub fn new(name: impl Into<String>, plugin: Arc<dyn BehaviorPlugin>) -> Self {
        let name = name.into();
        let parameters = plugin
            .default_parameters()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            id: name.clone(),
            name,
            parameters,
            table: None,
            executed: false,
            plugin,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(|s| s.as_str())
    }

    /// Boolean parameter; `true`, `1`, `yes` and `on` count as set.
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.parameter(name).map(|v| v.trim().to_lowercase()).as_deref(),
            Some("true" | "1" | "yes" | "on")
        )
    }

    /// Name of the decorated table, `None` for database behaviors.
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn plugin(&self) -> &dyn BehaviorPlugin {
        self.plugin.as_ref()
    }

    pub fn modifier(&self, target: ModifierTarget) -> Option<&dyn BuilderModifier> {
        self.plugin.modifier(target)
    }

    /// Whether the modification hook of this instance already ran.
    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
    }

    /// Fresh copy of this instance for another table.
    pub(crate) fn for_table(&self, table: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            executed: false,
            ..self.clone()
        }
    }

    pub(crate) fn set_table(&mut self, table: Option<&str>) {
        self.table = table.map(str::to_string);
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .field("table", &self.table)
            .field("executed", &self.executed)
            .finish()
    }
}

/// Add `behavior` to `behaviors`, rejecting id collisions. `owner` names the
/// decorated entity in error messages.
pub(crate) fn attach_behavior(
    behaviors: &mut Vec<Behavior>,
    behavior: Behavior,
    owner: &str,
) -> Result<()> {
    if let Some(existing) = behaviors.iter().find(|b| b.id == behavior.id) {
        let message = if behavior.id == behavior.name {
            format!(
                "behavior '{}' is already registered on {}; give each instance a distinct id to register it more than once",
                behavior.name, owner
            )
        } else {
            format!(
                "behavior id '{}' on {} is already used by a '{}' behavior",
                behavior.id, owner, existing.name
            )
        };
        return Err(ModelError::Constraint(message));
    }

    if !behavior.plugin.allows_multiple() && behaviors.iter().any(|b| b.name == behavior.name) {
        return Err(ModelError::Constraint(format!(
            "behavior '{}' does not allow multiple instances on {}",
            behavior.name, owner
        )));
    }

    behaviors.push(behavior);
    Ok(())
}
