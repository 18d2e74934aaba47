//! Tool capability trait and registry.
//!
//! The embedding agent discovers tools through the registry it is handed;
//! the tools themselves carry no agent-framework metadata.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use tempo_calendar::CalendarClient;

use crate::response::ToolResponse;

/// A callable capability exposed to the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name used for dispatch
    fn name(&self) -> &str;

    /// Human/model-readable description of when to use the tool
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments
    fn parameters(&self) -> Value;

    /// Run the tool. Always returns an envelope, never an error.
    async fn invoke(&self, args: Value) -> ToolResponse;
}

/// Name-indexed collection of tools sharing one calendar client.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the full calendar tool set.
    pub fn with_defaults(client: Arc<CalendarClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::CreateEventTool::new(client.clone())));
        registry.register(Arc::new(crate::CheckConflictsTool::new(client.clone())));
        registry.register(Arc::new(crate::ListNextEventsTool::new(client.clone())));
        registry.register(Arc::new(crate::ListTodayTool::new(client.clone())));
        registry.register(Arc::new(crate::DeleteEventTool::new(client)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        tracing::info!("registering tool: {}", tool.name());
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, sorted for stable presentation.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Machine-readable specs for the agent collaborator.
    pub fn specs(&self) -> Value {
        let mut specs: Vec<Value> = self
            .tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters(),
                })
            })
            .collect();
        specs.sort_by_key(|spec| spec["name"].as_str().map(str::to_string));
        Value::Array(specs)
    }
}
