//! The tool surface offered to MCP clients.
//!
//! Three tools, each resolving to exactly one status before anything is
//! triggered:
//!
//! - `turn_coffee_on` → `true`
//! - `turn_coffee_off` → `false`
//! - `set_coffee_status { status: bool }` → `status`

use serde_json::{Value, json};

use crate::remote::{RemoteError, Trigger};

/// Tool input that does not fit the declared shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("status must be a boolean (true or false)")]
    NotBoolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoffeeTool {
    TurnOn,
    TurnOff,
    Set,
}

impl CoffeeTool {
    pub const ALL: [Self; 3] = [Self::TurnOn, Self::TurnOff, Self::Set];

    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| ValidationError::UnknownTool(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TurnOn => "turn_coffee_on",
            Self::TurnOff => "turn_coffee_off",
            Self::Set => "set_coffee_status",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::TurnOn => {
                "Turn coffee ON for next Sunday. This triggers the GitHub workflow to update \
                 the status page, indicating that coffee will be available next Sunday from \
                 9:00 AM to 11:00 AM."
            }
            Self::TurnOff => {
                "Turn coffee OFF for next Sunday. This triggers the GitHub workflow to update \
                 the status page, indicating that coffee will NOT be available next Sunday."
            }
            Self::Set => {
                "Set the coffee status (on or off) for next Sunday. This triggers the GitHub \
                 workflow to update the status page accordingly."
            }
        }
    }

    pub fn schema(self) -> Value {
        match self {
            Self::TurnOn | Self::TurnOff => json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
            Self::Set => json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "boolean",
                        "description": "Coffee status: true for ON, false for OFF",
                    },
                },
                "required": ["status"],
            }),
        }
    }

    /// The status this call asks for.
    pub fn resolve(self, args: &Value) -> Result<bool, ValidationError> {
        match self {
            Self::TurnOn => Ok(true),
            Self::TurnOff => Ok(false),
            Self::Set => args
                .get("status")
                .and_then(Value::as_bool)
                .ok_or(ValidationError::NotBoolean),
        }
    }
}

/// The `tools/list` entries.
pub fn list() -> Vec<Value> {
    CoffeeTool::ALL
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name(),
                "description": tool.description(),
                "inputSchema": tool.schema(),
            })
        })
        .collect()
}

/// Why a tool call did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Resolve and run the named tool.
pub fn call(name: &str, args: &Value, trigger: &dyn Trigger) -> Result<Value, ToolError> {
    let tool = CoffeeTool::from_name(name)?;
    let status = tool.resolve(args)?;
    tracing::info!(tool = name, status, "tool call");

    let report = trigger.trigger(status)?;
    Ok(serde_json::to_value(report).unwrap_or_else(|e| json!({ "error": e.to_string() })))
}

/// The structured failure payload handed back to the client.
pub fn failure(error: &ToolError) -> Value {
    json!({
        "success": false,
        "error": error.to_string(),
    })
}
