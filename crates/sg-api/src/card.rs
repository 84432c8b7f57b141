//! Agent card served at `/.well-known/agent.json`

use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use sg_core::ToolManager;

pub const AGENT_NAME: &str = "statista_agent";
pub const AGENT_DESCRIPTION: &str =
    "Searches Statista's statistical database and retrieves chart data for individual statistics.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Public description of this agent
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub capabilities: JsonValue,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
    pub security_schemes: JsonValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<JsonValue>,
}

impl AgentCard {
    /// One skill per registered tool. `security` is only advertised when
    /// bearer auth is on.
    pub fn new(public_url: impl Into<String>, tools: &ToolManager, auth_enabled: bool) -> Self {
        let skills = tools
            .definitions()
            .into_iter()
            .map(|def| AgentSkill {
                id: def.name.clone(),
                name: def.name,
                description: def.description,
            })
            .collect();

        let security = if auth_enabled {
            vec![json!({ "bearer": [] })]
        } else {
            Vec::new()
        };

        Self {
            name: AGENT_NAME.to_string(),
            description: AGENT_DESCRIPTION.to_string(),
            url: public_url.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: json!({ "streaming": false }),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            skills,
            security_schemes: json!({
                "bearer": {
                    "type": "http",
                    "scheme": "bearer",
                    "description": "Bearer token required for /jsonrpc"
                }
            }),
            security,
        }
    }
}
