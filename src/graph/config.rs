//! Per-kind node configuration.
//!
//! Every node kind carries its own explicit field set. The structs deserialize
//! from the free-form `data` object of an editor node, accepting both the
//! snake_case names used here and the camelCase names the editor writes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Model providers the generated program can bind to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[serde(alias = "aws", alias = "Bedrock", alias = "AWS Bedrock")]
    Bedrock,
    #[serde(alias = "OpenAI", alias = "open-ai")]
    OpenAi,
    #[serde(alias = "Anthropic")]
    Anthropic,
    #[serde(alias = "Ollama")]
    Ollama,
}

impl Provider {
    pub fn default_model_id(self) -> &'static str {
        match self {
            Provider::Bedrock => "us.anthropic.claude-3-7-sonnet-20250219-v1:0",
            Provider::OpenAi => "gpt-4o",
            Provider::Anthropic => "claude-3-7-sonnet-latest",
            Provider::Ollama => "llama3",
        }
    }

    /// Environment variable the generated program reads the credential from.
    pub fn default_api_key_env(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::Bedrock | Provider::Ollama => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    #[serde(alias = "modelProvider")]
    pub provider: Provider,
    #[serde(alias = "modelId", alias = "model")]
    pub model_id: Option<String>,
    pub temperature: f64,
    #[serde(alias = "maxTokens")]
    pub max_tokens: u32,
    #[serde(alias = "regionName")]
    pub region: Option<String>,
    #[serde(alias = "baseUrl", alias = "ollamaHost")]
    pub host: Option<String>,
    #[serde(alias = "apiKeyEnv")]
    pub api_key_env: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Bedrock,
            model_id: None,
            temperature: 0.7,
            max_tokens: 4000,
            region: None,
            host: None,
            api_key_env: None,
        }
    }
}

impl ModelConfig {
    pub fn resolved_model_id(&self) -> &str {
        self.model_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model_id())
    }

    pub fn resolved_api_key_env(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.provider.default_api_key_env())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    #[serde(flatten)]
    pub model: ModelConfig,
    #[serde(alias = "systemPrompt")]
    pub system_prompt: String,
    #[serde(alias = "streamingEnabled")]
    pub streaming: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    #[serde(flatten)]
    pub agent: AgentConfig,
    #[serde(alias = "coordinationPrompt")]
    pub coordination_prompt: Option<String>,
}

/// Bounds for a swarm. Defaults mirror the runtime's own defaults so an
/// untouched node behaves exactly like a hand-written `Swarm(...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    #[serde(alias = "maxHandoffs")]
    pub max_handoffs: u32,
    #[serde(alias = "maxIterations")]
    pub max_iterations: u32,
    #[serde(alias = "executionTimeout")]
    pub execution_timeout: f64,
    #[serde(alias = "nodeTimeout")]
    pub node_timeout: f64,
    #[serde(alias = "repetitiveHandoffDetectionWindow")]
    pub repetitive_handoff_detection_window: u32,
    #[serde(alias = "repetitiveHandoffMinUniqueAgents")]
    pub repetitive_handoff_min_unique_agents: u32,
    #[serde(alias = "entryPoint")]
    pub entry_point: Option<String>,
    pub description: Option<String>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            max_handoffs: 20,
            max_iterations: 20,
            execution_timeout: 900.0,
            node_timeout: 300.0,
            repetitive_handoff_detection_window: 0,
            repetitive_handoff_min_unique_agents: 0,
            entry_point: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    #[serde(alias = "executionTimeout")]
    pub execution_timeout: Option<f64>,
    #[serde(alias = "nodeTimeout")]
    pub node_timeout: Option<f64>,
    #[serde(alias = "maxNodeExecutions")]
    pub max_node_executions: Option<u32>,
    #[serde(alias = "resetOnRevisit")]
    pub reset_on_revisit: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuiltinToolConfig {
    #[serde(alias = "toolName", alias = "tool", alias = "name")]
    pub tool_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomToolConfig {
    #[serde(alias = "pythonCode", alias = "source")]
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum McpTransport {
    #[default]
    #[serde(rename = "stdio")]
    Stdio,
    #[serde(
        rename = "streamable-http",
        alias = "http",
        alias = "streamable_http",
        alias = "streamableHttp"
    )]
    StreamableHttp,
    #[serde(rename = "sse")]
    Sse,
}

/// Connection parameters for an external tool server.
///
/// Values in `env` and `headers` written as `${NAME}` are references to the
/// execution environment and are never inlined into the generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpServerConfig {
    #[serde(alias = "transportType")]
    pub transport: McpTransport,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub env: IndexMap<String, String>,
    #[serde(alias = "serverUrl")]
    pub url: Option<String>,
    pub headers: IndexMap<String, String>,
    #[serde(alias = "startupTimeout")]
    pub startup_timeout: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    #[serde(
        alias = "defaultContent",
        alias = "defaultInput",
        alias = "prompt",
        alias = "value"
    )]
    pub default_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: Option<String>,
}
