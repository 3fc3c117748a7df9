use super::{Pattern, PatternExpander, unexpected};
use crate::codegen::literal::{py_dict, py_env_lookup, py_float, py_str, py_text};
use crate::codegen::{Arg, Stmt};
use crate::compiler::context::{GenContext, Site};
use crate::error::CompileError;
use crate::graph::{AgentConfig, ModelConfig, NodeDefinition, NodeKind, Provider};
use crate::naming::Role;

const OLLAMA_HOST: &str = "http://localhost:11434";

/// A single model-backed agent.
pub struct AgentExpander;

impl PatternExpander for AgentExpander {
    fn pattern(&self) -> Pattern {
        Pattern::Agent
    }

    fn expand(
        &self,
        node: &NodeDefinition,
        _site: &Site,
        cx: &mut GenContext<'_, '_>,
    ) -> Result<Vec<Stmt>, CompileError> {
        let NodeKind::Agent(config) = &node.kind else {
            return Err(unexpected(node, Pattern::Agent));
        };
        agent_stmts(cx, node, config, Vec::new(), None)
    }
}

/// Builds the model and agent declarations of an agent-like node.
///
/// `delegates` are extra tool entries placed after the node's own inline tools
/// and before the tools listed from servers; `coordination` is appended to the
/// system prompt.
pub fn agent_stmts(
    cx: &mut GenContext<'_, '_>,
    node: &NodeDefinition,
    config: &AgentConfig,
    delegates: Vec<String>,
    coordination: Option<&str>,
) -> Result<Vec<Stmt>, CompileError> {
    let ident = cx.ident(&node.id)?.to_string();
    let model_var = cx.name(&node.id, Role::Model)?;
    let agent_var = cx.name(&node.id, Role::Agent)?;

    let (mut tools, resolved) = cx.tool_entries(&node.id)?;
    tools.extend(delegates);
    tools.extend(
        resolved
            .server_backed
            .iter()
            .map(|server| format!("*{}.list_tools_sync()", server.client_symbol)),
    );

    let prompt = [Some(config.system_prompt.trim()), coordination.map(str::trim)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut args = vec![
        Arg::named("name", py_str(&ident)),
        Arg::named("model", model_var.clone()),
    ];
    if !prompt.is_empty() {
        args.push(Arg::named("system_prompt", py_text(&prompt)));
    }
    if !tools.is_empty() {
        args.push(Arg::named("tools", format!("[{}]", tools.join(", "))));
    }
    if let Some(description) = config.description.as_deref().filter(|d| !d.trim().is_empty()) {
        args.push(Arg::named("description", py_str(description.trim())));
    }
    args.push(Arg::named("callback_handler", "None"));

    cx.imports.agent = true;
    Ok(vec![
        model_stmt(cx, &model_var, &config.model),
        Stmt::assign(agent_var, "Agent", args),
    ])
}

fn model_stmt(cx: &mut GenContext<'_, '_>, var: &str, model: &ModelConfig) -> Stmt {
    cx.imports.provider(model.provider);
    let model_id = py_str(model.resolved_model_id());
    let temperature = py_float(model.temperature);
    let max_tokens = model.max_tokens.to_string();

    let mut client_args = Vec::new();
    if let Some(env) = model.resolved_api_key_env() {
        cx.imports.os = true;
        client_args.push((py_str("api_key"), py_env_lookup(env, None)));
    }

    match model.provider {
        Provider::Bedrock => {
            let mut args = vec![
                Arg::named("model_id", model_id),
                Arg::named("temperature", temperature),
                Arg::named("max_tokens", max_tokens),
            ];
            if let Some(region) = model.region.as_deref().filter(|r| !r.trim().is_empty()) {
                args.push(Arg::named("region_name", py_str(region)));
            }
            Stmt::assign(var, "BedrockModel", args)
        }
        Provider::OpenAi => {
            if let Some(host) = model.host.as_deref().filter(|h| !h.trim().is_empty()) {
                client_args.push((py_str("base_url"), py_str(host)));
            }
            let params = py_dict(&[
                (py_str("temperature"), temperature),
                (py_str("max_tokens"), max_tokens),
            ]);
            Stmt::assign(
                var,
                "OpenAIModel",
                vec![
                    Arg::named("client_args", py_dict(&client_args)),
                    Arg::named("model_id", model_id),
                    Arg::named("params", params),
                ],
            )
        }
        Provider::Anthropic => Stmt::assign(
            var,
            "AnthropicModel",
            vec![
                Arg::named("client_args", py_dict(&client_args)),
                Arg::named("model_id", model_id),
                Arg::named("max_tokens", max_tokens),
                Arg::named("params", py_dict(&[(py_str("temperature"), temperature)])),
            ],
        ),
        Provider::Ollama => {
            let host = model
                .host
                .as_deref()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(OLLAMA_HOST);
            Stmt::assign(
                var,
                "OllamaModel",
                vec![
                    Arg::named("host", py_str(host)),
                    Arg::named("model_id", model_id),
                    Arg::named("temperature", temperature),
                    Arg::named("max_tokens", max_tokens),
                ],
            )
        }
    }
}
