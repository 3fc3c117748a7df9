//! The import block, derived from what the emitted fragments actually use.

use crate::codegen::Stmt;
use crate::graph::{McpTransport, Provider};
use std::collections::BTreeSet;

/// Features used by the generated program. Every emitter records what it
/// references, so an import appears exactly when something needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports {
    pub os: bool,
    pub agent: bool,
    pub tool: bool,
    pub swarm: bool,
    pub graph_builder: bool,
    pub mcp_client: bool,
    providers: BTreeSet<ProviderKey>,
    transports: BTreeSet<TransportKey>,
    builtins: BTreeSet<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ProviderKey {
    Bedrock,
    Anthropic,
    Ollama,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TransportKey {
    Stdio,
    Sse,
    StreamableHttp,
}

impl Imports {
    pub fn provider(&mut self, provider: Provider) {
        self.providers.insert(match provider {
            Provider::Bedrock => ProviderKey::Bedrock,
            Provider::Anthropic => ProviderKey::Anthropic,
            Provider::Ollama => ProviderKey::Ollama,
            Provider::OpenAi => ProviderKey::OpenAi,
        });
    }

    pub fn transport(&mut self, transport: McpTransport) {
        self.mcp_client = true;
        self.transports.insert(match transport {
            McpTransport::Stdio => TransportKey::Stdio,
            McpTransport::Sse => TransportKey::Sse,
            McpTransport::StreamableHttp => TransportKey::StreamableHttp,
        });
    }

    pub fn builtin(&mut self, symbol: &'static str) {
        self.builtins.insert(symbol);
    }

    /// Import lines in a fixed order: standard library, `strands`, `strands_tools`, `mcp`.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "import argparse".to_string(),
            "import asyncio".to_string(),
            "import json".to_string(),
        ];
        if self.os {
            lines.push("import os".to_string());
        }

        let strands: Vec<&str> = [("Agent", self.agent), ("tool", self.tool)]
            .into_iter()
            .filter_map(|(name, used)| used.then_some(name))
            .collect();
        if !strands.is_empty() {
            lines.push(format!("from strands import {}", strands.join(", ")));
        }

        for provider in &self.providers {
            lines.push(
                match provider {
                    ProviderKey::Bedrock => "from strands.models import BedrockModel",
                    ProviderKey::Anthropic => "from strands.models.anthropic import AnthropicModel",
                    ProviderKey::Ollama => "from strands.models.ollama import OllamaModel",
                    ProviderKey::OpenAi => "from strands.models.openai import OpenAIModel",
                }
                .to_string(),
            );
        }

        let multiagent: Vec<&str> = [("GraphBuilder", self.graph_builder), ("Swarm", self.swarm)]
            .into_iter()
            .filter_map(|(name, used)| used.then_some(name))
            .collect();
        if !multiagent.is_empty() {
            lines.push(format!(
                "from strands.multiagent import {}",
                multiagent.join(", ")
            ));
        }

        if self.mcp_client {
            lines.push("from strands.tools.mcp import MCPClient".to_string());
        }

        if !self.builtins.is_empty() {
            let symbols: Vec<&str> = self.builtins.iter().copied().collect();
            lines.push(format!("from strands_tools import {}", symbols.join(", ")));
        }

        for transport in &self.transports {
            lines.push(
                match transport {
                    TransportKey::Stdio => "from mcp import StdioServerParameters, stdio_client",
                    TransportKey::Sse => "from mcp.client.sse import sse_client",
                    TransportKey::StreamableHttp => {
                        "from mcp.client.streamable_http import streamablehttp_client"
                    }
                }
                .to_string(),
            );
        }

        lines
    }

    /// The import block as statements, with a blank line after the standard library group.
    pub fn stmts(&self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        let mut in_stdlib = true;
        for line in self.lines() {
            if in_stdlib && line.starts_with("from ") {
                stmts.push(Stmt::Blank);
                in_stdlib = false;
            }
            stmts.push(Stmt::Line(line));
        }
        stmts
    }
}
