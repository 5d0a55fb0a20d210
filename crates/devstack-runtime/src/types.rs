//! Shared types for process supervision.

use std::fmt;
use tokio::process::Child;

/// Which pipeline stage a process belongs to. Used for diagnostics and for
/// shutdown bookkeeping, never for control flow branching after spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Tracing,
    Proxy,
    McpServer,
    Client,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tracing => "tracing",
            Self::Proxy => "proxy",
            Self::McpServer => "mcp-server",
            Self::Client => "client",
        };
        f.write_str(name)
    }
}

/// One supervised OS process. The supervisor holds these in start order;
/// shutdown consumes them in reverse.
pub struct ProcessHandle {
    pub stage: Stage,
    pub child: Child,
}

impl ProcessHandle {
    pub fn new(stage: Stage, child: Child) -> Self {
        Self { stage, child }
    }
}
