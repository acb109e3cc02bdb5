//! File-editing tools offered to the Frontend and Edit actors (§4.1 "Tool
//! use in expansion"): `read_file` and `write_file` against the node's
//! in-progress workspace.

use llm::ToolDefinition;
use serde_json::json;
use search_tree::ToolOutcome;
use workspace::Workspace;

pub fn read_file_tool() -> ToolDefinition {
    ToolDefinition {
        name: "read_file".to_string(),
        description: "Read a file's current contents from the workspace.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": { "path": { "type": "string" } },
            "required": ["path"],
        }),
    }
}

pub fn write_file_tool() -> ToolDefinition {
    ToolDefinition {
        name: "write_file".to_string(),
        description: "Write (or overwrite) a file in the workspace.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
                "content": { "type": "string" },
            },
            "required": ["path", "content"],
        }),
    }
}

/// Dispatch `read_file`/`write_file` against `workspace`; any other tool
/// name is reported as an error result rather than a panic (§7 "Tool-call
/// error" policy generalizes to actor-level tool dispatch too).
pub async fn dispatch_file_tool(workspace: &dyn Workspace, name: &str, input: &serde_json::Value) -> ToolOutcome {
    match name {
        "read_file" => {
            let Some(path) = input.get("path").and_then(|v| v.as_str()) else {
                return ToolOutcome::error("read_file requires a string `path`");
            };
            match workspace.read_file(path).await {
                Ok(content) => ToolOutcome::ok(content),
                Err(e) => ToolOutcome::error(format!("read_file failed: {}", e)),
            }
        }
        "write_file" => {
            let (Some(path), Some(content)) = (
                input.get("path").and_then(|v| v.as_str()),
                input.get("content").and_then(|v| v.as_str()),
            ) else {
                return ToolOutcome::error("write_file requires string `path` and `content`");
            };
            match workspace.write_file(path, content).await {
                Ok(()) => ToolOutcome::wrote_file(path, content),
                Err(e) => ToolOutcome::error(format!("write_file failed: {}", e)),
            }
        }
        other => ToolOutcome::error(format!("unknown tool '{}'", other)),
    }
}
