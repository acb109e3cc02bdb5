//! The four tool schemas `FSMToolProcessor` exposes to the outer LLM (§4.5).

use llm::ToolDefinition;
use serde_json::json;

pub fn start_fsm_tool() -> ToolDefinition {
    ToolDefinition {
        name: "start_fsm".to_string(),
        description: "Start the code-generation FSM for a new application.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": { "app_description": { "type": "string" } },
            "required": ["app_description"],
        }),
    }
}

pub fn confirm_state_tool() -> ToolDefinition {
    ToolDefinition {
        name: "confirm_state".to_string(),
        description: "Confirm the current reviewable stage and advance the FSM.".to_string(),
        input_schema: json!({ "type": "object", "properties": {} }),
    }
}

pub fn provide_feedback_tool() -> ToolDefinition {
    ToolDefinition {
        name: "provide_feedback".to_string(),
        description: "Send revision feedback for the currently reviewable stage.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "feedback": { "type": "string" },
                "component_name": { "type": "string" },
            },
            "required": ["feedback"],
        }),
    }
}

pub fn complete_fsm_tool() -> ToolDefinition {
    ToolDefinition {
        name: "complete_fsm".to_string(),
        description: "Declare the application complete once the FSM has reached COMPLETE.".to_string(),
        input_schema: json!({ "type": "object", "properties": {} }),
    }
}
