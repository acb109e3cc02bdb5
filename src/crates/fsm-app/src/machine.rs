//! Builds the concrete Application FSM (§4.4): wires the five code-gen
//! actors into `fsm-core::Machine<ApplicationContext>` states via `invoke`.

use std::collections::HashMap;
use std::sync::Arc;

use actors::{DraftProfile, EditProfile, FrontendProfile, HandlersProfile, IndexProfile, StageOutput};
use fsm_core::{path, Completion, Invoke, Machine, StateNode};
use llm::{AsyncLLM, Message};
use search_tree::BeamActor;
use serde_json::{json, Value};
use tracing::instrument;
use workspace::{FileMap, Workspace};

use crate::context::ApplicationContext;

fn stage_output_to_value(output: &StageOutput) -> Value {
    json!({ "files": output.files, "no_changes_applied": output.no_changes_applied })
}

fn error_value(message: impl std::fmt::Display) -> Value {
    json!({ "message": message.to_string() })
}

/// Merge a completed stage's file delta into the right bucket and mirror
/// `no_changes_applied` into context (§3 "ApplicationContext" canonical
/// location decision).
fn merge_stage_result(target: &mut FileMap, ctx_no_changes: &mut bool, payload: &Value) {
    if let Some(files) = payload.get("files").and_then(|v| v.as_object()) {
        for (k, v) in files {
            if let Some(content) = v.as_str() {
                target.insert(k.clone(), content.to_string());
            }
        }
    }
    *ctx_no_changes = payload.get("no_changes_applied").and_then(|v| v.as_bool()).unwrap_or(false);
}

fn set_error(ctx: &mut ApplicationContext, payload: &Value) {
    ctx.error = Some(payload.get("message").and_then(|v| v.as_str()).unwrap_or("unknown actor failure").to_string());
}

/// Run a text-emitting stage's actor to completion against a clone of the
/// session workspace seeded with `ctx.all_files()`, writing the winning
/// trajectory's files back into the session workspace so later stages see
/// them, and returning the JSON-erased result `invoke.run` expects.
#[instrument(skip_all)]
async fn run_stage<P: search_tree::ActorProfile<Output = StageOutput>>(
    llm: Arc<dyn AsyncLLM>,
    workspace: Arc<dyn Workspace>,
    profile: P,
    seed_files: &FileMap,
    seed_prompt: &str,
) -> std::result::Result<Value, Value> {
    let ws = workspace.clone_workspace();
    for (path, content) in seed_files {
        ws.write_file(path, content).await.map_err(error_value)?;
    }

    let actor = BeamActor::new(Arc::new(profile), llm);
    let seed = vec![Message::user(seed_prompt)];
    let result = actor.execute(seed, ws).await.map_err(error_value)?;

    for (path, content) in &result.output.files {
        workspace.write_file(path, content).await.map_err(error_value)?;
    }

    Ok(stage_output_to_value(&result.output))
}

fn draft_invoke(llm: Arc<dyn AsyncLLM>, workspace: Arc<dyn Workspace>) -> Invoke<ApplicationContext> {
    Invoke {
        input_fn: Arc::new(|ctx: &ApplicationContext| {
            json!({ "user_prompt": ctx.user_prompt, "feedback": ctx.feedback.draft })
        }),
        run: Arc::new(move |input| {
            let llm = llm.clone();
            let workspace = workspace.clone();
            Box::pin(async move {
                let user_prompt = input["user_prompt"].as_str().unwrap_or_default().to_string();
                let feedback = input.get("feedback").and_then(|v| v.as_str()).map(String::from);
                let profile = DraftProfile::new(user_prompt.clone(), feedback);
                run_stage(llm, workspace, profile, &FileMap::new(), &user_prompt).await
            })
        }),
        on_done: Completion::to(path(&["REVIEW_DRAFT"])).with_action(|ctx, payload| {
            merge_stage_result(&mut ctx.server_files, &mut ctx.no_changes_applied, payload);
            ctx.draft = Some(format!("{} files drafted", ctx.server_files.len()));
        }),
        on_error: Completion::to(path(&["FAILURE"])).with_action(set_error),
    }
}

fn handlers_invoke(llm: Arc<dyn AsyncLLM>, workspace: Arc<dyn Workspace>) -> Invoke<ApplicationContext> {
    Invoke {
        input_fn: Arc::new(|ctx: &ApplicationContext| {
            json!({ "server_files": ctx.server_files, "feedback": ctx.feedback.handlers })
        }),
        run: Arc::new(move |input| {
            let llm = llm.clone();
            let workspace = workspace.clone();
            Box::pin(async move {
                let server_files: FileMap = serde_json::from_value(input["server_files"].clone()).unwrap_or_default();
                let feedback = input.get("feedback").and_then(|v| v.as_str()).map(String::from);
                let profile = HandlersProfile::new(server_files.clone(), feedback);
                run_stage(llm, workspace, profile, &server_files, "Fill in the handler implementations.").await
            })
        }),
        on_done: Completion::to(path(&["REVIEW_HANDLERS"])).with_action(|ctx, payload| {
            merge_stage_result(&mut ctx.server_files, &mut ctx.no_changes_applied, payload);
        }),
        on_error: Completion::to(path(&["FAILURE"])).with_action(set_error),
    }
}

fn index_invoke(llm: Arc<dyn AsyncLLM>, workspace: Arc<dyn Workspace>) -> Invoke<ApplicationContext> {
    Invoke {
        input_fn: Arc::new(|ctx: &ApplicationContext| {
            json!({ "server_files": ctx.server_files, "feedback": ctx.feedback.index })
        }),
        run: Arc::new(move |input| {
            let llm = llm.clone();
            let workspace = workspace.clone();
            Box::pin(async move {
                let server_files: FileMap = serde_json::from_value(input["server_files"].clone()).unwrap_or_default();
                let feedback = input.get("feedback").and_then(|v| v.as_str()).map(String::from);
                let profile = IndexProfile::new(server_files.clone(), feedback);
                run_stage(llm, workspace, profile, &server_files, "Finalize the router index wiring.").await
            })
        }),
        on_done: Completion::to(path(&["REVIEW_INDEX"])).with_action(|ctx, payload| {
            merge_stage_result(&mut ctx.server_files, &mut ctx.no_changes_applied, payload);
        }),
        on_error: Completion::to(path(&["FAILURE"])).with_action(set_error),
    }
}

fn frontend_invoke(llm: Arc<dyn AsyncLLM>, workspace: Arc<dyn Workspace>) -> Invoke<ApplicationContext> {
    Invoke {
        input_fn: Arc::new(|ctx: &ApplicationContext| {
            json!({ "user_prompt": ctx.user_prompt, "server_files": ctx.server_files, "feedback": ctx.feedback.frontend })
        }),
        run: Arc::new(move |input| {
            let llm = llm.clone();
            let workspace = workspace.clone();
            Box::pin(async move {
                let user_prompt = input["user_prompt"].as_str().unwrap_or_default().to_string();
                let server_files: FileMap = serde_json::from_value(input["server_files"].clone()).unwrap_or_default();
                let feedback = input.get("feedback").and_then(|v| v.as_str()).map(String::from);
                let profile = FrontendProfile::new(user_prompt.clone(), server_files.clone(), feedback);
                run_stage(llm, workspace, profile, &server_files, &user_prompt).await
            })
        }),
        on_done: Completion::to(path(&["REVIEW_FRONTEND"])).with_action(|ctx, payload| {
            merge_stage_result(&mut ctx.frontend_files, &mut ctx.no_changes_applied, payload);
        }),
        on_error: Completion::to(path(&["FAILURE"])).with_action(set_error),
    }
}

fn edit_invoke(llm: Arc<dyn AsyncLLM>, workspace: Arc<dyn Workspace>) -> Invoke<ApplicationContext> {
    Invoke {
        input_fn: Arc::new(|ctx: &ApplicationContext| {
            json!({ "instructions": ctx.feedback.edit, "all_files": ctx.all_files() })
        }),
        run: Arc::new(move |input| {
            let llm = llm.clone();
            let workspace = workspace.clone();
            Box::pin(async move {
                let instructions = input.get("instructions").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let all_files: FileMap = serde_json::from_value(input["all_files"].clone()).unwrap_or_default();
                let profile = EditProfile::new(instructions.clone(), all_files.clone());
                run_stage(llm, workspace, profile, &all_files, &instructions).await
            })
        }),
        on_done: Completion::to(path(&["REVIEW_EDIT"])).with_action(|ctx, payload| {
            // Edit's delta can touch either half of the project; split by
            // the client-tree convention (`client/...`) rather than
            // guessing from profile state, since by this point the two
            // buckets are just a filing convention, not distinct actors.
            if let Some(files) = payload.get("files").and_then(|v| v.as_object()) {
                for (k, v) in files {
                    let Some(content) = v.as_str() else { continue };
                    if k.starts_with("client/") {
                        ctx.frontend_files.insert(k.clone(), content.to_string());
                    } else {
                        ctx.server_files.insert(k.clone(), content.to_string());
                    }
                }
            }
            ctx.no_changes_applied = payload.get("no_changes_applied").and_then(|v| v.as_bool()).unwrap_or(false);
        }),
        on_error: Completion::to(path(&["FAILURE"])).with_action(set_error),
    }
}

/// Build the Application FSM (§4.4): `START --PROMPT--> DRAFT --invoke-->
/// REVIEW_DRAFT --CONFIRM--> HANDLERS --invoke--> REVIEW_HANDLERS
/// --CONFIRM--> INDEX --invoke--> REVIEW_INDEX --CONFIRM--> FRONTEND
/// --invoke--> REVIEW_FRONTEND --CONFIRM--> COMPLETE`, each `REVIEW_*`
/// additionally accepting a `FEEDBACK_*` event back into its originating
/// stage, and `COMPLETE`/`REVIEW_EDIT` accepting `FEEDBACK_EDIT` into the
/// `EDIT` actor (§4.4 last paragraph). `workspace` is the session's
/// long-lived file tree every stage clones from and writes back into.
pub fn build_application_machine(
    llm: Arc<dyn AsyncLLM>,
    workspace: Arc<dyn Workspace>,
) -> Machine<ApplicationContext> {
    let (states, root_on) = build_states(llm, workspace);
    Machine::new(states, root_on, ApplicationContext::default())
}

/// Rebuild the Application FSM's state tree from a checkpoint (§6.3):
/// entry actions are not replayed, matching `Machine::load`'s contract.
/// `llm`/`workspace` rebind this session's actors to the restored machine —
/// they are never part of the serialized checkpoint itself.
pub fn load_application_machine(
    llm: Arc<dyn AsyncLLM>,
    workspace: Arc<dyn Workspace>,
    checkpoint: fsm_core::Checkpoint,
) -> fsm_core::Result<Machine<ApplicationContext>> {
    let (states, root_on) = build_states(llm, workspace);
    Machine::load(states, root_on, checkpoint)
}

type StatesAndRootOn = (Vec<StateNode<ApplicationContext>>, HashMap<String, fsm_core::StatePath>);

fn build_states(llm: Arc<dyn AsyncLLM>, workspace: Arc<dyn Workspace>) -> StatesAndRootOn {
    let start = StateNode::new("START").on("PROMPT", path(&["DRAFT"])).build();

    let draft = StateNode::new("DRAFT").invoke(draft_invoke(llm.clone(), workspace.clone())).build();
    let review_draft = StateNode::new("REVIEW_DRAFT")
        .on("CONFIRM", path(&["HANDLERS"]))
        .on("FEEDBACK_DRAFT", path(&["DRAFT"]))
        .build();

    let handlers = StateNode::new("HANDLERS").invoke(handlers_invoke(llm.clone(), workspace.clone())).build();
    let review_handlers = StateNode::new("REVIEW_HANDLERS")
        .on("CONFIRM", path(&["INDEX"]))
        .on("FEEDBACK_HANDLERS", path(&["HANDLERS"]))
        .build();

    let index = StateNode::new("INDEX").invoke(index_invoke(llm.clone(), workspace.clone())).build();
    let review_index = StateNode::new("REVIEW_INDEX")
        .on("CONFIRM", path(&["FRONTEND"]))
        .on("FEEDBACK_INDEX", path(&["INDEX"]))
        .build();

    let frontend = StateNode::new("FRONTEND").invoke(frontend_invoke(llm.clone(), workspace.clone())).build();
    let review_frontend = StateNode::new("REVIEW_FRONTEND")
        .on("CONFIRM", path(&["COMPLETE"]))
        .on("FEEDBACK_FRONTEND", path(&["FRONTEND"]))
        .build();

    let edit = StateNode::new("EDIT").invoke(edit_invoke(llm.clone(), workspace.clone())).build();
    let review_edit = StateNode::new("REVIEW_EDIT")
        .on("CONFIRM", path(&["COMPLETE"]))
        .on("FEEDBACK_EDIT", path(&["EDIT"]))
        .build();

    let complete = StateNode::new("COMPLETE").on("FEEDBACK_EDIT", path(&["EDIT"])).build();
    let failure = StateNode::new("FAILURE").build();

    let states = vec![
        start,
        draft,
        review_draft,
        handlers,
        review_handlers,
        index,
        review_index,
        frontend,
        review_frontend,
        edit,
        review_edit,
        complete,
        failure,
    ];

    let mut root_on: HashMap<String, Vec<fsm_core::StateId>> = HashMap::new();
    root_on.insert("ERROR".to_string(), path(&["FAILURE"]));

    (states, root_on)
}
