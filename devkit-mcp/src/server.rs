//! MCP surface: the `commit` and `code_review` tools over one [`Engine`],
//! plus `reset_session` to drop a session.

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::bail;
use devkit::core::types::Workflow;
use devkit::engine::Engine;
use devkit::guard::{ToolReply, guarded};
use devkit::io::config::ToolsConfig;
use devkit::registry::{SESSION_ID_FIELD, session_id_from_args};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;

/// Config name → MCP tool name.
const TOOL_NAMES: [(&str, &str); 2] = [("commit", "commit"), ("codereview", "code_review")];

// --- Tool input schemas ---
//
// The structs below only document the inputs. Arguments reach the engine as
// the raw JSON object so the validator can report every bad field at once.

#[derive(JsonSchema)]
#[allow(dead_code)]
struct CommitFields {
    /// Your current thinking step
    thought: String,
    /// The critical questions of the current step, helps guide critical thinking
    critical_questions: String,
    /// The next step to take in the process
    next_step: String,
    /// The analysis of the current step
    analysis: Option<String>,
    #[serde(flatten)]
    common: StepFields,
}

#[derive(JsonSchema)]
#[allow(dead_code)]
struct ReviewFields {
    /// Your current thinking step
    thought: String,
    /// The critical questions of the current step, help on critical thinking
    critical_questions: Option<String>,
    /// The next step to take, what to do next
    next_step: Option<String>,
    /// The analysis of the current step
    analysis: Option<String>,
    #[serde(flatten)]
    common: StepFields,
}

#[derive(JsonSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct StepFields {
    /// Whether another thought step is needed
    next_thought_needed: bool,
    /// Current thought number
    thought_number: u32,
    /// Estimated total thoughts needed
    total_thoughts: u32,
    /// Whether this revises previous thinking
    is_revision: Option<bool>,
    /// Which thought is being reconsidered
    revises_thought: Option<u32>,
    /// Branching point thought number
    branch_from_thought: Option<u32>,
    /// Branch identifier
    branch_id: Option<String>,
    /// If more thoughts are needed
    needs_more_thoughts: Option<bool>,
    /// Session to continue (default: "default")
    session_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ResetParams {
    /// Session to drop (default: "default")
    session_id: Option<String>,
    /// Only reset this tool's session: "commit" or "code_review" (default: both)
    tool: Option<String>,
}

/// Raw `commit` arguments, schema from [`CommitFields`].
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct CommitArgs(pub Map<String, Value>);

/// Raw `code_review` arguments, schema from [`ReviewFields`].
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ReviewArgs(pub Map<String, Value>);

impl JsonSchema for CommitArgs {
    fn schema_name() -> Cow<'static, str> {
        CommitFields::schema_name()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        CommitFields::json_schema(generator)
    }
}

impl JsonSchema for ReviewArgs {
    fn schema_name() -> Cow<'static, str> {
        ReviewFields::schema_name()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        ReviewFields::json_schema(generator)
    }
}

// --- MCP Server ---

#[derive(Clone)]
pub struct DevkitServer {
    engine: Arc<Engine>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DevkitServer {
    /// Build a server exposing only the tools `tools` enables.
    pub fn new(engine: Engine, tools: &ToolsConfig) -> Self {
        let mut tool_router = Self::tool_router();
        for (config_name, tool_name) in TOOL_NAMES {
            if !tools.is_enabled(config_name) {
                info!(tool = tool_name, "tool disabled by config");
                tool_router.map.remove(tool_name);
            }
        }
        Self {
            engine: Arc::new(engine),
            tool_router,
        }
    }

    /// Draft a Conventional Commit message step by step
    #[tool(
        description = "Guide the commit process with a chain of thought. Step 1 reviews the staged git changes; every step can surface an issue key (e.g. PROJ-123), a conventional type and scope (e.g. fix(auth)), and lines such as 'commit subject:', 'commit body:' or 'BREAKING CHANGE:'. When nextThoughtNeeded is false the composed commit message is returned. Branches explore alternatives; pass sessionId to keep drafts apart."
    )]
    async fn commit(
        &self,
        Parameters(args): Parameters<CommitArgs>,
    ) -> Result<CallToolResult, McpError> {
        let engine = Arc::clone(&self.engine);
        let args = Value::Object(args.0);
        run_guarded("commit", move || {
            let reply = engine.commit_step(&args)?;
            Ok(reply.to_string())
        })
        .await
    }

    /// Reflective, revisable step-by-step code review
    #[tool(
        description = "A tool for dynamic and reflective code review through numbered thoughts. Adjust totalThoughts as understanding grows, revise earlier thoughts with isRevision/revisesThought, or branch with branchFromThought/branchId. Each call returns a JSON progress summary; pass sessionId to keep reviews apart."
    )]
    async fn code_review(
        &self,
        Parameters(args): Parameters<ReviewArgs>,
    ) -> Result<CallToolResult, McpError> {
        let engine = Arc::clone(&self.engine);
        let args = Value::Object(args.0);
        run_guarded("code_review", move || {
            let summary = engine.review_step(&args)?;
            Ok(summary.to_json()?)
        })
        .await
    }

    /// Forget a session so its id starts fresh
    #[tool(
        description = "Forget a commit and/or code_review session so the same sessionId starts from scratch. Replies with the sessions that were reset and those still active."
    )]
    async fn reset_session(
        &self,
        Parameters(params): Parameters<ResetParams>,
    ) -> Result<CallToolResult, McpError> {
        let engine = Arc::clone(&self.engine);
        run_guarded("reset_session", move || {
            let mut args = Map::new();
            if let Some(id) = params.session_id {
                args.insert(SESSION_ID_FIELD.to_string(), Value::String(id));
            }
            let id = session_id_from_args(&Value::Object(args))?;
            let workflows = match params.tool.as_deref() {
                None => vec![Workflow::Commit, Workflow::Review],
                Some("commit") => vec![Workflow::Commit],
                Some("code_review") => vec![Workflow::Review],
                Some(other) => bail!("unknown tool '{other}' (expected commit or code_review)"),
            };

            let dropped = engine.reset_session(&id, &workflows);
            let report = json!({
                "sessionId": id,
                "reset": dropped.into_iter().map(tool_name).collect::<Vec<_>>(),
                "activeSessions": {
                    "commit": engine.commits().ids(),
                    "code_review": engine.reviews().ids(),
                },
            });
            Ok(serde_json::to_string_pretty(&report)?)
        })
        .await
    }
}

fn tool_name(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Commit => "commit",
        Workflow::Review => "code_review",
    }
}

/// Run `handler` on the blocking pool behind the fault boundary.
async fn run_guarded<F>(tool: &'static str, handler: F) -> Result<CallToolResult, McpError>
where
    F: FnOnce() -> anyhow::Result<String> + Send + 'static,
{
    let reply = tokio::task::spawn_blocking(move || guarded(tool, handler))
        .await
        .map_err(|err| McpError::internal_error(format!("{tool} worker failed: {err}"), None))?;
    Ok(to_call_result(reply))
}

fn to_call_result(reply: ToolReply) -> CallToolResult {
    let content = vec![Content::text(reply.text)];
    if reply.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[tool_handler]
impl ServerHandler for DevkitServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "devkit chain-of-thought tools: draft commit messages from staged changes and run step-by-step code reviews"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Serve `server` on stdio until the client disconnects.
pub async fn serve(server: DevkitServer) -> anyhow::Result<()> {
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
