use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{schemars, tool, tool_handler, tool_router, RoleServer, ServerHandler};
use serde::Deserialize;

use crate::error::McpGithubOrgError;
use crate::extras::{self, APP_CONFIG_NAME, APP_CONFIG_URI, CODE_PROMPT_NAME};
use crate::github::GithubClient;

#[derive(Clone)]
pub struct McpGithubOrgServer {
    github: GithubClient,
    extras: bool,
    tool_router: ToolRouter<Self>,
}

// -- Tool parameter types --

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddParams {
    #[schemars(description = "First addend")]
    pub a: i64,

    #[schemars(description = "Second addend")]
    pub b: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OrgParam {
    #[schemars(description = "The name of the GitHub organization")]
    pub org: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OptionalOrgParam {
    #[schemars(description = "The name of the GitHub organization. Omit to list issues across all your repositories")]
    #[serde(default)]
    pub org: Option<String>,
}

impl McpGithubOrgServer {
    pub fn new(github: GithubClient, extras: bool) -> Self {
        Self {
            github,
            extras,
            tool_router: Self::tool_router(),
        }
    }

    fn err(&self, e: McpGithubOrgError) -> ErrorData {
        e.to_mcp_error()
    }

    fn extras_disabled(&self, what: &str) -> ErrorData {
        ErrorData::invalid_request(
            format!("{} are not enabled on this server (start with --extras)", what),
            None,
        )
    }

    fn resources(&self) -> Vec<Resource> {
        if !self.extras {
            return Vec::new();
        }
        let mut raw = RawResource::new(APP_CONFIG_URI, APP_CONFIG_NAME);
        raw.description = Some("Static application configuration".to_string());
        raw.mime_type = Some("application/json".to_string());
        vec![raw.no_annotation()]
    }

    fn read_app_config(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        if !self.extras {
            return Err(self.extras_disabled("Resources"));
        }
        if uri != APP_CONFIG_URI {
            return Err(ErrorData::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(serde_json::json!({ "uri": uri })),
            ));
        }

        let mut contents = ResourceContents::text(extras::app_config_json(), uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some("application/json".to_string());
        }
        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }

    fn prompts(&self) -> Result<Vec<Prompt>, ErrorData> {
        if !self.extras {
            return Ok(Vec::new());
        }
        let arguments: Vec<PromptArgument> = serde_json::from_value(serde_json::json!([
            {
                "name": "language",
                "description": "Programming language to write the function in",
                "required": true,
            },
            {
                "name": "task",
                "description": "What the function should do",
                "required": true,
            },
        ]))
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

        Ok(vec![Prompt::new(
            CODE_PROMPT_NAME,
            Some("Generate a request asking for a function in a given language"),
            Some(arguments),
        )])
    }

    fn render_prompt(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<GetPromptResult, ErrorData> {
        if !self.extras {
            return Err(self.extras_disabled("Prompts"));
        }
        if name != CODE_PROMPT_NAME {
            return Err(ErrorData::invalid_params(
                format!("Unknown prompt: {}", name),
                None,
            ));
        }

        let arg = |key: &str| -> Result<String, ErrorData> {
            arguments
                .and_then(|args| args.get(key))
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| {
                    self.err(McpGithubOrgError::InvalidParam(format!(
                        "prompt argument '{}' is required",
                        key
                    )))
                })
        };
        let language = arg("language")?;
        let task = arg("task")?;

        Ok(GetPromptResult {
            description: Some(format!("Request for a {} function", language)),
            messages: vec![PromptMessage::new_text(
                PromptMessageRole::User,
                extras::code_request_text(&language, &task),
            )],
        })
    }
}

/// Sum of two i64 values, widened so every pair fits.
pub fn add_numbers(a: i64, b: i64) -> i128 {
    i128::from(a) + i128::from(b)
}

// -- MCP tool handlers --

#[tool_router]
impl McpGithubOrgServer {
    #[tool(name = "add", description = "Add two numbers")]
    async fn add(
        &self,
        Parameters(params): Parameters<AddParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let sum = add_numbers(params.a, params.b);
        Ok(CallToolResult::success(vec![Content::text(sum.to_string())]))
    }

    #[tool(
        name = "list_all_members_in_organization",
        description = "List all members in a GitHub organization. Returns member usernames"
    )]
    async fn list_all_members_in_organization(
        &self,
        Parameters(params): Parameters<OrgParam>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::debug!(org = %params.org, "list_all_members_in_organization");

        let members = self
            .github
            .list_org_members(&params.org)
            .await
            .map_err(|e| self.err(e))?;

        let text = serde_json::to_string_pretty(&serde_json::json!({
            "org": params.org,
            "members": members,
            "count": members.len(),
        }))
        .unwrap_or_else(|_| "{}".to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "list_issues",
        description = "List all issues in a GitHub organization or globally. Returns issue titles"
    )]
    async fn list_issues(
        &self,
        Parameters(params): Parameters<OptionalOrgParam>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::debug!(org = params.org.as_deref().unwrap_or("none"), "list_issues");

        let titles = self
            .github
            .list_issue_titles(params.org.as_deref())
            .await
            .map_err(|e| self.err(e))?;

        let text = serde_json::to_string_pretty(&serde_json::json!({
            "org": params.org,
            "titles": titles,
            "count": titles.len(),
        }))
        .unwrap_or_else(|_| "{}".to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for McpGithubOrgServer {
    fn get_info(&self) -> ServerInfo {
        let (capabilities, instructions) = if self.extras {
            (
                ServerCapabilities::builder()
                    .enable_tools()
                    .enable_resources()
                    .enable_prompts()
                    .build(),
                "GitHub organization server. Use add to add two numbers, \
                 list_all_members_in_organization to list an org's members, \
                 and list_issues for issue titles (omit org for all your issues). \
                 Read config://app for the app configuration and use the \
                 generate_code_request prompt to ask for a function."
                    .to_string(),
            )
        } else {
            (
                ServerCapabilities::builder().enable_tools().build(),
                "GitHub organization server. Use add to add two numbers, \
                 list_all_members_in_organization to list an org's members, \
                 and list_issues for issue titles (omit org for all your issues)."
                    .to_string(),
            )
        };

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities,
            server_info: Implementation {
                name: "mcp-github-org".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(instructions),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(self.resources()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        tracing::debug!(uri = %request.uri, "read_resource");
        self.read_app_config(&request.uri)
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult::with_all_items(self.prompts()?))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        tracing::debug!(name = %request.name, "get_prompt");
        self.render_prompt(&request.name, request.arguments.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::DEFAULT_API_URL;

    // GithubClient builds an Octocrab client, which needs a Tokio runtime.
    fn make_server(extras: bool) -> McpGithubOrgServer {
        let github = GithubClient::new(DEFAULT_API_URL, None).unwrap();
        McpGithubOrgServer::new(github, extras)
    }

    fn prompt_args(language: &str, task: &str) -> JsonObject {
        let mut args = JsonObject::new();
        args.insert("language".to_string(), serde_json::json!(language));
        args.insert("task".to_string(), serde_json::json!(task));
        args
    }

    #[test]
    fn test_add_numbers() {
        assert_eq!(add_numbers(2, 3), 5);
        assert_eq!(add_numbers(-7, 3), -4);
        assert_eq!(add_numbers(0, 0), 0);
        assert_eq!(add_numbers(-1, -1), -2);
    }

    #[test]
    fn test_add_numbers_does_not_overflow() {
        assert_eq!(add_numbers(i64::MAX, 1), i128::from(i64::MAX) + 1);
        assert_eq!(add_numbers(i64::MIN, i64::MIN), 2 * i128::from(i64::MIN));
    }

    #[tokio::test]
    async fn test_tool_catalog() {
        let server = make_server(false);
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert!(names.contains(&"add".to_string()));
        assert!(names.contains(&"list_all_members_in_organization".to_string()));
        assert!(names.contains(&"list_issues".to_string()));
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn test_info_without_extras() {
        let info = make_server(false).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert_eq!(info.server_info.name, "mcp-github-org");
    }

    #[tokio::test]
    async fn test_info_with_extras() {
        let info = make_server(true).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.capabilities.prompts.is_some());
        assert!(info.instructions.unwrap().contains("config://app"));
    }

    #[tokio::test]
    async fn test_resources_listed_only_with_extras() {
        assert!(make_server(false).resources().is_empty());

        let resources = make_server(true).resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].raw.uri, APP_CONFIG_URI);
        assert_eq!(resources[0].raw.mime_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_read_app_config() {
        let result = make_server(true).read_app_config(APP_CONFIG_URI).unwrap();
        assert_eq!(result.contents.len(), 1);
        match &result.contents[0] {
            ResourceContents::TextResourceContents {
                uri, mime_type, text, ..
            } => {
                assert_eq!(uri, APP_CONFIG_URI);
                assert_eq!(mime_type.as_deref(), Some("application/json"));
                let value: serde_json::Value = serde_json::from_str(text).unwrap();
                assert_eq!(value["theme"], "dark");
                assert_eq!(value["version"], "1.0");
            }
            other => panic!("unexpected contents: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_unknown_resource() {
        let err = make_server(true).read_app_config("config://other").unwrap_err();
        assert!(err.message.contains("config://other"));
    }

    #[tokio::test]
    async fn test_read_resource_without_extras() {
        assert!(make_server(false).read_app_config(APP_CONFIG_URI).is_err());
    }

    #[tokio::test]
    async fn test_prompt_listed_with_arguments() {
        let prompts = make_server(true).prompts().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name, CODE_PROMPT_NAME);
        let args = prompts[0].arguments.as_ref().unwrap();
        let names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["language", "task"]);
        assert!(args.iter().all(|a| a.required == Some(true)));

        assert!(make_server(false).prompts().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_render_prompt() {
        let args = prompt_args("Rust", "parse a CSV line");
        let result = make_server(true)
            .render_prompt(CODE_PROMPT_NAME, Some(&args))
            .unwrap();
        assert_eq!(result.messages.len(), 1);
        let message = &result.messages[0];
        assert!(matches!(message.role, PromptMessageRole::User));
        match &message.content {
            PromptMessageContent::Text { text } => assert_eq!(
                text,
                "Write a Rust function that does the following: parse a CSV line"
            ),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_render_prompt_missing_argument() {
        let mut args = JsonObject::new();
        args.insert("language".to_string(), serde_json::json!("Go"));
        let err = make_server(true)
            .render_prompt(CODE_PROMPT_NAME, Some(&args))
            .unwrap_err();
        assert!(err.message.contains("task"));

        assert!(make_server(true).render_prompt(CODE_PROMPT_NAME, None).is_err());
    }

    #[tokio::test]
    async fn test_render_unknown_prompt() {
        let args = prompt_args("Rust", "x");
        assert!(make_server(true).render_prompt("nope", Some(&args)).is_err());
        assert!(make_server(false)
            .render_prompt(CODE_PROMPT_NAME, Some(&args))
            .is_err());
    }
}
