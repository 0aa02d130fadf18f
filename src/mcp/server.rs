//! Notes MCP server implementation

use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use smart_notes::{NewNote, NoteError, NoteUpdate, Notebook, SearchRequest};

/// Parameters for notes_search tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "Search text; matched as a substring and by similarity")]
    pub query: String,
    #[schemars(description = "Only return notes carrying this tag")]
    #[serde(default)]
    pub tag: Option<String>,
    #[schemars(description = "Maximum results (default: 1, max: 100)")]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for tools addressing one note
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoteIdParams {
    #[schemars(description = "Note id")]
    pub id: String,
}

/// Parameters for notes_list tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListNotesParams {
    #[schemars(description = "Only list notes carrying this tag")]
    #[serde(default)]
    pub tag: Option<String>,
    #[schemars(description = "Maximum results (default: 100, max: 500)")]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for notes_create tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNoteParams {
    #[schemars(description = "Optional title (max 200 characters)")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "Markdown content (max 100000 characters)")]
    pub content: String,
    #[schemars(description = "Tags (max 20, each max 50 characters)")]
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Parameters for notes_update tool; omitted fields are left unchanged
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateNoteParams {
    #[schemars(description = "Note id")]
    pub id: String,
    #[schemars(description = "New title")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "New Markdown content")]
    #[serde(default)]
    pub content: Option<String>,
    #[schemars(description = "Replacement tag list")]
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Notes MCP Service
#[derive(Clone)]
pub struct NotesService {
    notes: Arc<Notebook>,
    tool_router: ToolRouter<Self>,
}

impl NotesService {
    pub fn new(notes: Notebook) -> Self {
        Self {
            notes: Arc::new(notes),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl NotesService {
    #[tool(description = "Search notes with hybrid keyword + semantic matching. Results are ranked by reciprocal rank fusion; `score` is the semantic relevance when available.")]
    async fn notes_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = SearchRequest {
            query: params.0.query,
            tag: params.0.tag,
            limit: params.0.limit,
        };
        let found = self.notes.search(&request).map_err(to_mcp_error)?;
        json_result(&found)
    }

    #[tool(description = "Get the full title, content, tags and timestamps of one note.")]
    async fn notes_get(&self, params: Parameters<NoteIdParams>) -> Result<CallToolResult, McpError> {
        let note = self.notes.get(&params.0.id).map_err(to_mcp_error)?;
        json_result(&note)
    }

    #[tool(description = "List notes, most recently updated first, optionally filtered by tag.")]
    async fn notes_list(
        &self,
        params: Parameters<ListNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        let listed = self
            .notes
            .list(params.0.tag.as_deref(), params.0.limit)
            .map_err(to_mcp_error)?;
        json_result(&serde_json::json!({
            "notes": listed,
            "total": listed.len(),
        }))
    }

    #[tool(description = "Create a note from Markdown content with an optional title and tags.")]
    async fn notes_create(
        &self,
        params: Parameters<CreateNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let note = self
            .notes
            .create(NewNote {
                title: p.title,
                content: p.content,
                tags: p.tags,
            })
            .map_err(to_mcp_error)?;
        json_result(&note)
    }

    #[tool(description = "Update title, content and/or tags of a note. Omitted fields keep their current value.")]
    async fn notes_update(
        &self,
        params: Parameters<UpdateNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let note = self
            .notes
            .update(
                &p.id,
                NoteUpdate {
                    title: p.title,
                    content: p.content,
                    tags: p.tags,
                },
            )
            .map_err(to_mcp_error)?;
        json_result(&note)
    }

    #[tool(description = "Delete a note permanently.")]
    async fn notes_delete(
        &self,
        params: Parameters<NoteIdParams>,
    ) -> Result<CallToolResult, McpError> {
        self.notes.delete(&params.0.id).map_err(to_mcp_error)?;
        json_result(&serde_json::json!({ "deleted": true }))
    }

    #[tool(description = "Tag usage counts, most used first. Counts cover at most 1000 notes and are flagged approximate beyond that.")]
    async fn notes_tags(&self) -> Result<CallToolResult, McpError> {
        let counts = self.notes.tag_counts().map_err(to_mcp_error)?;
        json_result(&counts)
    }

    #[tool(description = "Export all notes (up to 10000) as JSON.")]
    async fn notes_export(&self) -> Result<CallToolResult, McpError> {
        let export = self.notes.export().map_err(to_mcp_error)?;
        json_result(&export)
    }

    #[tool(description = "Database status and note count.")]
    async fn notes_health(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.notes.health())
    }
}

#[tool_handler]
impl ServerHandler for NotesService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Personal notes store. Create, update and list notes; search them with hybrid keyword + semantic matching.".to_string()
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

fn to_mcp_error(err: NoteError) -> McpError {
    let message = err.to_string();
    let data = Some(serde_json::json!({ "code": err.code() }));
    match err {
        NoteError::Validation(_) => McpError::invalid_params(message, data),
        NoteError::NotFound(_) => McpError::resource_not_found(message, data),
        NoteError::Search(_) | NoteError::Store(_) => McpError::internal_error(message, data),
    }
}

/// Run the MCP server
pub async fn run_mcp_server(notes: Notebook) -> Result<()> {
    use tokio::io::{stdin, stdout};

    let service = NotesService::new(notes);
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
