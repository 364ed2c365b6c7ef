//! MCP handler: tool dispatch plus the `tdrive:///{id}` resource template.
//!
//! Argument or backend failures inside a tool become error *results* the
//! model can read. Only protocol-level mistakes (unknown tool, unreadable
//! resource) surface as JSON-RPC errors.

use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    AnnotateAble, CallToolRequestParams, CallToolResult, Content, ListResourceTemplatesResult,
    ListToolsResult, PaginatedRequestParams, RawAudioContent, RawContent,
    ReadResourceRequestParams, ReadResourceResult, ResourceTemplate, ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use tdrive_core::params::ArgsExt;
use tdrive_core::{
    Arguments, ContentCategory, ContentResolver, ContentResult, Error, FileBackend, FileList,
    NewFolder, QueryParams, uri,
};

use crate::tools::{
    self, CREATE_FOLDER_TOOL_NAME, LIST_FILES_TOOL_NAME, READ_FILE_TOOL_NAME,
    SEARCH_FILES_TOOL_NAME,
};

pub const SERVER_NAME: &str = "TelDrive MCP";

const INSTRUCTIONS: &str = "Browse and read files stored in TelDrive. Use search_files or \
     list_files to find file IDs, then read_file or the tdrive:///{id} resource to fetch content.";

const TEMPLATE_NAME: &str = "File Contents";
const TEMPLATE_DESCRIPTION: &str = "Returns file content";
const TEMPLATE_MIME_TYPE: &str = "text/plain";

const FOLDER_CREATED: &str = "folder created";

#[derive(Clone)]
pub struct TdriveServer {
    backend: Arc<dyn FileBackend>,
    resolver: ContentResolver,
}

impl TdriveServer {
    pub fn new(backend: Arc<dyn FileBackend>, max_content_bytes: usize) -> Self {
        let resolver = ContentResolver::new(Arc::clone(&backend), max_content_bytes);
        Self { backend, resolver }
    }

    /// Run one tool by name.
    pub async fn call(&self, name: &str, args: &Arguments) -> Result<CallToolResult, McpError> {
        log::debug!("tool call: {name}");
        let outcome = match name {
            SEARCH_FILES_TOOL_NAME => self.search_files(args).await,
            LIST_FILES_TOOL_NAME => self.list_files(args).await,
            CREATE_FOLDER_TOOL_NAME => self.create_folder(args).await,
            READ_FILE_TOOL_NAME => self.read_file(args).await,
            other => {
                return Err(McpError::invalid_params(
                    format!("unknown tool: {other}"),
                    None,
                ));
            }
        };

        Ok(outcome.unwrap_or_else(|e| {
            log::warn!("{name} failed: {e}");
            CallToolResult::error(vec![Content::text(e.to_string())])
        }))
    }

    /// Read the file behind a `tdrive:///{id}` address.
    pub async fn read(&self, resource_uri: &str) -> Result<ReadResourceResult, McpError> {
        let file_id = uri::extract_id(resource_uri);
        if file_id.is_empty() {
            return Err(resource_error(Error::MalformedUri(resource_uri.to_string())));
        }

        let file = self.resolver.resolve(&file_id).await.map_err(|e| {
            log::warn!("reading {resource_uri} failed: {e}");
            resource_error(e)
        })?;
        resource_contents(file)
    }

    async fn search_files(&self, args: &Arguments) -> tdrive_core::Result<CallToolResult> {
        let params = QueryParams::for_search(args)?;
        self.list(&params).await
    }

    async fn list_files(&self, args: &Arguments) -> tdrive_core::Result<CallToolResult> {
        let params = QueryParams::for_listing(args)?;
        self.list(&params).await
    }

    async fn list(&self, params: &QueryParams) -> tdrive_core::Result<CallToolResult> {
        let raw = self
            .backend
            .list_files(params)
            .await
            .map_err(Error::backend("failed to list files"))?;
        let list = FileList::project(raw)?;
        log::debug!(
            "listed {} of {} files ({} pages)",
            list.files.len(),
            list.meta.count,
            list.meta.total_pages
        );
        Ok(CallToolResult::success(vec![Content::text(list.to_json()?)]))
    }

    async fn create_folder(&self, args: &Arguments) -> tdrive_core::Result<CallToolResult> {
        let folder = NewFolder::from_args(args)?;
        self.backend
            .create_folder(&folder)
            .await
            .map_err(Error::backend("failed to create folder"))?;
        log::info!("created folder {:?} in {:?}", folder.name, folder.path);
        Ok(CallToolResult::success(vec![Content::text(FOLDER_CREATED)]))
    }

    async fn read_file(&self, args: &Arguments) -> tdrive_core::Result<CallToolResult> {
        let file_id = args.required_str("file_id")?;
        let file = self.resolver.resolve(file_id).await?;
        Ok(CallToolResult::success(vec![tool_content(file)]))
    }
}

fn tool_content(file: ContentResult) -> Content {
    match file.category {
        ContentCategory::Text => Content::text(file.content),
        ContentCategory::Image => Content::image(file.content, file.mime_type),
        ContentCategory::Audio => RawContent::Audio(RawAudioContent {
            data: file.content,
            mime_type: file.mime_type,
        })
        .no_annotation(),
    }
}

fn resource_contents(file: ContentResult) -> Result<ReadResourceResult, McpError> {
    let contents = match file.category {
        ContentCategory::Text => json!({
            "uri": file.uri,
            "mimeType": file.mime_type,
            "text": file.content,
        }),
        ContentCategory::Image | ContentCategory::Audio => json!({
            "uri": file.uri,
            "mimeType": file.mime_type,
            "blob": file.content,
        }),
    };
    from_wire(json!({ "contents": [contents] }))
}

fn file_template() -> Result<ResourceTemplate, McpError> {
    from_wire(json!({
        "uriTemplate": uri::URI_TEMPLATE,
        "name": TEMPLATE_NAME,
        "description": TEMPLATE_DESCRIPTION,
        "mimeType": TEMPLATE_MIME_TYPE,
    }))
}

/// Build an rmcp model value from its JSON wire form.
fn from_wire<T: DeserializeOwned>(value: Value) -> Result<T, McpError> {
    serde_json::from_value(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

fn resource_error(err: Error) -> McpError {
    let message = err.to_string();
    match &err {
        Error::MalformedUri(_) | Error::MissingArgument(_) => {
            McpError::invalid_params(message, None)
        }
        Error::Backend { source, .. } if source.status() == Some(404) => {
            McpError::resource_not_found(message, None)
        }
        _ => McpError::internal_error(message, None),
    }
}

fn cancelled() -> McpError {
    McpError::internal_error("request cancelled", None)
}

impl ServerHandler for TdriveServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_resources()
            .build();
        info.server_info.name = SERVER_NAME.to_string();
        info.server_info.version = env!("CARGO_PKG_VERSION").to_string();
        info.instructions = Some(INSTRUCTIONS.to_string());
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(tools::all_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = request.arguments.unwrap_or_default();
        tokio::select! {
            result = self.call(&request.name, &args) => result,
            _ = context.ct.cancelled() => {
                log::debug!("{} cancelled by client", request.name);
                Err(cancelled())
            }
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(vec![
            file_template()?,
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        tokio::select! {
            result = self.read(&request.uri) => result,
            _ = context.ct.cancelled() => {
                log::debug!("read of {} cancelled by client", request.uri);
                Err(cancelled())
            }
        }
    }
}
