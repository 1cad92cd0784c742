//! MCP Server Implementation
//!
//! Routes MCP protocol requests to the matching service.

use super::protocol::*;
use super::resources::{get_all_resources, read_resource};
use super::tools::{get_all_tools, FindSolutionsArgs, FIND_SOLUTIONS_TOOL};
use super::transport::{Incoming, LineTransport};
use crate::error::{ServerError, ServerResult};
use crate::service::SolutionService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "painpoint";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server - handles protocol messages
pub struct McpServer {
    service: Arc<SolutionService>,
    initialized: bool,
}

impl McpServer {
    pub fn new(service: Arc<SolutionService>) -> Self {
        Self {
            service,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Serve over stdio until the client disconnects
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.serve(&mut LineTransport::stdio()).await
    }

    /// Run the event loop over an arbitrary transport
    pub async fn serve<R, W>(&mut self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("MCP server starting...");

        while let Some(incoming) = transport.read_request().await? {
            let response = match incoming {
                Incoming::Request(request) => self.handle_request(request).await,
                Incoming::Malformed(e) => Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                )),
            };

            if let Some(response) = response {
                transport.write_response(&response).await?;
            }
        }

        tracing::info!("Client disconnected");
        Ok(())
    }

    /// Handle a JSON-RPC request. Notifications get no response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!("Handling request: {}", request.method);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            ));
        }

        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" | "initialized" => self.initialized = true,
                "notifications/cancelled" => {}
                other => tracing::debug!("Ignoring notification: {}", other),
            }
            return None;
        }

        let id = request.id;
        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_value(ToolsListResult {
                tools: get_all_tools(self.service.default_limit()),
            }),
            "tools/call" => self.handle_tools_call(request.params).await,
            "resources/list" => to_value(ResourcesListResult {
                resources: get_all_resources(),
            }),
            "resources/read" => self.handle_resources_read(request.params),
            method => {
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::method_not_found(method),
                ))
            }
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, e.into()),
        })
    }

    fn handle_initialize(&mut self, params: Option<Value>) -> ServerResult<Value> {
        let params: InitializeParams = params
            .map(|p| serde_json::from_value(p).unwrap_or_default())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(
                "Client: {} {} (protocol {})",
                client.name,
                client.version.as_deref().unwrap_or("?"),
                params.protocol_version.as_deref().unwrap_or("?")
            );
        }

        self.initialized = true;

        to_value(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                logging: LoggingCapability {},
                resources: ListChangedCapability::default(),
                tools: ListChangedCapability::default(),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        })
    }

    /// Tool failures are reported inside the tool result, not as protocol errors
    async fn handle_tools_call(&self, params: Option<Value>) -> ServerResult<Value> {
        let params: ToolCallParams = parse_params(params)?;

        let tool_result = match self.execute_tool(&params.name, params.arguments).await {
            Ok(result) => ToolCallResult::text(
                serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string()),
            ),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", params.name, e);
                ToolCallResult::error(format!("Error: {}", e))
            }
        };

        to_value(tool_result)
    }

    fn handle_resources_read(&self, params: Option<Value>) -> ServerResult<Value> {
        let params: ResourceReadParams = parse_params(params)?;
        to_value(read_resource(&params.uri, &self.service)?)
    }

    /// Execute a tool by name
    async fn execute_tool(&self, name: &str, args: Option<Value>) -> ServerResult<Value> {
        let args = args.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            FIND_SOLUTIONS_TOOL => {
                let args = FindSolutionsArgs::parse(&args, self.service.default_limit())?;
                let solutions = self.service.find_solutions(args.pain_point, args.k).await?;
                to_value(solutions)
            }
            _ => Err(ServerError::UnknownTool(name.to_string())),
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> ServerResult<T> {
    let params = params.ok_or_else(|| ServerError::invalid_params("Missing params"))?;
    serde_json::from_value(params).map_err(|e| ServerError::invalid_params(e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> ServerResult<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::sample_service;
    use serde_json::json;

    fn request(id: Option<i64>, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: id.map(|i| json!(i)),
            method: method.to_string(),
            params,
        }
    }

    fn server(dir: &std::path::Path) -> McpServer {
        McpServer::new(Arc::new(sample_service(dir)))
    }

    #[tokio::test]
    async fn test_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let params = json!({"protocolVersion": "2024-11-05", "clientInfo": {"name": "test"}});

        let response = server
            .handle_request(request(Some(1), "initialize", Some(params)))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "painpoint");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let response = server
            .handle_request(request(None, "notifications/initialized", None))
            .await;
        assert!(response.is_none());
        assert!(server.is_initialized());
    }

    #[tokio::test]
    async fn test_null_id_request_gets_response() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();

        let response = server.handle_request(request).await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let response = server
            .handle_request(request(Some(2), "tools/list", None))
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["tools"][0]["name"], "find_solutions");
    }

    #[tokio::test]
    async fn test_find_solutions_tool() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let params = json!({
            "name": "find_solutions",
            "arguments": {
                "pain_point_description": "Our support agents are overwhelmed by the high volume of repetitive questions.",
                "k": 2
            }
        });

        let response = server
            .handle_request(request(Some(3), "tools/call", Some(params)))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert!(result.get("isError").is_none());

        let text = result["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        let solutions = payload["suggested_solutions"].as_array().unwrap();
        assert!(!solutions.is_empty() && solutions.len() <= 2);
        assert_eq!(solutions[0]["feature_name"], "AI Agent");
        assert!(solutions[0].get("how_it_helps").is_some());
    }

    #[tokio::test]
    async fn test_tool_error_is_reported_in_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let params = json!({"name": "find_solutions", "arguments": {"k": 2}});

        let response = server
            .handle_request(request(Some(4), "tools/call", Some(params)))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("pain_point_description"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let params = json!({"name": "delete_everything"});
        let response = server
            .handle_request(request(Some(5), "tools/call", Some(params)))
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["isError"], true);
    }

    #[tokio::test]
    async fn test_tools_call_without_params() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let response = server
            .handle_request(request(Some(6), "tools/call", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_resources_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let params = json!({"uri": "painpoint://settings"});
        let response = server
            .handle_request(request(Some(7), "resources/read", Some(params)))
            .await
            .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["contents"][0]["mimeType"], "application/json");

        let missing = server
            .handle_request(request(
                Some(8),
                "resources/read",
                Some(json!({"uri": "painpoint://missing"})),
            ))
            .await
            .unwrap();
        assert_eq!(missing.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let response = server
            .handle_request(request(Some(9), "prompts/list", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let mut req = request(Some(10), "ping", None);
        req.jsonrpc = "1.0".to_string();
        let response = server.handle_request(req).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_serve_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"initialize\",\"params\":{}}\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "garbage\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        );

        let mut transport = LineTransport::new(input.as_bytes(), Vec::new());
        server.serve(&mut transport).await.unwrap();
        let output = transport.into_writer();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["error"]["code"], -32700);
        assert_eq!(lines[2]["id"], 2);
    }

    #[tokio::test]
    async fn test_serve_stops_at_eof() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = server(dir.path());
        let input: &[u8] = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n";
        let mut transport = LineTransport::new(input, Vec::new());
        server.serve(&mut transport).await.unwrap();
        assert_eq!(transport.into_writer().iter().filter(|b| **b == b'\n').count(), 1);
    }
}
