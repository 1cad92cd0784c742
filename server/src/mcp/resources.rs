//! MCP Resource Definitions

use super::protocol::{Resource, ResourceContent, ResourceReadResult};
use crate::error::{ServerError, ServerResult};
use crate::service::SolutionService;

pub const CATALOG_URI: &str = "painpoint://catalog";
pub const SETTINGS_URI: &str = "painpoint://settings";

const JSON_MIME: &str = "application/json";

/// Get all available resources
pub fn get_all_resources() -> Vec<Resource> {
    vec![
        Resource {
            uri: CATALOG_URI.to_string(),
            name: "Feature Catalog".to_string(),
            description: "Every feature in the knowledge base with its keywords and known pain points"
                .to_string(),
            mime_type: JSON_MIME.to_string(),
        },
        Resource {
            uri: SETTINGS_URI.to_string(),
            name: "Matcher Settings".to_string(),
            description: "Keyword weight, default result count and embedding model in use"
                .to_string(),
            mime_type: JSON_MIME.to_string(),
        },
    ]
}

/// Read a resource by URI
pub fn read_resource(uri: &str, service: &SolutionService) -> ServerResult<ResourceReadResult> {
    let body = match uri {
        CATALOG_URI => service.catalog_overview(),
        SETTINGS_URI => service.settings(),
        _ => return Err(ServerError::ResourceNotFound(uri.to_string())),
    };

    Ok(ResourceReadResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: JSON_MIME.to_string(),
            text: serde_json::to_string_pretty(&body)?,
        }],
    })
}
