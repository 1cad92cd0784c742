//! MCP Tool Definitions

use super::protocol::{PropertySchema, Tool, ToolInputSchema};
use crate::error::{ServerError, ServerResult};
use serde_json::Value;
use std::collections::BTreeMap;

pub const FIND_SOLUTIONS_TOOL: &str = "find_solutions";

/// Get all available tools
pub fn get_all_tools(default_limit: usize) -> Vec<Tool> {
    vec![find_solutions_tool(default_limit)]
}

fn string_prop(description: &str) -> PropertySchema {
    PropertySchema {
        property_type: "string".to_string(),
        description: description.to_string(),
        default: None,
        minimum: None,
    }
}

fn integer_prop(description: &str, default: usize, minimum: f64) -> PropertySchema {
    PropertySchema {
        property_type: "integer".to_string(),
        description: description.to_string(),
        default: Some(serde_json::json!(default)),
        minimum: Some(minimum),
    }
}

fn find_solutions_tool(default_limit: usize) -> Tool {
    let mut properties = BTreeMap::new();
    properties.insert(
        "pain_point_description".to_string(),
        string_prop("Free-text description of the customer's problem"),
    );
    properties.insert(
        "k".to_string(),
        integer_prop("Maximum number of suggested features", default_limit, 1.0),
    );

    Tool {
        name: FIND_SOLUTIONS_TOOL.to_string(),
        description: "Rank product features by how well they address a pain point. \
                      Combines keyword-cue overlap with semantic similarity and returns \
                      the top matches with their scores."
            .to_string(),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties,
            required: vec!["pain_point_description".to_string()],
        },
    }
}

/// Parsed `find_solutions` arguments
#[derive(Debug, Clone, PartialEq)]
pub struct FindSolutionsArgs {
    pub pain_point: String,
    pub k: usize,
}

impl FindSolutionsArgs {
    /// Accepts `pain_point_description` (or `query`) and an optional positive `k`
    pub fn parse(args: &Value, default_limit: usize) -> ServerResult<Self> {
        let pain_point = args
            .get("pain_point_description")
            .or_else(|| args.get("query"))
            .and_then(Value::as_str)
            .ok_or_else(|| ServerError::invalid_params("Missing 'pain_point_description' parameter"))?
            .to_string();

        let k = match args.get("k") {
            None | Some(Value::Null) => default_limit,
            Some(value) => match value.as_u64() {
                Some(k) if k > 0 => usize::try_from(k)
                    .map_err(|_| ServerError::invalid_params("'k' is too large"))?,
                _ => return Err(ServerError::invalid_params("'k' must be a positive integer")),
            },
        };

        Ok(Self { pain_point, k })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_schema() {
        let tools = get_all_tools(5);
        assert_eq!(tools.len(), 1);
        let schema = serde_json::to_value(&tools[0]).unwrap();
        assert_eq!(schema["name"], "find_solutions");
        assert_eq!(schema["inputSchema"]["required"][0], "pain_point_description");
        assert_eq!(schema["inputSchema"]["properties"]["k"]["default"], 5);
    }

    #[test]
    fn test_parse_with_default_k() {
        let args = json!({"pain_point_description": "too many tickets"});
        let parsed = FindSolutionsArgs::parse(&args, 5).unwrap();
        assert_eq!(parsed.pain_point, "too many tickets");
        assert_eq!(parsed.k, 5);
    }

    #[test]
    fn test_parse_query_alias_and_k() {
        let args = json!({"query": "survey themes", "k": 3});
        let parsed = FindSolutionsArgs::parse(&args, 5).unwrap();
        assert_eq!(parsed.pain_point, "survey themes");
        assert_eq!(parsed.k, 3);
    }

    #[test]
    fn test_parse_missing_pain_point() {
        let err = FindSolutionsArgs::parse(&json!({"k": 3}), 5).unwrap_err();
        assert!(matches!(err, ServerError::InvalidParams(_)));
    }

    #[test]
    fn test_parse_rejects_non_positive_k() {
        for k in [json!(0), json!(-2), json!("three"), json!(1.5)] {
            let args = json!({"pain_point_description": "x", "k": k});
            assert!(FindSolutionsArgs::parse(&args, 5).is_err());
        }
    }
}
