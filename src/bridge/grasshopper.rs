//! Grasshopper bridge tools.
//!
//! Components are addressed either by their instance ID (GUID) or by the
//! nickname they carry on the canvas.

use serde_json::{json, Value};

use crate::bridge::args::{Args, Params};
use crate::bridge::{success, Bridge, BridgeKind, ToolError, ToolResult};
use crate::mcp::server::ToolDefinition;
use crate::plugin::PluginClient;

/// Tools for editing Grasshopper definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrasshopperBridge;

impl Bridge for GrasshopperBridge {
    fn kind(&self) -> BridgeKind {
        BridgeKind::Grasshopper
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    fn dispatch(&self, name: &str, args: &Args<'_>, client: &dyn PluginClient) -> Option<ToolResult> {
        let result = match name {
            // Canvas editing
            "add_component" => add_component(args, client),
            "connect_components" => wire("connect_components", args, client),
            "disconnect_components" => wire("disconnect_components", args, client),
            "delete_component" => component_command("delete_component", args, client),
            "create_definition" => create_definition(args, client),
            // Solutions
            "expire_solution" => expire_solution(args, client),
            "run_solution" => send(client, "run_solution", json!({})),
            "bake_component" => bake_component(args, client),
            // Inspection
            "get_canvas_state" => send(client, "get_canvas_state", json!({})),
            "get_component_info" => component_command("get_component_info", args, client),
            "get_gh_document_info" => send(client, "get_gh_document_info", json!({})),
            // Component catalog
            "get_component_type_info" => get_component_type_info(args, client),
            "list_components" => list_components(args, client),
            "search_components" => search_components(args, client),
            "batch_search_components" => batch_search_components(args, client),
            "get_available_components" => get_available_components(args, client),
            "list_component_categories" => send(client, "list_component_categories", json!({})),
            // Parameters
            "get_parameter_value" => get_parameter_value(args, client),
            "set_parameter_value" => set_parameter_value(args, client),
            _ => return None,
        };
        Some(result)
    }
}

fn send(client: &dyn PluginClient, command: &str, params: Value) -> ToolResult {
    Ok(success(client.send_command(command, params)?))
}

/// Forwards `instance_id` and `nickname`, requiring at least one.
fn component_ref(args: &Args<'_>) -> Result<Params, ToolError> {
    args.require_either("instance_id", "nickname")?;
    Ok(Params::new()
        .with_opt("instance_id", args.optional_str("instance_id")?)
        .with_opt("nickname", args.optional_str("nickname")?))
}

fn add_component(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let component_name = args.required_str("component_name")?;
    let position = match args.get("position") {
        None => vec![0.0, 0.0],
        Some(value) => value
            .as_array()
            .and_then(|items| items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
            .filter(|p| p.len() == 2)
            .ok_or_else(|| {
                ToolError::InvalidArguments("Position must be [x, y] canvas coordinates".to_string())
            })?,
    };

    let params = Params::new()
        .with("component_name", component_name)
        .with("position", position)
        .with_opt("nickname", args.optional_str("nickname")?)
        .with_opt("component_guid", args.optional_str("component_guid")?)
        .build();
    send(client, "add_component", params)
}

fn wire(command: &str, args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    args.require_either("source_instance_id", "source_nickname")?;
    args.require_either("target_instance_id", "target_nickname")?;

    let params = Params::new()
        .with_opt("source_instance_id", args.optional_str("source_instance_id")?)
        .with_opt("source_nickname", args.optional_str("source_nickname")?)
        .with("source_output", args.i64_or("source_output", 0)?)
        .with_opt("target_instance_id", args.optional_str("target_instance_id")?)
        .with_opt("target_nickname", args.optional_str("target_nickname")?)
        .with("target_input", args.i64_or("target_input", 0)?)
        .build();
    send(client, command, params)
}

fn component_command(command: &str, args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    send(client, command, component_ref(args)?.build())
}

fn create_definition(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let components = args.required_array("components")?;
    if components.is_empty() {
        return Err(ToolError::InvalidArguments(
            "At least one component is required".to_string(),
        ));
    }
    let connections = args.optional_array("connections")?.unwrap_or_default();
    let values = args.optional_array("values")?.unwrap_or_default();

    tracing::info!(
        components = components.len(),
        connections = connections.len(),
        values = values.len(),
        "Creating Grasshopper definition"
    );

    let params = Params::new()
        .with("components", components.to_vec())
        .with("connections", connections.to_vec())
        .with("values", values.to_vec())
        .with("clear_canvas", args.bool_or("clear_canvas", false)?)
        .build();
    send(client, "create_definition", params)
}

fn expire_solution(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with_opt("instance_id", args.optional_str("instance_id")?)
        .with_opt("nickname", args.optional_str("nickname")?)
        .build();
    send(client, "expire_solution", params)
}

fn bake_component(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = component_ref(args)?
        .with("output_index", args.i64_or("output_index", 0)?)
        .with_opt("layer_name", args.optional_str("layer_name")?)
        .build();
    send(client, "bake_component", params)
}

fn get_component_type_info(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    args.require_either("name", "guid")?;
    let params = Params::new()
        .with_opt("name", args.optional_str("name")?)
        .with_opt("guid", args.optional_str("guid")?)
        .build();
    send(client, "get_component_type_info", params)
}

fn list_components(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with("limit", positive_limit(args, 100)?)
        .with_opt("category", args.optional_str("category")?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send(client, "list_components", params)
}

fn search_components(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with("limit", positive_limit(args, 50)?)
        .with_opt("query", args.optional_str("query")?)
        .with_opt("category", args.optional_str("category")?)
        .build();
    send(client, "search_components", params)
}

fn batch_search_components(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let queries = args.string_list("queries")?;
    if queries.is_empty() {
        return Err(ToolError::InvalidArguments(
            "At least one query is required".to_string(),
        ));
    }
    send(client, "batch_search_components", json!({ "queries": queries }))
}

fn positive_limit(args: &Args<'_>, default: i64) -> Result<i64, ToolError> {
    let limit = args.i64_or("limit", default)?;
    if limit < 1 {
        return Err(ToolError::InvalidArguments(
            "limit must be at least 1".to_string(),
        ));
    }
    Ok(limit)
}

fn get_available_components(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with("limit", positive_limit(args, 500)?)
        .with("include_description", args.bool_or("include_description", false)?)
        .with_opt("category", args.optional_str("category")?)
        .build();
    send(client, "get_available_components", params)
}

fn get_parameter_value(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = component_ref(args)?
        .with("output_index", args.i64_or("output_index", 0)?)
        .with_opt("output_name", args.optional_str("output_name")?)
        .build();
    send(client, "get_parameter_value", params)
}

fn set_parameter_value(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let value = args.get("value").cloned().ok_or_else(|| {
        ToolError::InvalidArguments("Missing required parameter: value".to_string())
    })?;

    let params = component_ref(args)?
        .with("value", value)
        .with("input_index", args.i64_or("input_index", 0)?)
        .with_opt("input_name", args.optional_str("input_name")?)
        .build();
    send(client, "set_parameter_value", params)
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn component_ref_schema(description: &str, extra: Value) -> Value {
    let mut properties = json!({
        "instance_id": { "type": "string", "description": format!("Instance ID of the {description}") },
        "nickname": { "type": "string", "description": format!("Nickname of the {description} (alternative to instance_id)") }
    });
    if let (Some(base), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        base.extend(extra);
    }
    json!({ "type": "object", "properties": properties })
}

fn with_required(mut schema: Value, required: &[&str]) -> Value {
    if let Some(object) = schema.as_object_mut() {
        object.insert("required".to_string(), json!(required));
    }
    schema
}

fn wire_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "source_instance_id": { "type": "string", "description": "Instance ID of the source component" },
            "source_nickname": { "type": "string", "description": "Nickname of the source component" },
            "source_output": { "type": "integer", "minimum": 0, "description": "Output index on the source (default 0)" },
            "target_instance_id": { "type": "string", "description": "Instance ID of the target component" },
            "target_nickname": { "type": "string", "description": "Nickname of the target component" },
            "target_input": { "type": "integer", "minimum": 0, "description": "Input index on the target (default 0)" }
        }
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

#[allow(clippy::too_many_lines)]
fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // === Canvas editing ===
        tool(
            "add_component",
            "Add a component to the Grasshopper canvas. Give it a nickname so later \
             calls can refer to it.",
            json!({
                "type": "object",
                "properties": {
                    "component_name": { "type": "string", "description": "Component name, e.g. \"Circle\" or \"Number Slider\"" },
                    "position": {
                        "type": "array",
                        "items": { "type": "number" },
                        "description": "[x, y] canvas position (default [0, 0])"
                    },
                    "nickname": { "type": "string", "description": "Nickname for the new component" },
                    "component_guid": { "type": "string", "description": "Component type GUID when the name is ambiguous" }
                },
                "required": ["component_name"]
            }),
        ),
        tool(
            "connect_components",
            "Wire an output of one component to an input of another.",
            wire_schema(),
        ),
        tool(
            "disconnect_components",
            "Remove the wire between an output and an input.",
            wire_schema(),
        ),
        tool(
            "delete_component",
            "Delete a component from the canvas.",
            component_ref_schema("component", json!({})),
        ),
        tool(
            "create_definition",
            "Build a whole definition in one call: components, the wires between them \
             and initial values. Components refer to each other by nickname.",
            json!({
                "type": "object",
                "properties": {
                    "components": {
                        "type": "array",
                        "items": { "type": "object" },
                        "description": "Components as {\"name\", \"nickname\", \"position\"}"
                    },
                    "connections": {
                        "type": "array",
                        "items": { "type": "object" },
                        "description": "Wires as {\"source\", \"source_output\", \"target\", \"target_input\"}"
                    },
                    "values": {
                        "type": "array",
                        "items": { "type": "object" },
                        "description": "Initial values as {\"nickname\", \"value\"}"
                    },
                    "clear_canvas": { "type": "boolean", "description": "Clear the canvas first (default false)" }
                },
                "required": ["components"]
            }),
        ),
        // === Solutions ===
        tool(
            "expire_solution",
            "Expire a component, or the whole document when none is given, so it recomputes.",
            component_ref_schema("component to expire", json!({})),
        ),
        tool(
            "run_solution",
            "Run a new solution of the Grasshopper document.",
            empty_schema(),
        ),
        tool(
            "bake_component",
            "Bake a component output into the Rhino document.",
            component_ref_schema(
                "component",
                json!({
                    "output_index": { "type": "integer", "minimum": 0, "description": "Output to bake (default 0)" },
                    "layer_name": { "type": "string", "description": "Target Rhino layer" }
                }),
            ),
        ),
        // === Inspection ===
        tool(
            "get_canvas_state",
            "List every component on the canvas with its wires.",
            empty_schema(),
        ),
        tool(
            "get_component_info",
            "Get the inputs, outputs and messages of one component.",
            component_ref_schema("component", json!({})),
        ),
        tool(
            "get_gh_document_info",
            "Get information about the active Grasshopper document.",
            empty_schema(),
        ),
        // === Component catalog ===
        tool(
            "get_component_type_info",
            "Describe a component type: category, inputs and outputs.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Component type name" },
                    "guid": { "type": "string", "description": "Component type GUID (alternative to name)" }
                }
            }),
        ),
        tool(
            "list_components",
            "List installed component types, optionally filtered by category or name.",
            json!({
                "type": "object",
                "properties": {
                    "category": { "type": "string", "description": "Category filter, e.g. \"Curve\"" },
                    "name": { "type": "string", "description": "Name filter" },
                    "limit": { "type": "integer", "minimum": 1, "description": "Maximum results (default 100)" }
                }
            }),
        ),
        tool(
            "search_components",
            "Search installed component types by keyword.",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search text" },
                    "category": { "type": "string", "description": "Category filter" },
                    "limit": { "type": "integer", "minimum": 1, "description": "Maximum results (default 50)" }
                }
            }),
        ),
        tool(
            "batch_search_components",
            "Run several component searches in one call.",
            json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Search texts"
                    }
                },
                "required": ["queries"]
            }),
        ),
        tool(
            "get_available_components",
            "List the component types installed in the running Grasshopper, including \
             third-party plugins.",
            json!({
                "type": "object",
                "properties": {
                    "category": { "type": "string", "description": "Category filter, e.g. \"Params\" or \"Curve\"" },
                    "include_description": { "type": "boolean", "description": "Include component descriptions (default false)" },
                    "limit": { "type": "integer", "minimum": 1, "description": "Maximum results (default 500)" }
                }
            }),
        ),
        tool(
            "list_component_categories",
            "List component categories with their subcategories and component counts.",
            empty_schema(),
        ),
        // === Parameters ===
        tool(
            "get_parameter_value",
            "Read the data on a component output or parameter.",
            component_ref_schema(
                "component",
                json!({
                    "output_index": { "type": "integer", "minimum": 0, "description": "Output index (default 0)" },
                    "output_name": { "type": "string", "description": "Output name (overrides output_index)" }
                }),
            ),
        ),
        tool(
            "set_parameter_value",
            "Set a slider, panel, toggle or parameter input value.",
            with_required(
                component_ref_schema(
                    "component",
                    json!({
                        "value": { "description": "Value to set: number, string, boolean or list" },
                        "input_index": { "type": "integer", "minimum": 0, "description": "Input index (default 0)" },
                        "input_name": { "type": "string", "description": "Input name (overrides input_index)" }
                    }),
                ),
                &["value"],
            ),
        ),
    ]
}
