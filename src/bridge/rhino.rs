//! Rhino bridge tools.
//!
//! Every tool maps to one plugin command of the same name. Arguments are
//! validated here so malformed calls never reach the plugin.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde_json::{json, Map, Value};

use crate::bridge::args::{format_result_ids, Args, Params};
use crate::bridge::{success, Bridge, BridgeKind, ToolError, ToolResult};
use crate::mcp::server::{ToolCallResult, ToolDefinition};
use crate::plugin::PluginClient;

/// Largest page `get_objects` will request.
pub const MAX_OBJECTS_PER_PAGE: i64 = 200;

/// Smallest viewport capture edge in pixels.
pub const MIN_CAPTURE_SIZE: i64 = 100;

/// Largest viewport capture edge in pixels.
pub const MAX_CAPTURE_SIZE: i64 = 4096;

/// Tools for Rhino 3D modelling.
#[derive(Debug, Clone, Copy, Default)]
pub struct RhinoBridge;

impl Bridge for RhinoBridge {
    fn kind(&self) -> BridgeKind {
        BridgeKind::Rhino
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    fn dispatch(&self, name: &str, args: &Args<'_>, client: &dyn PluginClient) -> Option<ToolResult> {
        let result = match name {
            // Document queries
            "get_document_summary" => get_document_summary(client),
            "get_objects" => get_objects(args, client),
            "get_object_info" => get_object_info(args, client),
            "get_selected_objects_info" => get_selected_objects_info(args, client),
            // Object editing
            "create_object" => create_object(args, client),
            "create_objects" => create_objects(args, client),
            "modify_object" => modify_object(args, client),
            "modify_objects" => modify_objects(args, client),
            "delete_object" => delete_object(args, client),
            "select_objects" => select_objects(args, client),
            // Layers
            "create_layer" => create_layer(args, client),
            "delete_layer" => delete_layer(args, client),
            "get_or_set_current_layer" => get_or_set_current_layer(args, client),
            // History
            "undo" => history("undo", args, client),
            "redo" => history("redo", args, client),
            // Solids and surfaces
            "boolean_union" => boolean_union(args, client),
            "boolean_difference" => boolean_difference(args, client),
            "boolean_intersection" => boolean_intersection(args, client),
            "loft" => loft(args, client),
            "extrude_curve" => extrude_curve(args, client),
            "sweep1" => sweep1(args, client),
            "offset_curve" => offset_curve(args, client),
            "pipe" => pipe(args, client),
            // Viewport and scripting
            "capture_viewport" => capture_viewport(args, client),
            "execute_rhinoscript_python_code" => execute_python(args, client),
            "execute_rhinocommon_csharp_code" => execute_csharp(args, client),
            _ => return None,
        };
        Some(result)
    }
}

fn invalid(message: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments(message.into())
}

fn send(client: &dyn PluginClient, command: &str, params: Value) -> ToolResult {
    Ok(success(client.send_command(command, params)?))
}

/// Sends a geometry command and adds a summary message when the plugin
/// returned `result_ids` without one.
fn send_geometry(client: &dyn PluginClient, command: &str, params: Value, object_type: &str) -> ToolResult {
    let mut result = client.send_command(command, params)?;
    if let Value::Object(map) = &mut result {
        if !map.contains_key("message") {
            if let Some(ids) = map.get("result_ids").and_then(Value::as_array) {
                let ids: Vec<&str> = ids.iter().filter_map(Value::as_str).collect();
                let message = format_result_ids(&ids, object_type);
                map.insert("message".to_string(), Value::String(message));
            }
        }
    }
    Ok(success(result))
}

fn point_value(point: [f64; 3]) -> Value {
    json!(point)
}

fn get_document_summary(client: &dyn PluginClient) -> ToolResult {
    send(client, "get_document_summary", json!({}))
}

fn get_objects(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let offset = args.i64_or("offset", 0)?.max(0);
    let limit = args.i64_or("limit", 50)?.clamp(1, MAX_OBJECTS_PER_PAGE);

    let bbox = args
        .optional_array("bbox_filter")?
        .map(|corners| {
            let points = corners
                .iter()
                .map(crate::bridge::parse_point)
                .collect::<Option<Vec<_>>>()
                .filter(|p| p.len() == 2)
                .ok_or_else(|| {
                    invalid("bbox_filter must be [[min_x, min_y, min_z], [max_x, max_y, max_z]]")
                })?;
            Ok::<_, ToolError>(json!(points))
        })
        .transpose()?;

    let params = Params::new()
        .with("offset", offset)
        .with("limit", limit)
        .with("include_geometry", args.bool_or("include_geometry", true)?)
        .with_opt("layer_filter", args.optional_str("layer_filter")?)
        .with_opt(
            "type_filter",
            args.optional_str("type_filter")?.map(str::to_uppercase),
        )
        .with_opt("bbox_filter", bbox)
        .build();

    send(client, "get_objects", params)
}

fn get_object_info(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    args.require_either("id", "name")?;
    let params = Params::new()
        .with_opt("id", args.optional_str("id")?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send(client, "get_object_info", params)
}

fn get_selected_objects_info(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with("include_attributes", args.bool_or("include_attributes", false)?)
        .build();
    send(client, "get_selected_objects_info", params)
}

/// Shared by `create_object` and each entry of `create_objects`.
fn object_spec(args: &Args<'_>) -> Result<Params, ToolError> {
    let geometry = args.optional_object("params")?.cloned().unwrap_or_default();

    Ok(Params::new()
        .with("type", args.required_str("type")?.to_uppercase())
        .with_opt("name", args.optional_str("name")?)
        .with_opt("color", args.color("color")?.map(|c| c.to_array()))
        .with("params", Value::Object(geometry))
        .with_opt("translation", args.point("translation")?.map(point_value))
        .with_opt("rotation", args.point("rotation")?.map(point_value))
        .with_opt("scale", args.point("scale")?.map(point_value)))
}

fn create_object(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    send(client, "create_object", object_spec(args)?.build())
}

fn create_objects(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let objects = args.required_array("objects")?;
    if objects.is_empty() {
        return Err(invalid("At least one object is required"));
    }

    // The plugin receives the objects keyed by name.
    let mut keyed = Map::new();
    for (index, object) in objects.iter().enumerate() {
        if !object.is_object() {
            return Err(invalid(format!("objects[{index}] must be a JSON object")));
        }
        let entry = Args::new(object)?;
        let name = entry
            .optional_str("name")?
            .ok_or_else(|| invalid(format!("objects[{index}] needs a name")))?;
        if keyed.contains_key(name) {
            return Err(invalid(format!("Duplicate object name: {name}")));
        }
        keyed.insert(name.to_string(), object_spec(&entry)?.build());
    }

    send(client, "create_objects", Value::Object(keyed))
}

fn modify_object(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    args.require_either("id", "name")?;
    let params = Params::new()
        .with_opt("id", args.optional_str("id")?)
        .with_opt("name", args.optional_str("name")?)
        .with_opt("new_name", args.optional_str("new_name")?)
        .with_opt("new_color", args.color("new_color")?.map(|c| c.to_array()))
        .with_opt("translation", args.point("translation")?.map(point_value))
        .with_opt("rotation", args.point("rotation")?.map(point_value))
        .with_opt("scale", args.point("scale")?.map(point_value))
        .forward(args, &["visible"])
        .build();
    send(client, "modify_object", params)
}

fn modify_objects(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let objects = args.required_array("objects")?;
    let mut params = Params::new().with("objects", objects.to_vec());
    if args.bool_or("all", false)? {
        params = params.with("all", true);
    }
    send(client, "modify_objects", params.build())
}

fn delete_object(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let all = args.bool_or("all", false)?;
    if !all {
        args.require_either("id", "name")?;
    }
    let mut params = Params::new()
        .with_opt("id", args.optional_str("id")?)
        .with_opt("name", args.optional_str("name")?);
    if all {
        params = params.with("all", true);
    }
    send(client, "delete_object", params.build())
}

fn select_objects(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let filters = args.optional_object("filters")?.cloned().unwrap_or_default();
    let filters_type = args
        .optional_str("filters_type")?
        .unwrap_or("and")
        .to_lowercase();
    if filters_type != "and" && filters_type != "or" {
        return Err(invalid("filters_type must be \"and\" or \"or\""));
    }

    let params = Params::new()
        .with("filters", Value::Object(filters))
        .with("filters_type", filters_type)
        .build();
    send(client, "select_objects", params)
}

fn create_layer(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with_opt("name", args.optional_str("name")?)
        .with_opt("color", args.color("color")?.map(|c| c.to_array()))
        .with_opt("parent", args.optional_str("parent")?)
        .build();
    send(client, "create_layer", params)
}

fn delete_layer(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    args.require_either("guid", "name")?;
    let params = Params::new()
        .with_opt("guid", args.optional_str("guid")?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send(client, "delete_layer", params)
}

fn get_or_set_current_layer(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with_opt("guid", args.optional_str("guid")?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send(client, "get_or_set_current_layer", params)
}

fn history(command: &str, args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let steps = args.i64_or("steps", 1)?;
    if steps < 1 {
        return Err(invalid("steps must be at least 1"));
    }
    send(client, command, json!({ "steps": steps }))
}

fn boolean_union(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let object_ids = args.string_list("object_ids")?;
    if object_ids.len() < 2 {
        return Err(invalid("Boolean union requires at least 2 objects"));
    }
    let params = Params::new()
        .with("object_ids", object_ids)
        .with("delete_sources", args.bool_or("delete_sources", true)?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send_geometry(client, "boolean_union", params, "solid")
}

fn boolean_difference(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let base_id = args.required_str("base_id")?;
    let subtract_ids = args.string_list("subtract_ids")?;
    if subtract_ids.is_empty() {
        return Err(invalid("Boolean difference requires at least 1 object to subtract"));
    }
    let params = Params::new()
        .with("base_id", base_id)
        .with("subtract_ids", subtract_ids)
        .with("delete_sources", args.bool_or("delete_sources", true)?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send_geometry(client, "boolean_difference", params, "solid")
}

fn boolean_intersection(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let object_ids = args.string_list("object_ids")?;
    if object_ids.len() < 2 {
        return Err(invalid("Boolean intersection requires at least 2 objects"));
    }
    let params = Params::new()
        .with("object_ids", object_ids)
        .with("delete_sources", args.bool_or("delete_sources", true)?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send_geometry(client, "boolean_intersection", params, "solid")
}

fn loft(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let curve_ids = args.string_list("curve_ids")?;
    if curve_ids.len() < 2 {
        return Err(invalid("Loft requires at least 2 curves"));
    }
    let params = Params::new()
        .with("curve_ids", curve_ids)
        .with("closed", args.bool_or("closed", false)?)
        .with("loft_type", args.i64_or("loft_type", 0)?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send_geometry(client, "loft", params, "surface")
}

fn extrude_curve(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let curve_id = args.required_str("curve_id")?;
    let direction = args
        .required_array("direction")?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<_>>>()
        .filter(|d| d.len() == 3)
        .ok_or_else(|| invalid("Direction must be [x, y, z] vector"))?;

    let params = Params::new()
        .with("curve_id", curve_id)
        .with("direction", direction)
        .with("cap", args.bool_or("cap", true)?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send_geometry(client, "extrude_curve", params, "extrusion")
}

fn sweep1(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let rail_id = args.required_str("rail_id")?;
    let profile_ids = args.string_list("profile_ids")?;
    if profile_ids.is_empty() {
        return Err(invalid("Sweep requires at least 1 profile curve"));
    }
    let params = Params::new()
        .with("rail_id", rail_id)
        .with("profile_ids", profile_ids)
        .with("closed", args.bool_or("closed", false)?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send_geometry(client, "sweep1", params, "surface")
}

fn offset_curve(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let params = Params::new()
        .with("curve_id", args.required_str("curve_id")?)
        .with("distance", args.required_f64("distance")?)
        .with("corner_style", args.i64_or("corner_style", 1)?)
        .with_opt("name", args.optional_str("name")?)
        .forward(args, &["plane"])
        .build();
    send_geometry(client, "offset_curve", params, "curve")
}

fn pipe(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let curve_id = args.required_str("curve_id")?;
    let radius = args.required_f64("radius")?;
    if radius <= 0.0 {
        return Err(invalid("Radius must be positive"));
    }
    let params = Params::new()
        .with("curve_id", curve_id)
        .with("radius", radius)
        .with("cap", args.bool_or("cap", true)?)
        .with("fit_rail", args.bool_or("fit_rail", false)?)
        .with_opt("name", args.optional_str("name")?)
        .build();
    send_geometry(client, "pipe", params, "pipe")
}

fn capture_viewport(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let viewport = args.optional_str("viewport")?.unwrap_or("active");
    let width = args.i64_or("width", 800)?.clamp(MIN_CAPTURE_SIZE, MAX_CAPTURE_SIZE);
    let height = args.i64_or("height", 600)?.clamp(MIN_CAPTURE_SIZE, MAX_CAPTURE_SIZE);

    let params = Params::new()
        .with("viewport", viewport)
        .with("width", width)
        .with("height", height)
        .with("show_grid", args.bool_or("show_grid", true)?)
        .with("show_axes", args.bool_or("show_axes", true)?)
        .with("show_cplane_axes", args.bool_or("show_cplane_axes", false)?)
        .with("zoom_to_fit", args.bool_or("zoom_to_fit", false)?)
        .build();

    let result = client.send_command("capture_viewport", params)?;

    let image_data = result
        .get("image_data")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidResult("Rhino returned no image data".to_string()))?;
    let decoded = BASE64_STANDARD.decode(image_data).map_err(|e| {
        ToolError::InvalidResult(format!("Rhino returned invalid image data: {e}"))
    })?;

    let viewport_name = result
        .get("viewport_name")
        .and_then(Value::as_str)
        .unwrap_or(viewport);
    let width = result.get("width").and_then(Value::as_i64).unwrap_or(width);
    let height = result.get("height").and_then(Value::as_i64).unwrap_or(height);
    tracing::info!(
        viewport = viewport_name,
        width,
        height,
        bytes = decoded.len(),
        "Captured viewport"
    );

    let mut tool_result = ToolCallResult::image(image_data, "image/png");
    tool_result.push_text(format!("Captured viewport '{viewport_name}' ({width}x{height})"));
    Ok(tool_result)
}

fn execute_python(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let code = args.required_str("code")?;

    match args.optional_array("verified_functions")? {
        Some(functions) if !functions.is_empty() => {
            let names: Vec<&str> = functions.iter().filter_map(Value::as_str).collect();
            tracing::info!(verified_functions = ?names, "Executing RhinoScript Python code");
        }
        _ => {
            tracing::warn!("Executing RhinoScript Python code without verified_functions");
        }
    }

    send(client, "execute_rhinoscript_python_code", json!({ "code": code }))
}

fn execute_csharp(args: &Args<'_>, client: &dyn PluginClient) -> ToolResult {
    let code = args.required_str("code")?;
    tracing::info!("Executing RhinoCommon C# code");
    send(client, "execute_rhinocommon_csharp_code", json!({ "code": code }))
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

fn id_or_name_schema(extra: Value) -> Value {
    let mut properties = json!({
        "id": { "type": "string", "description": "Object ID (GUID)" },
        "name": { "type": "string", "description": "Object name (alternative to id)" }
    });
    if let (Some(base), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        base.extend(extra);
    }
    json!({ "type": "object", "properties": properties })
}

fn vector_schema(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "number" },
        "description": description
    })
}

fn color_schema() -> Value {
    json!({
        "description": "Colour as [r, g, b] (0-255), {\"r\", \"g\", \"b\"} or \"#RRGGBB\""
    })
}

fn object_properties() -> Value {
    json!({
        "type": {
            "type": "string",
            "description": "Object type: POINT, LINE, POLYLINE, CIRCLE, ARC, ELLIPSE, CURVE, BOX, SPHERE, CONE, CYLINDER, SURFACE"
        },
        "name": { "type": "string", "description": "Optional object name" },
        "color": color_schema(),
        "params": {
            "type": "object",
            "description": "Type-specific geometry parameters, e.g. {\"width\": 1, \"length\": 1, \"height\": 1} for BOX"
        },
        "translation": vector_schema("Optional [x, y, z] translation"),
        "rotation": vector_schema("Optional [x, y, z] rotation in radians"),
        "scale": vector_schema("Optional [x, y, z] scale factors")
    })
}

fn id_list_schema(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "description": description
    })
}

#[allow(clippy::too_many_lines)]
fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // === Document queries ===
        tool(
            "get_document_summary",
            "Get a lightweight summary of the Rhino document: metadata, object counts by \
             type and layer, the model bounding box and the layer tree. Call this first, \
             then query specific objects with get_objects.",
            json!({ "type": "object", "properties": {} }),
        ),
        tool(
            "get_objects",
            "Query objects in the Rhino document with filtering and pagination. \
             Returns the objects plus total_matching and has_more.",
            json!({
                "type": "object",
                "properties": {
                    "offset": { "type": "integer", "minimum": 0, "description": "Objects to skip (default 0)" },
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_OBJECTS_PER_PAGE, "description": "Maximum objects to return (default 50, max 200)" },
                    "layer_filter": { "type": "string", "description": "Only objects on this layer (name or full path)" },
                    "type_filter": { "type": "string", "description": "Only objects of this type, e.g. CURVE, BREP, MESH" },
                    "bbox_filter": {
                        "type": "array",
                        "items": { "type": "array", "items": { "type": "number" } },
                        "description": "Only objects inside [[min_x, min_y, min_z], [max_x, max_y, max_z]]"
                    },
                    "include_geometry": { "type": "boolean", "description": "Include geometry details (default true)" }
                }
            }),
        ),
        tool(
            "get_object_info",
            "Get detailed information about one object, by ID or name.",
            id_or_name_schema(json!({})),
        ),
        tool(
            "get_selected_objects_info",
            "Get information about the objects currently selected in Rhino.",
            json!({
                "type": "object",
                "properties": {
                    "include_attributes": { "type": "boolean", "description": "Include user attributes (default false)" }
                }
            }),
        ),
        // === Object editing ===
        tool(
            "create_object",
            "Create one object in the Rhino document.",
            json!({
                "type": "object",
                "properties": object_properties(),
                "required": ["type"]
            }),
        ),
        tool(
            "create_objects",
            "Create several objects in one call. Each entry takes the same fields as \
             create_object and must have a unique name.",
            json!({
                "type": "object",
                "properties": {
                    "objects": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": object_properties(),
                            "required": ["type", "name"]
                        }
                    }
                },
                "required": ["objects"]
            }),
        ),
        tool(
            "modify_object",
            "Modify an existing object: rename, recolour, transform or hide it.",
            id_or_name_schema(json!({
                "new_name": { "type": "string", "description": "New object name" },
                "new_color": color_schema(),
                "translation": vector_schema("[x, y, z] translation"),
                "rotation": vector_schema("[x, y, z] rotation in radians"),
                "scale": vector_schema("[x, y, z] scale factors"),
                "visible": { "type": "boolean", "description": "Show or hide the object" }
            })),
        ),
        tool(
            "modify_objects",
            "Modify several objects in one call. Each entry takes the modify_object fields.",
            json!({
                "type": "object",
                "properties": {
                    "objects": { "type": "array", "items": { "type": "object" } },
                    "all": { "type": "boolean", "description": "Apply the first entry to every object" }
                },
                "required": ["objects"]
            }),
        ),
        tool(
            "delete_object",
            "Delete an object by ID or name, or every object with all=true.",
            id_or_name_schema(json!({
                "all": { "type": "boolean", "description": "Delete every object in the document" }
            })),
        ),
        tool(
            "select_objects",
            "Select objects matching filters such as name, color or user attributes.",
            json!({
                "type": "object",
                "properties": {
                    "filters": { "type": "object", "description": "Filter name to value(s); empty selects everything" },
                    "filters_type": { "type": "string", "enum": ["and", "or"], "description": "How filters combine (default \"and\")" }
                }
            }),
        ),
        // === Layers ===
        tool(
            "create_layer",
            "Create a layer.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Layer name" },
                    "color": color_schema(),
                    "parent": { "type": "string", "description": "Parent layer name or ID" }
                }
            }),
        ),
        tool(
            "delete_layer",
            "Delete a layer by ID or name.",
            json!({
                "type": "object",
                "properties": {
                    "guid": { "type": "string", "description": "Layer ID" },
                    "name": { "type": "string", "description": "Layer name (alternative to guid)" }
                }
            }),
        ),
        tool(
            "get_or_set_current_layer",
            "Return the current layer, or make the given layer current.",
            json!({
                "type": "object",
                "properties": {
                    "guid": { "type": "string", "description": "Layer ID to make current" },
                    "name": { "type": "string", "description": "Layer name to make current" }
                }
            }),
        ),
        // === History ===
        tool(
            "undo",
            "Undo the last operations.",
            json!({
                "type": "object",
                "properties": {
                    "steps": { "type": "integer", "minimum": 1, "description": "Operations to undo (default 1)" }
                }
            }),
        ),
        tool(
            "redo",
            "Redo previously undone operations.",
            json!({
                "type": "object",
                "properties": {
                    "steps": { "type": "integer", "minimum": 1, "description": "Operations to redo (default 1)" }
                }
            }),
        ),
        // === Solids and surfaces ===
        tool(
            "boolean_union",
            "Combine two or more closed solids into one.",
            json!({
                "type": "object",
                "properties": {
                    "object_ids": id_list_schema("IDs of the solids to union (at least 2)"),
                    "delete_sources": { "type": "boolean", "description": "Delete the inputs (default true)" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["object_ids"]
            }),
        ),
        tool(
            "boolean_difference",
            "Subtract solids from a base solid.",
            json!({
                "type": "object",
                "properties": {
                    "base_id": { "type": "string", "description": "ID of the solid to subtract from" },
                    "subtract_ids": id_list_schema("IDs of the solids to subtract"),
                    "delete_sources": { "type": "boolean", "description": "Delete the inputs (default true)" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["base_id", "subtract_ids"]
            }),
        ),
        tool(
            "boolean_intersection",
            "Keep only the volume shared by two or more solids.",
            json!({
                "type": "object",
                "properties": {
                    "object_ids": id_list_schema("IDs of the solids to intersect (at least 2)"),
                    "delete_sources": { "type": "boolean", "description": "Delete the inputs (default true)" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["object_ids"]
            }),
        ),
        tool(
            "loft",
            "Create a lofted surface through two or more curves, in order.",
            json!({
                "type": "object",
                "properties": {
                    "curve_ids": id_list_schema("IDs of the section curves (at least 2)"),
                    "closed": { "type": "boolean", "description": "Close the loft (default false)" },
                    "loft_type": { "type": "integer", "description": "0 normal, 1 loose, 2 tight, 3 straight, 4 developable, 5 uniform" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["curve_ids"]
            }),
        ),
        tool(
            "extrude_curve",
            "Extrude a curve along a direction vector.",
            json!({
                "type": "object",
                "properties": {
                    "curve_id": { "type": "string", "description": "ID of the curve" },
                    "direction": vector_schema("[x, y, z] extrusion vector"),
                    "cap": { "type": "boolean", "description": "Cap planar ends (default true)" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["curve_id", "direction"]
            }),
        ),
        tool(
            "sweep1",
            "Sweep one or more profile curves along a rail.",
            json!({
                "type": "object",
                "properties": {
                    "rail_id": { "type": "string", "description": "ID of the rail curve" },
                    "profile_ids": id_list_schema("IDs of the profile curves (at least 1)"),
                    "closed": { "type": "boolean", "description": "Close the sweep (default false)" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["rail_id", "profile_ids"]
            }),
        ),
        tool(
            "offset_curve",
            "Offset a curve by a distance.",
            json!({
                "type": "object",
                "properties": {
                    "curve_id": { "type": "string", "description": "ID of the curve" },
                    "distance": { "type": "number", "description": "Offset distance; negative offsets to the other side" },
                    "plane": { "type": "array", "description": "Optional offset plane" },
                    "corner_style": { "type": "integer", "description": "0 none, 1 sharp, 2 round, 3 smooth, 4 chamfer (default 1)" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["curve_id", "distance"]
            }),
        ),
        tool(
            "pipe",
            "Create a pipe of constant radius around a curve.",
            json!({
                "type": "object",
                "properties": {
                    "curve_id": { "type": "string", "description": "ID of the rail curve" },
                    "radius": { "type": "number", "exclusiveMinimum": 0, "description": "Pipe radius" },
                    "cap": { "type": "boolean", "description": "Cap the ends (default true)" },
                    "fit_rail": { "type": "boolean", "description": "Fit the rail before piping (default false)" },
                    "name": { "type": "string", "description": "Name for the result" }
                },
                "required": ["curve_id", "radius"]
            }),
        ),
        // === Viewport and scripting ===
        tool(
            "capture_viewport",
            "Capture a Rhino viewport as a PNG image.",
            json!({
                "type": "object",
                "properties": {
                    "viewport": { "type": "string", "description": "Viewport name or \"active\" (default)" },
                    "width": { "type": "integer", "minimum": MIN_CAPTURE_SIZE, "maximum": MAX_CAPTURE_SIZE, "description": "Image width in pixels (default 800)" },
                    "height": { "type": "integer", "minimum": MIN_CAPTURE_SIZE, "maximum": MAX_CAPTURE_SIZE, "description": "Image height in pixels (default 600)" },
                    "show_grid": { "type": "boolean", "description": "Draw the grid (default true)" },
                    "show_axes": { "type": "boolean", "description": "Draw world axes (default true)" },
                    "show_cplane_axes": { "type": "boolean", "description": "Draw construction plane axes (default false)" },
                    "zoom_to_fit": { "type": "boolean", "description": "Zoom extents before capturing (default false)" }
                }
            }),
        ),
        tool(
            "execute_rhinoscript_python_code",
            "Run RhinoScript Python code inside Rhino and return its printed output.",
            json!({
                "type": "object",
                "properties": {
                    "code": { "type": "string", "description": "Python code to run" },
                    "verified_functions": id_list_schema("rhinoscriptsyntax functions whose documentation was checked")
                },
                "required": ["code"]
            }),
        ),
        tool(
            "execute_rhinocommon_csharp_code",
            "Run RhinoCommon C# code inside Rhino and return its output.",
            json!({
                "type": "object",
                "properties": {
                    "code": { "type": "string", "description": "C# code to run" }
                },
                "required": ["code"]
            }),
        ),
    ]
}
