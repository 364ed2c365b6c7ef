//! Tool definitions exposed to MCP clients.
//!
//! Declarative registry: each tool is a static [`ToolDef`] rendered into an
//! rmcp [`Tool`] with a JSON-schema input description.

use std::sync::Arc;

use rmcp::model::Tool;
use serde_json::{Map, Value, json};

pub const SEARCH_FILES_TOOL_NAME: &str = "search_files";
pub const LIST_FILES_TOOL_NAME: &str = "list_files";
pub const CREATE_FOLDER_TOOL_NAME: &str = "create_folder";
pub const READ_FILE_TOOL_NAME: &str = "read_file";

/// Schema for a single tool argument.
pub struct ToolPropertyDef {
    pub name: &'static str,
    /// JSON-schema type: "string", "integer", or "array" (of strings).
    pub prop_type: &'static str,
    pub description: &'static str,
    /// Allowed values for array items.
    pub item_enum: Option<&'static [&'static str]>,
}

pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub properties: &'static [ToolPropertyDef],
    pub required: &'static [&'static str],
}

impl ToolDef {
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut props = Map::new();
        for prop in self.properties {
            let mut prop_obj = json!({
                "type": prop.prop_type,
                "description": prop.description,
            });
            if prop.prop_type == "array" {
                let mut items = json!({ "type": "string" });
                if let Some(values) = prop.item_enum {
                    items["enum"] = json!(values);
                }
                prop_obj["items"] = items;
            }
            props.insert(prop.name.to_string(), prop_obj);
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(props));
        schema.insert("required".into(), json!(self.required));
        schema
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description, Arc::new(self.input_schema()))
    }
}

/// Same set the parameter mapper accepts for `category`.
const CATEGORY_NAMES: &[&str] = &["document", "image", "video", "audio", "archive", "other"];

const LIMIT: ToolPropertyDef = ToolPropertyDef {
    name: "limit",
    prop_type: "integer",
    description: "Maximum number of results to return",
    item_enum: None,
};

const PAGE: ToolPropertyDef = ToolPropertyDef {
    name: "page",
    prop_type: "integer",
    description: "Page number to return",
    item_enum: None,
};

pub static TOOL_DEFS: &[ToolDef] = &[
    ToolDef {
        name: SEARCH_FILES_TOOL_NAME,
        description: "Search or filter files and folders",
        properties: &[
            ToolPropertyDef {
                name: "query",
                prop_type: "string",
                description: "File name or keyword to search",
                item_enum: None,
            },
            ToolPropertyDef {
                name: "name",
                prop_type: "string",
                description: "Exact file name to find",
                item_enum: None,
            },
            LIMIT,
            PAGE,
            ToolPropertyDef {
                name: "category",
                prop_type: "array",
                description: "Filter by category (document, image, video, audio, archive, other)",
                item_enum: Some(CATEGORY_NAMES),
            },
            ToolPropertyDef {
                name: "searchType",
                prop_type: "string",
                description: "text for literal matches (default), regex for regular expressions",
                item_enum: None,
            },
            ToolPropertyDef {
                name: "type",
                prop_type: "string",
                description: "Filter by type (file or folder)",
                item_enum: None,
            },
        ],
        required: &[],
    },
    ToolDef {
        name: LIST_FILES_TOOL_NAME,
        description: "List files in a folder",
        properties: &[
            ToolPropertyDef {
                name: "folder_id",
                prop_type: "string",
                description: "ID of the folder to list files from",
                item_enum: None,
            },
            LIMIT,
            PAGE,
        ],
        required: &["folder_id"],
    },
    ToolDef {
        name: CREATE_FOLDER_TOOL_NAME,
        description: "Create a new folder",
        properties: &[
            ToolPropertyDef {
                name: "path",
                prop_type: "string",
                description: "Path to create the folder at, e.g. /folder1/folder2; default is root (/)",
                item_enum: None,
            },
            ToolPropertyDef {
                name: "name",
                prop_type: "string",
                description: "Name of the folder to create",
                item_enum: None,
            },
        ],
        required: &["name"],
    },
    ToolDef {
        name: READ_FILE_TOOL_NAME,
        description: "Read a file from TelDrive by file ID",
        properties: &[ToolPropertyDef {
            name: "file_id",
            prop_type: "string",
            description: "The ID of the file to read",
            item_enum: None,
        }],
        required: &["file_id"],
    },
];

pub fn all_tools() -> Vec<Tool> {
    TOOL_DEFS.iter().map(ToolDef::to_tool).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdrive_core::params::Category;

    fn def(name: &str) -> &'static ToolDef {
        TOOL_DEFS.iter().find(|d| d.name == name).unwrap()
    }

    #[test]
    fn registry_contains_all_tools() {
        let names: Vec<_> = TOOL_DEFS.iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                SEARCH_FILES_TOOL_NAME,
                LIST_FILES_TOOL_NAME,
                CREATE_FOLDER_TOOL_NAME,
                READ_FILE_TOOL_NAME
            ]
        );
        assert_eq!(all_tools().len(), 4);
    }

    #[test]
    fn category_schema_lists_closed_set() {
        let schema = def(SEARCH_FILES_TOOL_NAME).input_schema();
        assert_eq!(
            schema["properties"]["category"]["items"]["enum"],
            json!(["document", "image", "video", "audio", "archive", "other"])
        );
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn category_names_match_filter_enum() {
        let names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, CATEGORY_NAMES);
    }

    #[test]
    fn read_file_requires_id() {
        let schema = def(READ_FILE_TOOL_NAME).input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["file_id"]));
    }

    #[test]
    fn tool_carries_schema() {
        let tool = def(LIST_FILES_TOOL_NAME).to_tool();
        assert_eq!(tool.name, LIST_FILES_TOOL_NAME);
        assert_eq!(tool.input_schema["required"], json!(["folder_id"]));
    }
}
