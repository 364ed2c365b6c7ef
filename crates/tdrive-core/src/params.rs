//! Translation of loosely-typed tool arguments into backend query parameters.
//!
//! Tool callers send whatever JSON their client produced: numbers may arrive
//! as `10`, `10.0` or `"10"`, a category filter as an array or a bare string.
//! Everything here normalises that into a [`QueryParams`] value or fails with
//! [`Error::InvalidArgument`]; nothing silently falls back to a default once
//! the caller has actually supplied a value.
//!
//! Fields the caller left out stay `None` and never reach the outbound
//! parameter set. The backend treats "no filter" and "empty filter"
//! differently, so the distinction has to survive the mapping.

use serde_json::Value;

use crate::error::{Error, Result};

/// Raw tool-call arguments as delivered by the protocol layer.
pub type Arguments = serde_json::Map<String, Value>;

pub const SEARCH_DEFAULT_LIMIT: u32 = 20;
pub const LIST_DEFAULT_LIMIT: u32 = 50;
pub const DEFAULT_PAGE: u32 = 1;

/// Root folder used when `create_folder` is called without a path.
pub const ROOT_PATH: &str = "/";

/// Strict accessors over tool arguments.
///
/// Absent and `null` both read as "not specified". A present value of the
/// wrong shape is an error, never a default.
pub trait ArgsExt {
    /// Optional string. Empty strings are kept: they are an explicit value.
    fn opt_str(&self, field: &'static str) -> Result<Option<&str>>;

    /// Required, non-blank string.
    fn required_str(&self, field: &'static str) -> Result<&str>;

    /// Optional positive integer, accepting integral numbers and numeric strings.
    fn opt_positive_int(&self, field: &'static str) -> Result<Option<u32>>;

    /// Zero or more strings, accepting an array or a single bare string.
    fn str_list(&self, field: &'static str) -> Result<Vec<&str>>;
}

impl ArgsExt for Arguments {
    fn opt_str(&self, field: &'static str) -> Result<Option<&str>> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(Error::invalid(
                field,
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }

    fn required_str(&self, field: &'static str) -> Result<&str> {
        match self.opt_str(field)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(Error::MissingArgument(field)),
        }
    }

    fn opt_positive_int(&self, field: &'static str) -> Result<Option<u32>> {
        let n = match self.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => {
                if let Some(n) = n.as_u64() {
                    n
                } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0) {
                    f as u64
                } else {
                    return Err(Error::invalid(
                        field,
                        format!("expected a positive integer, got {n}"),
                    ));
                }
            }
            Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| {
                Error::invalid(field, format!("expected a positive integer, got {s:?}"))
            })?,
            Some(other) => {
                return Err(Error::invalid(
                    field,
                    format!("expected a positive integer, got {}", type_name(other)),
                ));
            }
        };
        match u32::try_from(n) {
            Ok(0) => Err(Error::invalid(field, "must be at least 1")),
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(Error::invalid(field, format!("{n} is out of range"))),
        }
    }

    fn str_list(&self, field: &'static str) -> Result<Vec<&str>> {
        match self.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.as_str()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| {
                        Error::invalid(
                            field,
                            format!("expected strings, got {}", type_name(item)),
                        )
                    })
                })
                .collect(),
            Some(other) => Err(Error::invalid(
                field,
                format!("expected an array of strings, got {}", type_name(other)),
            )),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Category filter. Closed set: anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Document,
    Image,
    Video,
    Audio,
    Archive,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Document,
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Archive,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Document => "document",
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Archive => "archive",
            Category::Other => "other",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| {
                Error::invalid(
                    "category",
                    format!(
                        "{value:?} is not one of document, image, video, audio, archive, other"
                    ),
                )
            })
    }
}

/// Entry-type filter. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Folder,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::File => "file",
            EntryType::Folder => "folder",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "file" => Ok(EntryType::File),
            "folder" => Ok(EntryType::Folder),
            other => Err(Error::invalid(
                "type",
                format!("{other:?} is not one of file, folder"),
            )),
        }
    }
}

/// How the backend interprets `query`. Open set: unknown modes pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    Text,
    Regex,
    Other(String),
}

impl SearchMode {
    pub fn as_str(&self) -> &str {
        match self {
            SearchMode::Text => "text",
            SearchMode::Regex => "regex",
            SearchMode::Other(mode) => mode,
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "text" => SearchMode::Text,
            "regex" => SearchMode::Regex,
            other => SearchMode::Other(other.to_string()),
        }
    }
}

/// Discriminator telling the backend which listing operation is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Find,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Find => "find",
        }
    }
}

/// Validated query for the backend's file listing endpoint.
///
/// Built fresh for every call and consumed by it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub operation: Option<Operation>,
    pub query: Option<String>,
    pub name: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub category: Vec<Category>,
    pub search_type: Option<SearchMode>,
    pub entry_type: Option<EntryType>,
    pub parent_id: Option<String>,
}

impl QueryParams {
    /// Map `search_files` arguments. Always marks the call as a find operation.
    pub fn for_search(args: &Arguments) -> Result<Self> {
        let category = args
            .str_list("category")?
            .into_iter()
            .map(Category::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            operation: Some(Operation::Find),
            query: args.opt_str("query")?.map(String::from),
            name: args.opt_str("name")?.map(String::from),
            limit: Some(args.opt_positive_int("limit")?.unwrap_or(SEARCH_DEFAULT_LIMIT)),
            page: Some(args.opt_positive_int("page")?.unwrap_or(DEFAULT_PAGE)),
            category,
            search_type: non_blank(args.opt_str("searchType")?).map(SearchMode::parse),
            entry_type: non_blank(args.opt_str("type")?)
                .map(EntryType::parse)
                .transpose()?,
            parent_id: None,
        })
    }

    /// Map `list_files` arguments. `folder_id` is required.
    pub fn for_listing(args: &Arguments) -> Result<Self> {
        Ok(Self {
            parent_id: Some(args.required_str("folder_id")?.to_string()),
            limit: Some(args.opt_positive_int("limit")?.unwrap_or(LIST_DEFAULT_LIMIT)),
            page: Some(args.opt_positive_int("page")?.unwrap_or(DEFAULT_PAGE)),
            ..Self::default()
        })
    }

    /// The outbound parameter set, in a stable order. Unset fields are absent;
    /// each category becomes its own `category` pair.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(op) = self.operation {
            pairs.push(("operation", op.as_str().to_string()));
        }
        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(parent_id) = &self.parent_id {
            pairs.push(("parentId", parent_id.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        for category in &self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(mode) = &self.search_type {
            pairs.push(("searchType", mode.as_str().to_string()));
        }
        if let Some(kind) = self.entry_type {
            pairs.push(("type", kind.as_str().to_string()));
        }
        pairs
    }
}

/// Empty enum values are treated as "no filter"; clients often send `""`
/// for an untouched dropdown.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A folder to create on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFolder {
    pub name: String,
    pub path: String,
}

impl NewFolder {
    /// Map `create_folder` arguments. `name` is required; `path` defaults to `/`.
    pub fn from_args(args: &Arguments) -> Result<Self> {
        let name = args.required_str("name")?.to_string();
        let path = non_blank(args.opt_str("path")?)
            .unwrap_or(ROOT_PATH)
            .to_string();
        Ok(Self { name, path })
    }
}
