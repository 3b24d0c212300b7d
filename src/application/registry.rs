//! # Operation Registry
//!
//! The fixed catalog of operations: names, descriptions and argument schemas.
//! Operation names are part of the client-facing contract and must not change.

use serde_json::{Map, Value, json};

use crate::domain::error::ToolError;

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ReadFile,
    WriteFile,
    AppendToFile,
    DeleteFile,
    CopyFile,
    MoveFile,
    FileExists,
    GetFileInfo,
    ListDirectory,
    SearchFiles,
    RunPowershell,
    RunGit,
    FetchUrl,
    HttpRequest,
    GetTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    String,
    Boolean,
    Object,
    /// A string, or an array of strings.
    StringList,
}

impl ArgKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ArgKind::String => value.is_string(),
            ArgKind::Boolean => value.is_boolean(),
            ArgKind::Object => value.is_object(),
            ArgKind::StringList => match value {
                Value::String(_) => true,
                Value::Array(items) => items.iter().all(Value::is_string),
                _ => false,
            },
        }
    }

    fn expected(self) -> &'static str {
        match self {
            ArgKind::String => "expected a string",
            ArgKind::Boolean => "expected a boolean",
            ArgKind::Object => "expected an object",
            ArgKind::StringList => "expected a string or an array of strings",
        }
    }

    fn schema(self) -> Value {
        match self {
            ArgKind::String => json!({ "type": "string" }),
            ArgKind::Boolean => json!({ "type": "boolean" }),
            ArgKind::Object => json!({ "type": "object" }),
            ArgKind::StringList => json!({
                "oneOf": [
                    { "type": "string" },
                    { "type": "array", "items": { "type": "string" } }
                ]
            }),
        }
    }
}

#[derive(Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub description: &'static str,
    /// Allowed values, for string parameters with a closed set.
    pub choices: &'static [&'static str],
}

const fn required(name: &'static str, kind: ArgKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: true,
        description,
        choices: &[],
    }
}

const fn optional(name: &'static str, kind: ArgKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: false,
        description,
        choices: &[],
    }
}

#[derive(Debug)]
pub struct OperationSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const READ_FILE: OperationSpec = OperationSpec {
    name: "read_file",
    description: "Read the contents of a text file. Returns the file content as text.",
    params: &[required("path", ArgKind::String, "Absolute path to the file to read")],
};

const WRITE_FILE: OperationSpec = OperationSpec {
    name: "write_file",
    description: "Write content to a file. Creates the file if it doesn't exist, overwrites if it does.",
    params: &[
        required("path", ArgKind::String, "Absolute path to the file to write"),
        required("content", ArgKind::String, "Content to write to the file"),
    ],
};

const APPEND_TO_FILE: OperationSpec = OperationSpec {
    name: "append_to_file",
    description: "Append content to the end of a file. Creates the file if it doesn't exist.",
    params: &[
        required("path", ArgKind::String, "Absolute path to the file"),
        required("content", ArgKind::String, "Content to append"),
    ],
};

const DELETE_FILE: OperationSpec = OperationSpec {
    name: "delete_file",
    description: "Delete a file.",
    params: &[required("path", ArgKind::String, "Absolute path to the file to delete")],
};

const COPY_FILE: OperationSpec = OperationSpec {
    name: "copy_file",
    description: "Copy a file to a new location.",
    params: &[
        required("source", ArgKind::String, "Absolute path to the source file"),
        required("destination", ArgKind::String, "Absolute path to the destination"),
    ],
};

const MOVE_FILE: OperationSpec = OperationSpec {
    name: "move_file",
    description: "Move or rename a file.",
    params: &[
        required("source", ArgKind::String, "Absolute path to the source file"),
        required("destination", ArgKind::String, "Absolute path to the destination"),
    ],
};

const FILE_EXISTS: OperationSpec = OperationSpec {
    name: "file_exists",
    description: "Check if a file or directory exists.",
    params: &[required("path", ArgKind::String, "Absolute path to check")],
};

const GET_FILE_INFO: OperationSpec = OperationSpec {
    name: "get_file_info",
    description: "Get file metadata (size, modified time, type).",
    params: &[required("path", ArgKind::String, "Absolute path to the file")],
};

const LIST_DIRECTORY: OperationSpec = OperationSpec {
    name: "list_directory",
    description: "List files and folders in a directory. Returns names with [FILE] or [DIR] prefix.",
    params: &[required("path", ArgKind::String, "Absolute path to the directory to list")],
};

const SEARCH_FILES: OperationSpec = OperationSpec {
    name: "search_files",
    description: "Search for files matching a pattern in a directory tree.",
    params: &[
        required("path", ArgKind::String, "Absolute path to the directory to search"),
        required("pattern", ArgKind::String, "Glob pattern to match (e.g., '*.py', '*.md')"),
        optional("recursive", ArgKind::Boolean, "Search subdirectories (default: true)"),
    ],
};

const RUN_POWERSHELL: OperationSpec = OperationSpec {
    name: "run_powershell",
    description: "Execute a PowerShell command and return the output.",
    params: &[
        required("command", ArgKind::String, "PowerShell command to execute"),
        optional("working_directory", ArgKind::String, "Optional working directory for the command"),
    ],
};

const RUN_GIT: OperationSpec = OperationSpec {
    name: "run_git",
    description: "Execute a Git command and return the output.",
    params: &[
        required(
            "args",
            ArgKind::StringList,
            "Git arguments (e.g., 'status', 'log --oneline -5'), or an array of arguments",
        ),
        required("working_directory", ArgKind::String, "Repository directory"),
    ],
};

const FETCH_URL: OperationSpec = OperationSpec {
    name: "fetch_url",
    description: "Fetch a webpage and return its content as plain text (HTML stripped).",
    params: &[
        required("url", ArgKind::String, "URL to fetch"),
        optional("raw", ArgKind::Boolean, "Return raw HTML instead of stripped text (default: false)"),
    ],
};

const HTTP_REQUEST: OperationSpec = OperationSpec {
    name: "http_request",
    description: "Make an HTTP API request. Returns response body and status.",
    params: &[
        ParamSpec {
            name: "method",
            kind: ArgKind::String,
            required: true,
            description: "HTTP method (GET, POST, PUT, DELETE, PATCH)",
            choices: &["GET", "POST", "PUT", "DELETE", "PATCH"],
        },
        required("url", ArgKind::String, "URL to request"),
        optional("headers", ArgKind::Object, "Optional headers as key-value pairs"),
        optional("body", ArgKind::String, "Optional request body (for POST/PUT/PATCH)"),
        optional("json_body", ArgKind::Object, "Optional JSON body (will be serialized)"),
    ],
};

const GET_TIME: OperationSpec = OperationSpec {
    name: "get_time",
    description: "Get current local date and time on the machine.",
    params: &[],
};

impl OperationKind {
    pub const ALL: [OperationKind; 15] = [
        OperationKind::ReadFile,
        OperationKind::WriteFile,
        OperationKind::AppendToFile,
        OperationKind::DeleteFile,
        OperationKind::CopyFile,
        OperationKind::MoveFile,
        OperationKind::FileExists,
        OperationKind::GetFileInfo,
        OperationKind::ListDirectory,
        OperationKind::SearchFiles,
        OperationKind::RunPowershell,
        OperationKind::RunGit,
        OperationKind::FetchUrl,
        OperationKind::HttpRequest,
        OperationKind::GetTime,
    ];

    pub fn spec(self) -> &'static OperationSpec {
        match self {
            OperationKind::ReadFile => &READ_FILE,
            OperationKind::WriteFile => &WRITE_FILE,
            OperationKind::AppendToFile => &APPEND_TO_FILE,
            OperationKind::DeleteFile => &DELETE_FILE,
            OperationKind::CopyFile => &COPY_FILE,
            OperationKind::MoveFile => &MOVE_FILE,
            OperationKind::FileExists => &FILE_EXISTS,
            OperationKind::GetFileInfo => &GET_FILE_INFO,
            OperationKind::ListDirectory => &LIST_DIRECTORY,
            OperationKind::SearchFiles => &SEARCH_FILES,
            OperationKind::RunPowershell => &RUN_POWERSHELL,
            OperationKind::RunGit => &RUN_GIT,
            OperationKind::FetchUrl => &FETCH_URL,
            OperationKind::HttpRequest => &HTTP_REQUEST,
            OperationKind::GetTime => &GET_TIME,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl OperationSpec {
    /// Checks presence of required arguments and the type of every known argument.
    /// `null` counts as absent. Unknown extra arguments are ignored.
    pub fn validate(&self, args: &JsonObject) -> Result<(), ToolError> {
        for param in self.params {
            match args.get(param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ToolError::MissingArgument {
                        operation: self.name,
                        argument: param.name,
                    });
                }
                None | Some(Value::Null) => {}
                Some(value) if !param.kind.accepts(value) => {
                    return Err(ToolError::invalid(param.name, param.kind.expected()));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// JSON Schema describing the argument object.
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = Map::new();
        for param in self.params {
            let mut schema = param.kind.schema();
            if let Some(object) = schema.as_object_mut() {
                object.insert("description".into(), Value::from(param.description));
                if !param.choices.is_empty() {
                    object.insert("enum".into(), json!(param.choices));
                }
            }
            properties.insert(param.name.to_string(), schema);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), Value::from("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }
}
