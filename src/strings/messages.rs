//! # Messages
//!
//! Success messages returned to the client. Failure texts live on `ToolError`.

use std::path::Path;

pub const EMPTY_DIRECTORY: &str = "(empty directory)";
pub const TRUNCATION_MARKER: &str = "\n\n... (truncated)";

pub fn wrote(bytes: usize, path: &Path) -> String {
    format!("Successfully wrote {bytes} bytes to {}", path.display())
}

pub fn appended(bytes: usize, path: &Path) -> String {
    format!("Successfully appended {bytes} bytes to {}", path.display())
}

pub fn deleted(path: &Path) -> String {
    format!("Successfully deleted {}", path.display())
}

pub fn copied(source: &Path, destination: &Path) -> String {
    format!(
        "Successfully copied {} to {}",
        source.display(),
        destination.display()
    )
}

pub fn moved(source: &Path, destination: &Path) -> String {
    format!(
        "Successfully moved {} to {}",
        source.display(),
        destination.display()
    )
}

pub fn exists(path: &Path, kind: &str) -> String {
    format!("Exists: {} (type: {kind})", path.display())
}

pub fn does_not_exist(path: &Path) -> String {
    format!("Does not exist: {}", path.display())
}

pub fn file_info(path: &Path, kind: &str, size: u64, modified: &str, created: &str) -> String {
    format!(
        "Path: {}\nType: {kind}\nSize: {size} bytes\nModified: {modified}\nCreated: {created}",
        path.display()
    )
}

pub fn search_found(matches: &[String]) -> String {
    format!("Found {} files:\n{}", matches.len(), matches.join("\n"))
}

pub fn search_empty(pattern: &str, path: &Path) -> String {
    format!("No files matching '{pattern}' found in {}", path.display())
}

pub fn http_response(status: u16, url: &str, body: &str) -> String {
    format!("Status: {status}\nURL: {url}\n\n{body}")
}
