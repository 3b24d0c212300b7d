//! # File Operations
//!
//! Every path argument is resolved and checked by the [`PathGuard`] before the filesystem is
//! touched; the handlers then act on the resolved path. Messages echo the path as the caller
//! wrote it.

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use glob::{MatchOptions, Pattern};
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

use crate::application::args::Args;
use crate::application::dispatcher::ToolContext;
use crate::domain::error::ToolError;
use crate::infrastructure::tools::guard::PathGuard;
use crate::strings::messages;

/// Stats `path`, mapping a missing entry to `NotFound { what, shown }`.
async fn stat(
    path: &Path,
    what: &'static str,
    shown: &Path,
    action: &'static str,
) -> Result<Metadata, ToolError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ToolError::NotFound {
            what,
            path: shown.to_path_buf(),
        }),
        Err(e) => Err(ToolError::io(action)(e)),
    }
}

async fn create_parent(path: &Path, action: &'static str) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(ToolError::io(action))?;
    }
    Ok(())
}

/// Checks both ends of a copy or move. If the destination is an existing directory the
/// source's file name is appended, and the final destination is checked again.
async fn resolve_transfer(
    ctx: &ToolContext,
    args: &Args<'_>,
) -> Result<(PathBuf, PathBuf), ToolError> {
    let source = ctx.guard.check(args.path("source")?)?;
    let mut destination = ctx.guard.check(args.path("destination")?)?;

    let dest_is_dir = tokio::fs::metadata(&destination)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if dest_is_dir {
        if let Some(name) = source.file_name() {
            destination = ctx.guard.check(destination.join(name))?;
        }
    }
    Ok((source, destination))
}

pub async fn read_file(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let path = ctx.guard.check(shown)?;

    let meta = stat(&path, "File", shown, "reading file").await?;
    if !meta.is_file() {
        return Err(ToolError::NotAFile(shown.to_path_buf()));
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(ToolError::io("reading file"))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn write_file(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let content = args.str("content")?;
    let path = ctx.guard.check(shown)?;

    create_parent(&path, "writing file").await?;
    tokio::fs::write(&path, content)
        .await
        .map_err(ToolError::io("writing file"))?;
    Ok(messages::wrote(content.len(), shown))
}

pub async fn append_to_file(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let content = args.str("content")?;
    let path = ctx.guard.check(shown)?;

    create_parent(&path, "appending to file").await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .map_err(ToolError::io("appending to file"))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(ToolError::io("appending to file"))?;
    file.flush()
        .await
        .map_err(ToolError::io("appending to file"))?;
    Ok(messages::appended(content.len(), shown))
}

pub async fn delete_file(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let path = ctx.guard.check(shown)?;

    let meta = stat(&path, "File", shown, "deleting file").await?;
    if meta.is_dir() {
        return Err(ToolError::IsADirectory(shown.to_path_buf()));
    }
    if !meta.is_file() {
        return Err(ToolError::NotAFile(shown.to_path_buf()));
    }

    tokio::fs::remove_file(&path)
        .await
        .map_err(ToolError::io("deleting file"))?;
    Ok(messages::deleted(shown))
}

pub async fn copy_file(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let (source, destination) = resolve_transfer(ctx, args).await?;
    let shown_source = args.path("source")?;

    let meta = stat(&source, "Source file", shown_source, "copying file").await?;
    if !meta.is_file() {
        return Err(ToolError::NotAFile(shown_source.to_path_buf()));
    }

    create_parent(&destination, "copying file").await?;
    tokio::fs::copy(&source, &destination)
        .await
        .map_err(ToolError::io("copying file"))?;
    Ok(messages::copied(shown_source, args.path("destination")?))
}

pub async fn move_file(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let (source, destination) = resolve_transfer(ctx, args).await?;
    let shown_source = args.path("source")?;

    let meta = stat(&source, "Source file", shown_source, "moving file").await?;

    create_parent(&destination, "moving file").await?;
    match tokio::fs::rename(&source, &destination).await {
        Ok(()) => {}
        // rename(2) cannot cross filesystems; files fall back to copy + remove.
        Err(e) if e.kind() == ErrorKind::CrossesDevices && meta.is_file() => {
            tracing::debug!("Cross-device move of {}, copying", source.display());
            tokio::fs::copy(&source, &destination)
                .await
                .map_err(ToolError::io("moving file"))?;
            tokio::fs::remove_file(&source)
                .await
                .map_err(ToolError::io("moving file"))?;
        }
        Err(e) => return Err(ToolError::io("moving file")(e)),
    }
    Ok(messages::moved(shown_source, args.path("destination")?))
}

pub async fn file_exists(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let path = ctx.guard.check(shown)?;

    match tokio::fs::metadata(&path).await {
        Ok(meta) => {
            let kind = if meta.is_dir() {
                "directory"
            } else if meta.is_file() {
                "file"
            } else {
                "unknown"
            };
            Ok(messages::exists(shown, kind))
        }
        Err(_) => Ok(messages::does_not_exist(shown)),
    }
}

fn iso_timestamp(time: std::io::Result<SystemTime>) -> String {
    match time {
        Ok(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
        Err(_) => "unavailable".to_string(),
    }
}

pub async fn get_file_info(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let path = ctx.guard.check(shown)?;

    let meta = stat(&path, "Path", shown, "getting file info").await?;
    let kind = if meta.is_dir() { "directory" } else { "file" };
    Ok(messages::file_info(
        shown,
        kind,
        meta.len(),
        &iso_timestamp(meta.modified()),
        &iso_timestamp(meta.created()),
    ))
}

pub async fn list_directory(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let path = ctx.guard.check(shown)?;

    let meta = stat(&path, "Directory", shown, "listing directory").await?;
    if !meta.is_dir() {
        return Err(ToolError::NotADirectory(shown.to_path_buf()));
    }

    let mut entries = tokio::fs::read_dir(&path)
        .await
        .map_err(ToolError::io("listing directory"))?;
    let mut items = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(ToolError::io("listing directory"))?
    {
        // Follows symlinks, so a link to a directory is listed as one.
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        items.push((entry.file_name(), is_dir));
    }

    if items.is_empty() {
        return Ok(messages::EMPTY_DIRECTORY.to_string());
    }
    items.sort();
    let lines: Vec<String> = items
        .into_iter()
        .map(|(name, is_dir)| {
            let prefix = if is_dir { "[DIR]" } else { "[FILE]" };
            format!("{prefix} {}", name.to_string_lossy())
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Files under `root` whose name matches `pattern`, sorted.
/// Unreadable subdirectories are skipped, as are symlinks that lead outside the guard.
fn find_matches(guard: &PathGuard, root: &Path, pattern: &Pattern, recursive: bool) -> Vec<String> {
    let options = MatchOptions {
        case_sensitive: !cfg!(windows),
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 });

    let mut matches: Vec<String> = walker
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| pattern.matches_with(&entry.file_name().to_string_lossy(), options))
        .filter(|entry| {
            entry.file_type().is_file()
                || (entry.path_is_symlink()
                    && entry.path().is_file()
                    && guard.is_allowed(entry.path()))
        })
        .map(|entry| entry.path().display().to_string())
        .collect();
    matches.sort();
    matches
}

pub async fn search_files(ctx: &ToolContext, args: &Args<'_>) -> Result<String, ToolError> {
    let shown = args.path("path")?;
    let raw_pattern = args.str("pattern")?;
    let recursive = args.bool_or("recursive", true)?;
    let path = ctx.guard.check(shown)?;

    let meta = stat(&path, "Directory", shown, "searching files").await?;
    if !meta.is_dir() {
        return Err(ToolError::NotADirectory(shown.to_path_buf()));
    }
    let pattern =
        Pattern::new(raw_pattern).map_err(|e| ToolError::invalid("pattern", e.to_string()))?;

    let guard = ctx.guard.clone();
    let matches =
        tokio::task::spawn_blocking(move || find_matches(&guard, &path, &pattern, recursive))
            .await
            .map_err(|e| ToolError::io("searching files")(std::io::Error::other(e)))?;

    if matches.is_empty() {
        Ok(messages::search_empty(raw_pattern, shown))
    } else {
        Ok(messages::search_found(&matches))
    }
}

#[cfg(test)]
mod tests {
    use crate::application::dispatcher::test_support::Harness;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let h = Harness::new();
        let content = "line one\nunicode: \u{00e9}\u{4e2d}\n\ttabbed";
        let result = h
            .call("write_file", json!({ "path": h.path("notes/today.md"), "content": content }))
            .await;
        assert!(!result.is_error, "{}", result.text);
        assert_eq!(
            result.text,
            format!("Successfully wrote {} bytes to {}", content.len(), h.path("notes/today.md"))
        );

        let read = h.call("read_file", json!({ "path": h.path("notes/today.md") })).await;
        assert!(!read.is_error);
        assert_eq!(read.text, content);
    }

    #[tokio::test]
    async fn test_empty_content_round_trips() {
        let h = Harness::new();
        let result = h
            .call("write_file", json!({ "path": h.path("empty.txt"), "content": "" }))
            .await;
        assert!(!result.is_error);
        let read = h.call("read_file", json!({ "path": h.path("empty.txt") })).await;
        assert!(!read.is_error);
        assert_eq!(read.text, "");
        assert_eq!(std::fs::metadata(h.root.join("empty.txt")).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_read_failures() {
        let h = Harness::new();
        let missing = h.call("read_file", json!({ "path": h.path("nope.txt") })).await;
        assert!(missing.is_error);
        assert_eq!(missing.text, format!("Error: File not found: {}", h.path("nope.txt")));

        let dir = h.call("read_file", json!({ "path": h.path("") })).await;
        assert!(dir.is_error);
        assert!(dir.text.starts_with("Error: Not a file:"));
    }

    #[tokio::test]
    async fn test_append_creates_then_concatenates() {
        let h = Harness::new();
        let path = h.path("log/app.log");

        let first = h.call("append_to_file", json!({ "path": path, "content": "alpha\n" })).await;
        assert!(!first.is_error, "{}", first.text);
        assert_eq!(h.read(&path), "alpha\n");

        let second = h.call("append_to_file", json!({ "path": path, "content": "beta" })).await;
        assert_eq!(second.text, format!("Successfully appended 4 bytes to {path}"));
        assert_eq!(h.read(&path), "alpha\nbeta");
    }

    #[tokio::test]
    async fn test_outside_paths_are_rejected_without_mutation() {
        let h = Harness::new();
        let target = h.outside_path("victim.txt");

        let write = h.call("write_file", json!({ "path": target, "content": "x" })).await;
        assert!(write.is_error);
        assert_eq!(write.text, format!("Error: Path not allowed: {target}"));
        assert!(!std::path::Path::new(&target).exists());

        let sneaky = format!("{}/../outside/victim.txt", h.root.display());
        let write = h.call("append_to_file", json!({ "path": sneaky, "content": "x" })).await;
        assert!(write.is_error);
        assert!(!std::path::Path::new(&target).exists());

        std::fs::write(&target, "keep").unwrap();
        let delete = h.call("delete_file", json!({ "path": target })).await;
        assert!(delete.is_error);
        assert_eq!(h.read(&target), "keep");
    }

    #[tokio::test]
    async fn test_delete_file_and_directory() {
        let h = Harness::new();
        std::fs::write(h.root.join("gone.txt"), "x").unwrap();
        std::fs::create_dir(h.root.join("folder")).unwrap();

        let ok = h.call("delete_file", json!({ "path": h.path("gone.txt") })).await;
        assert_eq!(ok.text, format!("Successfully deleted {}", h.path("gone.txt")));
        assert!(!h.root.join("gone.txt").exists());

        let dir = h.call("delete_file", json!({ "path": h.path("folder") })).await;
        assert!(dir.is_error);
        assert!(dir.text.ends_with("is not a file. Use rmdir for directories."));
        assert!(h.root.join("folder").is_dir());

        let missing = h.call("delete_file", json!({ "path": h.path("gone.txt") })).await;
        assert!(missing.text.starts_with("Error: File not found:"));
    }

    #[tokio::test]
    async fn test_copy_creates_missing_parents() {
        let h = Harness::new();
        std::fs::write(h.root.join("src.txt"), "payload").unwrap();

        let result = h
            .call(
                "copy_file",
                json!({ "source": h.path("src.txt"), "destination": h.path("a/b/c/dst.txt") }),
            )
            .await;
        assert!(!result.is_error, "{}", result.text);
        assert_eq!(h.read(h.root.join("a/b/c/dst.txt")), "payload");
        assert_eq!(h.read(h.root.join("src.txt")), "payload");
    }

    #[tokio::test]
    async fn test_copy_into_existing_directory_keeps_name() {
        let h = Harness::new();
        std::fs::write(h.root.join("src.txt"), "payload").unwrap();
        std::fs::create_dir(h.root.join("into")).unwrap();

        let result = h
            .call("copy_file", json!({ "source": h.path("src.txt"), "destination": h.path("into") }))
            .await;
        assert!(!result.is_error, "{}", result.text);
        assert_eq!(h.read(h.root.join("into/src.txt")), "payload");
    }

    #[tokio::test]
    async fn test_move_creates_missing_parents() {
        let h = Harness::new();
        std::fs::write(h.root.join("from.txt"), "moving").unwrap();

        let result = h
            .call(
                "move_file",
                json!({ "source": h.path("from.txt"), "destination": h.path("x/y/to.txt") }),
            )
            .await;
        assert!(!result.is_error, "{}", result.text);
        assert_eq!(
            result.text,
            format!("Successfully moved {} to {}", h.path("from.txt"), h.path("x/y/to.txt"))
        );
        assert!(!h.root.join("from.txt").exists());
        assert_eq!(h.read(h.root.join("x/y/to.txt")), "moving");
    }

    #[tokio::test]
    async fn test_transfer_requires_both_paths_allowed() {
        let h = Harness::new();
        std::fs::write(h.root.join("inside.txt"), "in").unwrap();
        std::fs::write(h.outside.join("outside.txt"), "out").unwrap();

        let exfiltrate = h
            .call(
                "copy_file",
                json!({ "source": h.path("inside.txt"), "destination": h.outside_path("leak.txt") }),
            )
            .await;
        assert!(exfiltrate.is_error);
        assert!(exfiltrate.text.starts_with("Error: Path not allowed"));
        assert!(!h.outside.join("leak.txt").exists());

        let import = h
            .call(
                "move_file",
                json!({ "source": h.outside_path("outside.txt"), "destination": h.path("in.txt") }),
            )
            .await;
        assert!(import.is_error);
        assert!(h.outside.join("outside.txt").exists());
        assert!(!h.root.join("in.txt").exists());
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let h = Harness::new();
        let result = h
            .call("copy_file", json!({ "source": h.path("nope"), "destination": h.path("x") }))
            .await;
        assert_eq!(result.text, format!("Error: Source file not found: {}", h.path("nope")));
    }

    #[tokio::test]
    async fn test_file_exists_reports_type() {
        let h = Harness::new();
        std::fs::write(h.root.join("f.txt"), "").unwrap();

        let file = h.call("file_exists", json!({ "path": h.path("f.txt") })).await;
        assert_eq!(file.text, format!("Exists: {} (type: file)", h.path("f.txt")));

        let dir = h.call("file_exists", json!({ "path": h.path("") })).await;
        assert!(dir.text.ends_with("(type: directory)"));

        let none = h.call("file_exists", json!({ "path": h.path("ghost") })).await;
        assert!(!none.is_error);
        assert_eq!(none.text, format!("Does not exist: {}", h.path("ghost")));
    }

    #[tokio::test]
    async fn test_get_file_info() {
        let h = Harness::new();
        std::fs::write(h.root.join("info.bin"), [0u8; 42]).unwrap();

        let result = h.call("get_file_info", json!({ "path": h.path("info.bin") })).await;
        assert!(!result.is_error, "{}", result.text);
        let lines: Vec<&str> = result.text.lines().collect();
        assert_eq!(lines[0], format!("Path: {}", h.path("info.bin")));
        assert_eq!(lines[1], "Type: file");
        assert_eq!(lines[2], "Size: 42 bytes");
        assert!(lines[3].starts_with("Modified: 20"));
        assert!(lines[4].starts_with("Created: "));

        let missing = h.call("get_file_info", json!({ "path": h.path("nope") })).await;
        assert!(missing.text.starts_with("Error: Path not found:"));
    }

    #[tokio::test]
    async fn test_list_directory_sorted_with_prefixes() {
        let h = Harness::new();
        std::fs::create_dir(h.root.join("beta")).unwrap();
        std::fs::write(h.root.join("alpha.txt"), "").unwrap();
        std::fs::write(h.root.join("gamma.txt"), "").unwrap();

        let result = h.call("list_directory", json!({ "path": h.path("") })).await;
        assert_eq!(result.text, "[FILE] alpha.txt\n[DIR] beta\n[FILE] gamma.txt");

        let empty = h.call("list_directory", json!({ "path": h.path("beta") })).await;
        assert_eq!(empty.text, "(empty directory)");

        let file = h.call("list_directory", json!({ "path": h.path("alpha.txt") })).await;
        assert!(file.text.starts_with("Error: Not a directory:"));
    }

    fn search_tree(h: &Harness) {
        std::fs::create_dir_all(h.root.join("b")).unwrap();
        std::fs::write(h.root.join("a.md"), "").unwrap();
        std::fs::write(h.root.join("b/c.md"), "").unwrap();
        std::fs::write(h.root.join("b/d.txt"), "").unwrap();
    }

    #[tokio::test]
    async fn test_search_recursive() {
        let h = Harness::new();
        search_tree(&h);

        let result = h
            .call("search_files", json!({ "path": h.path(""), "pattern": "*.md", "recursive": true }))
            .await;
        assert_eq!(
            result.text,
            format!("Found 2 files:\n{}\n{}", h.path("a.md"), h.path("b/c.md"))
        );

        // Recursive is the default.
        let default = h
            .call("search_files", json!({ "path": h.path(""), "pattern": "*.md" }))
            .await;
        assert_eq!(default.text, result.text);
    }

    #[tokio::test]
    async fn test_search_non_recursive_and_no_match() {
        let h = Harness::new();
        search_tree(&h);

        let shallow = h
            .call("search_files", json!({ "path": h.path(""), "pattern": "*.md", "recursive": false }))
            .await;
        assert_eq!(shallow.text, format!("Found 1 files:\n{}", h.path("a.md")));

        let none = h
            .call("search_files", json!({ "path": h.path(""), "pattern": "*.rs" }))
            .await;
        assert!(!none.is_error);
        assert_eq!(none.text, format!("No files matching '*.rs' found in {}", h.path("")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_through_dangling_link_is_rejected() {
        let h = Harness::new();
        let planted = h.outside.join("planted.txt");
        std::os::unix::fs::symlink(&planted, h.root.join("link.txt")).unwrap();

        for op in ["write_file", "append_to_file"] {
            let result = h
                .call(op, json!({ "path": h.path("link.txt"), "content": "pwned" }))
                .await;
            assert!(result.is_error, "{op}: {}", result.text);
            assert!(result.text.starts_with("Error: Path not allowed"));
        }
        assert!(!planted.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_search_skips_links_leading_outside() {
        let h = Harness::new();
        std::fs::write(h.outside.join("secret.md"), "").unwrap();
        std::fs::write(h.root.join("real.md"), "").unwrap();
        std::os::unix::fs::symlink(h.outside.join("secret.md"), h.root.join("leak.md")).unwrap();
        std::os::unix::fs::symlink(h.root.join("real.md"), h.root.join("alias.md")).unwrap();

        let result = h
            .call("search_files", json!({ "path": h.path(""), "pattern": "*.md" }))
            .await;
        assert_eq!(
            result.text,
            format!("Found 2 files:\n{}\n{}", h.path("alias.md"), h.path("real.md"))
        );
    }

    #[tokio::test]
    async fn test_search_rejects_bad_pattern() {
        let h = Harness::new();
        let result = h
            .call("search_files", json!({ "path": h.path(""), "pattern": "[unclosed" }))
            .await;
        assert!(result.is_error);
        assert!(result.text.starts_with("Error: Invalid argument 'pattern'"));
    }
}
