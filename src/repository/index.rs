//! Static `index.html` listings for the repository folders.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::fs::is_hidden;

pub const INDEX_FILENAME: &str = "index.html";

/// File names listed in an index when they contain one of these.
const LISTED_FILE_MARKERS: &[&str] = &[".md5", "README.md", ".xml", ".zip"];

/// Names linked as files; everything else links as a folder.
const FILE_LINK_MARKERS: &[&str] = &[".zip", ".md5", ".xml", ".md", ".txt"];

const PAGE: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">
<html>
  <head>
     <title>Index of</title>
  </head>
  <body>
    <h1>{{header}}</h1>
    <table>
{{rows}}
    </table>
  </body>
</html>
"#;

/// Sorted immediate children of `path` worth listing.
///
/// Hidden names are skipped. Folders are always listed; files only when
/// they look like a repository artifact.
pub fn list_dir_items(path: &Path) -> Result<Vec<String>> {
    let mut items = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_hidden(&name) {
            continue;
        }
        let listed = entry.path().is_dir()
            || LISTED_FILE_MARKERS
                .iter()
                .any(|marker| name.contains(marker));
        if listed {
            items.push(name);
        }
    }
    items.sort();
    Ok(items)
}

#[must_use]
pub fn render_index(header: &str, names: &[String]) -> String {
    let rows = names
        .iter()
        .map(|name| {
            let escaped = escape_html(name);
            let href = if is_file_link(name) {
                escaped.clone()
            } else {
                format!("{escaped}/")
            };
            format!("      <tr><td><a href=\"{href}\">{escaped}</a></td></tr>")
        })
        .collect::<Vec<_>>()
        .join("\n");

    PAGE.replace("{{header}}", &escape_html(header))
        .replace("{{rows}}", &rows)
}

/// Render and write `<path>/index.html`, headed by the folder name.
pub fn write_index(path: &Path) -> Result<PathBuf> {
    let names = list_dir_items(path)?;
    let header = folder_name(path);
    let target = path.join(INDEX_FILENAME);
    std::fs::write(&target, render_index(&header, &names))?;
    tracing::debug!(index = %target.display(), items = names.len(), "Wrote index");
    Ok(target)
}

fn is_file_link(name: &str) -> bool {
    FILE_LINK_MARKERS.iter().any(|marker| name.contains(marker))
}

fn folder_name(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .map_or_else(|| resolved.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
