//! Language hints for syntax highlighting.

use crate::links::file_extension;

/// Guess a highlighting language for a gist.
///
/// The attached file name wins when it has a known extension; otherwise a
/// few cheap content sniffs are tried before falling back to `"text"`.
pub fn language_hint(file_name: Option<&str>, content: &str) -> &'static str {
    if let Some(lang) = file_name.and_then(file_extension).and_then(|ext| from_extension(&ext)) {
        return lang;
    }
    sniff(content)
}

/// Map a file extension to a highlighter language name.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let lang = match ext.trim().to_ascii_lowercase().as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "jsx" => "jsx",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "sh" | "bash" | "zsh" => "bash",
        "md" | "markdown" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "html" | "htm" => "html",
        "xml" | "svg" => "xml",
        "css" => "css",
        "sql" => "sql",
        "txt" | "text" => "text",
        _ => return None,
    };
    Some(lang)
}

fn sniff(content: &str) -> &'static str {
    let head = content.trim_start();
    if head.starts_with("#!") {
        let first_line = head.lines().next().unwrap_or_default();
        if first_line.contains("python") {
            return "python";
        }
        if first_line.contains("sh") {
            return "bash";
        }
    }
    if (head.starts_with('{') || head.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(content).is_ok()
    {
        return "json";
    }
    if head.starts_with("<!DOCTYPE html") || head.starts_with("<html") {
        return "html";
    }
    if head.contains("fn main()") || head.contains("use std::") {
        return "rust";
    }
    if head.contains("console.log(") || head.contains("function ") || head.contains("const ") {
        return "javascript";
    }
    if head.contains("def ") && head.contains(':') {
        return "python";
    }
    "text"
}
