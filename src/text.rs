//! Small string transforms exposed to templates.

/// Escape `&`, `<`, `>`, `"` and `'` for embedding in generated markup.
pub fn html_escape(text: &str) -> String {
    return text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&#34;")
        .replace('\'', "&#39;");
}

/// Escape the markdown emphasis characters `*` and `_`.
pub fn md_escape(text: &str) -> String {
    return text.replace('*', "\\*").replace('_', "\\_");
}

/// Wrap text in a Go code fence.
pub fn pre(text: &str) -> String {
    return format!("``` go\n{text}\n```");
}

/// Anchor slug: lowercase, spaces and dots to dashes, escaped `*` to `42`.
pub fn kebab(text: &str) -> String {
    return text
        .to_lowercase()
        .replace(' ', "-")
        .replace('.', "-")
        .replace("\\*", "42");
}

/// Escape square brackets, which Bitbucket's renderer reads as link syntax.
pub fn bitscape(text: &str) -> String {
    return text.replace('[', "\\[").replace(']', "\\]");
}

/// Lowercase and drop underscores, matching the anchors hosting platforms generate for headings.
pub fn clean_link(text: &str) -> String {
    return text.to_lowercase().replace('_', "");
}

/// Last slash-separated element of a path, ignoring trailing slashes.
/// Empty input yields `.` and an all-slash input yields `/`.
pub fn base(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    return trimmed.rsplit('/').next().unwrap_or(trimmed);
}

/// Remove `prefix` once from the start of `text`, if present.
pub fn trim_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    return text.strip_prefix(prefix).unwrap_or(text);
}
