use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

/// Split YAML frontmatter (between leading `---` lines) from the document body.
///
/// A document without a closing `---`, or whose block is not valid YAML, is
/// treated as having no frontmatter.
pub fn extract(content: &str) -> (Frontmatter, String) {
    let content = content.replace("\r\n", "\n");
    let Some(rest) = content.strip_prefix("---\n") else {
        return (Frontmatter::default(), content);
    };
    let Some(end) = rest.find("\n---") else {
        return (Frontmatter::default(), content);
    };

    let yaml = &rest[..end];
    let after = &rest[end + 4..];
    // The closing fence must be a line of its own.
    let body = match after.split_once('\n') {
        Some((tail, body)) if tail.trim().is_empty() => body,
        None if after.trim().is_empty() => "",
        _ => return (Frontmatter::default(), content),
    };

    match serde_yaml::from_str::<Frontmatter>(yaml) {
        Ok(meta) => (meta, body.to_string()),
        Err(err) => {
            tracing::warn!(%err, "ignoring malformed frontmatter");
            (Frontmatter::default(), content)
        }
    }
}
