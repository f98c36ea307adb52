pub mod frontmatter;
pub mod splitter;

use std::sync::LazyLock;

use regex::Regex;

use crate::deck::{Deck, Fragment, Slide};

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z0-9_-]+):\s*(.*)$").expect("valid regex"));
static FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+\s+(.+)$").expect("valid regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

/// Parse a markdown slide document into a deck snapshot.
pub fn parse(content: &str) -> Deck {
    let (meta, body) = frontmatter::extract(content);
    let slides = splitter::split(&body)
        .iter()
        .map(|raw| parse_slide(raw))
        .collect();
    Deck::new(meta.title, meta.theme, slides)
}

fn parse_slide(raw: &str) -> Slide {
    let mut directives = Vec::new();
    let mut title = None;
    let mut lines = Vec::new();
    let mut fragments = Vec::new();
    let mut in_fence = false;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            lines.push(line.to_string());
            continue;
        }
        if let Some(caps) = DIRECTIVE.captures(trimmed) {
            directives.push(Directive {
                name: caps[1].to_lowercase(),
                value: caps[2].trim().to_string(),
            });
            continue;
        }
        if title.is_none() {
            if let Some(caps) = HEADING.captures(trimmed) {
                title = Some(caps[1].trim().to_string());
                continue;
            }
        }
        if let Some(caps) = FRAGMENT.captures(line) {
            fragments.push(Fragment::new(caps[1].trim()));
            continue;
        }
        // Keep paragraph breaks but not leading blank lines.
        if trimmed.is_empty() && lines.is_empty() {
            continue;
        }
        lines.push(trimmed.to_string());
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let slide = Slide::new(title, lines, fragments);
    if numbering_disabled(&directives) {
        slide.without_number()
    } else {
        slide
    }
}

fn numbering_disabled(directives: &[Directive]) -> bool {
    directives
        .iter()
        .any(|d| d.name == "number" && matches!(d.value.as_str(), "off" | "false" | "none"))
}
