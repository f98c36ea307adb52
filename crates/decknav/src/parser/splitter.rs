/// Split a document body (frontmatter already removed) into raw slide texts.
///
/// A new slide starts at:
/// 1. a `---` line with blank lines (or the document edge) on both sides,
/// 2. a run of three or more blank lines,
/// 3. a `# ` heading when the current slide already has content.
///
/// Nothing inside a fenced code block ever starts a slide.
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");
    let lines: Vec<&str> = body.split('\n').collect();

    let mut slides = Vec::new();
    let mut current = Chunk::default();
    let mut fence: Option<(char, usize)> = None;
    let mut blank_run = 0;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if let Some((ch, len)) = fence {
            if closes_fence(trimmed, ch, len) {
                fence = None;
            }
            current.push(line);
            continue;
        }

        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run == 3 {
                current.flush_into(&mut slides);
            } else if blank_run < 3 {
                current.push(line);
            }
            continue;
        }
        let prev_blank = blank_run > 0 || i == 0;
        blank_run = 0;

        if is_dash_separator(trimmed) {
            let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
            if prev_blank && next_blank {
                current.flush_into(&mut slides);
                continue;
            }
        }

        if let Some(ch) = opens_fence(trimmed) {
            let len = trimmed.chars().take_while(|&c| c == ch).count();
            fence = Some((ch, len));
            current.has_content = true;
            current.push(line);
            continue;
        }

        if line.starts_with("# ") && current.has_content {
            // `@key: value` lines just above the heading belong to the new slide.
            let carried = current.take_trailing_directives();
            current.flush_into(&mut slides);
            for directive in carried {
                current.push(&directive);
            }
        }

        if !is_directive(trimmed) {
            current.has_content = true;
        }
        current.push(line);
    }

    current.flush_into(&mut slides);
    slides
}

#[derive(Default)]
struct Chunk {
    lines: Vec<String>,
    has_content: bool,
}

impl Chunk {
    fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn flush_into(&mut self, slides: &mut Vec<String>) {
        let text = self.lines.join("\n").trim().to_string();
        if !text.is_empty() {
            slides.push(text);
        }
        self.lines.clear();
        self.has_content = false;
    }

    fn take_trailing_directives(&mut self) -> Vec<String> {
        let keep = self
            .lines
            .iter()
            .rposition(|l| {
                let t = l.trim();
                !t.is_empty() && !is_directive(t)
            })
            .map_or(0, |i| i + 1);
        self.lines
            .split_off(keep)
            .into_iter()
            .filter(|l| !l.trim().is_empty())
            .collect()
    }
}

fn opens_fence(trimmed: &str) -> Option<char> {
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

fn closes_fence(trimmed: &str, ch: char, len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == ch).count();
    count >= len && trimmed.chars().skip(count).all(char::is_whitespace)
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

pub(crate) fn is_directive(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('@') else {
        return false;
    };
    match rest.find(':') {
        Some(colon) => {
            colon > 0
                && rest[..colon]
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        }
        None => false,
    }
}
