//! Line-oriented markdown dissection: front matter, heading sections,
//! fenced code blocks, and snippet windows.
//!
//! All extraction here is tolerant by construction. A missing or
//! unterminated front-matter fence means "no front matter"; an
//! unterminated code fence is simply never closed and its trailing
//! content discarded. Nothing in this module touches the filesystem.

/// A heading-delimited span of the document body.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    /// Heading nesting level (1-6).
    pub level: usize,
    pub content: String,
    /// 1-based line numbers within the body.
    pub start_line: usize,
    pub end_line: usize,
}

/// A fenced code block with its language tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// A short excerpt around the first query match in a document body.
#[derive(Debug, Clone)]
pub struct Snippet {
    pub text: String,
    /// True when the query substring was actually found; false when the
    /// snippet fell back to the opening lines.
    pub matched: bool,
}

/// Split a document into its raw front-matter block and body.
///
/// The front matter is the text between an opening `---` on the first
/// line and the next `---` line. Without a closing fence the entire
/// content is treated as body.
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let rest = match content.strip_prefix("---") {
        Some(r) => r,
        None => return (None, content),
    };
    // The opening fence must be the whole first line.
    let rest = match rest.strip_prefix('\n') {
        Some(r) => r,
        None => match rest.strip_prefix("\r\n") {
            Some(r) => r,
            None => return (None, content),
        },
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(front), body);
        }
        offset += line.len();
    }

    (None, content)
}

/// Split the body into heading-delimited sections.
///
/// Content before the first heading is not captured. Levels follow the
/// number of `#` markers (1-6).
pub fn extract_sections(body: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for (idx, line) in body.lines().enumerate() {
        if let Some((level, title)) = parse_heading(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section {
                title: title.to_string(),
                level,
                content: String::new(),
                start_line: idx + 1,
                end_line: idx + 1,
            });
        } else if let Some(section) = current.as_mut() {
            section.content.push_str(line);
            section.content.push('\n');
            section.end_line = idx + 1;
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }

    sections
}

fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(' ') {
        return None;
    }
    let title = rest.trim();
    if title.is_empty() {
        return None;
    }
    Some((hashes, title))
}

/// Extract fenced code blocks with their language tags.
///
/// An opening fence without a closing fence never produces a block.
pub fn extract_code_blocks(body: &str) -> Vec<CodeBlock> {
    let mut blocks: Vec<CodeBlock> = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for (idx, line) in body.lines().enumerate() {
        if let Some(mut block) = current.take() {
            if line.starts_with("```") {
                block.end_line = idx + 1;
                blocks.push(block);
            } else {
                block.code.push_str(line);
                block.code.push('\n');
                current = Some(block);
            }
        } else if let Some(rest) = line.strip_prefix("```") {
            let tag: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            current = Some(CodeBlock {
                language: if tag.is_empty() {
                    "plaintext".to_string()
                } else {
                    tag
                },
                code: String::new(),
                start_line: idx + 1,
                end_line: idx + 1,
            });
        }
    }

    blocks
}

/// Extract a window of lines around the first case-insensitive occurrence
/// of `query`. Falls back to the opening lines when nothing matches.
pub fn extract_snippet(content: &str, query: &str, context_lines: usize) -> Snippet {
    let lines: Vec<&str> = content.lines().collect();
    let needle = query.to_lowercase();

    for (idx, line) in lines.iter().enumerate() {
        if line.to_lowercase().contains(&needle) {
            let start = idx.saturating_sub(context_lines);
            let end = (idx + context_lines + 1).min(lines.len());
            return Snippet {
                text: lines[start..end].join("\n"),
                matched: true,
            };
        }
    }

    Snippet {
        text: lines.iter().take(3).copied().collect::<Vec<_>>().join("\n"),
        matched: false,
    }
}
