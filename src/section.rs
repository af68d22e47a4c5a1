//! Merging a rendered section into existing ssh_config content.
//!
//! A section is the span from `# BEGIN [<key>]` to the next `# END [<key>]`,
//! plus the single newline that follows the footer. Anything outside that
//! span is preserved byte for byte, including sections owned by other keys.

use std::ops::Range;

use crate::error::{AppError, Result};
use crate::render::{footer, header, section_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Replaced,
    Appended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub content: String,
    pub action: MergeAction,
}

pub fn merge(existing: Option<&str>, config_key: &str, body: &[String]) -> Result<Merged> {
    let existing = existing.unwrap_or("");
    let section = section_text(config_key, body);

    match find_section(existing, config_key)? {
        Some(span) => {
            let mut content = String::with_capacity(existing.len() + section.len());
            content.push_str(&existing[..span.start]);
            content.push_str(&section);
            content.push_str(&existing[span.end..]);
            Ok(Merged { content, action: MergeAction::Replaced })
        }
        None => {
            let mut content = String::with_capacity(existing.len() + section.len() + 1);
            content.push_str(existing);
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            content.push_str(&section);
            Ok(Merged { content, action: MergeAction::Appended })
        }
    }
}

/// Byte range of the first `config_key` section, if any.
fn find_section(content: &str, config_key: &str) -> Result<Option<Range<usize>>> {
    let header = header(config_key);
    let footer = footer(config_key);

    let Some(start) = content.find(&header) else {
        return Ok(None);
    };
    let after_header = start + header.len();
    let Some(offset) = content[after_header..].find(&footer) else {
        return Err(AppError::UnterminatedSection(config_key.to_string()));
    };
    let mut end = after_header + offset + footer.len();
    if content[end..].starts_with('\n') {
        end += 1;
    }
    Ok(Some(start..end))
}
