//! Structured documentation comments.
//!
//! A doc block is a free-text summary, an optional long description and a
//! list of `@tag` lines. Comment markers (`/** */`, leading `*`, `///`, `//!`)
//! are stripped before parsing, so raw comment text can be passed as-is.

use super::TypeRef;

/// One `@tag` of a doc block
#[derive(Debug, Clone, PartialEq)]
pub enum DocTag {
    /// `@param [Type] $name [text]` or `@param name [text]`
    Param {
        type_ref: Option<TypeRef>,
        variable: String,
        description: String,
    },
    /// `@return Type [text]`
    Return { type_ref: TypeRef, description: String },
    /// `@throws Type [text]`
    Throws { type_ref: TypeRef, description: String },
    /// `@deprecated [text]`
    Deprecated { description: String },
    /// Any other tag, body kept verbatim
    Other { name: String, body: String },
}

/// A parsed documentation comment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocBlock {
    pub summary: String,
    pub description: String,
    pub tags: Vec<DocTag>,
}

impl DocBlock {
    /// Parse raw comment text. Never fails; malformed tags are kept as [`DocTag::Other`].
    pub fn parse(raw: &str) -> DocBlock {
        let lines = strip_comment_markers(raw);

        let mut text_lines: Vec<&str> = Vec::new();
        let mut raw_tags: Vec<(String, String)> = Vec::new();
        for line in &lines {
            let trimmed = line.trim();
            if let Some(tag_line) = trimmed.strip_prefix('@') {
                let (name, body) = match tag_line.split_once(char::is_whitespace) {
                    Some((name, body)) => (name, body.trim()),
                    None => (tag_line, ""),
                };
                raw_tags.push((name.to_string(), body.to_string()));
            } else if let Some((_, body)) = raw_tags.last_mut() {
                // continuation of the previous tag
                if !trimmed.is_empty() {
                    if !body.is_empty() {
                        body.push(' ');
                    }
                    body.push_str(trimmed);
                }
            } else {
                text_lines.push(line.as_str());
            }
        }

        let (summary, description) = split_summary(&text_lines);
        let tags = raw_tags
            .into_iter()
            .map(|(name, body)| parse_tag(name, body))
            .collect();

        DocBlock {
            summary,
            description,
            tags,
        }
    }

    /// Summary and long description joined by a blank line
    pub fn full_text(&self) -> String {
        match (self.summary.is_empty(), self.description.is_empty()) {
            (false, false) => format!("{}\n\n{}", self.summary, self.description),
            (false, true) => self.summary.clone(),
            (true, _) => self.description.clone(),
        }
    }

    pub fn params(&self) -> impl Iterator<Item = &DocTag> {
        self.tags.iter().filter(|tag| matches!(tag, DocTag::Param { .. }))
    }

    pub fn returns(&self) -> impl Iterator<Item = &DocTag> {
        self.tags.iter().filter(|tag| matches!(tag, DocTag::Return { .. }))
    }

    pub fn throws(&self) -> impl Iterator<Item = &DocTag> {
        self.tags.iter().filter(|tag| matches!(tag, DocTag::Throws { .. }))
    }

    pub fn is_deprecated(&self) -> bool {
        self.tags.iter().any(|tag| matches!(tag, DocTag::Deprecated { .. }))
    }

    /// Bodies of every generic tag called `name`
    pub fn other_tags<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags.iter().filter_map(move |tag| match tag {
            DocTag::Other { name: tag_name, body } if tag_name == name => Some(body.as_str()),
            _ => None,
        })
    }
}

fn strip_comment_markers(raw: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let mut text = line.trim();
        for marker in ["/**", "///", "//!", "/*"] {
            if let Some(rest) = text.strip_prefix(marker) {
                text = rest;
                break;
            }
        }
        if let Some(rest) = text.trim_end().strip_suffix("*/") {
            text = rest;
        }
        let text = text.trim_start();
        let text = match text.strip_prefix('*') {
            Some(rest) => rest,
            None => text,
        };
        let text = text.strip_prefix(' ').unwrap_or(text);
        lines.push(text.trim_end().to_string());
    }
    lines
}

/// Summary runs to the first blank line or the first line ending with a period
fn split_summary(lines: &[&str]) -> (String, String) {
    let start = lines.iter().position(|line| !line.trim().is_empty());
    let Some(start) = start else {
        return (String::new(), String::new());
    };

    let mut summary = Vec::new();
    let mut index = start;
    while index < lines.len() {
        let line = lines[index].trim();
        if line.is_empty() {
            break;
        }
        summary.push(line);
        index += 1;
        if line.ends_with('.') {
            break;
        }
    }

    let description = lines[index..].join("\n").trim().to_string();
    (summary.join(" "), description)
}

/// Split off the first whitespace-delimited token, keeping `<...>` groups whole
fn next_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    let mut depth = 0usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                return Some((&text[..index], text[index..].trim()));
            }
            _ => {}
        }
    }
    Some((text, ""))
}

fn parse_tag(name: String, body: String) -> DocTag {
    match name.as_str() {
        "param" => {
            let Some((first, rest)) = next_token(&body) else {
                return DocTag::Other { name, body };
            };
            let (type_ref, variable, description) = if first.starts_with('$') {
                (None, first, rest)
            } else {
                match next_token(rest) {
                    Some((second, tail)) if second.starts_with('$') => (TypeRef::parse(first), second, tail),
                    _ => (None, first, rest),
                }
            };
            DocTag::Param {
                type_ref,
                variable: variable.trim_start_matches('$').to_string(),
                description: description.to_string(),
            }
        }
        "return" | "returns" | "throws" | "throw" => {
            let Some((type_text, description)) = next_token(&body) else {
                return DocTag::Other { name, body };
            };
            let Some(type_ref) = TypeRef::parse(type_text) else {
                return DocTag::Other { name, body };
            };
            let description = description.to_string();
            if name.starts_with("return") {
                DocTag::Return { type_ref, description }
            } else {
                DocTag::Throws { type_ref, description }
            }
        }
        "deprecated" => DocTag::Deprecated { description: body },
        _ => DocTag::Other { name, body },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_block_comment() {
        let raw = r#"/**
         * Fetch a single user.
         *
         * Looks the user up by its identifier and
         * returns the public representation.
         *
         * @param int $id The user identifier
         * @return User the user
         * @throws NotFoundException when missing
         * @deprecated
         */"#;

        let block = DocBlock::parse(raw);

        assert_eq!(block.summary, "Fetch a single user.");
        assert_eq!(
            block.description,
            "Looks the user up by its identifier and\nreturns the public representation."
        );
        assert_eq!(
            block.tags,
            vec![
                DocTag::Param {
                    type_ref: Some(TypeRef::named("int")),
                    variable: "id".to_string(),
                    description: "The user identifier".to_string(),
                },
                DocTag::Return {
                    type_ref: TypeRef::named("User"),
                    description: "the user".to_string(),
                },
                DocTag::Throws {
                    type_ref: TypeRef::named("NotFoundException"),
                    description: "when missing".to_string(),
                },
                DocTag::Deprecated { description: String::new() },
            ]
        );
        assert!(block.is_deprecated());
    }

    #[test]
    fn test_parse_rust_style_block() {
        let raw = "/// Lists users\n/// page by page\n///\n/// @param page Page number\n/// @return Vec<User>";
        let block = DocBlock::parse(raw);

        assert_eq!(block.summary, "Lists users page by page");
        assert_eq!(block.description, "");
        assert_eq!(
            block.params().next(),
            Some(&DocTag::Param {
                type_ref: None,
                variable: "page".to_string(),
                description: "Page number".to_string(),
            })
        );
        assert_eq!(block.returns().count(), 1);
    }

    #[test]
    fn test_summary_stops_at_period() {
        let block = DocBlock::parse("First sentence.\nSecond line belongs to the description.");
        assert_eq!(block.summary, "First sentence.");
        assert_eq!(block.description, "Second line belongs to the description.");
        assert_eq!(
            block.full_text(),
            "First sentence.\n\nSecond line belongs to the description."
        );
    }

    #[test]
    fn test_tag_continuation_lines() {
        let raw = "@throws AccessDenied when the caller\n   lacks the permission";
        let block = DocBlock::parse(raw);

        assert_eq!(
            block.throws().next(),
            Some(&DocTag::Throws {
                type_ref: TypeRef::named("AccessDenied"),
                description: "when the caller lacks the permission".to_string(),
            })
        );
    }

    #[test]
    fn test_param_variable_without_type() {
        let block = DocBlock::parse("@param $filter Optional filter");
        assert_eq!(
            block.tags[0],
            DocTag::Param {
                type_ref: None,
                variable: "filter".to_string(),
                description: "Optional filter".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_and_malformed_tags_are_kept() {
        let block = DocBlock::parse("@groups read write\n@readonly\n@return");
        let groups: Vec<_> = block.other_tags("groups").collect();

        assert_eq!(groups, vec!["read write"]);
        assert_eq!(block.other_tags("readonly").count(), 1);
        assert_eq!(block.other_tags("return").count(), 1);
        assert_eq!(block.returns().count(), 0);
    }

    #[test]
    fn test_generic_types_with_spaces() {
        let block = DocBlock::parse("@return array<string, User> users by login");
        assert_eq!(
            block.tags[0],
            DocTag::Return {
                type_ref: TypeRef::parse("array<string,User>").unwrap(),
                description: "users by login".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_comment() {
        let block = DocBlock::parse("/** */");
        assert_eq!(block, DocBlock::default());
        assert_eq!(block.full_text(), "");
    }
}
