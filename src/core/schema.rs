//! Field limits and input validation for notes and queries

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 100_000;
pub const MAX_TAGS: usize = 20;
pub const MAX_TAG_CHARS: usize = 50;

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 500;
pub const DEFAULT_SEARCH_LIMIT: usize = 1;
pub const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaViolation {
    TitleTooLong(usize),
    ContentTooLong(usize),
    TooManyTags(usize),
    TagTooLong(String),
    EmptyQuery,
    LimitOutOfRange { limit: usize, max: usize },
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleTooLong(n) => {
                write!(f, "Title is {} characters (max {})", n, MAX_TITLE_CHARS)
            }
            Self::ContentTooLong(n) => {
                write!(f, "Content is {} characters (max {})", n, MAX_CONTENT_CHARS)
            }
            Self::TooManyTags(n) => write!(f, "Too many tags: {} (max {})", n, MAX_TAGS),
            Self::TagTooLong(t) => write!(
                f,
                "Tag '{}' exceeds maximum length of {} characters",
                t, MAX_TAG_CHARS
            ),
            Self::EmptyQuery => write!(f, "Search query must not be empty"),
            Self::LimitOutOfRange { limit, max } => {
                write!(f, "Limit {} out of range (must be 1..={})", limit, max)
            }
        }
    }
}

pub fn check_title(title: &str, violations: &mut Vec<SchemaViolation>) {
    let n = title.chars().count();
    if n > MAX_TITLE_CHARS {
        violations.push(SchemaViolation::TitleTooLong(n));
    }
}

pub fn check_content(content: &str, violations: &mut Vec<SchemaViolation>) {
    let n = content.chars().count();
    if n > MAX_CONTENT_CHARS {
        violations.push(SchemaViolation::ContentTooLong(n));
    }
}

pub fn check_tags(tags: &[String], violations: &mut Vec<SchemaViolation>) {
    if tags.len() > MAX_TAGS {
        violations.push(SchemaViolation::TooManyTags(tags.len()));
    }
    for tag in tags {
        if tag.chars().count() > MAX_TAG_CHARS {
            violations.push(SchemaViolation::TagTooLong(tag.clone()));
        }
    }
}

/// Resolve an optional limit against its default and ceiling
pub fn resolve_limit(
    limit: Option<usize>,
    default: usize,
    max: usize,
    violations: &mut Vec<SchemaViolation>,
) -> usize {
    let limit = limit.unwrap_or(default);
    if limit == 0 || limit > max {
        violations.push(SchemaViolation::LimitOutOfRange { limit, max });
    }
    limit
}
