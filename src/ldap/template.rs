//! Placeholder templates for DN patterns and search filters.
//!
//! # Syntax
//! ```text
//! uid={0},ou=Users           DN pattern, {0} = login
//! (uid={0})                  user search filter, {0} = login
//! (uniqueMember={0})         group search filter, {0} = user DN, {1} = login
//! ```
//!
//! # Design Decisions
//! - Templates are parsed once (on reload) and rendered many times
//! - Each usage has a fixed arity; out-of-range placeholders are rejected up front
//! - Arguments are escaped on render (RFC 4514 for DNs, RFC 4515 for filters)

use thiserror::Error;

/// Placeholders available in a user DN pattern: `{0}` = login.
pub const DN_PATTERN_ARITY: usize = 1;

/// Placeholders available in a user search filter: `{0}` = login.
pub const USER_SEARCH_ARITY: usize = 1;

/// Placeholders available in a group search filter: `{0}` = user DN, `{1}` = login.
pub const GROUP_SEARCH_ARITY: usize = 2;

/// Errors raised while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' at offset {0}")]
    UnclosedPlaceholder(usize),

    #[error("unexpected '}}' at offset {0}")]
    UnexpectedClosingBrace(usize),

    #[error("placeholder '{{{0}}}' is not an argument index")]
    InvalidPlaceholder(String),

    #[error("placeholder {{{index}}} is out of range, at most {arity} argument(s) available")]
    IndexOutOfRange { index: usize, arity: usize },

    #[error("filter must be enclosed in parentheses")]
    NotParenthesised,

    #[error("unbalanced parentheses at offset {0}")]
    UnbalancedParentheses(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Arg(usize),
}

/// A parsed placeholder template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, accepting placeholders `{0}` .. `{arity - 1}`.
    pub fn parse(source: &str, arity: usize) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::UnclosedPlaceholder(offset));
                    }

                    let index: usize = name
                        .parse()
                        .map_err(|_| TemplateError::InvalidPlaceholder(name.clone()))?;
                    if index >= arity {
                        return Err(TemplateError::IndexOutOfRange { index, arity });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Arg(index));
                }
                '}' => return Err(TemplateError::UnexpectedClosingBrace(offset)),
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Argument indexes referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Arg(i) => Some(*i),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute `args`, escaping each one with `escape`.
    pub fn render(&self, args: &[&str], escape: fn(&str) -> String) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Arg(i) => {
                    if let Some(arg) = args.get(*i) {
                        out.push_str(&escape(arg));
                    }
                }
            }
        }
        out
    }
}

/// Check that a search filter is a single parenthesised expression with balanced parentheses.
///
/// Escaped characters (`\28`, `\29`) are plain hex sequences, so a literal
/// parenthesis always counts.
pub fn check_filter_syntax(filter: &str) -> Result<(), TemplateError> {
    let trimmed = filter.trim();
    if !trimmed.starts_with('(') || !trimmed.ends_with(')') {
        return Err(TemplateError::NotParenthesised);
    }

    let mut depth: usize = 0;
    for (offset, c) in trimmed.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(TemplateError::UnbalancedParentheses(offset))?;
                if depth == 0 && offset + 1 != trimmed.len() {
                    // A second top-level expression, e.g. "(a=1)(b=2)".
                    return Err(TemplateError::NotParenthesised);
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(TemplateError::UnbalancedParentheses(trimmed.len()));
    }
    Ok(())
}

/// Escape an attribute value for use inside a DN (RFC 4514 section 2.4).
pub fn escape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);

    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' | ',' | '+' | '"' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\00"),
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an assertion value for use inside a search filter (RFC 4515 section 3).
pub fn escape_filter_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => out.push_str("\\2a"),
            '(' => out.push_str("\\28"),
            ')' => out.push_str("\\29"),
            '\\' => out.push_str("\\5c"),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render_dn_pattern() {
        let template = Template::parse("uid={0},ou=Users", DN_PATTERN_ARITY).unwrap();
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec![0]);
        assert_eq!(
            template.render(&["przemyslaw"], escape_dn_value),
            "uid=przemyslaw,ou=Users"
        );
    }

    #[test]
    fn test_placeholder_out_of_range() {
        let err = Template::parse("(member={1})", USER_SEARCH_ARITY).unwrap_err();
        assert_eq!(err, TemplateError::IndexOutOfRange { index: 1, arity: 1 });

        // Group search may reference the login as {1}.
        assert!(Template::parse("(&(member={0})(cn={1}))", GROUP_SEARCH_ARITY).is_ok());
    }

    #[test]
    fn test_malformed_braces() {
        assert_eq!(
            Template::parse("uid={0,ou=Users", 1).unwrap_err(),
            TemplateError::UnclosedPlaceholder(4)
        );
        assert_eq!(
            Template::parse("uid=0},ou=Users", 1).unwrap_err(),
            TemplateError::UnexpectedClosingBrace(5)
        );
        assert_eq!(
            Template::parse("uid={login}", 1).unwrap_err(),
            TemplateError::InvalidPlaceholder("login".into())
        );
    }

    #[test]
    fn test_template_without_placeholders() {
        let template = Template::parse("cn=admin,dc=example", 1).unwrap();
        assert_eq!(template.placeholders().count(), 0);
        assert_eq!(template.render(&["ignored"], escape_dn_value), "cn=admin,dc=example");
    }

    #[test]
    fn test_filter_syntax() {
        assert!(check_filter_syntax("(uid={0})").is_ok());
        assert!(check_filter_syntax("(&(objectClass=person)(uid={0}))").is_ok());
        assert_eq!(check_filter_syntax("uid={0}"), Err(TemplateError::NotParenthesised));
        assert_eq!(check_filter_syntax("(a=1)(b=2)"), Err(TemplateError::NotParenthesised));
        assert!(matches!(
            check_filter_syntax("(&(uid={0})"),
            Err(TemplateError::UnbalancedParentheses(_))
        ));
    }

    #[test]
    fn test_escape_dn_value() {
        assert_eq!(escape_dn_value("Smith, John"), "Smith\\, John");
        assert_eq!(escape_dn_value("#admin"), "\\#admin");
        assert_eq!(escape_dn_value(" padded "), "\\ padded\\ ");
        assert_eq!(escape_dn_value("a=b+c"), "a\\=b\\+c");
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("*)(uid=*"), "\\2a\\29\\28uid=\\2a");
        assert_eq!(escape_filter_value("back\\slash"), "back\\5cslash");
        assert_eq!(escape_filter_value("plain"), "plain");
    }
}
