//! Pure line rules for the `DEF` qualifier rewrite.

use std::borrow::Cow;

/// Keyword introducing a declaration in the current syntax.
pub const QUALIFIER: &str = "DEF";

/// Constant declaration keyword.
pub const DECLARATION: &str = "EQU";

/// Line comment marker.
pub const COMMENT_MARKER: char = ';';

/// Lines mentioning any of these are never rewritten.
pub const DIRECTIVES: [&str; 3] = ["INCLUDE", "SECTION", "EXPORT"];

/// Result of rewriting a whole source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedSource {
    pub text: String,
    /// Number of declarations that received the qualifier.
    pub qualified: usize,
}

/// Whether the text already uses the qualified declaration form.
///
/// The check is file-global: `DEF <ident> EQU` anywhere marks the whole
/// text as patched, even inside a comment or with unqualified declarations
/// remaining. The qualifier must start a word, so `UNDEF FOO EQU 1` does
/// not count.
pub fn is_patched(text: &str) -> bool {
    text.match_indices(QUALIFIER).any(|(start, _)| {
        let starts_word = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_ident_char(c));
        let rest = &text[start + QUALIFIER.len()..];
        let line_rest = rest.split('\n').next().unwrap_or("");
        starts_word
            && line_rest.starts_with(char::is_whitespace)
            && declaration_identifier(line_rest.trim_start()).is_some()
    })
}

/// Rewrite a single line.
///
/// Returns the line unchanged when `already_patched` is set, when the line
/// is excluded (comment, blank, contains the qualifier or a directive) or
/// when it does not have the `<ident> EQU <value>` shape. Otherwise the
/// qualifier is inserted before the identifier, keeping the indentation
/// and the rest of the line verbatim.
pub fn patch_line(line: &str, already_patched: bool) -> Cow<'_, str> {
    if already_patched || !is_candidate(line) {
        return Cow::Borrowed(line);
    }

    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    match declaration_identifier(body) {
        Some(_) => Cow::Owned(format!("{}{} {}", indent, QUALIFIER, body)),
        None => Cow::Borrowed(line),
    }
}

/// Rewrite every line of a source text.
///
/// Lines are split on `\n` and joined back the same way, so line endings
/// and a trailing newline survive untouched.
pub fn patch_source(text: &str) -> PatchedSource {
    let already_patched = is_patched(text);
    let mut qualified = 0;

    let lines: Vec<Cow<'_, str>> = text
        .split('\n')
        .map(|line| {
            let patched = patch_line(line, already_patched);
            if matches!(patched, Cow::Owned(_)) {
                qualified += 1;
            }
            patched
        })
        .collect();

    PatchedSource {
        text: lines.join("\n"),
        qualified,
    }
}

fn is_candidate(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
        return false;
    }
    if line.contains(&format!("{} ", QUALIFIER)) {
        return false;
    }
    !DIRECTIVES.iter().any(|d| line.contains(d))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Match `<ident> <ws>+ EQU <ws>+ <anything>` at the start of `body` and
/// return the identifier.
fn declaration_identifier(body: &str) -> Option<&str> {
    let mut chars = body.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }

    let ident_end = chars
        .find(|(_, c)| !is_ident_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    let (ident, rest) = body.split_at(ident_end);

    let after_ident = rest.trim_start();
    if after_ident.len() == rest.len() {
        return None;
    }

    let after_keyword = after_ident.strip_prefix(DECLARATION)?;
    if !after_keyword.starts_with(char::is_whitespace) {
        return None;
    }

    Some(ident)
}
