//! Static import scanning
//!
//! A lexical scan, not a parser: it finds import specifiers written as string
//! literals, which is every form the resolution hooks need to see. A small
//! lexer blanks comments and records string literal spans first, so imports
//! inside comments or strings are not reported. Type-only imports are
//! skipped since type stripping removes them before anything is resolved.

use addonkit_core::ImportKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::ops::Range;
use std::path::Path;
use std::str::CharIndices;

/// Which import syntax a source file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFlavor {
    Script,
    Stylesheet,
}

impl SourceFlavor {
    /// Flavor for a file, or `None` for files that carry no imports
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" => Some(Self::Script),
            "css" | "scss" | "less" => Some(Self::Stylesheet),
            _ => None,
        }
    }
}

/// One import found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub specifier: String,
    pub kind: ImportKind,
    /// Byte offset of the specifier in the source
    pub offset: usize,
}

#[allow(clippy::expect_used)]
static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:^|[;}\s])(?:import|export)\s+(?:(?P<clause>[\w*{}\s,$]+?)\s+from\s*)?["'](?P<spec>[^"'\n]+)["']"#,
    )
    .expect("invalid regex")
});

#[allow(clippy::expect_used)]
static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*["'](?P<spec>[^"'\n]+)["']\s*\)"#).expect("invalid regex")
});

#[allow(clippy::expect_used)]
static REQUIRE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*["'](?P<spec>[^"'\n]+)["']\s*\)"#).expect("invalid regex")
});

#[allow(clippy::expect_used)]
static IMPORT_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']?(?P<spec>[^"')\s;]+)["']?\s*\)?"#)
        .expect("invalid regex")
});

#[allow(clippy::expect_used)]
static URL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\burl\(\s*["']?(?P<spec>[^"')\s]+)["']?\s*\)"#).expect("invalid regex")
});

/// Find every import in `source`, in source order
pub fn scan_imports(source: &str, flavor: SourceFlavor) -> Vec<ImportRef> {
    let lexed = Lexed::new(source, flavor);

    let mut imports = Vec::new();
    match flavor {
        SourceFlavor::Script => {
            lexed.collect(&STATIC_IMPORT, ImportKind::ImportStatement, &mut imports);
            lexed.collect(&DYNAMIC_IMPORT, ImportKind::DynamicImport, &mut imports);
            lexed.collect(&REQUIRE_CALL, ImportKind::RequireCall, &mut imports);
        }
        SourceFlavor::Stylesheet => {
            let rules = lexed.collect(&IMPORT_RULE, ImportKind::ImportRule, &mut imports);
            let mut urls = Vec::new();
            lexed.collect(&URL_TOKEN, ImportKind::UrlToken, &mut urls);
            // `@import url(x)` is one import, not two
            imports.extend(
                urls.into_iter()
                    .filter(|url| !rules.iter().any(|rule| rule.contains(&url.offset))),
            );
        }
    }

    imports.sort_by_key(|import| import.offset);
    imports
}

/// Source with comments blanked, and the byte spans of its string literals
///
/// Blanking keeps newlines and byte offsets, so offsets into `code` are
/// offsets into the original source.
struct Lexed {
    code: String,
    /// Quote to closing quote, inclusive
    literals: Vec<Range<usize>>,
}

impl Lexed {
    fn new(source: &str, flavor: SourceFlavor) -> Self {
        let script = flavor == SourceFlavor::Script;
        let mut code = String::with_capacity(source.len());
        let mut literals = Vec::new();
        let mut chars = source.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            let next = chars.peek().map(|&(_, next)| next);
            match c {
                '/' if next == Some('*') => {
                    blank(&mut code, c);
                    skip_block_comment(&mut chars, &mut code);
                }
                '/' if script && next == Some('/') => {
                    blank(&mut code, c);
                    while let Some(&(_, c)) = chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        blank(&mut code, c);
                        chars.next();
                    }
                }
                '"' | '\'' => {
                    code.push(c);
                    let end = copy_literal(&mut chars, &mut code, c, source.len());
                    literals.push(start..end);
                }
                '`' if script => {
                    code.push(c);
                    let end = copy_literal(&mut chars, &mut code, c, source.len());
                    literals.push(start..end);
                }
                c => code.push(c),
            }
        }

        Self { code, literals }
    }

    /// Push every accepted match of `pattern`; returns their spans
    fn collect(
        &self,
        pattern: &Regex,
        kind: ImportKind,
        out: &mut Vec<ImportRef>,
    ) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        for captures in pattern.captures_iter(&self.code) {
            let (Some(whole), Some(specifier)) = (captures.get(0), captures.name("spec")) else {
                continue;
            };
            if !self.is_code(whole.start(), specifier.start()) {
                continue;
            }
            if captures
                .name("clause")
                .is_some_and(|clause| is_type_only(clause.as_str()))
            {
                continue;
            }
            spans.push(whole.range());
            out.push(ImportRef {
                specifier: specifier.as_str().to_string(),
                kind,
                offset: specifier.start(),
            });
        }
        spans
    }

    /// Whether a match starting at `keyword` is real code whose specifier
    /// at `specifier` is a literal of its own
    fn is_code(&self, keyword: usize, specifier: usize) -> bool {
        let inside = |pos: usize| self.literals.iter().any(|r| r.start <= pos && pos < r.end);
        if inside(keyword) {
            return false;
        }
        match self.code[..specifier].chars().next_back() {
            Some('"' | '\'') => self.literals.iter().any(|r| r.start + 1 == specifier),
            _ => !inside(specifier),
        }
    }
}

fn blank(code: &mut String, c: char) {
    if c == '\n' {
        code.push('\n');
    } else {
        code.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}

/// Blank through the closing `*/`; the opening `/` is already consumed
fn skip_block_comment(chars: &mut Peekable<CharIndices<'_>>, code: &mut String) {
    // The `*` of the opener cannot also close the comment
    if let Some((_, star)) = chars.next() {
        blank(code, star);
    }
    let mut prev = '\0';
    for (_, c) in chars.by_ref() {
        blank(code, c);
        if prev == '*' && c == '/' {
            return;
        }
        prev = c;
    }
}

/// Copy a literal through its closing quote; returns the end offset
///
/// An unterminated quoted string ends before the newline; template literals
/// may span lines.
fn copy_literal(
    chars: &mut Peekable<CharIndices<'_>>,
    code: &mut String,
    quote: char,
    len: usize,
) -> usize {
    while let Some((offset, c)) = chars.next() {
        code.push(c);
        if c == '\\' {
            if let Some((_, escaped)) = chars.next() {
                code.push(escaped);
            }
        } else if c == quote {
            return offset + c.len_utf8();
        } else if c == '\n' && quote != '`' {
            return offset;
        }
    }
    len
}

/// `import type …`, `export type …`, or braces holding only `type` names
fn is_type_only(clause: &str) -> bool {
    let clause = clause.trim();
    let starts_with_type = |text: &str| {
        text.strip_prefix("type").is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '*')
        })
    };

    if starts_with_type(clause) {
        return true;
    }

    let Some(inner) = clause.strip_prefix('{').and_then(|c| c.strip_suffix('}')) else {
        return false;
    };
    let mut names = inner
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .peekable();
    names.peek().is_some() && names.all(starts_with_type)
}
