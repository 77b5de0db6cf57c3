//! In-memory rewriting of downloaded artifacts.
//!
//! Both patchers are pure string functions that never touch the filesystem.
//! Patching a config twice gives the same result as patching it once.

use crate::core::error::{Error, Result};
use regex::{Captures, Regex};

/// Copyright default as it appears in the upstream hook script.
pub const COPYRIGHT_PLACEHOLDER: &str =
    "${REUSE_COPYRIGHT:-The Contributors to Eclipse OpenSOVD (see CONTRIBUTORS)}";

/// License default as it appears in the upstream hook script.
pub const LICENSE_PLACEHOLDER: &str = "${REUSE_LICENSE:-Apache-2.0}";

/// Template default as it appears in the upstream hook script.
pub const TEMPLATE_PLACEHOLDER: &str = "${REUSE_TEMPLATE:-opensovd}";

/// Flag that keeps formatters from touching files.
const DIFF_FLAG: &str = "--diff";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Internal {
        message: format!("invalid patch pattern {pattern}: {e}"),
    })
}

/// Switches pre-commit configs between CI mode and fix mode.
#[derive(Debug, Clone)]
pub struct ConfigPatcher {
    /// `--no-fix` as a standalone argument, in block or flow YAML.
    no_fix: Regex,
    /// A block sequence line whose only item is `--diff`.
    diff_item: Regex,
    /// A mapping key with no inline value, opening a nested block.
    bare_key: Regex,
    /// A single-line flow sequence such as `[--diff, --quiet]`.
    flow_sequence: Regex,
}

/// A `key:` line whose block sequence is being scanned.
#[derive(Debug)]
struct OpenKey {
    /// Index of the key line in the output.
    line: usize,
    indent: usize,
    removed_item: bool,
    kept_item: bool,
}

impl ConfigPatcher {
    /// Compiles the rewrite patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            no_fix: compile(r#"(?m)(^|[\s\[,"'])--no-fix($|[\s\],"'])"#)?,
            diff_item: compile(r#"^[ \t]*-[ \t]+["']?--diff["']?[ \t]*(?:#.*)?$"#)?,
            bare_key: compile(r#"^([ \t]*)([^\s#:'"\[\]{}-][^:#]*):[ \t]*(#.*)?$"#)?,
            flow_sequence: compile(r"\[([^\[\]\n]*)\]")?,
        })
    }

    /// Patches `content` for the given mode.
    ///
    /// In fix mode every `--no-fix` argument becomes `--fix` and every
    /// `--diff` argument is dropped, so linters and formatters rewrite files
    /// in place. A key left without items becomes an empty flow sequence.
    /// Otherwise the content is returned unmodified.
    #[must_use]
    pub fn patch(&self, content: &str, fix_mode: bool) -> String {
        if !fix_mode {
            return content.to_string();
        }

        let mut patched = content.to_string();
        // Adjacent matches share their delimiter, so repeat until stable.
        loop {
            let next = self
                .no_fix
                .replace_all(&patched, "${1}--fix${2}")
                .into_owned();
            if next == patched {
                break;
            }
            patched = next;
        }

        let patched = self.strip_diff_items(&patched);
        self.flow_sequence
            .replace_all(&patched, |caps: &Captures<'_>| strip_diff_from_flow(caps))
            .into_owned()
    }

    /// Drops block sequence items that are only `--diff`.
    ///
    /// pre-commit rejects a null `args`, so a key whose items were all
    /// removed is rewritten to `key: []`.
    fn strip_diff_items(&self, content: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut open: Option<OpenKey> = None;

        for raw in content.split_inclusive('\n') {
            let line = raw.trim_end_matches(['\r', '\n']);
            let indent = line.len() - line.trim_start().len();

            if self.diff_item.is_match(line) {
                if let Some(key) = open.as_mut().filter(|key| indent >= key.indent) {
                    key.removed_item = true;
                }
                continue;
            }

            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                lines.push(raw.to_string());
                continue;
            }

            if is_sequence_item(trimmed) {
                if let Some(key) = open.as_mut().filter(|key| indent >= key.indent) {
                    key.kept_item = true;
                    lines.push(raw.to_string());
                    continue;
                }
            }

            if let Some(key) = open.take() {
                self.close_key(&mut lines, &key);
            }
            if self.bare_key.is_match(line) {
                open = Some(OpenKey {
                    line: lines.len(),
                    indent,
                    removed_item: false,
                    kept_item: false,
                });
            }
            lines.push(raw.to_string());
        }

        if let Some(key) = open.take() {
            self.close_key(&mut lines, &key);
        }
        lines.concat()
    }

    /// Rewrites an emptied `key:` line to `key: []`, keeping any comment.
    fn close_key(&self, lines: &mut [String], key: &OpenKey) {
        if !key.removed_item || key.kept_item {
            return;
        }
        let Some(raw) = lines.get_mut(key.line) else {
            return;
        };
        let body = raw.trim_end_matches(['\r', '\n']);
        let ending = raw[body.len()..].to_string();
        let Some(caps) = self.bare_key.captures(body) else {
            return;
        };
        let comment = caps.get(3).map_or(String::new(), |c| format!(" {}", c.as_str()));
        *raw = format!("{}{}: []{comment}{ending}", &caps[1], &caps[2]);
    }
}

fn is_sequence_item(trimmed: &str) -> bool {
    trimmed == "-" || trimmed.starts_with("- ") || trimmed.starts_with("-\t")
}

/// Switches a pre-commit config between CI and fix mode.
///
/// Convenience wrapper around [`ConfigPatcher::patch`].
pub fn patch_config(content: &str, fix_mode: bool) -> Result<String> {
    Ok(ConfigPatcher::new()?.patch(content, fix_mode))
}

/// Removes `--diff` entries from one flow sequence, leaving other sequences
/// byte-identical.
fn strip_diff_from_flow(caps: &Captures<'_>) -> String {
    let items: Vec<&str> = caps[1].split(',').collect();
    let is_diff =
        |item: &&str| item.trim().trim_matches(|c: char| c == '"' || c == '\'') == DIFF_FLAG;

    if !items.iter().any(is_diff) {
        return caps[0].to_string();
    }

    let kept: Vec<&str> = items
        .iter()
        .filter(|item| !is_diff(*item))
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect();
    format!("[{}]", kept.join(", "))
}

/// Bakes resolved values into the license-annotation hook script.
#[derive(Debug, Clone)]
pub struct HookPatcher {
    /// Any of the three upstream `${VAR:-default}` expressions.
    placeholders: Regex,
}

impl HookPatcher {
    /// Compiles the placeholder pattern.
    pub fn new() -> Result<Self> {
        let pattern = [COPYRIGHT_PLACEHOLDER, LICENSE_PLACEHOLDER, TEMPLATE_PLACEHOLDER]
            .map(regex::escape)
            .join("|");
        Ok(Self {
            placeholders: compile(&pattern)?,
        })
    }

    /// Replaces the placeholders in one pass.
    ///
    /// Values are escaped for use inside a double-quoted shell string, so the
    /// script no longer reads the environment. Inserted values are never
    /// scanned again and all other text is untouched.
    #[must_use]
    pub fn patch(&self, content: &str, copyright: &str, license: &str, template: &str) -> String {
        self.placeholders
            .replace_all(content, |caps: &Captures<'_>| {
                let value = match &caps[0] {
                    COPYRIGHT_PLACEHOLDER => copyright,
                    LICENSE_PLACEHOLDER => license,
                    _ => template,
                };
                escape_double_quoted(value)
            })
            .into_owned()
    }
}

/// Bakes resolved values into the license-annotation hook script.
///
/// Convenience wrapper around [`HookPatcher::patch`].
pub fn patch_hook_script(
    content: &str,
    copyright: &str,
    license: &str,
    template: &str,
) -> Result<String> {
    Ok(HookPatcher::new()?.patch(content, copyright, license, template))
}

/// Escapes the characters that stay special inside `"..."` in POSIX sh.
fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
