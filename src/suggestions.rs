//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kustomize_diff::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Invalid regex pattern: {}", pattern);
//!
//! // Use:
//! return Err(suggestions::invalid_regex("--include", pattern, &error));
//! ```

use std::path::Path;

use crate::error::Error;

/// Values accepted by `--kustomize-load-restrictor`.
pub const LOAD_RESTRICTORS: [&str; 3] = [
    "LoadRestrictionsUnknown",
    "LoadRestrictionsRootOnly",
    "LoadRestrictionsNone",
];

/// Generate an error for an invalid `--include`/`--exclude` pattern.
///
/// Includes hints about common regex mistakes.
pub fn invalid_regex(option: &str, pattern: &str, error: &regex::Error) -> anyhow::Error {
    let hint = match error {
        regex::Error::Syntax(msg) if msg.contains("unclosed") => {
            "hint: Check for unclosed brackets, parentheses, or braces"
        }
        regex::Error::Syntax(msg) if msg.contains("repetition") => {
            "hint: Repetition operators (+, *, ?) must follow a pattern"
        }
        _ => "hint: Patterns are matched against unit paths relative to the run directory, e.g. 'apps/web'",
    };

    anyhow::anyhow!(
        "Invalid regex pattern for {option}: {pattern}\n\
         error: {error}\n\n\
         {hint}\n\
         hint: Test patterns at https://regex101.com (select Rust flavor)"
    )
}

/// Generate an error for an unknown load restrictor.
///
/// Lists the accepted values and suggests a close match.
pub fn unknown_load_restrictor(value: &str) -> anyhow::Error {
    let did_you_mean = find_similar(value, &LOAD_RESTRICTORS)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown load restrictor: {value}{did_you_mean}\n\n\
         Valid load restrictors are: {values}\n\
         hint: Omit --kustomize-load-restrictor to use the renderer default",
        values = LOAD_RESTRICTORS.join(", ")
    )
}

/// Generate an error for a commit-ish that does not resolve.
///
/// Includes hints about fetching and choosing another base or target.
pub fn unresolved_reference(reference: &str, error: &Error) -> anyhow::Error {
    let remote_hint = if reference.contains('/') {
        "hint: Run 'git fetch --all' if the remote branch was never fetched\n"
    } else {
        ""
    };

    anyhow::anyhow!(
        "{error}\n\n\
         {remote_hint}\
         hint: Use --base and --target to pick other commits (e.g. '--base main')\n\
         hint: A detached HEAD needs an explicit --target"
    )
}

/// Generate an error for a run directory outside any git work tree.
pub fn not_a_repository(dir: &Path, error: &Error) -> anyhow::Error {
    anyhow::anyhow!(
        "{error}\n\n\
         hint: {dir} must be inside a git work tree\n\
         hint: Use --git-path if git is not on PATH",
        dir = dir.display()
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Comparison ignores ASCII case. Returns Some(candidate) if a close match
/// is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_ascii_lowercase();
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(&input, &candidate.to_ascii_lowercase());
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    // One row of the matrix at a time.
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];
    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_chars.len()]
}
