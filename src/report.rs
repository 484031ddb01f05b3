//! # Report Rendering
//!
//! Turns a [`RunResult`] into a document for humans or machines.
//!
//! - **Markdown** ([`markdown`]): suited to a pull request comment. It
//!   lists the options of the run and the discovered units in collapsible
//!   blocks, then one section per unit with something to show. Unchanged
//!   units are left out; when every unit is unchanged a single
//!   "No Diff" line is emitted instead.
//! - **JSON** ([`json`]): the commits and every unit with its status.

use serde::Serialize;

use crate::error::Result;
use crate::phases::orchestrator::{RunOptions, RunResult};
use crate::result::DiffOutcome;

/// Line emitted when no unit has anything to show.
pub const NO_DIFF_SENTINEL: &str = ":tada::tada: No Diff :tada::tada:";

/// Render `result` of a run over `dir` as a markdown document.
pub fn markdown(dir: &str, options: &RunOptions, result: &RunResult) -> String {
    let dirs = result.diff_map.dirs();
    let mut out = String::from("# Git Kustomize Diff\n\n");
    out.push_str(&format!(
        "{}...{}\n\n",
        result.base_commit, result.target_commit
    ));

    out.push_str("<details><summary>Options</summary>\n\n");
    out.push_str("| name | value |\n|-|-|\n");
    let pattern = |re: &Option<regex::Regex>| re.as_ref().map(|re| re.as_str().to_string());
    for (name, value) in [
        ("dir", Some(dir.to_string())),
        ("base", options.base.clone()),
        ("target", options.target.clone()),
        ("include", pattern(&options.filter.include)),
        ("exclude", pattern(&options.filter.exclude)),
    ] {
        out.push_str(&format!(
            "| {} | {} |\n",
            name,
            escape_cell(value.as_deref().unwrap_or(""))
        ));
    }
    out.push_str("\n</details>\n\n");

    out.push_str("<details><summary>Target Kustomizations</summary>\n\n");
    if dirs.is_empty() {
        out.push_str("N/A\n");
    } else {
        out.push_str(&format!("```\n{}\n```\n", dirs.join("\n")));
    }
    out.push_str("\n</details>\n\n");

    let mut found = false;
    for (path, outcome) in result.diff_map.iter() {
        if outcome.is_trivial() {
            continue;
        }
        found = true;
        out.push_str(&format!("## {}\n\n", path));
        out.push_str("<details><summary>diff</summary>\n\n");
        out.push_str(&outcome.as_markdown());
        out.push_str("\n\n</details>\n\n");
    }
    if !found {
        out.push_str(NO_DIFF_SENTINEL);
        out.push('\n');
    }
    out
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    base_commit: &'a str,
    target_commit: &'a str,
    units: Vec<JsonUnit<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum UnitStatus {
    Changed,
    Unchanged,
    Error,
}

#[derive(Debug, Serialize)]
struct JsonUnit<'a> {
    path: &'a str,
    status: UnitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> JsonUnit<'a> {
    fn new(path: &'a str, outcome: &'a DiffOutcome) -> Self {
        match outcome {
            DiffOutcome::Content(content) if content.is_empty() => Self {
                path,
                status: UnitStatus::Unchanged,
                diff: None,
                error: None,
            },
            DiffOutcome::Content(content) => Self {
                path,
                status: UnitStatus::Changed,
                diff: Some(content),
                error: None,
            },
            DiffOutcome::Failure(err) => Self {
                path,
                status: UnitStatus::Error,
                diff: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Render `result` as a pretty-printed JSON document.
pub fn json(result: &RunResult) -> Result<String> {
    let report = JsonReport {
        base_commit: &result.base_commit,
        target_commit: &result.target_commit,
        units: result
            .diff_map
            .iter()
            .map(|(path, outcome)| JsonUnit::new(path, outcome))
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::phases::discovery::UnitFilter;
    use crate::result::DiffMap;
    use std::path::PathBuf;

    fn result_with(entries: Vec<(&str, DiffOutcome)>) -> RunResult {
        let mut diff_map = DiffMap::new();
        for (path, outcome) in entries {
            diff_map.record(path, outcome);
        }
        RunResult {
            base_commit: "abc1234".to_string(),
            target_commit: "def5678".to_string(),
            diff_map,
            retained_workspaces: Vec::new(),
        }
    }

    fn broken() -> DiffOutcome {
        DiffOutcome::Failure(Error::Kustomization {
            path: PathBuf::from("invalid/kustomization.yaml"),
            message: "resource not found".to_string(),
        })
    }

    #[test]
    fn test_markdown_lists_non_trivial_units() {
        let result = result_with(vec![
            ("sub2", DiffOutcome::Content(String::new())),
            ("sub1", DiffOutcome::Content("-a\n+b\n".to_string())),
            ("invalid", broken()),
        ]);
        let options = RunOptions {
            base: Some("main".to_string()),
            filter: UnitFilter::new(Some("sub1|invalid"), None).unwrap(),
            ..Default::default()
        };
        let report = markdown(".", &options, &result);

        assert!(report.starts_with("# Git Kustomize Diff\n\nabc1234...def5678\n\n"));
        assert!(report.contains("| dir | . |\n"));
        assert!(report.contains("| base | main |\n"));
        assert!(report.contains("| target |  |\n"));
        assert!(report.contains("| include | sub1\\|invalid |\n"));
        assert!(report.contains("```\ninvalid\nsub1\nsub2\n```\n"));
        assert!(report.contains(
            "## sub1\n\n<details><summary>diff</summary>\n\n```diff\n-a\n+b\n```\n\n</details>\n\n"
        ));
        assert!(report.contains("## invalid\n\n"));
        assert!(report.contains("resource not found (invalid/kustomization.yaml)"));
        assert!(!report.contains("## sub2"));
        assert!(!report.contains(NO_DIFF_SENTINEL));

        let invalid = report.find("## invalid").unwrap();
        let sub1 = report.find("## sub1").unwrap();
        assert!(invalid < sub1);
    }

    #[test]
    fn test_markdown_sentinel_when_nothing_changed() {
        let result = result_with(vec![("sub1", DiffOutcome::Content(String::new()))]);
        let report = markdown(".", &RunOptions::default(), &result);
        assert!(report.ends_with(":tada::tada: No Diff :tada::tada:\n"));
        assert!(!report.contains("## sub1"));
    }

    #[test]
    fn test_markdown_without_units() {
        let result = result_with(Vec::new());
        let report = markdown("apps", &RunOptions::default(), &result);
        assert!(report.contains("<details><summary>Target Kustomizations</summary>\n\nN/A\n"));
        assert!(report.ends_with(&format!("{}\n", NO_DIFF_SENTINEL)));
    }

    #[test]
    fn test_json_report() {
        let result = result_with(vec![
            ("sub1", DiffOutcome::Content("+a\n".to_string())),
            ("sub2", DiffOutcome::Content(String::new())),
            ("invalid", broken()),
        ]);
        let value: serde_json::Value = serde_json::from_str(&json(&result).unwrap()).unwrap();

        assert_eq!(value["base_commit"], "abc1234");
        assert_eq!(value["target_commit"], "def5678");
        let units = value["units"].as_array().unwrap();
        assert_eq!(units.len(), 3);
        assert_eq!(units[0]["path"], "invalid");
        assert_eq!(units[0]["status"], "error");
        assert!(units[0]["error"]
            .as_str()
            .unwrap()
            .contains("resource not found"));
        assert_eq!(units[1]["status"], "changed");
        assert_eq!(units[1]["diff"], "+a\n");
        assert_eq!(units[2]["status"], "unchanged");
        assert!(units[2].get("diff").is_none());
    }
}
