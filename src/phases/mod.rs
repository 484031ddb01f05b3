//! Implementation of the phases of a kustomize-diff run.
//!
//! ## Overview
//!
//! A run goes through these phases:
//! 1. Resolution - Resolve the base and target commit-ish to short hashes
//! 2. Workspace Setup - Clone the base and the target into scratch
//!    directories, merge the target onto the base and optionally apply the
//!    uncommitted changes (see [`scratch`] and [`orchestrator`])
//! 3. Discovery - Find every configuration unit in both workspaces
//! 4. Comparison - Render and diff each unit of the union
//!
//! Phases 1 and 2 are fail-fast: the first error aborts the run. Phases 3
//! and 4 isolate failures per unit, so one broken unit never hides the
//! results of its siblings.

pub mod compare;
pub mod discovery;
pub mod orchestrator;
pub mod scratch;
