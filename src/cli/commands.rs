//! Command implementations

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use treebridge_core::UniqueId;

use crate::discovery::fixture::{self, FixtureError, PlanFixture};
use crate::discovery::tags::parse_filter_lines;
use crate::discovery::{PostDiscoveryFilter, ShardingFilter, TagFilter};
use crate::error::ProjectionError;
use crate::listener::ExecutionEvent;
use crate::notification::{ConsoleNotifier, FilteredNotifier, Notification, RecordingNotifier, RunNotifier};
use crate::runner::ProjectionRunner;
use crate::tree::Description;
use crate::tree::filter::is_selected;

use super::{CliError, CliResult, ExitCode, ProjectionArgs};

type BoxedFilter = Box<dyn PostDiscoveryFilter>;

fn fixture_error(err: FixtureError) -> CliError {
    CliError::failure(format!("{:?}", miette::Report::new(err)))
}

fn projection_error(err: ProjectionError) -> CliError {
    CliError::projection(format!("error: {err}"))
}

fn load_plan(path: &Path) -> CliResult<PlanFixture> {
    fixture::load_plan(path).map_err(fixture_error)
}

fn build_runner(path: &Path, projection: &ProjectionArgs, filters: &[BoxedFilter]) -> CliResult<ProjectionRunner> {
    let PlanFixture { label, plan } = load_plan(path)?;
    let label = projection.label.clone().unwrap_or(label);
    ProjectionRunner::with_filters(plan, filters, &label, projection.run_config()).map_err(projection_error)
}

/// Build the discovery filters requested on the command line.
pub fn collect_filters(
    shard: Option<ShardingFilter>,
    include_tags: Vec<String>,
    exclude_tags: Vec<String>,
    filter_file: Option<&Path>,
) -> CliResult<Vec<BoxedFilter>> {
    let mut filters: Vec<BoxedFilter> = Vec::new();
    if let Some(shard) = shard {
        filters.push(Box::new(shard));
    }
    if !include_tags.is_empty() {
        filters.push(Box::new(TagFilter::include(include_tags)));
    }
    if !exclude_tags.is_empty() {
        filters.push(Box::new(TagFilter::exclude(exclude_tags)));
    }
    if let Some(path) = filter_file {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::failure(format!("Error reading filter file '{}': {}", path.display(), e)))?;
        for filter in parse_filter_lines(&contents) {
            filters.push(Box::new(filter));
        }
    }
    Ok(filters)
}

/// `tree`: print the projected description tree.
pub fn print_tree(plan: &Path, projection: &ProjectionArgs) -> CliResult<ExitCode> {
    let runner = build_runner(plan, projection, &[])?;
    print!("{}", runner.tree().render());
    Ok(ExitCode::SUCCESS)
}

/// The leaf-filtered unique IDs whose description names contain `name`.
fn select_leaves(runner: &ProjectionRunner, name: &str) -> CliResult<BTreeSet<UniqueId>> {
    let leaves = runner.tree().filtered_leaves(|d| d.name().contains(name));
    if leaves.is_empty() {
        return Err(CliError::failure(format!("No descriptions match '{name}'")));
    }
    Ok(leaves)
}

/// Run `events`, forwarding to `notifier` only what lies in `selection` when one is given.
fn run_selected<N: RunNotifier>(
    runner: &mut ProjectionRunner,
    events: Vec<ExecutionEvent>,
    notifier: N,
    selection: Option<&BTreeSet<UniqueId>>,
) -> CliResult<N> {
    let notifier = match selection {
        None => runner.run(events, notifier),
        Some(selected) => runner
            .run(
                events,
                FilteredNotifier::new(notifier, |d: &Description| is_selected(d, selected)),
            )
            .map(FilteredNotifier::into_inner),
    };
    notifier.map_err(projection_error)
}

/// `replay`: drive the legacy notifications from an event fixture.
///
/// With `name`, only notifications for the matching subset (see `select`) are reported. Exits with a failure
/// code when any test or container failed.
pub fn replay(
    plan: &Path,
    events: &Path,
    projection: &ProjectionArgs,
    filters: Vec<BoxedFilter>,
    name: Option<&str>,
    json: bool,
    verbose: bool,
) -> CliResult<ExitCode> {
    let mut runner = build_runner(plan, projection, &filters)?;
    let events = fixture::load_events(events).map_err(fixture_error)?;
    let selection = name.map(|name| select_leaves(&runner, name)).transpose()?;

    let failed = if json {
        let notifications = run_selected(&mut runner, events, RecordingNotifier::new(), selection.as_ref())?
            .into_notifications();
        let rendered = serde_json::to_string_pretty(&notifications)
            .map_err(|e| CliError::failure(format!("Error serializing notifications: {e}")))?;
        println!("{rendered}");
        notifications
            .iter()
            .any(|n| matches!(n, Notification::Failure { .. }))
    } else {
        let console = run_selected(&mut runner, events, ConsoleNotifier::new(verbose), selection.as_ref())?;
        console.summary().failed > 0
    };

    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// `select`: print the leaf-filtered unique IDs whose description names contain `name`.
pub fn select(plan: &Path, name: &str, projection: &ProjectionArgs) -> CliResult<ExitCode> {
    let runner = build_runner(plan, projection, &[])?;
    for unique_id in select_leaves(&runner, name)? {
        println!("{unique_id}");
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn test_collect_filters_counts() {
        let filters = collect_filters(
            ShardingFilter::new(2, 0),
            vec!["fast".to_string()],
            Vec::new(),
            None,
        )
        .unwrap();
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn test_missing_filter_file_is_an_error() {
        let err = collect_filters(None, Vec::new(), Vec::new(), Some(Path::new("no/such/filters"))).err().unwrap();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_missing_plan_renders_diagnostic() {
        let err = load_plan(Path::new("no/such/plan.json")).err().unwrap();
        assert!(err.message.contains("treebridge::fixture::io"));
    }

    #[test]
    fn test_select_on_fixture() {
        let exit = select(&fixture_path("calculator_plan.json"), "adds", &ProjectionArgs::default()).unwrap();
        assert_eq!(exit, ExitCode::SUCCESS);
        assert!(select(&fixture_path("calculator_plan.json"), "nothing-matches", &ProjectionArgs::default()).is_err());
    }

    fn replay_fixture(prefix: &str, name: Option<&str>, json: bool) -> CliResult<ExitCode> {
        replay(
            &fixture_path(&format!("{prefix}_plan.json")),
            &fixture_path(&format!("{prefix}_events.json")),
            &ProjectionArgs::default(),
            Vec::new(),
            name,
            json,
            false,
        )
    }

    #[test]
    fn test_replay_with_failure_exits_with_failure() {
        assert_eq!(replay_fixture("calculator", None, true).unwrap(), ExitCode::FAILURE);
        assert_eq!(replay_fixture("calculator", None, false).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn test_container_failure_exits_with_failure_on_both_outputs() {
        assert_eq!(replay_fixture("setup_failure", None, true).unwrap(), ExitCode::FAILURE);
        assert_eq!(replay_fixture("setup_failure", None, false).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn test_replay_selection_hides_other_failures() {
        // `divides` fails; a run reporting only the `sums` invocations does not
        assert_eq!(replay_fixture("calculator", Some("sums"), true).unwrap(), ExitCode::SUCCESS);
        assert_eq!(replay_fixture("calculator", Some("sums"), false).unwrap(), ExitCode::SUCCESS);
        assert_eq!(replay_fixture("calculator", Some("divides"), true).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn test_uncorrelated_events_exit_with_projection_error() {
        let err = replay(
            &fixture_path("calculator_plan.json"),
            &fixture_path("setup_failure_events.json"),
            &ProjectionArgs::default(),
            Vec::new(),
            None,
            true,
            false,
        )
        .err()
        .unwrap();
        assert_eq!(err.exit_code, ExitCode::PROJECTION_ERROR);
        assert!(err.message.contains("com.example.C"));
    }

    #[test]
    fn test_replay_selection_without_match_is_an_error() {
        let err = replay_fixture("calculator", Some("nothing-matches"), true).err().unwrap();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }
}
