// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line dispatch, wired onto the `cukeboard-core` services.

use crate::output::{OutputOpts, OutputWriter, StdoutWriter};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail};
use cukeboard_core::{
    config::CukeboardConfig,
    model::{AttachmentUuid, FeatureUuid, ScenarioKey, ScenarioStatus, ScenarioUuid, TestRunUuid},
    query::{ScenarioQuery, TagSelection, TestRunQuery},
    service::{ScenarioService, TestRunService},
    store::{DiskStore, FeatureStore, ScenarioUpdate},
    views::{FailedScenarioListItemView, NormalizingMatcher, ScenarioViewAccess, StatsNumbers},
};
use serde::Serialize;
use smol_str::SmolStr;
use std::io::Write;
use tracing::debug;

/// A reporting backend for Cucumber test results.
///
/// Test runs collect imported Cucumber JSON reports; the remaining
/// subcommands query and mutate what was imported.
#[derive(Debug, Parser)]
#[command(version, name = "cukeboard")]
pub struct CukeboardApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(flatten)]
    config_opts: ConfigOpts,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

impl CukeboardApp {
    /// Executes the app.
    pub fn exec(self, output_writer: &mut OutputWriter) -> Result<()> {
        self.output.init();
        let config = self.config_opts.make_config()?;
        let store = self.config_opts.open_store(&config)?;
        self.command.exec(&store, &config, self.json, output_writer)
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Config options")]
struct ConfigOpts {
    /// Config file [default: ./cukeboard.toml]
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Store directory [default: store.dir from the config]
    #[arg(long, global = true, value_name = "DIR", env = "CUKEBOARD_STORE_DIR")]
    store_dir: Option<Utf8PathBuf>,
}

impl ConfigOpts {
    fn make_config(&self) -> Result<CukeboardConfig> {
        let current_dir: Utf8PathBuf = std::env::current_dir()
            .wrap_err("error reading the current directory")?
            .try_into()
            .wrap_err("the current directory is not valid UTF-8")?;
        Ok(CukeboardConfig::from_sources(
            &current_dir,
            self.config_file.as_deref(),
        )?)
    }

    fn open_store(&self, config: &CukeboardConfig) -> Result<DiskStore> {
        let store_dir = self
            .store_dir
            .as_deref()
            .unwrap_or_else(|| config.store_dir());
        debug!("opening store at `{store_dir}`");
        Ok(DiskStore::open(store_dir)?)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a test run and print its id
    CreateRun {
        /// Environment label, e.g. ci or staging
        #[arg(long, short = 'e', value_name = "ENV")]
        environment: String,
    },
    /// Import a Cucumber JSON report into an existing run
    ///
    /// Importing the same report again replaces the run's records instead
    /// of duplicating them.
    Import {
        /// The run to import into
        #[arg(long, value_name = "RUN_ID")]
        run: TestRunUuid,

        /// Path to the report file
        #[arg(value_name = "REPORT")]
        report: Utf8PathBuf,
    },
    /// List test runs, most recent first
    Runs {
        /// Only runs for this environment
        #[arg(long, short = 'e', value_name = "ENV")]
        environment: Option<String>,
    },
    /// Delete a run along with all its features and scenarios
    DeleteRun {
        /// The run to delete
        #[arg(value_name = "RUN_ID")]
        run: TestRunUuid,
    },
    /// List the features recorded for a run
    Features {
        /// The run to list
        #[arg(long, value_name = "RUN_ID")]
        run: TestRunUuid,
    },
    /// List scenarios matching the filters
    Scenarios {
        #[command(flatten)]
        filter: FilterOpts,

        /// Order the listing by scenario name
        #[arg(long)]
        sorted: bool,
    },
    /// Print one scenario record in full, as JSON
    Show {
        /// The scenario to show
        #[arg(value_name = "SCENARIO_ID")]
        scenario: ScenarioUuid,
    },
    /// Change the status or review flag of a scenario
    Update {
        /// The scenario to update
        #[arg(value_name = "SCENARIO_ID")]
        scenario: ScenarioUuid,

        /// New status
        #[arg(long, value_name = "STATUS")]
        status: Option<ScenarioStatus>,

        /// New review flag
        #[arg(long, value_name = "BOOL")]
        reviewed: Option<bool>,
    },
    /// Delete one scenario record
    Delete {
        /// The scenario to delete
        #[arg(value_name = "SCENARIO_ID")]
        scenario: ScenarioUuid,
    },
    /// List a run's failures, grouped by error-message similarity
    Failures {
        /// The run to inspect
        #[arg(long, value_name = "RUN_ID")]
        run: TestRunUuid,

        /// List failures flat instead of grouped
        #[arg(long)]
        flat: bool,
    },
    /// List the failures in the same run that look like this scenario's
    Associated {
        /// The scenario whose failure to start from
        #[arg(value_name = "SCENARIO_ID")]
        scenario: ScenarioUuid,
    },
    /// Report step definition usage across a run
    StepDefs {
        /// The run to inspect
        #[arg(long, value_name = "RUN_ID")]
        run: TestRunUuid,
    },
    /// Show scenario statistics, overall or per tag
    Stats {
        #[command(flatten)]
        filter: FilterOpts,

        /// Break the statistics down per tag
        #[arg(long)]
        per_tag: bool,

        /// Only report these tags; repeatable, requires --per-tag
        #[arg(long = "only-tag", value_name = "TAG", requires = "per_tag")]
        only_tags: Vec<String>,
    },
    /// Chart a scenario's results across runs, most recent first
    History {
        /// A scenario record whose identity to chart
        #[arg(long, value_name = "SCENARIO_ID", conflicts_with = "key")]
        scenario: Option<ScenarioUuid>,

        /// A scenario key, as printed by show
        #[arg(long, value_name = "KEY")]
        key: Option<ScenarioKey>,
    },
    /// Show the most recent result for the first scenario matching the
    /// filters
    LastTested {
        #[command(flatten)]
        filter: FilterOpts,
    },
    /// Write an attachment's payload to a file
    Attachment {
        /// The scenario the attachment belongs to
        #[arg(value_name = "SCENARIO_ID")]
        scenario: ScenarioUuid,

        /// The attachment to extract
        #[arg(value_name = "ATTACHMENT_ID")]
        attachment: AttachmentUuid,

        /// Where to write the payload
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Utf8PathBuf,
    },
}

/// Filters selecting the scenarios an operation works on.
#[derive(Debug, Args)]
#[command(next_help_heading = "Filter options")]
struct FilterOpts {
    /// Only scenarios in this run
    #[arg(long, value_name = "RUN_ID")]
    run: Option<TestRunUuid>,

    /// Only scenarios of this feature
    #[arg(long, value_name = "FEATURE_ID")]
    feature: Option<FeatureUuid>,

    /// Only scenarios with this status
    #[arg(long, value_name = "STATUS")]
    status: Option<ScenarioStatus>,

    /// Only scenarios carrying this tag; repeatable, any match counts
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Drop scenarios carrying this tag; repeatable
    #[arg(long = "exclude-tag", value_name = "TAG")]
    exclude_tags: Vec<String>,

    /// Case-insensitive search over names and descriptions
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Only scenarios with exactly this name
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Only scenarios that recorded an error message
    #[arg(long)]
    having_error_message: bool,
}

impl FilterOpts {
    fn to_query(&self) -> ScenarioQuery {
        let mut query = ScenarioQuery::new();
        if let Some(run) = self.run {
            query = query.with_test_run_id(run);
        }
        if let Some(feature) = self.feature {
            query = query.with_feature_id(feature);
        }
        if let Some(status) = self.status {
            query = query.with_status(status);
        }
        if let Some(name) = &self.name {
            query = query.with_name(name.as_str());
        }
        if let Some(search) = &self.search {
            query = query.with_search(search.as_str());
        }
        if self.having_error_message {
            query = query.having_error_message();
        }
        let mut tags = TagSelection::new();
        for tag in &self.tags {
            tags = tags.include(tag.as_str());
        }
        for tag in &self.exclude_tags {
            tags = tags.exclude(tag.as_str());
        }
        query.with_tag_selection(tags)
    }
}

impl Command {
    fn exec(
        self,
        store: &DiskStore,
        config: &CukeboardConfig,
        json: bool,
        output_writer: &mut OutputWriter,
    ) -> Result<()> {
        let mut writer = output_writer.stdout_writer();

        match self {
            Self::CreateRun { environment } => {
                let run = TestRunService::new(store).create_run(environment)?;
                if json {
                    print_json(&mut writer, &run)?;
                } else {
                    writeln!(writer, "{}", run.id)?;
                }
            }
            Self::Import { run, report } => {
                let outcome = ScenarioService::new(store).import_report_file(run, &report)?;
                if json {
                    print_json(&mut writer, &outcome)?;
                } else {
                    writeln!(
                        writer,
                        "imported {} features, {} scenarios",
                        outcome.features, outcome.scenarios
                    )?;
                }
            }
            Self::Runs { environment } => {
                let mut query = TestRunQuery::new().ordered_latest_first();
                if let Some(environment) = environment {
                    query = query.with_environment(environment);
                }
                let runs = TestRunService::new(store).test_runs(&query)?;
                if json {
                    print_json(&mut writer, &runs)?;
                } else {
                    for run in runs {
                        writeln!(
                            writer,
                            "{}  {}  {}",
                            run.date.to_rfc3339(),
                            run.id,
                            run.environment
                        )?;
                    }
                }
            }
            Self::DeleteRun { run } => {
                TestRunService::new(store).delete_run(run)?;
            }
            Self::Features { run } => {
                let features = store.features(run)?;
                if json {
                    print_json(&mut writer, &features)?;
                } else {
                    for feature in features {
                        writeln!(writer, "{}  {}  {}", feature.id, feature.info.name, feature.uri)?;
                    }
                }
            }
            Self::Scenarios { filter, sorted } => {
                let mut query = filter.to_query();
                if sorted {
                    query = query.ordered_by_name();
                }
                let items = scenario_views(store, config).scenario_list_items(&query)?;
                if json {
                    print_json(&mut writer, &items)?;
                } else {
                    for item in items {
                        let tags = if item.tags.is_empty() {
                            String::new()
                        } else {
                            format!("  [{}]", item.tags.join(" "))
                        };
                        writeln!(writer, "{}  {}  {}{}", item.id, item.status, item.info.name, tags)?;
                    }
                }
            }
            Self::Show { scenario } => {
                let record = ScenarioService::new(store).scenario(scenario)?;
                print_json(&mut writer, &record)?;
            }
            Self::Update {
                scenario,
                status,
                reviewed,
            } => {
                let mut update = ScenarioUpdate::new();
                if let Some(status) = status {
                    update = update.set_status(status);
                }
                if let Some(reviewed) = reviewed {
                    update = update.set_reviewed(reviewed);
                }
                if update.is_empty() {
                    bail!("pass at least one of --status or --reviewed");
                }
                let updated = ScenarioService::new(store).update_scenario(scenario, &update)?;
                if json {
                    print_json(&mut writer, &updated)?;
                } else {
                    writeln!(
                        writer,
                        "{}  {}  reviewed={}",
                        updated.id, updated.status, updated.reviewed
                    )?;
                }
            }
            Self::Delete { scenario } => {
                ScenarioService::new(store).delete_scenario(scenario)?;
            }
            Self::Failures { run, flat } => {
                let access = scenario_views(store, config);
                if flat {
                    let failures = access.failed_scenarios(run)?;
                    if json {
                        print_json(&mut writer, &failures)?;
                    } else {
                        write_failures(&mut writer, &failures)?;
                    }
                } else {
                    let groups = access.grouped_failures(run)?;
                    if json {
                        print_json(&mut writer, &groups)?;
                    } else {
                        for group in groups {
                            writeln!(
                                writer,
                                "{}x {}",
                                group.failed_scenarios.len(),
                                group.error_message
                            )?;
                            for failure in &group.failed_scenarios {
                                writeln!(writer, "    {}  {}", failure.id, failure.info.name)?;
                            }
                        }
                    }
                }
            }
            Self::Associated { scenario } => {
                let failures = scenario_views(store, config).associated_failures(scenario)?;
                if json {
                    print_json(&mut writer, &failures)?;
                } else {
                    write_failures(&mut writer, &failures)?;
                }
            }
            Self::StepDefs { run } => {
                let groups = scenario_views(store, config).step_definitions(run)?;
                if json {
                    print_json(&mut writer, &groups)?;
                } else {
                    for group in groups {
                        writeln!(
                            writer,
                            "{:>4}  {}",
                            group.occurrences.len(),
                            group.definition_location
                        )?;
                    }
                }
            }
            Self::Stats {
                filter,
                per_tag,
                only_tags,
            } => {
                let access = scenario_views(store, config);
                let query = filter.to_query();
                if per_tag {
                    let whitelist: Vec<SmolStr> =
                        only_tags.iter().map(SmolStr::new).collect();
                    let stats = access.tag_stats(&query, &whitelist)?;
                    if json {
                        print_json(&mut writer, &stats)?;
                    } else {
                        for entry in stats {
                            writeln!(writer, "{}  {}", entry.tag, format_numbers(&entry.stats.all))?;
                        }
                    }
                } else {
                    let stats = access.stats(&query)?;
                    if json {
                        print_json(&mut writer, &stats)?;
                    } else {
                        writeln!(writer, "all           {}", format_numbers(&stats.all))?;
                        writeln!(writer, "reviewed      {}", format_numbers(&stats.reviewed))?;
                        writeln!(writer, "non-reviewed  {}", format_numbers(&stats.non_reviewed))?;
                    }
                }
            }
            Self::History { scenario, key } => {
                let access = scenario_views(store, config);
                let history = match (scenario, key) {
                    (Some(id), _) => access.history_for(id)?,
                    (None, Some(key)) => access.scenario_history(&key)?,
                    (None, None) => bail!("pass one of --scenario or --key"),
                };
                if json {
                    print_json(&mut writer, &history)?;
                } else {
                    for item in history {
                        writeln!(
                            writer,
                            "{}  {}  {}",
                            item.test_run.date.to_rfc3339(),
                            item.status,
                            item.test_run.environment
                        )?;
                    }
                }
            }
            Self::LastTested { filter } => {
                let latest = scenario_views(store, config).last_tested(&filter.to_query())?;
                if json {
                    print_json(&mut writer, &latest)?;
                } else {
                    match latest {
                        Some(item) => writeln!(
                            writer,
                            "{}  {}  {}",
                            item.test_run.date.to_rfc3339(),
                            item.status,
                            item.test_run.environment
                        )?,
                        None => writeln!(writer, "no matching scenario")?,
                    }
                }
            }
            Self::Attachment {
                scenario,
                attachment,
                output,
            } => {
                let payload = ScenarioService::new(store).attachment(scenario, attachment)?;
                std::fs::write(&output, &*payload.data)
                    .wrap_err_with(|| format!("error writing attachment to `{output}`"))?;
                writeln!(
                    writer,
                    "wrote {} bytes ({}) to {}",
                    payload.data.len(),
                    payload.mime_type,
                    output
                )?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

fn scenario_views<'store>(
    store: &'store DiskStore,
    config: &CukeboardConfig,
) -> ScenarioViewAccess<'store, DiskStore> {
    ScenarioViewAccess::with_matcher(store, Box::new(NormalizingMatcher::new(config.similarity())))
}

fn print_json<T: Serialize>(writer: &mut StdoutWriter<'_>, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn write_failures(
    writer: &mut StdoutWriter<'_>,
    failures: &[FailedScenarioListItemView],
) -> Result<()> {
    for failure in failures {
        writeln!(
            writer,
            "{}  {}  {}",
            failure.id, failure.info.name, failure.error_message
        )?;
    }
    Ok(())
}

fn format_numbers(numbers: &StatsNumbers) -> String {
    format!(
        "{} scenarios ({} passed, {} failed, {} skipped, {} pending, {} undefined)",
        numbers.count,
        numbers.passed,
        numbers.failed,
        numbers.skipped,
        numbers.pending,
        numbers.undefined
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use camino_tempfile::tempdir;
    use clap::error::ErrorKind;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_lines_parse() {
        let valid = &[
            "cukeboard create-run --environment ci",
            "cukeboard create-run -e staging --json",
            "cukeboard runs",
            "cukeboard runs --environment ci --json",
            "cukeboard import --run 1a46a870-bd91-45eb-bf29-b34e1898ce8f target/report.json",
            "cukeboard features --run 1a46a870-bd91-45eb-bf29-b34e1898ce8f",
            "cukeboard scenarios",
            "cukeboard scenarios --run 1a46a870-bd91-45eb-bf29-b34e1898ce8f --status FAILED \
             --tag @payment --tag @checkout --exclude-tag @wip --sorted",
            "cukeboard scenarios --search declined --having-error-message",
            "cukeboard scenarios --name Login",
            "cukeboard show 00e122f1-71ec-45bc-b0a4-62e979f2bc4f",
            "cukeboard update 00e122f1-71ec-45bc-b0a4-62e979f2bc4f --status PASSED --reviewed true",
            "cukeboard delete 00e122f1-71ec-45bc-b0a4-62e979f2bc4f",
            "cukeboard delete-run 1a46a870-bd91-45eb-bf29-b34e1898ce8f",
            "cukeboard failures --run 1a46a870-bd91-45eb-bf29-b34e1898ce8f",
            "cukeboard failures --run 1a46a870-bd91-45eb-bf29-b34e1898ce8f --flat",
            "cukeboard associated 00e122f1-71ec-45bc-b0a4-62e979f2bc4f",
            "cukeboard step-defs --run 1a46a870-bd91-45eb-bf29-b34e1898ce8f",
            "cukeboard stats",
            "cukeboard stats --run 1a46a870-bd91-45eb-bf29-b34e1898ce8f --per-tag",
            "cukeboard stats --per-tag --only-tag @payment --only-tag @smoke",
            "cukeboard history --key 8f00b204e9800998",
            "cukeboard history --scenario 00e122f1-71ec-45bc-b0a4-62e979f2bc4f",
            "cukeboard last-tested --name Login",
            "cukeboard attachment 00e122f1-71ec-45bc-b0a4-62e979f2bc4f \
             41e19c2b-63b2-4a61-bb46-d02d730b3a2e --output payload.png",
            "cukeboard --store-dir /tmp/boards scenarios",
            "cukeboard --config-file custom.toml runs",
            "cukeboard -v runs",
        ];
        for &cmd in valid {
            if let Err(error) = CukeboardApp::try_parse_from(cmd.split_whitespace()) {
                panic!("`{cmd}` should have parsed, but didn't: {error}");
            }
        }

        let invalid = &[
            ("cukeboard create-run", ErrorKind::MissingRequiredArgument),
            (
                "cukeboard import target/report.json",
                ErrorKind::MissingRequiredArgument,
            ),
            (
                "cukeboard attachment 00e122f1-71ec-45bc-b0a4-62e979f2bc4f \
                 41e19c2b-63b2-4a61-bb46-d02d730b3a2e",
                ErrorKind::MissingRequiredArgument,
            ),
            (
                "cukeboard scenarios --run not-a-uuid",
                ErrorKind::ValueValidation,
            ),
            (
                "cukeboard update 00e122f1-71ec-45bc-b0a4-62e979f2bc4f --status FLAKY",
                ErrorKind::ValueValidation,
            ),
            (
                "cukeboard history --scenario 00e122f1-71ec-45bc-b0a4-62e979f2bc4f \
                 --key 8f00b204e9800998",
                ErrorKind::ArgumentConflict,
            ),
            (
                "cukeboard stats --only-tag @payment",
                ErrorKind::MissingRequiredArgument,
            ),
            ("cukeboard runs --flat", ErrorKind::UnknownArgument),
            ("cukeboard frobnicate", ErrorKind::InvalidSubcommand),
        ];
        for &(cmd, kind) in invalid {
            match CukeboardApp::try_parse_from(cmd.split_whitespace()) {
                Ok(_) => panic!("`{cmd}` should have errored out but parsed"),
                Err(error) => assert_eq!(error.kind(), kind, "unexpected error kind for `{cmd}`"),
            }
        }
    }

    const REPORT: &str = indoc! {r#"
        [
          {
            "uri": "features/checkout.feature",
            "id": "checkout",
            "keyword": "Feature",
            "name": "Checkout",
            "elements": [
              {
                "id": "checkout;pay-by-card",
                "keyword": "Scenario",
                "name": "Pay by card",
                "type": "scenario",
                "tags": [{ "name": "@payment" }],
                "steps": [
                  {
                    "keyword": "Given ",
                    "name": "a full basket",
                    "match": { "location": "steps/basket.rs:12" },
                    "result": { "status": "passed", "duration": 12000000 }
                  },
                  {
                    "keyword": "When ",
                    "name": "the customer pays by card",
                    "match": { "location": "steps/payment.rs:30" },
                    "result": {
                      "status": "failed",
                      "duration": 40000000,
                      "error_message": "card declined"
                    }
                  }
                ]
              }
            ]
          }
        ]
    "#};

    fn run_cli(args: &[&str], store_dir: &Utf8Path) -> Result<String> {
        let mut cmd = vec!["cukeboard", "--store-dir", store_dir.as_str()];
        cmd.extend_from_slice(args);
        let app = CukeboardApp::try_parse_from(cmd).expect("valid command line");
        let mut output = OutputWriter::test();
        app.exec(&mut output)?;
        Ok(String::from_utf8(output.stdout().to_vec()).expect("output is UTF-8"))
    }

    #[test]
    fn subcommands_round_trip_through_the_store() {
        let temp = tempdir().expect("created a tempdir");
        let store_dir = temp.path().join("store");

        let out = run_cli(&["create-run", "--environment", "ci"], &store_dir)
            .expect("create-run succeeds");
        let run_id = out.trim().to_owned();

        let report_path = temp.path().join("report.json");
        std::fs::write(&report_path, REPORT).expect("report written");
        let out = run_cli(&["import", "--run", &run_id, report_path.as_str()], &store_dir)
            .expect("import succeeds");
        assert_eq!(out.trim(), "imported 1 features, 1 scenarios");

        let out = run_cli(&["scenarios", "--run", &run_id, "--json"], &store_dir)
            .expect("scenarios succeed");
        let items: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        let items = items.as_array().expect("an array");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["status"], "FAILED");
        assert_eq!(items[0]["info"]["name"], "Pay by card");
        assert_eq!(items[0]["tags"][0], "@payment");
        let scenario_id = items[0]["id"].as_str().expect("an id").to_owned();

        let out = run_cli(&["failures", "--run", &run_id], &store_dir).expect("failures succeed");
        assert!(out.contains("1x card declined"), "groups lead with the message: {out}");

        let out = run_cli(&["update", &scenario_id, "--reviewed", "true"], &store_dir)
            .expect("update succeeds");
        assert!(out.contains("reviewed=true"), "update echoes the flag: {out}");

        let out =
            run_cli(&["stats", "--run", &run_id, "--json"], &store_dir).expect("stats succeed");
        let stats: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(stats["all"]["count"], 1);
        assert_eq!(stats["reviewed"]["failed"], 1);
        assert_eq!(stats["non-reviewed"]["count"], 0);

        let out = run_cli(&["history", "--scenario", &scenario_id, "--json"], &store_dir)
            .expect("history succeeds");
        let history: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(history.as_array().expect("an array").len(), 1);
        assert_eq!(history[0]["status"], "FAILED");

        let out = run_cli(&["step-defs", "--run", &run_id], &store_dir).expect("step-defs succeed");
        assert!(out.contains("steps/basket.rs:12"), "usage lists locations: {out}");

        run_cli(&["delete-run", &run_id], &store_dir).expect("delete-run succeeds");
        let out = run_cli(&["runs", "--json"], &store_dir).expect("runs succeed");
        let runs: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(runs.as_array().expect("an array").len(), 0);
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let temp = tempdir().expect("created a tempdir");
        let store_dir = temp.path().join("store");

        let error = run_cli(
            &["show", "00e122f1-71ec-45bc-b0a4-62e979f2bc4f"],
            &store_dir,
        )
        .expect_err("show fails on an empty store");
        assert!(
            error.to_string().contains("not found"),
            "unexpected error: {error}"
        );
    }
}
