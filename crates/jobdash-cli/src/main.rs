// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod headless;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use config::Config;
use jobdash_app::{DashboardState, SortKey, StatusFilter, ViewState};
use jobdash_client::Client;
use runtime::{CliRuntime, DEMO_COUNT, DEMO_SEED, RecordSource};
use std::path::PathBuf;
use time::OffsetDateTime;

#[derive(Parser, Debug)]
#[command(name = "jobdash")]
#[command(version)]
#[command(about = "Terminal dashboard for tracked job applications")]
struct Args {
    /// Use a specific config path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read applications from a local JSON file instead of the server
    #[arg(long, global = true, conflicts_with = "demo")]
    file: Option<PathBuf>,

    /// Use generated demo data instead of the server
    #[arg(long, global = true)]
    demo: bool,

    /// Validate config and client setup, then exit
    #[arg(long)]
    check: bool,

    /// Print the resolved config path
    #[arg(long)]
    print_config_path: bool,

    /// Print a config template
    #[arg(long)]
    print_example_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Fetch applications and write the filtered rows as CSV
    Export(ExportArgs),
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
struct ExportArgs {
    /// Free-text filter over company, role, and location
    #[arg(long, default_value = "")]
    query: String,

    /// Status filter: all, applied, assessment, interview, offer, rejected, other
    #[arg(long, default_value = "all", value_parser = parse_status_filter)]
    status: StatusFilter,

    /// Sort key: updated, company, status
    #[arg(long, default_value = "updated", value_parser = parse_sort_key)]
    sort: SortKey,

    /// Write to this path instead of the export directory
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    fn view_state(&self) -> ViewState {
        ViewState {
            query: self.query.clone(),
            status_filter: self.status,
            sort_key: self.sort,
        }
    }
}

fn parse_status_filter(raw: &str) -> std::result::Result<StatusFilter, String> {
    StatusFilter::parse(&raw.trim().to_lowercase()).ok_or_else(|| {
        format!(
            "unknown status {raw:?}; expected one of: {}",
            StatusFilter::ALL.map(StatusFilter::as_str).join(", ")
        )
    })
}

fn parse_sort_key(raw: &str) -> std::result::Result<SortKey, String> {
    SortKey::parse(&raw.trim().to_lowercase()).ok_or_else(|| {
        format!(
            "unknown sort key {raw:?}; expected one of: {}",
            SortKey::ALL.map(SortKey::as_str).join(", ")
        )
    })
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    if args.print_config_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if args.print_example_config {
        print!("{}", Config::example_config(&config_path));
        return Ok(());
    }

    let config = Config::load(&config_path).with_context(|| {
        format!(
            "load config {}; run `jobdash --print-example-config` to generate a v1 template",
            config_path.display()
        )
    })?;

    let source = record_source(&args, &config).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/applications_path/timeout values",
            config_path.display()
        )
    })?;
    let export_dir = config.export_dir()?;
    if args.check {
        return Ok(());
    }

    logging::init(&config.log_path()?)?;
    tracing::info!(source = %source.label(), "jobdash starting");

    match &args.command {
        Some(Command::Export(export)) => {
            let today = OffsetDateTime::now_utc().date();
            let outcome = headless::run_export(
                &source,
                &export.view_state(),
                export.output.as_deref(),
                &export_dir,
                today,
            )?;
            println!(
                "exported {} of {} applications to {}",
                outcome.row_count,
                outcome.total_records,
                outcome.path.display()
            );
            Ok(())
        }
        None => {
            let mut state = DashboardState::default();
            let mut runtime = CliRuntime::new(source, export_dir);
            jobdash_tui::run_app(&mut state, &mut runtime)
        }
    }
}

fn record_source(args: &Args, config: &Config) -> Result<RecordSource> {
    if let Some(path) = &args.file {
        return Ok(RecordSource::File(path.clone()));
    }
    if args.demo {
        return Ok(RecordSource::Demo {
            seed: DEMO_SEED,
            count: DEMO_COUNT,
        });
    }

    let mut client = Client::new(
        config.base_url(),
        config.applications_path(),
        config.timeout()?,
    )?;
    if let Some(cookie) = config.session_cookie() {
        client = client.with_session_cookie(&cookie);
    }
    Ok(RecordSource::Http(client))
}

#[cfg(test)]
mod tests {
    use super::{Args, Command, parse_sort_key, parse_status_filter, record_source};
    use crate::config::Config;
    use crate::runtime::RecordSource;
    use anyhow::Result;
    use clap::Parser;
    use jobdash_app::{CanonicalStatus, SortKey, StatusFilter};
    use std::path::PathBuf;

    #[test]
    fn defaults_launch_dashboard_against_server() -> Result<()> {
        let args = Args::try_parse_from(["jobdash"])?;
        assert!(args.config.is_none());
        assert!(args.file.is_none());
        assert!(!args.demo);
        assert!(!args.check);
        assert!(args.command.is_none());

        let source = record_source(&args, &Config::default())?;
        match source {
            RecordSource::Http(client) => {
                assert_eq!(client.endpoint(), "http://localhost:8080/api/applications");
            }
            other => panic!("expected http source, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn config_override_and_print_flags() -> Result<()> {
        let args = Args::try_parse_from([
            "jobdash",
            "--config",
            "/custom/config.toml",
            "--print-config-path",
            "--print-example-config",
            "--check",
        ])?;
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(args.print_config_path);
        assert!(args.print_example_config);
        assert!(args.check);
        Ok(())
    }

    #[test]
    fn file_and_demo_conflict() {
        let error = Args::try_parse_from(["jobdash", "--demo", "--file", "apps.json"])
            .expect_err("file and demo together should fail");
        assert_eq!(error.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn demo_flag_selects_demo_source() -> Result<()> {
        let args = Args::try_parse_from(["jobdash", "--demo"])?;
        let source = record_source(&args, &Config::default())?;
        assert!(matches!(source, RecordSource::Demo { .. }));
        Ok(())
    }

    #[test]
    fn export_subcommand_parses_view_flags() -> Result<()> {
        let args = Args::try_parse_from([
            "jobdash",
            "export",
            "--query",
            "acme",
            "--status",
            "Offer",
            "--sort",
            "company",
            "--output",
            "/tmp/out.csv",
            "--file",
            "apps.json",
        ])?;
        let Some(Command::Export(export)) = args.command.clone() else {
            panic!("expected export subcommand");
        };
        let view_state = export.view_state();
        assert_eq!(view_state.query, "acme");
        assert_eq!(
            view_state.status_filter,
            StatusFilter::Only(CanonicalStatus::Offer)
        );
        assert_eq!(view_state.sort_key, SortKey::Company);
        assert_eq!(export.output, Some(PathBuf::from("/tmp/out.csv")));
        assert_eq!(args.file, Some(PathBuf::from("apps.json")));
        Ok(())
    }

    #[test]
    fn export_defaults_match_initial_view() -> Result<()> {
        let args = Args::try_parse_from(["jobdash", "export"])?;
        let Some(Command::Export(export)) = args.command else {
            panic!("expected export subcommand");
        };
        assert_eq!(export.view_state(), jobdash_app::ViewState::default());
        Ok(())
    }

    #[test]
    fn value_parsers_reject_unknown_names() {
        let status = parse_status_filter("ghosted").expect_err("unknown status");
        assert!(status.contains("all, applied, assessment, interview, offer, rejected, other"));

        let sort = parse_sort_key("salary").expect_err("unknown sort key");
        assert!(sort.contains("updated, company, status"));

        let error = Args::try_parse_from(["jobdash", "export", "--sort", "salary"])
            .expect_err("clap should surface the parser error");
        assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn invalid_base_url_is_a_config_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "version = 1\n[server]\nbase_url = \"ftp://jobs.local\"\n")?;
        let config = Config::load(&path)?;
        let args = Args::try_parse_from(["jobdash"])?;

        let error = record_source(&args, &config).expect_err("ftp should fail");
        assert!(error.to_string().contains("http or https"));
        Ok(())
    }
}
