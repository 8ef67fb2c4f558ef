use std::io::{self, Write};
use std::path::PathBuf;
use std::{env, process};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::resolve::resolve_manifest_with_override;
use crate::core::project::ProjectId;
use crate::error::{ProjgraphError, Result};
use crate::graph::ops::{build_per_root, RootBuild};
use crate::graph::{
    Edge, EdgeSink, GraphBuilder, GraphFormat, MissingReference, UnknownPolicy, WriterSink,
};
use crate::source::{DependencySource, ManifestSource};
use crate::util::{logging, output};

#[derive(Parser, Debug)]
#[command(name = "projgraph")]
#[command(about = "Project dependency graph builder", long_about = None)]
pub struct Cli {
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[arg(short, long)]
    pub quiet: bool,
    #[arg(long)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Show(ShowArgs),
    Projects(ProjectsArgs),
}

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    /// Start from these projects instead of the manifest's startup list.
    #[arg(long = "root")]
    pub roots: Vec<String>,
    #[arg(long)]
    pub format: Option<String>,
    #[arg(long)]
    pub on_unknown: Option<String>,
    #[arg(long)]
    pub each_root: bool,
    #[arg(long)]
    pub parallel: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ProjectsArgs {
    #[arg(long)]
    pub json: bool,
}

pub fn run() {
    let cli = Cli::parse();
    if cli.no_color {
        output::set_colors(false);
    }
    logging::init(
        cli.verbose,
        cli.quiet,
        !cli.no_color && console::colors_enabled_stderr(),
    );
    if let Err(err) = dispatch(cli) {
        output::error(&err.to_string());
        process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Show(ShowArgs::default()));
    match command {
        Commands::Show(args) => handle_show(args, cli.manifest, cli.quiet),
        Commands::Projects(args) => handle_projects(args, cli.manifest),
    }
}

fn load_source(manifest: Option<PathBuf>) -> Result<ManifestSource> {
    let cwd = env::current_dir()?;
    let path = resolve_manifest_with_override(cwd, manifest)?;
    ManifestSource::open(path).map_err(ProjgraphError::from)
}

fn handle_show(args: ShowArgs, manifest: Option<PathBuf>, quiet: bool) -> Result<()> {
    let source = load_source(manifest)?;
    let settings = &source.config.render;

    let format = match args.format.as_deref() {
        Some(value) => parse_format(value)?,
        None => settings.format.unwrap_or_default(),
    };
    let policy = match args.on_unknown.as_deref() {
        Some(value) => parse_policy(value)?,
        None => settings.on_unknown.unwrap_or_default(),
    };
    let jobs = args.parallel.or(settings.parallel);

    let (index, startup) = source.load()?;
    let roots: Vec<ProjectId> = if args.roots.is_empty() {
        startup
    } else {
        args.roots.iter().map(|id| ProjectId::new(id.as_str())).collect()
    };
    if roots.is_empty() && !quiet {
        output::warn("no roots: set solution.startup in the manifest or pass --root");
    }

    let builder = GraphBuilder::new().with_policy(policy);
    if args.each_root {
        let builds = build_per_root(&index, &roots, &builder, jobs);
        return print_each_root(builds, format, quiet);
    }

    let traversal = builder.traverse(&index, &roots)?;
    if !quiet {
        report_missing(&traversal.missing);
    }
    let stdout = io::stdout();
    let mut sink = WriterSink::new(stdout.lock(), format);
    sink.render(&traversal.edges)?;
    Ok(())
}

fn parse_format(input: &str) -> Result<GraphFormat> {
    input
        .parse()
        .map_err(|err: String| ProjgraphError::Other(anyhow::anyhow!(err)))
}

fn parse_policy(input: &str) -> Result<UnknownPolicy> {
    input
        .parse()
        .map_err(|err: String| ProjgraphError::Other(anyhow::anyhow!(err)))
}

fn report_missing(missing: &[MissingReference]) {
    for item in missing {
        match &item.from {
            Some(from) => output::warn(&format!(
                "skipped unknown project {} required by {}",
                item.id, from
            )),
            None => output::warn(&format!("skipped unknown root {}", item.id)),
        }
    }
}

#[derive(Serialize)]
struct RootJson<'a> {
    root: &'a str,
    edges: &'a [Edge],
}

fn print_each_root(builds: Vec<RootBuild>, format: GraphFormat, quiet: bool) -> Result<()> {
    let mut traversals = Vec::with_capacity(builds.len());
    for build in builds {
        let traversal = build.result?;
        traversals.push((build.root, traversal));
    }

    if !quiet {
        for (_, traversal) in &traversals {
            report_missing(&traversal.missing);
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if format == GraphFormat::Json {
        let json: Vec<RootJson> = traversals
            .iter()
            .map(|(root, traversal)| RootJson {
                root: root.as_str(),
                edges: &traversal.edges,
            })
            .collect();
        let text = serde_json::to_string_pretty(&json)
            .map_err(|err| ProjgraphError::Other(anyhow::Error::new(err)))?;
        writeln!(out, "{text}")?;
        return Ok(());
    }

    let mut sink = WriterSink::new(out, format);
    for (root, traversal) in &traversals {
        write_header(&mut sink, root)?;
        sink.render(&traversal.edges)?;
    }
    Ok(())
}

fn write_header<W: Write>(sink: &mut WriterSink<W>, root: &ProjectId) -> Result<()> {
    sink.writer_mut().write_all(format!("# {root}\n").as_bytes())?;
    Ok(())
}

#[derive(Serialize)]
struct ProjectJson<'a> {
    id: &'a str,
    name: &'a str,
    requires: Vec<&'a str>,
}

fn handle_projects(args: ProjectsArgs, manifest: Option<PathBuf>) -> Result<()> {
    let source = load_source(manifest)?;
    let (index, _) = source.load()?;
    let mut records: Vec<_> = index.records().collect();
    records.sort_by(|a, b| a.id.cmp(&b.id));

    if args.json {
        let json: Vec<ProjectJson> = records
            .iter()
            .map(|record| ProjectJson {
                id: record.id.as_str(),
                name: record.display_name.as_str(),
                requires: record.required_ids.iter().map(ProjectId::as_str).collect(),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json)
                .map_err(|err| ProjgraphError::Other(anyhow::Error::new(err)))?
        );
        return Ok(());
    }

    for record in records {
        println!(
            "{}\t{}\t{} requires",
            record.id,
            record.display_name,
            record.required_ids.len()
        );
    }
    Ok(())
}
