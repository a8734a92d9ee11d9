use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use paperboard_core::bibtex::{DEFAULT_EXPORT_FILE, write_bibtex};
use paperboard_core::config_file::{self, ConfigFile};
use paperboard_core::{
    CatalogStore, Category, DateRange, MonthSelection, Pager, PaperView, PublicationStatus,
    ResearchField, Session, SortOrder, from_location, is_month_key,
};

mod output;

use output::ColorMode;

/// Paperboard - browse, filter and export a month-sharded paper catalog
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Catalog location: a directory or http(s) base URL holding index.json
    #[arg(long, global = true)]
    data: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the months available in the catalog index
    Months,

    /// Filter, sort and print papers in batches
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Only load this month (YYYY-MM) instead of the whole catalog
        #[arg(long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Start of an inclusive date range (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End of an inclusive date range (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Number of extra batches to render after the first
        #[arg(long, default_value_t = 0)]
        more: usize,

        /// Print rendered records as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show every field of one paper
    Show {
        /// Paper id (e.g. 2401.01234)
        id: String,
    },

    /// Export selected papers as BibTeX
    Export {
        /// Paper id to include (repeatable)
        #[arg(long = "id", value_name = "ID")]
        ids: Vec<String>,

        /// Output file (default: papers.bib)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build month shards and index.json from a JSONL metadata file
    Shard {
        /// Path to papers_metadata.jsonl
        jsonl: PathBuf,

        /// Directory to write the shards into
        out_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// published | preprint
    #[arg(long, value_parser = parse_status)]
    status: Option<PublicationStatus>,

    /// Empirical | Survey | Benchmark | Technical
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,

    /// Research field, e.g. "Software Testing"
    #[arg(long, value_parser = parse_field)]
    field: Option<ResearchField>,

    /// Task within the field, e.g. "Test Generation"
    #[arg(long)]
    task: Option<String>,

    /// Case-insensitive substring over title, authors and abstract
    #[arg(short, long)]
    search: Option<String>,

    /// date-desc | date-asc
    #[arg(long, value_parser = parse_sort, default_value = "date-desc")]
    sort: SortOrder,
}

fn parse_status(s: &str) -> Result<PublicationStatus, String> {
    PublicationStatus::parse(s).ok_or_else(|| format!("unknown status '{s}'"))
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| {
        let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        format!("unknown category '{s}' (expected one of: {})", names.join(", "))
    })
}

fn parse_field(s: &str) -> Result<ResearchField, String> {
    ResearchField::parse(s).ok_or_else(|| {
        let names: Vec<&str> = ResearchField::all().iter().map(|f| f.as_str()).collect();
        format!("unknown field '{s}' (expected one of: {})", names.join(", "))
    })
}

fn parse_sort(s: &str) -> Result<SortOrder, String> {
    SortOrder::parse(s).ok_or_else(|| format!("unknown sort order '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config_file::load_config();
    let color = ColorMode(!cli.no_color);
    let location = config.resolve_location(cli.data.as_deref());

    match cli.command {
        Command::Months => months(&location, &config, color).await,
        Command::List {
            filters,
            month,
            from,
            to,
            more,
            json,
        } => {
            let range = match (from, to) {
                (Some(f), Some(t)) => Some(DateRange::new(&f, &t)?),
                _ => None,
            };
            list(&location, &config, filters, month, range, more, json, color).await
        }
        Command::Show { id } => show(&location, &config, &id, color).await,
        Command::Export { ids, output } => export(&location, &config, ids, output, color).await,
        Command::Shard { jsonl, out_dir } => shard(&jsonl, &out_dir, color),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins; otherwise warn, or debug with --verbose
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build a store for `location` and fetch its index.
async fn open_store(location: &str, config: &ConfigFile) -> anyhow::Result<CatalogStore> {
    let source = from_location(location, config.timeout())?;
    let mut store = CatalogStore::new(source);
    store.load_index().await;
    Ok(store)
}

fn new_session(store: CatalogStore, config: &ConfigFile) -> Session {
    Session::new(store, Pager::new(config.initial_batch(), config.batch()))
}

/// Load every month with a progress bar on stderr.
async fn load_everything(session: &mut Session, color: ColorMode) -> anyhow::Result<()> {
    let total = session.store().index().len();
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{spinner:.cyan} Loading {msg} [{bar:30.cyan/dim}] {pos}/{len}")?
        .progress_chars("=> ");
    bar.set_style(style);

    let report = session
        .store_mut()
        .load_all_with(|month, done, _| {
            bar.set_message(month.to_string());
            bar.set_position(done as u64);
        })
        .await;
    bar.finish_and_clear();

    output::print_load_report(&mut std::io::stderr(), &report, color)?;
    session.refresh();
    Ok(())
}

async fn months(location: &str, config: &ConfigFile, color: ColorMode) -> anyhow::Result<()> {
    let store = open_store(location, config).await?;
    if store.index().is_empty() {
        anyhow::bail!("No months found in {location}/index.json");
    }
    let mut out = std::io::stdout();
    output::print_months(&mut out, store.index(), color)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn list(
    location: &str,
    config: &ConfigFile,
    filters: FilterArgs,
    month: Option<String>,
    range: Option<DateRange>,
    more: usize,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let store = open_store(location, config).await?;
    let mut session = new_session(store, config);

    if let Some(month) = month {
        if !is_month_key(&month) {
            anyhow::bail!("Invalid month '{month}', expected YYYY-MM");
        }
        session.select_month(MonthSelection::Month(month)).await?;
    } else if range.is_some() {
        let report = session.set_date_range(range).await?;
        output::print_load_report(&mut std::io::stderr(), &report, color)?;
    } else {
        load_everything(&mut session, color).await?;
    }

    session.set_status(filters.status);
    session.set_category(filters.category);
    session.set_field(filters.field);
    session.set_task(filters.task);
    session.set_search(filters.search.unwrap_or_default());
    session.set_sort(filters.sort);

    for _ in 0..more {
        if session.load_more().is_none() {
            break;
        }
    }

    let mut out = std::io::stdout().lock();
    if json {
        let papers: Vec<&paperboard_core::Paper> =
            session.rendered().iter().map(|p| &**p).collect();
        serde_json::to_writer_pretty(&mut out, &papers)?;
        writeln!(out)?;
        return Ok(());
    }

    output::print_facets(&mut out, session.facets(), color)?;
    output::print_result_header(
        &mut out,
        session.results().len(),
        session.rendered().len(),
        &session.filter().describe(),
        color,
    )?;
    for paper in session.rendered() {
        output::print_paper(&mut out, &PaperView::from(&**paper), color)?;
    }
    output::print_more_hint(
        &mut out,
        session.results().len() - session.rendered().len(),
        color,
    )?;
    Ok(())
}

async fn show(location: &str, config: &ConfigFile, id: &str, color: ColorMode) -> anyhow::Result<()> {
    let store = open_store(location, config).await?;
    let mut session = new_session(store, config);
    load_everything(&mut session, color).await?;

    let Some(paper) = session.find(id) else {
        anyhow::bail!("No paper with id '{id}' in {location}");
    };
    let mut out = std::io::stdout();
    output::print_paper_detail(&mut out, &PaperView::from(&*paper), color)?;
    Ok(())
}

async fn export(
    location: &str,
    config: &ConfigFile,
    ids: Vec<String>,
    output_path: Option<PathBuf>,
    color: ColorMode,
) -> anyhow::Result<()> {
    let store = open_store(location, config).await?;
    let mut session = new_session(store, config);
    load_everything(&mut session, color).await?;

    for id in &ids {
        session.select(id);
    }
    let bibtex = session.export_bibtex()?;

    let path = output_path
        .or_else(|| config.export_path().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
    write_bibtex(&path, &bibtex)?;

    let entries = bibtex.matches("@article{").count();
    let msg = format!("Wrote {} entries to {}", entries, path.display());
    if color.enabled() {
        use owo_colors::OwoColorize;
        eprintln!("{}", msg.green());
    } else {
        eprintln!("{}", msg);
    }
    Ok(())
}

fn shard(jsonl: &std::path::Path, out_dir: &std::path::Path, color: ColorMode) -> anyhow::Result<()> {
    if !jsonl.exists() {
        anyhow::bail!("Metadata file not found at {}", jsonl.display());
    }
    let summary = paperboard_core::shard::build_shards(jsonl, out_dir)?;
    let mut out = std::io::stdout();
    output::print_shard_summary(&mut out, &summary, &out_dir.display().to_string(), color)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_filters() {
        let cli = Cli::parse_from([
            "paperboard",
            "--data",
            "docs/data",
            "list",
            "--status",
            "published",
            "--field",
            "software testing",
            "--sort",
            "date-asc",
            "--more",
            "2",
        ]);
        assert_eq!(cli.data.as_deref(), Some("docs/data"));
        let Command::List { filters, more, .. } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(filters.status, Some(PublicationStatus::Published));
        assert_eq!(filters.field, Some(ResearchField::SoftwareTesting));
        assert_eq!(filters.sort, SortOrder::DateAsc);
        assert_eq!(more, 2);
    }

    #[test]
    fn month_conflicts_with_range() {
        let res = Cli::try_parse_from([
            "paperboard", "list", "--month", "2024-01", "--from", "2024-01-01", "--to", "2024-01-31",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn range_requires_both_ends() {
        assert!(Cli::try_parse_from(["paperboard", "list", "--from", "2024-01-01"]).is_err());
    }

    #[test]
    fn export_collects_repeated_ids() {
        let cli = Cli::parse_from([
            "paperboard", "export", "--id", "2401.00001", "--id", "2401.00002", "-o", "refs.bib",
        ]);
        let Command::Export { ids, output } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(ids, vec!["2401.00001", "2401.00002"]);
        assert_eq!(output, Some(PathBuf::from("refs.bib")));
    }

    fn write_catalog(dir: &std::path::Path) {
        std::fs::write(dir.join("index.json"), r#"[{"month":"2024-01"}]"#).unwrap();
        std::fs::write(
            dir.join("2024-01.json"),
            r#"[{"id":"2401.00001","title":"Log Parsing at Scale","authors":["Ada Lovelace"],"published":"2024-01-05"},
                {"id":"2401.00002","title":"Other","published":"2024-01-06"}]"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn export_with_repeated_id_keeps_it_selected() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let out = dir.path().join("refs.bib");

        export(
            &dir.path().display().to_string(),
            &ConfigFile::default(),
            vec!["2401.00001".into(), "2401.00001".into()],
            Some(out.clone()),
            ColorMode(false),
        )
        .await
        .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.matches("@article{").count(), 1);
        assert!(written.contains("author={Ada Lovelace},"));
    }

    #[tokio::test]
    async fn export_of_unknown_id_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let out = dir.path().join("refs.bib");

        let res = export(
            &dir.path().display().to_string(),
            &ConfigFile::default(),
            vec!["9999.99999".into()],
            Some(out.clone()),
            ColorMode(false),
        )
        .await;
        assert!(res.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["paperboard", "list", "--category", "Opinion"]).is_err());
    }
}
