mod args;
mod error;
mod output;

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use gridline_lib::DataTable;
use gridline_lib::config::TableConfig;
use gridline_lib::export;
use gridline_lib::export::ExportOptions;
use gridline_lib::locale::Locale;
use gridline_lib::model::Row;
use gridline_lib::remote::RemoteDataCache;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::args::Cli;
use crate::args::OutputFormat;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<(), CliError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    match log_file {
        Some(path) => WriteLogger::init(level, Config::default(), File::create(path)?)?,
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?,
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = TableConfig::load(&cli.config)?;
    if let Some(per_page) = cli.per_page {
        config = config.with_per_page(per_page);
        config.validate()?;
    }

    let mut table = DataTable::new(config)?;
    for (column, values) in &cli.filters {
        if !table.set_filter(column, values.iter().cloned()) {
            log::warn!("ignoring filter on unknown or unfilterable column '{}'", column);
        }
    }
    if let Some(search) = &cli.search {
        table.set_search(search.clone());
        table.flush_search();
    }
    if let Some(sort) = &cli.sort {
        if !table.set_sort(Some(sort.as_str()), !cli.desc) {
            log::warn!("ignoring sort on unknown or unsortable column '{}'", sort);
        }
    }

    if let Some(path) = &cli.rows {
        table.set_rows(read_rows(path)?);
    } else if let Some(url) = &cli.url {
        let remote = RemoteDataCache::http(url)?
            .with_cache_config(table.config().cache_config())
            .with_retry_config(table.config().retry_config());
        let mut request = table.fetch_request();
        request.page = usize::try_from(cli.page).unwrap_or(1).max(1);
        log::info!("fetching page {} from {}", request.page, url);
        let result = remote.fetch_data(&request).await?.into_inner();
        table.load_remote(&result);
    }
    table.set_page(cli.page);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &table.current_page())?;
            out.write_all(b"\n")?;
        }
        OutputFormat::Csv => {
            let rows = table.paginated_rows();
            export::write_csv(&mut out, &rows, table.columns(), &ExportOptions::default())?;
        }
        OutputFormat::Tsv => {
            let rows = table.paginated_rows();
            export::write_tsv(&mut out, &rows, table.columns(), &ExportOptions::default())?;
        }
        OutputFormat::Table => {
            let page = table.current_page();
            let info = table.page_info();
            let text = output::render_table(&page, info, table.columns(), &Locale::new(cli.lang));
            out.write_all(text.as_bytes())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<Row>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::Rows(format!("{}: {}", path.display(), e)))?;
    let rows: Vec<Row> =
        serde_json::from_str(&text).map_err(|e| CliError::Rows(format!("{}: {}", path.display(), e)))?;
    log::debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
