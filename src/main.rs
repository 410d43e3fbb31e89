mod cli;

use movietag::{config, metadata::SearchResult, Pipeline};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::{BufRead, Write};
use std::path::Path;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

/// Overview length shown per candidate.
const OVERVIEW_CHARS: usize = 100;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "movietag=debug,movietag_av=debug,movietag_parser=debug".to_string()
        } else {
            "movietag=info,movietag_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse { file, json } => parse_file(&file, cli.config.as_deref(), json),
        Commands::Search { query, year, json } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let (rt, cancel) = runtime()?;
            search(&rt, &cancel, &config, &query, year.as_deref(), json)
        }
        Commands::Identify { file, json } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let (rt, cancel) = runtime()?;
            identify(&rt, &cancel, &config, &file, json)
        }
        Commands::Tag {
            file,
            query,
            pick,
            no_poster,
            dry_run,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let (rt, cancel) = runtime()?;
            let options = TagOptions {
                query,
                pick,
                attach_poster: !no_poster,
                dry_run,
            };
            tag_file(&rt, &cancel, &config, &file, options)
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::SetApiKey { key } => set_api_key(cli.config.as_deref(), &key),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("movietag {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Tokio runtime plus a token that is cancelled on Ctrl-C.
fn runtime() -> Result<(Runtime, CancellationToken)> {
    let rt = Runtime::new()?;
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    Ok((rt, cancel))
}

fn parse_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let parser = config.parser.build_parser()?;
    let info = parser.parse(file);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Title: {}", info.title);
        println!("Year: {}", if info.year.is_empty() { "-" } else { &info.year });
    }

    Ok(())
}

fn search(
    rt: &Runtime,
    cancel: &CancellationToken,
    config: &config::Config,
    query: &str,
    year: Option<&str>,
    json: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        return Err(movietag::Error::EmptyQuery.into());
    }

    let pipeline = Pipeline::from_config(config)?;
    let candidates = rt.block_on(pipeline.resolver().resolve(query, year, cancel))?;

    print_candidates(&candidates, json)
}

fn identify(
    rt: &Runtime,
    cancel: &CancellationToken,
    config: &config::Config,
    file: &Path,
    json: bool,
) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let mut session = pipeline.open(file)?;

    if !json {
        print_parsed(&session);
    }

    let candidates = rt.block_on(pipeline.search(&mut session, None, true, cancel))?;
    print_candidates(candidates, json)
}

struct TagOptions {
    query: Option<String>,
    pick: Option<usize>,
    attach_poster: bool,
    dry_run: bool,
}

fn tag_file(
    rt: &Runtime,
    cancel: &CancellationToken,
    config: &config::Config,
    file: &Path,
    options: TagOptions,
) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let mut session = pipeline.open(file)?;
    print_parsed(&session);

    // A typed query is searched without the parsed year.
    let use_year = options.query.is_none();
    let count = rt
        .block_on(pipeline.search(&mut session, options.query.as_deref(), use_year, cancel))?
        .len();

    if count == 0 {
        anyhow::bail!("No matches found on TMDB. Try --query with a different title.");
    }

    print_candidates(session.candidates(), false)?;

    let index = match options.pick {
        Some(0) => anyhow::bail!("--pick counts from 1"),
        Some(n) => n - 1,
        None => prompt_selection(count)?,
    };

    let selected = pipeline.select(&mut session, index)?;
    println!("\nSelected: {}", selected.display_title());

    if options.dry_run {
        let tags = rt.block_on(pipeline.prepare(&session, options.attach_poster, cancel))?;
        println!("\nTags:");
        for (key, value) in tags.container_tags() {
            println!("  {key}: {value}");
        }
        if tags.has_poster() {
            println!("  cover art: {} bytes", tags.poster.len());
        }
        println!(
            "\n[DRY RUN] Would rename to {}",
            pipeline.destination(&session, &tags).display()
        );
        return Ok(());
    }

    println!("\nWriting metadata...");
    let renamed = rt.block_on(pipeline.process(&mut session, options.attach_poster, cancel))?;

    println!("\nProcessing complete!");
    println!("Output: {}", renamed.display());

    Ok(())
}

fn print_parsed(session: &movietag::Session) {
    let info = session.info();
    println!("File: {}", session.file().display());
    if info.year.is_empty() {
        println!("Parsed: {}", info.title);
    } else {
        println!("Parsed: {} ({})", info.title, info.year);
    }
}

fn print_candidates(candidates: &[SearchResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(candidates)?);
        return Ok(());
    }

    println!("\nCandidates: {}", candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        println!("  {}. {} [tmdb:{}]", i + 1, candidate.display_title(), candidate.id);
        if !candidate.overview.is_empty() {
            println!("      {}", candidate.display_overview(OVERVIEW_CHARS));
        }
    }

    Ok(())
}

/// Ask on stdin which candidate to use. Blank input or end of input
/// cancels.
fn prompt_selection(count: usize) -> Result<usize> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("\nSelect a movie [1-{count}] (blank to cancel): ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            return Err(movietag::Error::NoSelection.into());
        }

        match line.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(n - 1),
            _ => println!("Please enter a number between 1 and {count}."),
        }
    }
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = movietag_av::check_tools(config.tools.ffmpeg_path.as_deref());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg or set tools.ffmpeg_path.");
    }

    Ok(())
}

fn set_api_key(config_path: Option<&Path>, key: &str) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path);

    config::persist::set_api_key(&path, key)
        .with_context(|| format!("Failed to store API key in {:?}", path))?;

    println!("API key saved to {}", path.display());
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::load_config_or_default(None)?
        }
    };

    println!(
        "  TMDB API key: {}",
        if config.tmdb.has_api_key() {
            "configured"
        } else {
            "missing"
        }
    );
    println!("  TMDB language: {}", config.tmdb.language);
    println!("  TMDB endpoint: {}", config.tmdb.base_url);
    match config.tools.ffmpeg_path {
        Some(ref ffmpeg) => println!("  ffmpeg: {}", ffmpeg.display()),
        None => println!("  ffmpeg: from PATH"),
    }
    println!("  Extensions: {}", config.files.extensions.join(", "));
    println!(
        "  Extra release markers: {}",
        config.parser.extra_markers.len() + config.parser.extra_patterns.len()
    );

    Ok(())
}
