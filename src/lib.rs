pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod header;
pub mod io_utils;
pub mod load;
pub mod normalize;
pub mod prefs;
pub mod rank;
pub mod render;
pub mod source;
pub mod summary;
pub mod table;
pub mod tier;
pub mod view;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands},
    config::Config,
    header::{FieldKey, TableLayout, detect_layout},
    load::{Session, SourceKind},
    prefs::Preferences,
    render::{RenderContext, Renderer},
    source::{TextOptions, read_workbook},
    view::{Tab, View, ViewState, build_view},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("rankboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;
    match &cli.command {
        Commands::Show(args) => handle_show(&cli, &config, args),
        Commands::Export(args) => handle_export(&config, args),
        Commands::Inspect(args) => handle_inspect(&config, args),
        Commands::Theme(args) => handle_theme(&cli, args),
        Commands::Config(args) => handle_config(&config, args),
    }
}

fn text_options(args: &cli::SourceArgs) -> Result<TextOptions> {
    Ok(TextOptions {
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    })
}

fn load_session(config: &Config, args: &cli::SourceArgs) -> Result<Session> {
    let options = text_options(args)?;
    let source = SourceKind::from_input(args.input.as_deref(), config);
    info!("Loading {:?}", source.path());
    Ok(Session::load(&source, config, &options))
}

fn view_state(args: &cli::ViewArgs, top_n: Option<usize>) -> ViewState {
    ViewState::default()
        .with_sort(args.sort)
        .with_query(args.search.clone())
        .with_tab(Tab::parse(&args.group))
        .with_top_n(top_n)
}

fn warn_unknown_tab(session: &Session, state: &ViewState) {
    let (Some(dataset), Tab::Group(label)) = (&session.dataset, &state.tab) else {
        return;
    };
    let labels = view::group_labels(dataset);
    if !labels.iter().any(|known| known.eq_ignore_ascii_case(label)) {
        warn!(
            "Group '{}' not found; available groups: {}",
            label,
            if labels.is_empty() {
                "none".to_string()
            } else {
                labels.join(", ")
            }
        );
    }
}

fn handle_show(cli: &Cli, config: &Config, args: &cli::ShowArgs) -> Result<()> {
    let session = load_session(config, &args.source)?;
    let top_n = match args.top {
        Some(0) => None,
        Some(limit) => Some(limit),
        None => config.chart.top_n,
    };
    let state = view_state(&args.view, top_n);
    warn_unknown_tab(&session, &state);
    let view = build_view(session.dataset.as_ref(), &state);
    let theme = match args.theme {
        Some(theme) => theme,
        None => Preferences::load(&cli.prefs)?.theme,
    };
    debug!("Rendering {} row(s) with theme {}", view.rows.len(), theme.as_str());

    let renderer = Renderer::standard().with_hook(|ctx, _| {
        debug!(
            "Rendered {} of {} row(s) for tab {:?}",
            ctx.view.rows.len(),
            ctx.view.base.len(),
            ctx.state.tab
        );
    });
    let output = renderer.render(&RenderContext {
        session: &session,
        state: &state,
        view: &view,
        config,
        theme,
    });
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Writing leaderboard to stdout")?;
    Ok(())
}

fn handle_export(config: &Config, args: &cli::ExportArgs) -> Result<()> {
    let session = load_session(config, &args.source)?;
    let state = view_state(&args.view, None);
    warn_unknown_tab(&session, &state);
    let view: View = build_view(session.dataset.as_ref(), &state);
    if view.rows.is_empty() {
        warn!("Nothing to export: {}", session.hint);
        return Ok(());
    }

    let encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
    let delimiter = args.output_delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter, encoding)?;
    let rows = export::write_csv(&mut writer, &view, &config.export.labels)?;

    let destination = args
        .output
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!("Exported {} row(s) -> {}", rows, destination);
    Ok(())
}

fn handle_inspect(config: &Config, args: &cli::InspectArgs) -> Result<()> {
    let options = text_options(&args.source)?;
    let path = args
        .source
        .input
        .clone()
        .unwrap_or_else(|| config.default_source.clone());
    let sheets = read_workbook(&path, &options).with_context(|| format!("Reading {path:?}"))?;

    let headers = ["sheet", "layout", "group", "field", "column"]
        .map(String::from)
        .to_vec();
    let mut rows = Vec::new();
    for sheet in &sheets {
        let header_row = sheet.header_row();
        let layout = detect_layout(&header_row, &config.synonyms, &config.groups);
        let blocks = match &layout {
            TableLayout::Single(map) => vec![("single", "-".to_string(), map)],
            TableLayout::Split(groups) => groups
                .iter()
                .map(|g| ("split", g.label.clone(), &g.columns))
                .collect(),
        };
        for (kind, group, map) in blocks {
            for key in FieldKey::ALL {
                let column = map
                    .get(key)
                    .map(|col| format!("{} (#{})", col.header, col.index + 1))
                    .unwrap_or_else(|| "-".to_string());
                rows.push(vec![
                    sheet.name.clone(),
                    kind.to_string(),
                    group.clone(),
                    key.to_string(),
                    column,
                ]);
            }
        }
        if let TableLayout::Single(map) = &layout
            && !map.is_usable()
        {
            let found = header_row.iter().flatten().join(", ");
            warn!("Sheet '{}' is not usable; headers found: {}", sheet.name, found);
        }
    }
    let aligns = [table::Align::Left; 5];
    print!("{}", table::render_table(&headers, &rows, &aligns));
    info!("Inspected {} sheet(s) in {:?}", sheets.len(), path);
    Ok(())
}

fn handle_theme(cli: &Cli, args: &cli::ThemeArgs) -> Result<()> {
    let mut prefs = Preferences::load(&cli.prefs)?;
    if args.show {
        println!("{}", prefs.theme.as_str());
        return Ok(());
    }
    let next = args.theme.unwrap_or_else(|| prefs.theme.toggled());
    prefs.theme = next;
    prefs
        .save(&cli.prefs)
        .with_context(|| format!("Saving preferences to {:?}", cli.prefs))?;
    println!("{}", prefs.theme.as_str());
    info!("Saved theme '{}' to {:?}", prefs.theme.as_str(), cli.prefs);
    Ok(())
}

fn handle_config(config: &Config, args: &cli::ConfigArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            config.save(path)?;
            info!("Configuration written to {:?}", path);
        }
        None => print!("{}", config.to_yaml_string()?),
    }
    Ok(())
}
