// src/main.rs

use anyhow::Context;
use clap::Parser;
use folio::analytics::{measure_content, plain_text};
use folio::api::storage::clients_from_config;
use folio::api::{
    AdminApi, HttpImageFetcher, ObjectStorage, Suggestion, SuggestionKind, SuggestionRequest,
    UploadFallback,
};
use folio::config::{draft_dir_from_env, Command, CommandLineInput, DraftAction, SuggestField};
use folio::editor::{BlockEditor, Editor, Toolbar, ToolbarPreset};
use folio::import::{parse_export, ImportSession, Importer, RowStatus};
use folio::output::{deliver, OutputPlan};
use folio::store::{draft_key, DraftStore};
use folio::upload::{
    BulkUploader, ImageUploader, OptimizeOptions, UploadFile, UploadPipeline, UploadStatus,
};
use folio::{
    normalize_content, render_for_display, serialize_blocks, AdminConfig, AppError, ArticleForm,
    ContentBlock, RecordId,
};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("folio.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // stdout carries command output (HTML, JSON), so logs go to stderr
    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Reads a file, or stdin when `input` is `-`.
async fn read_input(input: &str) -> Result<String, AppError> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    Ok(tokio::fs::read_to_string(input).await?)
}

fn emit(output: Option<PathBuf>, content: String) -> Result<(), AppError> {
    let report = deliver(OutputPlan::file_or_stdout(output, content));
    if report.is_success() {
        Ok(())
    } else {
        Err(AppError::InternalError {
            message: format!("output failed: {}", report.failures().join("; ")),
            source: None,
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Uploader and admin client built from the environment.
fn connect(no_optimize: bool) -> Result<(UploadPipeline, Arc<dyn AdminApi>), AppError> {
    let config = AdminConfig::from_env()?;
    let (storage, admin) = clients_from_config(&config)?;
    let admin = Arc::new(admin);
    let fallback: Arc<dyn UploadFallback> = admin.clone();
    let admin: Arc<dyn AdminApi> = admin;

    if storage.is_none() {
        log::info!("No storage configured, uploads go through the admin endpoint");
    }
    let storage = storage.map(|s| Arc::new(s) as Arc<dyn ObjectStorage>);
    let optimize = (!no_optimize).then(OptimizeOptions::default);
    let pipeline = UploadPipeline::new(storage, fallback).with_optimization(optimize);

    Ok((pipeline, admin))
}

async fn render(input: &str, display: bool, output: Option<PathBuf>) -> anyhow::Result<()> {
    let blocks: Vec<ContentBlock> = serde_json::from_str(&read_input(input).await?)?;
    let html = if display {
        render_for_display(&blocks)
    } else {
        serialize_blocks(&blocks)
    };
    Ok(emit(output, html)?)
}

async fn parse(input: &str, toolbar: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let preset: ToolbarPreset = toolbar.parse().map_err(AppError::Editor)?;
    let mut editor = Editor::new(Toolbar::preset(preset));
    let html = read_input(input).await?;
    let blocks = editor.parse(&html);

    let summary = measure_content(blocks);
    log::info!(
        "Parsed {} blocks, {} words, {} images",
        summary.blocks,
        summary.words,
        summary.images
    );
    Ok(emit(output, to_json(&blocks)?)?)
}

async fn normalize(
    input: &str,
    legacy_images: &[String],
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let text = read_input(input).await?;
    // a bare HTML file is a stored string value too
    let value = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
    let blocks = normalize_content(&value, legacy_images);
    Ok(emit(output, to_json(&blocks)?)?)
}

async fn upload(files: &[PathBuf], folder: &str, no_optimize: bool) -> anyhow::Result<()> {
    let mut loaded = Vec::with_capacity(files.len());
    for path in files {
        loaded.push(UploadFile::from_path(path).await?);
    }

    let (pipeline, _) = connect(no_optimize)?;
    let uploader: Arc<dyn ImageUploader> = Arc::new(pipeline);
    let report = BulkUploader::new(uploader).upload_all(loaded, folder).await;

    for (file, status) in report.files.iter().zip(&report.statuses) {
        match status {
            UploadStatus::Success(url) => println!("✓ {} → {}", file.name, url),
            UploadStatus::Error(message) => println!("✗ {}: {}", file.name, message),
            other => println!("? {}: {}", file.name, other),
        }
    }
    println!("Uploaded {}", report.summary());

    if report.failed_count() > 0 {
        anyhow::bail!("{} of {} uploads failed", report.failed_count(), report.total());
    }
    Ok(())
}

fn print_rows(session: &ImportSession) {
    for (index, row) in session.rows().iter().enumerate() {
        let mark = if row.selected { "x" } else { " " };
        let date = row
            .post
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "----------".to_string());
        let status = match &row.status {
            RowStatus::Error(message) => format!("error: {}", message),
            RowStatus::Success(id) => format!("success ({})", id),
            other => other.to_string(),
        };
        println!(
            "[{}] {:>3}  {}  {:<50}  {} images  {}",
            mark,
            index + 1,
            date,
            row.post.title,
            row.post.images.len(),
            status
        );
    }
}

async fn import(
    file: &Path,
    target: folio::RecordKind,
    dry_run: bool,
    skip: &[usize],
) -> anyhow::Result<()> {
    let xml = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("could not read {}", file.display()))?;
    let mut session = ImportSession::new(parse_export(&xml)?, target);
    for row in skip {
        session.deselect(row.saturating_sub(1));
    }

    println!(
        "{} blog posts found, {} selected for import as {}",
        session.rows().len(),
        session.selected_count(),
        target
    );
    if dry_run || session.selected_count() == 0 {
        print_rows(&session);
        return Ok(());
    }

    let (pipeline, admin) = connect(false)?;
    let importer = Importer::new(
        Arc::new(HttpImageFetcher::new()?),
        Arc::new(pipeline),
        admin,
        target.endpoint(),
    );
    let summary = importer.run(&mut session, chrono::Utc::now()).await;

    print_rows(&session);
    println!("{}", summary);
    Ok(())
}

async fn suggest(input: &str, field: SuggestField) -> anyhow::Result<()> {
    let form: ArticleForm = serde_json::from_str(&read_input(input).await?)?;
    let request = SuggestionRequest {
        title: form.title.clone(),
        excerpt: form.excerpt.clone(),
        content: plain_text(&form.content),
    };
    let kind = match field {
        SuggestField::Tags => SuggestionKind::Tags,
        SuggestField::Description => SuggestionKind::Description,
        SuggestField::ReadTime => SuggestionKind::ReadTime,
    };

    let (_, admin) = connect(true)?;
    match admin.suggest(kind, &request).await? {
        Suggestion::Tags(tags) => println!("{}", tags.join(", ")),
        Suggestion::Description(description) => println!("{}", description),
        Suggestion::ReadTime(minutes) => println!("{} min read", minutes),
    }
    Ok(())
}

fn record_id(record: Option<&str>) -> anyhow::Result<Option<RecordId>> {
    Ok(record.map(RecordId::parse).transpose()?)
}

async fn draft(action: DraftAction) -> anyhow::Result<()> {
    let store = DraftStore::open(draft_dir_from_env()).await?;
    log::debug!("Draft directory: {}", store.dir().display());

    match action {
        DraftAction::Save { input, record } => {
            let form: ArticleForm = serde_json::from_str(&read_input(&input).await?)?;
            let key = draft_key(record_id(record.as_deref())?.as_ref());
            let saved_at = chrono::Utc::now();
            store.save(&key, &form, saved_at).await?;
            println!("Saved {} at {}", key, saved_at.to_rfc3339());
        }
        DraftAction::Show { record, output } => {
            let key = draft_key(record_id(record.as_deref())?.as_ref());
            match store.load::<ArticleForm>(&key).await {
                Some(saved) => emit(output, to_json(&saved)?)?,
                None => println!("No draft saved under {}", key),
            }
        }
        DraftAction::Discard { record } => {
            let key = draft_key(record_id(record.as_deref())?.as_ref());
            store.remove(&key).await?;
            println!("Discarded {}", key);
        }
    }
    Ok(())
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Render { input, display, output } => render(&input, display, output).await,
        Command::Parse { input, toolbar, output } => parse(&input, &toolbar, output).await,
        Command::Normalize {
            input,
            legacy_images,
            output,
        } => normalize(&input, &legacy_images, output).await,
        Command::Upload {
            files,
            folder,
            no_optimize,
        } => upload(&files, &folder, no_optimize).await,
        Command::Import {
            file,
            target,
            dry_run,
            skip,
        } => import(&file, target.into(), dry_run, &skip).await,
        Command::Suggest { input, field } => suggest(&input, field).await,
        Command::Draft { action } => draft(action).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("could not initialize logging")?;

    run(cli.command).await?;

    Ok(())
}
