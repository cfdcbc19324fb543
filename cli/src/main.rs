use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::media::{LocalFile, MemoryPreviews, SequenceKind, is_remote_url};
use canvas::model::CanvasModel;
use canvas::page::{BackgroundKind, PartialTextBox, ScrollHeight};
use clap::{Args, Parser, Subcommand, ValueEnum};
use page_editor::api::http::HttpApi;
use page_editor::api::{ApiError, EnhanceKind};
use page_editor::catalog;
use page_editor::config::{
    ConfigError, DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TEMPLATE_PATH, EditorConfig, Timeouts,
};
use page_editor::enhance::{EnhanceError, clear_tts_cache, enhance_text_box};
use page_editor::session::{EditorSession, Prompt, SessionError, Services};
use page_editor::template::{FileTemplateStore, TemplateError, TemplateStore};
use serde_json::Value;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Enhance(#[from] EnhanceError),
    #[error("cannot read {}: {source}", .path.display())]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "page-editor", about = "Storybook page editor backend CLI")]
struct Cli {
    #[arg(long, env = "PAGE_EDITOR_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "PAGE_EDITOR_API_TOKEN")]
    api_token: Option<String>,

    #[arg(long, env = "PAGE_EDITOR_TEMPLATE_PATH", default_value = DEFAULT_TEMPLATE_PATH)]
    template_path: PathBuf,

    #[arg(long, env = "PAGE_EDITOR_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    #[arg(long, env = "PAGE_EDITOR_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[arg(long, short = 'y', default_value_t = false, help = "Answer yes to every confirmation")]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Pages(PagesCommand),
    Page(PageCommand),
    Template(TemplateCommand),
    Tts(TtsCommand),
    /// List games that can back a web-view page.
    Games,
    /// List the book's character voices.
    Voices {
        #[arg(long)]
        book: String,
    },
}

#[derive(Args, Debug)]
struct PagesCommand {
    #[command(subcommand)]
    command: PagesSubcommand,
}

#[derive(Subcommand, Debug)]
enum PagesSubcommand {
    List {
        #[arg(long)]
        book: String,
    },
    Delete {
        #[arg(long)]
        book: String,
        page_id: String,
    },
}

#[derive(Args, Debug)]
struct PageCommand {
    #[command(subcommand)]
    command: PageSubcommand,
}

#[derive(Subcommand, Debug)]
enum PageSubcommand {
    Save(SaveArgs),
}

#[derive(Args, Debug)]
struct SaveArgs {
    #[arg(long)]
    book: String,

    #[arg(long, help = "Update this page instead of creating a new one")]
    edit: Option<String>,

    #[arg(long)]
    page_number: Option<u32>,

    #[arg(long, help = "Local file or https:// URL")]
    background: Option<String>,

    #[arg(long, help = "Local file or https:// URL")]
    scroll: Option<String>,

    #[arg(long, value_parser = ["0", "30", "60"])]
    scroll_height: Option<String>,

    #[arg(long, help = "Local audio file")]
    sound_effect: Option<PathBuf>,

    #[arg(long = "text", help = "Add a text box; repeatable")]
    texts: Vec<String>,

    #[arg(long = "video", help = "Append a video sequence item; repeatable")]
    videos: Vec<PathBuf>,

    #[arg(long = "image", help = "Append an image sequence item; repeatable")]
    images: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    coloring: bool,

    #[arg(long, conflicts_with = "game")]
    web_view_url: Option<String>,

    #[arg(long, help = "Catalog game id for a web-view page")]
    game: Option<String>,
}

#[derive(Args, Debug)]
struct TemplateCommand {
    #[command(subcommand)]
    command: TemplateSubcommand,
}

#[derive(Subcommand, Debug)]
enum TemplateSubcommand {
    Show {
        #[arg(long)]
        book: String,
    },
    Clear {
        #[arg(long)]
        book: String,
    },
    /// Copy page 1's layout onto every other page with blank text.
    ApplyAll {
        #[arg(long)]
        book: String,
    },
}

#[derive(Args, Debug)]
struct TtsCommand {
    #[command(subcommand)]
    command: TtsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TtsSubcommand {
    /// Rewrite one text box of a page with speech markup and save it.
    Enhance {
        #[arg(long)]
        book: String,
        #[arg(long)]
        page: String,
        #[arg(long = "box", default_value_t = 0)]
        box_index: usize,
        #[arg(long, value_enum, default_value_t = Markup::Emotion)]
        kind: Markup,
    },
    ClearCache {
        #[arg(long)]
        book: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    Emotion,
    Sfx,
}

impl From<Markup> for EnhanceKind {
    fn from(value: Markup) -> Self {
        match value {
            Markup::Emotion => Self::Emotion,
            Markup::Sfx => Self::SoundEffect,
        }
    }
}

/// Confirmations read from stdin, or always yes with `--yes`.
struct StdinPrompt {
    assume_yes: bool,
}

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            eprintln!("{question} yes");
            return true;
        }
        eprint!("{question} [y/N] ");
        if let Err(err) = io::stderr().flush() {
            tracing::debug!(error = %err, "prompt flush failed");
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

struct CliContext {
    api: Arc<HttpApi>,
    templates: Arc<FileTemplateStore>,
    prompt: Arc<StdinPrompt>,
}

impl CliContext {
    fn session(&self, book_id: &str) -> EditorSession {
        let services = Services {
            pages: self.api.clone(),
            uploads: self.api.clone(),
            templates: self.templates.clone(),
            prompt: self.prompt.clone(),
        };
        EditorSession::new(book_id, services, Arc::new(MemoryPreviews::new()))
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let timeouts = Timeouts { request_secs: cli.request_timeout_secs, connect_secs: cli.connect_timeout_secs };
    let config = EditorConfig::new(&cli.api_url, cli.api_token, timeouts, cli.template_path)?;
    let ctx = CliContext {
        api: Arc::new(HttpApi::new(&config)?),
        templates: Arc::new(FileTemplateStore::new(config.template_path.clone())),
        prompt: Arc::new(StdinPrompt { assume_yes: cli.yes }),
    };

    match cli.command {
        Command::Pages(pages) => run_pages(&ctx, pages).await,
        Command::Page(page) => match page.command {
            PageSubcommand::Save(args) => run_save(&ctx, args).await,
        },
        Command::Template(template) => run_template(&ctx, template).await,
        Command::Tts(tts) => run_tts(&ctx, tts).await,
        Command::Games => {
            let games = catalog::fetch_webview_games(ctx.api.as_ref()).await?;
            print_json(&serde_json::to_value(games)?)
        }
        Command::Voices { book } => {
            let voices = catalog::fetch_character_voices(ctx.api.as_ref(), &book).await?;
            print_json(&serde_json::to_value(voices)?)
        }
    }
}

async fn run_pages(ctx: &CliContext, pages: PagesCommand) -> Result<(), CliError> {
    match pages.command {
        PagesSubcommand::List { book } => {
            let mut session = ctx.session(&book);
            session.fetch_pages().await?;
            print_json(&serde_json::to_value(session.pages())?)?;
            eprintln!("next page number: {}", session.next_page_number());
            Ok(())
        }
        PagesSubcommand::Delete { book, page_id } => {
            let mut session = ctx.session(&book);
            session.fetch_pages().await?;
            if session.delete_page(&page_id).await? {
                eprintln!("deleted {page_id}; {} pages remain", session.pages().len());
            } else {
                eprintln!("delete cancelled");
            }
            Ok(())
        }
    }
}

async fn run_save(ctx: &CliContext, args: SaveArgs) -> Result<(), CliError> {
    let mut session = ctx.session(&args.book);
    session.fetch_pages().await?;
    if let Some(page_id) = &args.edit {
        session.select_page_for_editing(page_id)?;
    }

    if let Some(game_id) = &args.game {
        let games = catalog::fetch_webview_games(ctx.api.as_ref()).await?;
        let game = games
            .iter()
            .find(|g| &g.id == game_id)
            .ok_or_else(|| CliError::NotFound(format!("web-view game {game_id}")))?;
        let model = session.model_mut();
        catalog::select_game(model, game);
        model.web_view.enabled = true;
    }
    apply_save_args(session.model_mut(), &args).await?;

    let Some(report) = session.save().await? else {
        return Ok(());
    };
    for warning in &report.outcome.warnings {
        eprintln!("warning: {warning}");
    }
    if report.template_saved {
        eprintln!("layout saved as the template for book {}", args.book);
    }
    let verb = if report.outcome.created { "created" } else { "updated" };
    eprintln!("{verb} page {} ({})", report.outcome.payload.page_number, report.outcome.page.id);
    print_json(&serde_json::to_value(&report.outcome.page)?)
}

async fn apply_save_args(model: &mut CanvasModel, args: &SaveArgs) -> Result<(), CliError> {
    if let Some(number) = args.page_number {
        model.page_number = number.max(1);
    }

    if let Some(source) = &args.background {
        match media_source(source) {
            MediaSource::Remote(url) => model.set_background_url(BackgroundKind::infer(&url), &url),
            MediaSource::Local(path) => {
                let file = read_local(&path).await?;
                let kind = if file.is_video() { BackgroundKind::Video } else { BackgroundKind::Image };
                model.set_background_source(kind, file);
            }
        }
    }

    if let Some(source) = &args.scroll {
        match media_source(source) {
            MediaSource::Remote(url) => model.set_scroll_reference(Some(&url)),
            MediaSource::Local(path) => {
                model.set_scroll_source(read_local(&path).await?);
            }
        }
    }
    if let Some(height) = args.scroll_height.as_deref().and_then(|h| h.parse::<f64>().ok()) {
        model.set_scroll_height(ScrollHeight::from_percent(height));
    }

    if let Some(path) = &args.sound_effect {
        model.set_sound_effect(read_local(path).await?);
    }

    for text in &args.texts {
        let id = model.add_text_box();
        model.update_text_box(&id, &PartialTextBox::text(text.clone()));
    }

    for path in &args.videos {
        model.add_sequence_file(SequenceKind::Video, read_local(path).await?);
    }
    for path in &args.images {
        model.add_sequence_file(SequenceKind::Image, read_local(path).await?);
    }
    if !args.videos.is_empty() {
        model.toggle_video_sequence_mode(true);
    } else if !args.images.is_empty() {
        model.toggle_image_sequence_mode(true);
    }

    if args.coloring {
        model.coloring.set_enabled(true);
    }
    if let Some(url) = &args.web_view_url {
        model.web_view.select_url(url);
        model.web_view.enabled = true;
    }
    Ok(())
}

async fn run_template(ctx: &CliContext, template: TemplateCommand) -> Result<(), CliError> {
    match template.command {
        TemplateSubcommand::Show { book } => match ctx.templates.get(&book).await? {
            Some(template) => print_json(&serde_json::to_value(template)?),
            None => {
                eprintln!("no template stored for book {book}");
                Ok(())
            }
        },
        TemplateSubcommand::Clear { book } => {
            if ctx.templates.remove(&book).await? {
                eprintln!("template cleared for book {book}");
            } else {
                eprintln!("no template stored for book {book}");
            }
            Ok(())
        }
        TemplateSubcommand::ApplyAll { book } => {
            let mut session = ctx.session(&book);
            session.fetch_pages().await?;
            let first = session
                .pages()
                .iter()
                .find(|p| p.page_number == 1)
                .map(|p| p.id.clone())
                .ok_or_else(|| CliError::NotFound(format!("page 1 of book {book}")))?;
            session.select_page_for_editing(&first)?;

            let question = format!("Copy page 1's layout onto {} other pages?", session.pages().len().saturating_sub(1));
            if session.can_apply_layout_to_all() && !ctx.prompt.confirm(&question) {
                eprintln!("layout copy cancelled");
                return Ok(());
            }
            let report = session.apply_layout_to_all_pages().await?;
            for (page_number, detail) in &report.failed {
                eprintln!("page {page_number} failed: {detail}");
            }
            eprintln!("layout applied to {} pages", report.updated);
            Ok(())
        }
    }
}

async fn run_tts(ctx: &CliContext, tts: TtsCommand) -> Result<(), CliError> {
    match tts.command {
        TtsSubcommand::Enhance { book, page, box_index, kind } => {
            let mut session = ctx.session(&book);
            session.fetch_pages().await?;
            session.select_page_for_editing(&page)?;
            let box_id = session
                .model()
                .text_boxes()
                .get(box_index)
                .map(|b| b.id.clone())
                .ok_or_else(|| CliError::NotFound(format!("text box {box_index} on page {page}")))?;

            if !enhance_text_box(ctx.api.as_ref(), session.model_mut(), &box_id, kind.into()).await? {
                eprintln!("text box {box_index} is empty; nothing to enhance");
                return Ok(());
            }
            if let Some(text) = session.model().text_box(&box_id).map(|b| b.layout.text.clone()) {
                println!("{text}");
            }
            session.save().await?;
            Ok(())
        }
        TtsSubcommand::ClearCache { book } => {
            if let Some(result) = clear_tts_cache(ctx.api.as_ref(), &book).await? {
                eprintln!("cleared {} cached audio files", result.deleted_count);
            }
            Ok(())
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum MediaSource {
    Remote(String),
    Local(PathBuf),
}

fn media_source(arg: &str) -> MediaSource {
    let trimmed = arg.trim();
    if is_remote_url(trimmed) {
        MediaSource::Remote(trimmed.to_owned())
    } else {
        MediaSource::Local(PathBuf::from(trimmed))
    }
}

async fn read_local(path: &Path) -> Result<LocalFile, CliError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(LocalFile::new(name, bytes))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
