use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use drivepress::drive::{DriveItem, refresh_access_token};
use drivepress::rename::{NameChange, RenameStatus, diff_names, preview};
use drivepress::server::{self, AppState};
use drivepress::wordpress::WordPressGateway;
use drivepress::{
    BatchOptions, Config, DriveClient, EmbedKind, EmbedOptions, ProgressEvent, ProgressReporter,
    PublishRequest, RenameRules, ReqwestClient, WordPressClient, WordPressConfig, embed_code,
    extract_resource_id, human_readable_size, load_item, publish_episode, rename_item,
};

// Emoji with fallback for terminals without Unicode support
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "[d] ");
static FILE: Emoji<'_, '_> = Emoji("🎬 ", "- ");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static PENCIL: Emoji<'_, '_> = Emoji("✏️  ", "[>] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static STOP: Emoji<'_, '_> = Emoji("🛑 ", "[x] ");

/// Browse and batch-rename Google Drive folders, publish episodes to WordPress
#[derive(Parser, Debug)]
#[command(name = "drivepress")]
#[command(about = "Browse and batch-rename Google Drive folders, publish episodes to WordPress")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the JSON API
    Serve,

    /// Show a Drive file or folder
    List {
        /// Drive link or bare file/folder ID
        url: String,
    },

    /// Rename every file of a Drive file or folder
    Rename {
        /// Drive link or bare file/folder ID
        url: String,

        /// Substring to replace
        #[arg(short, long, default_value = "")]
        find: String,

        /// Replacement for every occurrence of --find
        #[arg(short, long, default_value = "")]
        replace: String,

        /// Text inserted before the file extension
        #[arg(short, long, default_value = "")]
        append: String,

        /// Only show what would change
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Pause between renames in milliseconds (defaults to RENAME_THROTTLE_MS or 300)
        #[arg(long)]
        throttle_ms: Option<u64>,
    },

    /// Print WordPress shortcodes for the videos of a Drive folder
    Embed {
        /// Drive link or bare file/folder ID
        url: String,

        #[arg(short, long, value_enum, default_value = "series")]
        kind: Kind,

        /// Add a season header with the average episode size
        #[arg(short, long)]
        title: bool,

        /// Number episodes from here instead of parsing file names
        #[arg(short, long)]
        start_episode: Option<u32>,
    },

    /// Add an episode button to the matching WordPress post
    Publish {
        #[arg(long)]
        file_name: String,

        /// Download link of the episode
        #[arg(long)]
        link: String,

        /// Search WordPress for this instead of a term derived from the file name
        #[arg(long)]
        search_title: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Series,
    Movie,
}

impl From<Kind> for EmbedKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Series => EmbedKind::Series,
            Kind::Movie => EmbedKind::Movie,
        }
    }
}

/// Progress reporter using indicatif for terminal output
struct IndicatifReporter {
    bar: Mutex<Option<ProgressBar>>,
    spinner: ProgressBar,
}

impl IndicatifReporter {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar: Mutex::new(None),
            spinner,
        }
    }

    fn bar(&self, total: usize) -> ProgressBar {
        let mut slot = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        slot.get_or_insert_with(|| {
            self.spinner.finish_and_clear();
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template(&format!("  {PENCIL}[{{bar:30.cyan/blue}}] {{pos}}/{{len}} {{wide_msg}}"))
            {
                bar.set_style(style.progress_chars("█▓░"));
            }
            bar
        })
        .clone()
    }
}

impl ProgressReporter for IndicatifReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::ResolvingItem { id } => {
                self.spinner
                    .set_message(format!("{SEARCH}Fetching {}", id.cyan()));
            }

            ProgressEvent::ItemResolved {
                name,
                is_folder,
                files,
            } => {
                self.spinner.set_message(format!(
                    "{}{} • {} files",
                    if is_folder { FOLDER } else { FILE },
                    name.bold().green(),
                    files.to_string().cyan()
                ));
            }

            ProgressEvent::RenamesPlanned { planned, unchanged } => {
                self.spinner.set_message(format!(
                    "{} to rename, {} unchanged",
                    planned.to_string().yellow(),
                    unchanged.to_string().dimmed()
                ));
            }

            ProgressEvent::Rename(event) => {
                let bar = self.bar(event.total);
                match event.status {
                    RenameStatus::Processing | RenameStatus::Pending => {
                        bar.set_message(event.operation.old_name.clone());
                    }
                    RenameStatus::Completed => {
                        bar.println(format!(
                            "  {SUCCESS}{}",
                            render_change(&diff_names(
                                &event.operation.old_name,
                                &event.operation.new_name
                            ))
                        ));
                        bar.inc(1);
                    }
                    RenameStatus::Error => {
                        bar.println(format!(
                            "  {FAILURE}{} - {}",
                            event.operation.old_name.red(),
                            event.error.unwrap_or_default().red()
                        ));
                        bar.inc(1);
                    }
                }
            }

            ProgressEvent::RenamesFinished {
                completed,
                failed,
                skipped,
                cancelled,
            } => {
                self.spinner.finish_and_clear();
                if let Some(bar) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).take() {
                    bar.finish_and_clear();
                }
                let (icon, headline) = if cancelled {
                    (STOP, "Rename cancelled:".bold().yellow())
                } else {
                    (PARTY, "Rename complete:".bold().green())
                };
                println!(
                    "\n{icon}{} {} renamed, {} failed, {} skipped",
                    headline,
                    completed.to_string().green().bold(),
                    if failed > 0 {
                        failed.to_string().red().bold()
                    } else {
                        failed.to_string().green()
                    },
                    skipped.to_string().yellow()
                );
            }
        }
    }
}

/// Old name with the replaced part struck red and the new part green
fn render_change(change: &NameChange<'_>) -> String {
    format!(
        "{}{}{}{}",
        change.prefix,
        change.removed.red().strikethrough(),
        change.added.green(),
        change.suffix
    )
}

fn resource_id(url: &str) -> Result<String> {
    extract_resource_id(url).with_context(|| format!("No Drive file or folder ID in '{url}'"))
}

async fn access_token(config: &Config, http: &ReqwestClient) -> Result<String> {
    if let Some(token) = &config.google_access_token {
        return Ok(token.clone());
    }

    match (&config.oauth, &config.google_refresh_token) {
        (Some(oauth), Some(refresh_token)) => {
            let token = refresh_access_token(http, oauth, refresh_token)
                .await
                .context("Failed to refresh Google access token")?;
            Ok(token.token)
        }
        _ => bail!(
            "Set GOOGLE_ACCESS_TOKEN, or GOOGLE_REFRESH_TOKEN with AUTH_GOOGLE_CLIENT_ID and AUTH_GOOGLE_CLIENT_SECRET"
        ),
    }
}

fn print_item(item: &DriveItem) {
    match item {
        DriveItem::File(view) => {
            println!(
                "{FILE}{} {}",
                view.entry.name.bold(),
                human_readable_size(view.entry.size as f64).dimmed()
            );
        }
        DriveItem::Folder(view) => {
            println!("{FOLDER}{}", view.name.bold().green());
            for folder in &view.sub_folders {
                println!("  {FOLDER}{}", folder.name.cyan());
            }
            for file in &view.files {
                println!(
                    "  {FILE}{} {}",
                    file.name,
                    human_readable_size(file.size as f64).dimmed()
                );
            }
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing(match args.command {
        Command::Serve => "drivepress=info",
        _ => "drivepress=warn",
    });

    let config = Config::from_env().context("Invalid configuration")?;
    let http = ReqwestClient::new();

    match args.command {
        Command::Serve => {
            let mut state = AppState::new(http.clone());
            if let Some(wordpress) = &config.wordpress {
                let client: Arc<dyn WordPressGateway> =
                    Arc::new(WordPressClient::new(http, wordpress));
                state = state.with_wordpress(client);
            }
            server::serve(config.bind_addr, state)
                .await
                .context("Server failed")?;
        }

        Command::List { url } => {
            let id = resource_id(&url)?;
            let drive = DriveClient::new(http.clone(), access_token(&config, &http).await?);
            let item = load_item(&drive, &id)
                .await
                .with_context(|| format!("Failed to load {id}"))?;
            print_item(&item);
        }

        Command::Rename {
            url,
            find,
            replace,
            append,
            dry_run,
            throttle_ms,
        } => {
            let id = resource_id(&url)?;
            let drive = Arc::new(DriveClient::new(
                http.clone(),
                access_token(&config, &http).await?,
            ));
            let rules = RenameRules {
                find,
                replace,
                append,
            };
            let options = BatchOptions {
                throttle: throttle_ms
                    .map(Duration::from_millis)
                    .unwrap_or(config.rename_throttle),
                dry_run,
            };

            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_ctrl_c.cancel();
                }
            });

            let reporter = Arc::new(IndicatifReporter::new());
            let result = rename_item(drive, &id, &rules, &options, reporter.clone(), cancel)
                .await
                .context("Failed to rename files")?;

            if dry_run {
                reporter.spinner.finish_and_clear();
                if result.planned.is_empty() {
                    println!("Nothing to rename");
                }
                for (_, change) in preview(&result.planned) {
                    println!("  {PENCIL}{}", render_change(&change));
                }
            }

            if let Some(report) = result.report
                && report.failed() > 0
                && report.completed() == 0
            {
                std::process::exit(1);
            }
        }

        Command::Embed {
            url,
            kind,
            title,
            start_episode,
        } => {
            let id = resource_id(&url)?;
            let drive = DriveClient::new(http.clone(), access_token(&config, &http).await?);
            let item = load_item(&drive, &id)
                .await
                .with_context(|| format!("Failed to load {id}"))?;
            let options = EmbedOptions {
                title,
                start_episode,
            };
            println!("{}", embed_code(item.files(), kind.into(), &options));
        }

        Command::Publish {
            file_name,
            link,
            search_title,
        } => {
            let wordpress = match config.wordpress {
                Some(wordpress) => wordpress,
                None => WordPressConfig::from_env().context("WordPress is not configured")?,
            };
            let client = WordPressClient::new(http, &wordpress);
            let request = PublishRequest {
                file_name: Some(file_name),
                web_content_link: Some(link),
                search_title,
            };

            let published = publish_episode(&client, &request)
                .await
                .context("Failed to publish episode")?;
            println!(
                "{SUCCESS}Updated post {} {}",
                published.post_id.to_string().cyan(),
                published.post_title.bold().green()
            );
            println!("  {}", published.episode_marker.dimmed());
        }
    }

    Ok(())
}
