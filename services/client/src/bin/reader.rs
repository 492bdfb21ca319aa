//! services/client/src/bin/reader.rs
//!
//! The `reader` command line: a terminal front end over the same stores and
//! services a graphical client would use.

use client_lib::{
    app::ReaderApp,
    config::Config,
    error::{ClientError, ClientResult},
    services::{Credentials, NewComment, NovelQuery, SignupRequest},
};
use clap::{Parser, Subcommand};
use novel_reader_core::{Access, Language, ReadingRecord, SessionState, SyncResult};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "reader", version, about = "Read Tamil and English novels from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Browse the catalog
    Novels {
        #[arg(long)]
        cursor: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        genre: Option<String>,
    },
    /// Show one novel
    Novel { id: String },
    /// List the chapters of a novel
    Chapters { id: String },
    /// Read a chapter and record progress
    Read { novel: String, chapter: String },
    /// Mark a novel as finished
    Complete { novel: String },
    /// Show the ongoing and completed shelves
    Progress,
    /// Show bookmarked novels
    Library {
        /// Pull the bookmark list from the backend first
        #[arg(long)]
        refresh: bool,
    },
    /// Bookmark a novel, or remove the bookmark
    Bookmark {
        novel: String,
        #[arg(long)]
        remove: bool,
    },
    /// List the comments on a chapter
    Comments { chapter: String },
    /// Comment on a chapter
    Comment {
        novel: String,
        chapter: String,
        text: String,
    },
    /// Show or set the interface language (ta or en)
    Language { code: Option<String> },
    /// Check whether the current session may open a client route
    Route { path: String },
    /// Back-office commands
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Show the dashboard counters
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded.");

    // --- 2. Wire the Client & Restore the Session ---
    let (app, redirect) = ReaderApp::from_config(config)?;
    match app.restore_session().await {
        SessionState::Authenticated(session) => info!("Signed in as '{}'.", session.user.username),
        _ => info!("No active session."),
    }

    // --- 3. Dispatch ---
    let result = run(&app, cli.command).await;
    if redirect.login_required() {
        eprintln!("Your session has expired. Run `reader login` to continue.");
    }
    result
}

async fn run(app: &ReaderApp, command: Command) -> ClientResult<()> {
    let language = app.language.current();

    match command {
        Command::Login { email, password } => {
            let user = app.auth.login(&Credentials { email, password }).await?;
            println!("Signed in as {} ({}).", user.username, user.email);
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            let user = app
                .auth
                .signup(&SignupRequest {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("Welcome, {}!", user.username);
        }
        Command::Logout => {
            app.auth.logout();
            println!("Signed out.");
        }
        Command::Whoami => match app.session.user() {
            Some(user) => println!("{} <{}> [{:?}]", user.username, user.email, user.role),
            None => println!("Not signed in."),
        },
        Command::Novels {
            cursor,
            limit,
            search,
            genre,
        } => {
            let page = app
                .novels
                .list_novels(&NovelQuery {
                    cursor,
                    limit,
                    search,
                    genre,
                })
                .await?;
            for novel in &page.items {
                println!("{}  {} by {}", novel.id, novel.display_title(language), novel.author);
            }
            if let Some(cursor) = page.next_cursor.filter(|_| page.has_more) {
                println!("More: --cursor {}", cursor);
            }
        }
        Command::Novel { id } => {
            let novel = app.novels.get_novel(&id).await?;
            println!("{}", novel.display_title(language));
            println!("by {} | {} chapters | {} likes", novel.author, novel.chapter_count, novel.likes);
            if !novel.description.is_empty() {
                println!("\n{}", novel.description);
            }
        }
        Command::Chapters { id } => {
            for chapter in app.novels.list_chapters(&id).await? {
                println!("{:>4}. {}  ({})", chapter.order, chapter.display_title(language), chapter.id);
            }
        }
        Command::Read { novel, chapter } => {
            let (details, chapter) = futures::try_join!(
                app.novels.get_novel(&novel),
                app.novels.get_chapter(&novel, &chapter)
            )?;

            report_sync(app.progress.start_reading(&details.summary()).await);
            report_sync(
                app.progress
                    .update_progress(&novel, &chapter.id, Some(chapter.order))
                    .await,
            );

            println!("{}. {}\n", chapter.order, chapter.display_title(language));
            println!("{}", chapter.content);
        }
        Command::Complete { novel } => {
            let details = app.novels.get_novel(&novel).await?;
            report_sync(app.progress.complete_novel(&details.summary()).await);
            println!("Finished {}.", details.display_title(language));
        }
        Command::Progress => {
            println!("Reading:");
            print_shelf(&app.progress.ongoing());
            println!("Completed:");
            print_shelf(&app.progress.completed());
        }
        Command::Library { refresh } => {
            if refresh {
                report_sync(app.progress.refresh_library().await);
            }
            let library = app.progress.library();
            if library.is_empty() {
                println!("No bookmarks yet.");
            }
            for novel in library {
                println!("{}  {}", novel.id, novel.display_title(language));
            }
        }
        Command::Bookmark { novel, remove } => {
            if remove {
                report_sync(app.progress.remove_bookmark(&novel).await);
                println!("Bookmark removed.");
            } else {
                let details = app.novels.get_novel(&novel).await?;
                report_sync(app.progress.add_bookmark(&details).await);
                println!("Bookmarked {}.", details.display_title(language));
            }
        }
        Command::Comments { chapter } => {
            for comment in app.comments.list_for_chapter(&chapter).await? {
                println!("{}: {}", comment.username, comment.content);
            }
        }
        Command::Comment {
            novel,
            chapter,
            text,
        } => {
            app.comments
                .post(&NewComment {
                    novel_id: novel,
                    chapter_id: chapter,
                    content: text,
                })
                .await?;
            println!("Comment posted.");
        }
        Command::Language { code } => {
            if let Some(code) = code {
                let chosen = Language::from_code(&code).ok_or_else(|| {
                    ClientError::InvalidInput(format!("'{}' is neither 'ta' nor 'en'", code))
                })?;
                app.language.set(chosen)?;
            }
            println!("{}", app.language.current().code());
        }
        Command::Route { path } => {
            let (route, access) = app.check_route(&path);
            let verdict = match access {
                Access::Allow => "allowed",
                Access::Pending => "pending",
                Access::RedirectToLogin => "redirect to /login",
                Access::Forbidden => "redirect to /403",
            };
            println!("{} -> {}", route.path(), verdict);
        }
        Command::Admin {
            command: AdminCommand::Stats,
        } => {
            let stats = app.admin.dashboard_stats().await?;
            println!("Novels:   {}", stats.total_novels);
            println!("Chapters: {}", stats.total_chapters);
            println!("Users:    {}", stats.total_users);
            println!("Views:    {}", stats.total_views);
            println!("Comments: {}", stats.total_comments);
        }
    }

    Ok(())
}

fn print_shelf(records: &[ReadingRecord]) {
    if records.is_empty() {
        println!("  (none)");
    }
    for record in records {
        println!(
            "  {}  {} (chapter {}, {})",
            record.novel_id,
            record.title,
            record.last_chapter_order,
            record.updated_at.format("%Y-%m-%d")
        );
    }
}

fn report_sync(result: SyncResult) {
    if let SyncResult::Failed(reason) = result {
        eprintln!("Saved locally; the server could not be updated ({}).", reason);
    }
}
