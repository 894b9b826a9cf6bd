mod seed;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use edustream_core::model::{CourseId, User, UserId};
use edustream_core::playback::{format_clock, format_course_length};
use services::{
    AppServices, CatalogQuery, CategoryFilter, Clock, MediaElement, MediaEvent, PlayerConfig,
    SimulatedMedia,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_EMAIL: &str = "learner@example.com";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourseId { raw: String },
    InvalidUserId { raw: String },
    InvalidSeconds { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    MissingCourse,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidSeconds { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingCourse => write!(f, "--course is required for this command"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_seconds(raw: String, flag: &'static str) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeconds { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  edustream seed       [--db <sqlite_url>]");
    eprintln!("  edustream catalog    [--db <sqlite_url>] [--search <text>] [--category <name>]");
    eprintln!("  edustream enroll     [--db <sqlite_url>] [--user <uuid>] --course <id>");
    eprintln!("  edustream dashboard  [--db <sqlite_url>] [--user <uuid>]");
    eprintln!("  edustream instructor [--db <sqlite_url>] --name <instructor>");
    eprintln!(
        "  edustream watch      [--db <sqlite_url>] [--user <uuid>] --course <id> [--seconds <n>] [--sync-secs <n>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:edustream.sqlite3");
    eprintln!("  --seconds 30");
    eprintln!("  --sync-secs 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EDUSTREAM_DB_URL, EDUSTREAM_USER_ID, EDUSTREAM_USER_EMAIL, EDUSTREAM_SYNC_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Seed,
    Catalog,
    Enroll,
    Dashboard,
    Instructor,
    Watch,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "seed" => Some(Self::Seed),
            "catalog" => Some(Self::Catalog),
            "enroll" => Some(Self::Enroll),
            "dashboard" => Some(Self::Dashboard),
            "instructor" => Some(Self::Instructor),
            "watch" => Some(Self::Watch),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    user_id: Option<UserId>,
    email: String,
    course_id: Option<CourseId>,
    search: String,
    category: CategoryFilter,
    instructor: String,
    watch_seconds: u64,
    config: PlayerConfig,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("EDUSTREAM_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://edustream.sqlite3".into(), normalize_sqlite_url);
        let mut user_id = std::env::var("EDUSTREAM_USER_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok());
        let email = std::env::var("EDUSTREAM_USER_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.into());
        let mut config = std::env::var("EDUSTREAM_SYNC_SECS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or_else(PlayerConfig::default, |secs| {
                PlayerConfig::default().with_sync_interval(Duration::from_secs(secs))
            });

        let mut course_id = None;
        let mut search = String::new();
        let mut category = CategoryFilter::All;
        let mut instructor = String::new();
        let mut watch_seconds = 30;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    let parsed = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = Some(parsed);
                }
                "--course" => {
                    let value = require_value(args, "--course")?;
                    let parsed = value
                        .parse::<CourseId>()
                        .map_err(|_| ArgsError::InvalidCourseId { raw: value.clone() })?;
                    course_id = Some(parsed);
                }
                "--search" => search = require_value(args, "--search")?,
                "--category" => category = CategoryFilter::parse(&require_value(args, "--category")?),
                "--name" => instructor = require_value(args, "--name")?,
                "--seconds" => {
                    watch_seconds = parse_seconds(require_value(args, "--seconds")?, "--seconds")?;
                }
                "--sync-secs" => {
                    let secs = parse_seconds(require_value(args, "--sync-secs")?, "--sync-secs")?;
                    config = config.with_sync_interval(Duration::from_secs(secs));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            email,
            course_id,
            search,
            category,
            instructor,
            watch_seconds,
            config,
        })
    }

    fn course(&self) -> Result<CourseId, ArgsError> {
        self.course_id.ok_or(ArgsError::MissingCourse)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = std::path::Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database's parent directory; the file itself is created on connect.
fn prepare_sqlite_dir(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }
    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Signs the CLI user in. Without a configured id a fresh one is generated,
/// which is only useful for one-off runs.
fn sign_in(app: &AppServices, args: &Args) -> Result<User, Box<dyn std::error::Error>> {
    let id = match args.user_id {
        Some(id) => id,
        None => {
            let id = UserId::random();
            info!(user_id = %id, "no EDUSTREAM_USER_ID set; using a one-off user");
            id
        }
    };
    let auth = app.auth();
    auth.sign_in(User::new(id, args.email.as_str(), None)?);
    Ok(auth.require_user()?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_dir(&args.db_url)?;
    debug!(db = %args.db_url, "opening database");
    let app = AppServices::new_sqlite(&args.db_url, Clock::system(), args.config).await?;

    match cmd {
        Command::Seed => seed::seed_catalog(&app).await,
        Command::Catalog => list_catalog(&app, &args).await,
        Command::Enroll => enroll(&app, &args).await,
        Command::Dashboard => show_dashboard(&app, &args).await,
        Command::Instructor => show_instructor(&app, &args).await,
        Command::Watch => watch(&app, &args).await,
    }
}

async fn list_catalog(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let query = CatalogQuery {
        search: args.search.clone(),
        category: args.category.clone(),
    };
    let courses = app.catalog().browse(&query).await?;
    if courses.is_empty() {
        println!("No courses found");
        return Ok(());
    }
    for course in courses {
        println!(
            "{:>4}  {:<36}  {:<16}  {:>8}  {:<12}  {:>7}  {}",
            course.id(),
            course.title(),
            course.instructor_name(),
            course.price().to_string(),
            course.level().to_string(),
            format_course_length(course.duration_minutes()),
            course.category()
        );
    }
    Ok(())
}

async fn enroll(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let user = sign_in(app, args)?;
    let course_id = args.course()?;
    match app.enrollments().enroll(&user, course_id).await {
        Ok(outcome) => {
            let notice = outcome.notice();
            println!("{notice}");
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.notice());
            Err(err.into())
        }
    }
}

async fn show_dashboard(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let user = sign_in(app, args)?;
    let dashboard = app.dashboard().dashboard(user.id()).await?;
    let stats = dashboard.stats;
    println!("Welcome back, {}!", user.label());
    println!(
        "Courses: {}  Completed: {}  Hours: {:.1}  Average progress: {}%",
        stats.total_courses, stats.completed_courses, stats.total_hours, stats.average_progress
    );
    for entry in &dashboard.courses {
        println!(
            "{:>4}  {:<36}  {:>4}  {}",
            entry.course.id(),
            entry.course.title(),
            entry.enrollment.progress().to_string(),
            entry.enrollment.payment_status()
        );
    }
    Ok(())
}

async fn show_instructor(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let rows = app.dashboard().instructor_courses(args.instructor.trim()).await?;
    if rows.is_empty() {
        println!("No courses taught by {}", args.instructor.trim());
        return Ok(());
    }
    for row in rows {
        println!(
            "{:>4}  {:<36}  students: {:>3}  average progress: {}%",
            row.course.id(),
            row.course.title(),
            row.audience.enrollments,
            row.audience.average_progress
        );
    }
    Ok(())
}

/// Plays a course on a simulated element in real time so the sampler writes
/// progress exactly as a browser session would.
async fn watch(app: &AppServices, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let user = sign_in(app, args)?;
    let course_id = args.course()?;

    let media = SimulatedMedia::new();
    let loaded = match app
        .player()
        .load(course_id, &user, Arc::new(media.clone()))
        .await
    {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{}", err.notice());
            return Err(err.into());
        }
    };
    let Some(mut session) = loaded.into_session() else {
        println!("Course not found");
        return Ok(());
    };

    media.set_duration(f64::from(session.course().duration_minutes()) * 60.0);
    session.handle_event(MediaEvent::LoadedMetadata);
    println!(
        "{}: starting at {}",
        session.course().title(),
        session.state().time_label()
    );
    if !session.saves_progress() {
        println!("Not enrolled; progress will not be saved");
    }

    session.toggle_play();
    let mut second = tokio::time::interval(Duration::from_secs(1));
    second.tick().await;
    for _ in 0..args.watch_seconds {
        second.tick().await;
        if media.advance(1.0) {
            session.handle_event(MediaEvent::Ended);
            break;
        }
        session.handle_event(MediaEvent::TimeUpdate);
    }
    if !media.is_paused() {
        session.toggle_play();
    }

    session.settle().await;

    let state = session.state();
    println!(
        "Stopped at {} ({})",
        format_clock(state.current_time),
        state.percent()
    );
    if session.is_course_complete() {
        println!("Congratulations! You've completed this course!");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
