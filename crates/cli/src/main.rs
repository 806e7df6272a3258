//! Money Mastery CLI - budget, savings goal and dashboard progress.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mastery_animation::{AnimationConfig, AnimationController, FillKind};
use mastery_core::{EngineConfig, FetchState, NormalizedProgress, ProgressView, SourceId, Time};
use mastery_fetch::{
    first_tip, headlines, AsyncDataBinding, BudgetStatusEndpoint, BudgetStatusRequest,
    CryptoChallengeEndpoint, CryptoChallengeRequest, HttpTransport, InsightsEndpoint,
    InsightsRequest, LivePriceEndpoint, NewsEndpoint, Transport, DEFAULT_HEADLINES,
};
use mastery_progress::{
    compute_crypto_progress, crypto_progress_from_feed, xp_progress, BudgetBook, CryptoGoalView,
    CRYPTO_GOAL_ID,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mastery")]
#[command(about = "Money Mastery progress engine", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend API base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show budget progress for NAME=SPENT/LIMIT entries (starter budget if none)
    Budget {
        /// Entries such as Groceries=220/300
        entries: Vec<String>,
    },
    /// Show progress toward a BTC savings goal
    Crypto {
        /// USD saved
        usd: f64,
        /// Goal in BTC
        goal: f64,
        /// USD per BTC; fetched from the live feed when omitted
        #[arg(long)]
        price: Option<f64>,
        /// Ask the backend to evaluate the goal instead
        #[arg(long)]
        server: bool,
    },
    /// Fetch budget status for one category
    Status {
        /// Category name
        category: String,
    },
    /// Fetch smart tips for the starter budget
    Tips {
        /// Print every tip, not just the first
        #[arg(long)]
        all: bool,
    },
    /// Fetch finance headlines
    News {
        /// Number of headlines
        #[arg(long, default_value_t = DEFAULT_HEADLINES)]
        limit: usize,
    },
    /// Refresh status, tips, news and price concurrently
    Dashboard {
        /// Category for the status card
        #[arg(long, default_value = "Groceries")]
        category: String,
        /// USD saved toward the crypto goal
        #[arg(long, default_value_t = 50.0)]
        usd: f64,
        /// Crypto goal in BTC
        #[arg(long, default_value_t = 0.01)]
        goal: f64,
    },
    /// Simulate a fill animation and print its frames
    Animate {
        /// Starting percentage
        from: f64,
        /// Target percentage
        to: f64,
        /// Bar or ring timing
        #[arg(long, value_enum, default_value = "bar")]
        kind: Kind,
        /// Milliseconds between printed frames
        #[arg(long, default_value = "100")]
        step: u64,
    },
    /// Show the XP ring
    Xp {
        /// Current XP
        xp: f64,
        /// XP needed for the next level
        max_xp: f64,
        /// Current level
        #[arg(long, default_value = "1")]
        level: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Bar,
    Ring,
}

impl From<Kind> for FillKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Bar => FillKind::Bar,
            Kind::Ring => FillKind::Ring,
        }
    }
}

fn init_logging() {
    // stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(api_base) = &cli.api_base {
        config.api_base = api_base.clone();
    }
    debug!("Using API base {}", config.api_base);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.timeout()));

    match cli.command {
        Commands::Budget { entries } => {
            let book = if entries.is_empty() {
                BudgetBook::starter()
            } else {
                let mut book = BudgetBook::new();
                for entry in &entries {
                    let (name, spent, limit) = parse_budget_entry(entry)?;
                    book.upsert(name, limit, spent);
                }
                book
            };

            println!("Budget");
            for progress in book.progress() {
                println!("  {}", format_progress(&progress));
            }

            let health = book.health();
            let worst = health.worst_tier.map_or("none", |tier| tier.as_str());
            println!(
                "Health: {} categories, worst tier {}, {} over limit, {} invalid",
                health.total, worst, health.over_limit, health.invalid
            );
        }
        Commands::Crypto { usd, goal, price, server } => {
            if server {
                let binding = AsyncDataBinding::new(CryptoChallengeEndpoint, transport, &config);
                let request = CryptoChallengeRequest { usd_saved: usd, btc_goal: goal };
                if let FetchState::Ready(result) = binding.fetch(Some(&request)).await {
                    println!("Server: {:.8} BTC of {} ({:.1}%)", result.btc_saved, result.btc_goal, result.percent);
                }
                println!("{}", format_view(&binding.progress_view(&SourceId::new(CRYPTO_GOAL_ID))));
            } else {
                let view = match price {
                    Some(price) => {
                        let progress = compute_crypto_progress(usd, goal, price)?;
                        CryptoGoalView { progress, usd_per_btc: Some(price), error: None, loading: false }
                    }
                    None => {
                        let binding = AsyncDataBinding::new(LivePriceEndpoint, transport, &config);
                        let state = binding.fetch(None).await;
                        crypto_progress_from_feed(usd, goal, &state)
                    }
                };
                print_crypto(&view);
            }
        }
        Commands::Status { category } => {
            let binding = AsyncDataBinding::new(BudgetStatusEndpoint, transport, &config);
            binding.fetch(Some(&BudgetStatusRequest::new(&config, category.as_str()))).await;
            println!("{}", format_view(&binding.progress_view(&SourceId::new(category))));
        }
        Commands::Tips { all } => {
            let binding = AsyncDataBinding::new(InsightsEndpoint, transport, &config);
            let request = InsightsRequest::from(&BudgetBook::starter());
            match binding.fetch(Some(&request)).await {
                FetchState::Ready(tips) if all => {
                    for (i, tip) in tips.iter().enumerate() {
                        println!("{}. {}", i + 1, tip);
                    }
                }
                FetchState::Ready(tips) => println!("{}", first_tip(&tips)),
                FetchState::Failed(err) => println!("Unable to load tip ({})", err),
                FetchState::Idle | FetchState::Loading => {}
            }
        }
        Commands::News { limit } => {
            let binding = AsyncDataBinding::new(NewsEndpoint, transport, &config);
            match binding.fetch(None).await {
                FetchState::Ready(articles) => {
                    for article in headlines(&articles, limit) {
                        println!("- {}\n  {}", article.title, article.url);
                    }
                }
                FetchState::Failed(err) => println!("News unavailable ({})", err),
                FetchState::Idle | FetchState::Loading => {}
            }
        }
        Commands::Dashboard { category, usd, goal } => {
            run_dashboard(&config, transport, category, usd, goal).await;
        }
        Commands::Animate { from, to, kind, step } => {
            run_animation(&config, from, to, kind.into(), Duration::from_millis(step.max(1)));
        }
        Commands::Xp { xp, max_xp, level } => {
            let ring = xp_progress(xp, max_xp, level);
            println!("{}  {}  {}%", ring.title, render_bar(ring.progress.percent, 20), ring.progress.display_percent());
        }
    }

    Ok(())
}

async fn run_dashboard(
    config: &EngineConfig,
    transport: Arc<dyn Transport>,
    category: String,
    usd: f64,
    goal: f64,
) {
    let status = AsyncDataBinding::new(BudgetStatusEndpoint, Arc::clone(&transport), config);
    let insights = AsyncDataBinding::new(InsightsEndpoint, Arc::clone(&transport), config);
    let news = AsyncDataBinding::new(NewsEndpoint, Arc::clone(&transport), config);
    let price = AsyncDataBinding::new(LivePriceEndpoint, transport, config);
    let _guards = [status.guard(), insights.guard(), news.guard(), price.guard()];

    let status_request = BudgetStatusRequest::new(config, category.as_str());
    let insights_request = InsightsRequest::from(&BudgetBook::starter());

    info!("Refreshing dashboard");
    let (_, tips, articles, quote) = tokio::join!(
        status.fetch(Some(&status_request)),
        insights.fetch(Some(&insights_request)),
        news.fetch(None),
        price.fetch(None),
    );
    let taken_at: Time = chrono::Utc::now();

    println!("Dashboard ({})", taken_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("{}", format_view(&status.progress_view(&SourceId::new(category))));
    print_crypto(&crypto_progress_from_feed(usd, goal, &quote));
    match tips {
        FetchState::Ready(tips) => println!("Tip: {}", first_tip(&tips)),
        _ => println!("Tip: unavailable"),
    }
    match articles {
        FetchState::Ready(articles) => {
            for article in headlines(&articles, DEFAULT_HEADLINES) {
                println!("News: {}", article.title);
            }
        }
        _ => println!("News: unavailable"),
    }
}

fn run_animation(config: &EngineConfig, from: f64, to: f64, kind: FillKind, step: Duration) {
    let mut controller = AnimationController::new(AnimationConfig::from(config));
    let id = SourceId::new("preview");
    controller.mount(id.clone(), kind);

    let start = tokio::time::Instant::now();
    let duration = controller.config().fill_duration(kind);

    // Settle at `from` before animating to `to`
    controller.set_target(id.clone(), from, start);
    let settled = start + duration;
    controller.tick(settled);
    controller.set_target(id.clone(), to, settled);

    let mut elapsed = Duration::ZERO;
    loop {
        let now = settled + elapsed;
        for value in controller.tick(now) {
            println!(
                "{:>5}ms  {}  {:>6.2}%  {}{}",
                elapsed.as_millis(),
                render_bar(value.displayed_percent, 20),
                value.displayed_percent,
                value.tier,
                if value.is_pulsing { "  (pulsing)" } else { "" }
            );
        }
        if elapsed >= duration {
            break;
        }
        elapsed = (elapsed + step).min(duration);
    }

    controller.unmount(&id);
}

/// Parse `NAME=SPENT/LIMIT`.
fn parse_budget_entry(entry: &str) -> Result<(String, f64, f64)> {
    let (name, amounts) = entry
        .split_once('=')
        .with_context(|| format!("Expected NAME=SPENT/LIMIT, got '{}'", entry))?;
    let (spent, limit) = amounts
        .split_once('/')
        .with_context(|| format!("Expected SPENT/LIMIT in '{}'", entry))?;

    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Missing category name in '{}'", entry);
    }
    let spent: f64 = spent.trim().parse().with_context(|| format!("Invalid amount spent in '{}'", entry))?;
    let limit: f64 = limit.trim().parse().with_context(|| format!("Invalid limit in '{}'", entry))?;
    Ok((name.to_string(), spent, limit))
}

fn render_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn format_progress(progress: &NormalizedProgress) -> String {
    let mut line = format!(
        "{:<16} {} {:>3}%  {}",
        progress.source_id.as_str(),
        render_bar(progress.percent, 20),
        progress.display_percent(),
        progress.tier
    );
    if progress.shows_limit_warning() {
        line.push_str("  ! near limit");
    }
    if !progress.valid {
        line.push_str("  (no limit set)");
    }
    line
}

fn format_view(view: &ProgressView) -> String {
    match &view.error {
        Some(err) => format!("{}  unavailable ({})", format_progress(&view.progress), err),
        None if view.loading => format!("{}  loading", format_progress(&view.progress)),
        None => format_progress(&view.progress),
    }
}

fn print_crypto(view: &CryptoGoalView) {
    let progress = &view.progress;
    let price = view.usd_per_btc.map_or_else(|| "n/a".to_string(), |p| format!("${:.2}", p));
    println!(
        "Crypto goal: {:.8} / {} BTC at {}  {} {:>3}%  {}",
        progress.btc_saved,
        progress.btc_goal,
        price,
        render_bar(progress.percent(), 20),
        progress.progress.display_percent(),
        progress.standing
    );
    if let Some(err) = &view.error {
        println!("  price unavailable ({})", err);
    }
}
