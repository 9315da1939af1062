use std::sync::Arc;
use tindev_client::config::{LoggingSettings, Settings};
use tindev_client::models::ScreenPhase;
use tindev_client::services::{Navigator, ProfileClient, RealtimeChannel, Route, SessionGate, SessionStore};
use tindev_client::{mount, view, CardQueueViewModel, SessionId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Key the login flow stores the signed-in user under
const USER_KEY: &str = "user";

const HELP: &str = "commands: l = like, d = dislike, c = close match, q = logout";

/// Terminal stand-in for the app's navigation stack
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => println!("-> Login"),
        }
    }
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // stdout is the screen, logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if logging.format == "json" {
        subscriber.json().init();
    } else {
        subscriber.pretty().init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load()?;
    init_logging(&settings.logging);

    let session = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TINDEV_USER").ok())
        .map(|id| id.trim().to_string())
    {
        Some(id) if !id.is_empty() => SessionId::new(id),
        _ => {
            error!("Usage: tindev <user-id> (or set TINDEV_USER)");
            std::process::exit(2);
        }
    };

    info!("Starting Tindev main screen for {}", session);

    let api = Arc::new(ProfileClient::new(
        settings.api.base_url.clone(),
        settings.api.timeout(),
    )?);
    let realtime = Arc::new(RealtimeChannel::new(
        settings.realtime_url(),
        &settings.realtime.path,
    ));

    let store = SessionStore::new(settings.storage.path.clone());
    if let Err(e) = store.set(USER_KEY, session.as_str()).await {
        warn!("Could not persist session: {}", e);
    }
    let gate = SessionGate::new(store, Arc::new(ConsoleNavigator));

    let screen = mount(CardQueueViewModel::new(api, session), realtime, gate);
    let mut frames = screen.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    println!("{}", view::render(&frames.borrow_and_update()));

    loop {
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = frames.borrow_and_update().clone();
                println!("{}", view::render(&state));
                if state.phase == ScreenPhase::LoggedOut {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(command) = line? else {
                    break;
                };
                let sent = match command.trim() {
                    "l" | "like" => screen.like().await,
                    "d" | "dislike" => screen.dislike().await,
                    "c" | "close" => screen.dismiss_match().await,
                    "q" | "logout" => screen.logout().await,
                    "" => Ok(()),
                    other => {
                        println!("unknown command {:?}; {}", other, HELP);
                        Ok(())
                    }
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    }

    screen.unmount().await;
    Ok(())
}
