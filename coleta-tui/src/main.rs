//! Terminal UI for coleta that lets users find waste collection points by state, city and item.

mod app;
mod input;
mod ui;

use std::{
    collections::HashMap,
    env,
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::Result;
use clap::Parser;
use coleta_core::{
    ColetaConfig, ColetaService, Explorer, ItemCatalog, MapProjector, ProviderSet, Route, route,
};
use coleta_provider_ecoleta as ecoleta;
use coleta_provider_ibge as ibge;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Request, Response};
use crate::input::Action;

/// Command line arguments; the screen to open is derived from them.
#[derive(Debug, Parser)]
#[command(name = "coleta", version, about)]
struct Args {
    /// State code (UF) to open, e.g. SC
    #[arg(long)]
    region: Option<String>,

    /// City inside --region to show points for
    #[arg(long)]
    city: Option<String>,

    /// Collection point id to open directly
    #[arg(long)]
    point: Option<String>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

impl Args {
    fn route(&self) -> Result<Route> {
        let mut params = HashMap::new();
        let screen = if let Some(point) = &self.point {
            params.insert("point_id".to_owned(), point.clone());
            route::DETAIL
        } else if self.region.is_some() || self.city.is_some() {
            if let Some(region) = &self.region {
                params.insert("uf".to_owned(), region.clone());
            }
            if let Some(city) = &self.city {
                params.insert("city".to_owned(), city.clone());
            }
            route::POINTS
        } else {
            route::HOME
        };
        Ok(Route::from_params(screen, &params)?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env_file = load_env_file(args.env_file.as_deref());
    init_logging()?;

    match env_file {
        Ok(path) => debug!(path = %path.display(), "env file loaded"),
        // an explicitly requested file has to exist
        Err(err) if args.env_file.is_some() => return Err(err.into()),
        Err(err) => debug!(%err, "no .env file"),
    }

    let config = ColetaConfig::from_env()?;
    let start = args.route()?;
    info!(api = %config.api_url, regions = %config.regions_url, ?start, "starting coleta");

    // HTTP + service setup
    let client = Client::builder().user_agent(&config.user_agent).build()?;

    let providers = ProviderSet::with_backend(
        ibge::provider(client.clone(), &config.regions_url),
        ecoleta::provider(client, &config.api_url),
    );
    let service = Arc::new(
        ColetaService::connect(&providers, ItemCatalog::builtin(&config.api_url)).await,
    );

    // App state
    let explorer = Explorer::new(MapProjector::new(config.fallback_viewport));
    let mut app = App::new(service, explorer);

    let (tx, rx) = mpsc::unbounded_channel();
    let requests = app.start(start);
    dispatch(&app, requests, &tx);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app, &tx, rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    tx: &UnboundedSender<Response>,
    mut rx: UnboundedReceiver<Response>,
) -> Result<()> {
    loop {
        // Apply whatever finished in the background since the last frame
        while let Ok(response) = rx.try_recv() {
            app.apply(response);
        }

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::Fetch(requests) => dispatch(&app, requests, tx),
            }
        }
    }

    Ok(())
}

/// Run each request on the runtime and send its outcome back to the event loop.
fn dispatch(app: &App, requests: Vec<Request>, tx: &UnboundedSender<Response>) {
    for request in requests {
        let service = Arc::clone(&app.service);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = match request {
                Request::Regions(ticket) => {
                    let result = service.list_regions().await;
                    Response::Regions(ticket, result)
                }
                Request::Cities(ticket) => {
                    let result = service.list_cities(ticket.context()).await;
                    Response::Cities(ticket, result)
                }
                Request::Points(ticket) => {
                    let result = service.query(ticket.context()).await;
                    Response::Points(ticket, result)
                }
                Request::Detail(ticket) => {
                    let result = service.get_by_id(*ticket.context()).await;
                    Response::Detail(ticket, result)
                }
            };
            if tx.send(response).is_err() {
                debug!("event loop gone, dropping response");
            }
        });
    }
}

fn load_env_file(path: Option<&Path>) -> Result<PathBuf, dotenvy::Error> {
    match path {
        Some(file) => dotenvy::from_path(file).map(|()| file.to_owned()),
        None => dotenvy::dotenv(),
    }
}

/// Log to a file when `COLETA_LOG` is set; the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let Ok(filter) = EnvFilter::try_from_env("COLETA_LOG") else {
        return Ok(());
    };
    let path = env::var("COLETA_LOG_FILE").unwrap_or_else(|_| "coleta.log".to_owned());
    let file = File::create(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
