mod config;
mod seed;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use list_core::{
    query_store::LocationChange, FallbackFetcher, HttpPageFetcher, InfiniteList, ListState,
    ListView, MemoryQueryStore, PageFetcher, QueryStore, QueryUpdate,
};
use shared::domain::{Asset, AssetStatus};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Listing backend base url, e.g. http://localhost:8000/api
    #[arg(long)]
    api_url: Option<String>,
    /// Ignore any configured backend and browse the bundled dataset.
    #[arg(long)]
    offline: bool,
    #[arg(long)]
    page_size: Option<u32>,
    /// Starting query string, e.g. "q=eth&page=1".
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    More,
    Search(String),
    Clear,
    Retry,
    Goto(u32),
    Show,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "more" | "m" => Command::More,
            "search" | "s" => Command::Search(rest.to_string()),
            "clear" => Command::Clear,
            "retry" | "r" => Command::Retry,
            "goto" | "g" => {
                let page = rest
                    .parse::<u32>()
                    .map_err(|_| format!("goto expects a page number, got '{rest}'"))?;
                Command::Goto(page)
            }
            "show" | "ls" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

const HELP: &str = "commands: more | search <term> | clear | retry | goto <page> | show | quit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(api_url) = args.api_url {
        settings.api_url = Some(api_url);
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }

    let offline = seed::fetcher(settings.offline_latency());
    let fetcher: Arc<dyn PageFetcher<Asset>> = match settings.api_url.as_deref() {
        Some(api_url) if !args.offline => {
            info!(api_url, "browsing remote listing with offline fallback");
            Arc::new(FallbackFetcher::new(
                HttpPageFetcher::<Asset>::new(api_url, "assets")?,
                offline,
            ))
        }
        _ => {
            info!(assets = offline.len(), "browsing offline dataset");
            Arc::new(offline)
        }
    };

    let store = MemoryQueryStore::from_query_string(&args.location);
    store.subscribe(Arc::new(|change: &LocationChange| {
        println!("location: ?{}", change.current);
    }));

    let list = InfiniteList::new(fetcher, store.clone(), settings.list_config())?;

    let mut updates = list.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let line = status_line(&updates.borrow_and_update());
            println!("{line}");
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                warn!("{message}");
                continue;
            }
        };

        match command {
            Command::More => list.load_more(),
            Command::Search(term) => list.search(&term),
            Command::Clear => list.search(""),
            Command::Retry => list.retry().await,
            Command::Goto(page) => {
                store.update(QueryUpdate::new().set(&list.config().page_param, page));
            }
            Command::Show => print!("{}", render(&list.snapshot())),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

fn status_line<T>(state: &ListState<T>) -> String {
    if state.is_initial_loading() {
        return "loading...".to_string();
    }
    if state.is_page_loading {
        return format!("{} loaded, loading more...", state.items.len());
    }
    if let Some(error) = &state.error {
        return format!("error: {error} (type 'retry')");
    }
    if state.is_empty() {
        return "no results".to_string();
    }
    if state.is_end_reached() {
        return format!("{} of {} loaded, end of list", state.items.len(), state.total);
    }
    format!("{} of {} loaded", state.items.len(), state.total)
}

fn render(view: &ListView<Asset>) -> String {
    let mut out = String::new();
    let search = if view.search_query.is_empty() {
        "<none>"
    } else {
        view.search_query.as_str()
    };
    out.push_str(&format!(
        "page {} | search {} | {} of {}\n",
        view.current_page,
        search,
        view.items.len(),
        view.total
    ));
    for asset in &view.items {
        let rank = asset
            .market_cap_rank
            .map(|rank| format!("#{rank}"))
            .unwrap_or_else(|| "-".into());
        let price = asset
            .current_price
            .map(|price| format!("{price:.4}"))
            .unwrap_or_else(|| "n/a".into());
        let change = asset
            .price_change_percentage_24h
            .map(|change| format!("{change:+.2}%"))
            .unwrap_or_default();
        let halted = if asset.status == AssetStatus::Inactive {
            " (inactive)"
        } else {
            ""
        };
        out.push_str(&format!(
            "{rank:>4} {:<6} {:<22} {price:>12} {change:>8}{halted}\n",
            asset.symbol.as_str(),
            asset.name
        ));
    }
    if view.is_end_reached {
        out.push_str("-- end --\n");
    } else if view.has_more && !view.items.is_empty() {
        out.push_str("-- 'more' for the next page --\n");
    }
    out
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
