use tokio::sync::mpsc;

use crate::app::{AppContext, NewsreelError, Result};
use crate::domain::{readable_timestamp, ArticleSummary, FeedMode, SyncState};
use crate::store::ArticleCache;
use crate::sync::{Effect, Intent};

/// Number of id characters shown in listings
const SHORT_ID_LEN: usize = 12;

pub async fn headlines(ctx: &AppContext, mode: Option<FeedMode>, pages: u32) -> Result<()> {
    let mode = mode.unwrap_or(ctx.config.api.default_mode);
    let (handle, mut effects) = ctx.synchronizer(mode);

    let mut state = handle.settled().await?;
    print_notices(&mut effects);

    for _ in 1..pages {
        state = handle.dispatch(Intent::LoadNextPage).await?;
        let stop = print_notices(&mut effects);
        if stop || !state.can_load_more {
            break;
        }
    }
    handle.shutdown().await;

    print_listing(&state);
    Ok(())
}

/// Print pending notices. Returns true if paging should stop.
fn print_notices(effects: &mut mpsc::UnboundedReceiver<Effect>) -> bool {
    let mut stop = false;
    while let Ok(effect) = effects.try_recv() {
        if !effect.is_notice() {
            continue;
        }
        eprintln!("{}", effect);
        stop = true;
    }
    stop
}

fn print_listing(state: &SyncState) {
    if state.is_offline {
        println!("[offline] showing cached articles");
    }
    if state.results.is_empty() {
        println!("No articles");
        return;
    }

    println!("{} (page {})", state.mode, state.current_page);
    for article in &state.results {
        println!("{}", format_summary(article));
    }
}

fn format_summary(article: &ArticleSummary) -> String {
    let short_id: String = article.id.chars().take(SHORT_ID_LEN).collect();
    format!(
        "{}  {}  {:<18}  {}",
        short_id,
        article.readable_published_at(),
        article.source_name,
        article.title
    )
}

pub fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_id(ctx.cache.as_ref(), id)?;
    let article = ctx.details().open(&id)?;

    println!("{}", article.title);
    println!("{}", "=".repeat(article.title.chars().count().min(80)));
    println!("Source: {}", article.source_name);
    if let Some(author) = &article.author {
        println!("Author: {}", author);
    }
    println!("Published: {}", readable_timestamp(&article.published_at));
    println!("Link: {}", article.url);
    if !article.thumbnail_url.is_empty() {
        println!("Image: {}", article.thumbnail_url);
    }
    println!();

    if let Some(description) = &article.description {
        println!("{}\n", description);
    }
    println!("{}", article.display_content());
    Ok(())
}

pub async fn save(ctx: &AppContext, id: &str) -> Result<()> {
    let id = resolve_id(ctx.cache.as_ref(), id)?;
    let details = ctx.details();
    let article = details.open(&id)?;

    if details.save(&article).await? {
        println!("Saved: {}", article.title);
    } else if details.can_save_remotely() {
        println!("Remote declined to save: {}", article.title);
    } else {
        println!("No save endpoint configured; kept locally: {}", article.title);
    }
    Ok(())
}

pub fn clear(ctx: &AppContext) -> Result<()> {
    let count = ctx.cache.count()?;
    ctx.cache.clear()?;
    println!("Removed {} cached articles", count);
    Ok(())
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let online = ctx.connectivity.is_connected();
    println!("Network: {}", if online { "online" } else { "offline" });
    println!("Cached articles: {}", ctx.cache.count()?);
    println!("Default mode: {}", ctx.config.api.default_mode);
    match &ctx.config.saver.endpoint {
        Some(endpoint) => println!("Save endpoint: {}", endpoint),
        None => println!("Save endpoint: not configured"),
    }
    if ctx.config.api.api_key.is_empty() {
        println!("API key: missing (set api.api_key or NEWSREEL_API_KEY)");
    }
    Ok(())
}

/// Expand a unique id prefix to the full cached id.
fn resolve_id(cache: &dyn ArticleCache, prefix: &str) -> Result<String> {
    if cache.read_by_id(prefix)?.is_some() {
        return Ok(prefix.to_string());
    }

    let mut matches = cache
        .read_all()?
        .into_iter()
        .filter(|a| a.id.starts_with(prefix));

    match (matches.next(), matches.next()) {
        (Some(article), None) => Ok(article.id),
        (Some(_), Some(_)) => Err(NewsreelError::Config(format!(
            "Ambiguous article id prefix: {}",
            prefix
        ))),
        (None, _) => Err(NewsreelError::NotFound(prefix.to_string())),
    }
}
