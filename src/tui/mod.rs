pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use crate::app::{AppContext, Result};
use crate::sync::{ArticleDetails, Intent, SyncHandle};

use self::app::{TuiApp, View};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>) -> Result<()> {
    let config = &ctx.config;
    let (handle, mut effects) = ctx.synchronizer(config.api.default_mode);
    let details = ctx.details();
    let mut states = handle.state();

    let mut tui_app = TuiApp::new(handle.snapshot());
    let event_handler = EventHandler::new(Duration::from_millis(100));

    loop {
        if states.has_changed().unwrap_or(false) {
            let snapshot = states.borrow_and_update().clone();
            tui_app.apply_state(snapshot);
        }
        while let Ok(effect) = effects.try_recv() {
            tui_app.apply_effect(&effect);
        }
        refresh_preview(&mut tui_app, &details);

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        if let AppEvent::Key(key) = event_handler.next()? {
            tui_app.clear_status();

            match config.keybindings.get_action(&key) {
                Action::Quit => tui_app.should_quit = true,
                Action::MoveUp => tui_app.move_up(),
                Action::MoveDown => {
                    if tui_app.move_down() {
                        request(&handle, &mut tui_app, Intent::LoadNextPage).await;
                    }
                }
                Action::NextPage => tui_app.next_page(),
                Action::PrevPage => tui_app.prev_page(),
                Action::LoadMore => request(&handle, &mut tui_app, Intent::LoadNextPage).await,
                Action::Refresh => request(&handle, &mut tui_app, Intent::Refresh).await,
                Action::ToggleMode => request(&handle, &mut tui_app, Intent::ToggleMode).await,
                Action::Select => {
                    if let Some(id) = tui_app.selected().map(|a| a.id.clone()) {
                        match details.open(&id) {
                            Ok(article) => tui_app.open_detail(article),
                            Err(e) => tui_app.set_status(e.to_string()),
                        }
                    }
                }
                Action::Back => tui_app.back(),
                Action::Save => save_selected(&mut tui_app, &details).await,
                Action::OpenInBrowser => {
                    if let Some(article) = &tui_app.preview {
                        if let Err(e) = open::that(&article.url) {
                            tui_app.set_status(format!("Failed to open browser: {}", e));
                        }
                    }
                }
                Action::None => {}
            }
        }

        if tui_app.should_quit {
            break;
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn request(handle: &SyncHandle, tui_app: &mut TuiApp, intent: Intent) {
    if let Err(e) = handle.send(intent).await {
        warn!("Failed to send {:?}: {}", intent, e);
        tui_app.set_status(e.to_string());
    }
}

/// Keep the preview pane on the selected article. Only the list view
/// follows the selection; the detail view keeps what was opened.
fn refresh_preview(tui_app: &mut TuiApp, details: &ArticleDetails) {
    if tui_app.view != View::List {
        return;
    }
    if let Some(id) = tui_app.stale_preview().map(str::to_string) {
        let article = details.open(&id).ok();
        tui_app.set_preview(id, article);
    }
}

async fn save_selected(tui_app: &mut TuiApp, details: &ArticleDetails) {
    let Some(article) = tui_app.preview.clone() else {
        return;
    };

    let message = match details.save(&article).await {
        Ok(true) => "Saved successfully".to_string(),
        Ok(false) if details.can_save_remotely() => "Server declined to save".to_string(),
        Ok(false) => "Kept locally (no save endpoint configured)".to_string(),
        Err(e) => format!("Failed to save: {}", e),
    };
    tui_app.set_status(message);
}
