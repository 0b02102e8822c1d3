//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::Folio;

/// Quiet period before a batch of file events triggers a rebuild
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Load the corpus and write every page
pub fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();

    let corpus = folio.load_corpus()?;
    tracing::info!(
        "Loaded {} solutions and {} pages",
        corpus.solutions.len(),
        corpus.pages.len()
    );

    let color = folio.color_mode();
    let generator = Generator::new(folio, color.handle())?;
    let count = generator.generate(&corpus)?;

    tracing::info!(
        "Generated {} pages in {:.2}s",
        count,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Watch content, static files and the config, regenerating on change
pub async fn watch(folio: &Folio) -> Result<()> {
    let folio = folio.clone();
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");
    tokio::task::spawn_blocking(move || watch_blocking(&folio, || {})).await?
}

/// Rebuild after every debounced batch of relevant changes, calling
/// `on_rebuilt` after each successful build. Blocks for as long as the
/// watcher lives.
pub fn watch_blocking(folio: &Folio, mut on_rebuilt: impl FnMut()) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    let config_path = folio.base_dir.join("_config.yml");
    let targets = watched_dirs(folio)
        .into_iter()
        .map(|dir| (dir, RecursiveMode::Recursive))
        .chain(config_path.exists().then_some((config_path, RecursiveMode::NonRecursive)));
    for (target, mode) in targets {
        debouncer.watcher().watch(&target, mode)?;
        tracing::debug!("Watching {:?}", target);
    }

    for batch in rx {
        let events = match batch {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Watcher reported an error: {:?}", e);
                continue;
            }
        };

        let mut changed = events.iter().map(|e| &e.path).filter(|p| is_relevant(p)).peekable();
        if changed.peek().is_none() {
            continue;
        }
        for path in changed {
            tracing::info!("Changed: {}", path.display());
        }

        // Config edits apply on the next build
        match Folio::new(&folio.base_dir).and_then(|fresh| run(&fresh)) {
            Ok(()) => on_rebuilt(),
            Err(e) => tracing::error!("Rebuild failed: {:#}", e),
        }
    }

    Ok(())
}

/// Editor swap files and VCS metadata never trigger a rebuild
pub fn is_relevant(path: &Path) -> bool {
    let hidden_dir = path.components().any(|c| match c {
        Component::Normal(part) => part == ".git" || part == ".folio",
        _ => false,
    });
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    !hidden_dir && name != ".DS_Store" && !name.ends_with('~') && !name.ends_with(".swp")
}

/// Existing directories whose changes affect the output
pub fn watched_dirs(folio: &Folio) -> Vec<PathBuf> {
    [&folio.content_dir, &folio.static_dir]
        .into_iter()
        .filter(|dir| dir.exists())
        .cloned()
        .collect()
}
