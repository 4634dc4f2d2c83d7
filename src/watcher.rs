use crate::db::ItemStore;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Reloads the store when another process writes to the database file.
///
/// The returned watcher must be kept alive for events to keep flowing.
pub fn watch_database(
    store: ItemStore,
    database_path: &Path,
    debounce: Duration,
) -> notify::Result<(RecommendedWatcher, JoinHandle<()>)> {
    let file_name = database_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    let directory = match database_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<()>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if touches_database(&event, &file_name) => {
            let _ = tx.send(());
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "database watch error"),
    })?;
    watcher.watch(&directory, RecursiveMode::NonRecursive)?;
    debug!(path = %directory.display(), "watching database directory");

    let handle = tokio::spawn(async move {
        while rx.recv().await.is_some() {
            tokio::time::sleep(debounce).await;
            while rx.try_recv().is_ok() {}

            match store.refresh() {
                Ok(true) => debug!("reloaded items after external change"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "failed to reload items after external change"),
            }
        }
    });

    Ok((watcher, handle))
}

const COMPANION_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// Matches the database file and its `-wal` / `-shm` / `-journal` companions.
fn touches_database(event: &Event, file_name: &OsString) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    if file_name.is_empty() {
        return false;
    }
    let file_name = file_name.to_string_lossy();

    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| is_database_file(&name.to_string_lossy(), &file_name))
            .unwrap_or(false)
    })
}

fn is_database_file(name: &str, database: &str) -> bool {
    match name.strip_prefix(database) {
        Some("") => true,
        Some(suffix) => COMPANION_SUFFIXES.contains(&suffix),
        None => false,
    }
}
