use anyhow::Result;
use closet_score::db::{establish_pool, ItemStore};
use closet_score::monitor::ClosetMonitor;
use closet_score::scoring::ClosetReport;
use closet_score::settings::settings;
use closet_score::utils::{
    log_report, log_shutdown, log_startup, log_store_error, log_store_ready, log_watching,
};
use closet_score::watcher::watch_database;
use std::path::Path;
use std::time::Duration;
use tracing::subscriber::set_global_default;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Where reports go. In JSON mode stdout carries one report per line and console
/// banners are suppressed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Output {
    Console { top_items: usize },
    Json,
}

impl Output {
    fn status(&self, print: impl FnOnce()) {
        if let Output::Console { .. } = self {
            print();
        }
    }

    fn report(&self, report: &ClosetReport) {
        match self {
            Output::Console { top_items } => log_report(report, *top_items),
            Output::Json => match json_line(report) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "cannot encode report"),
            },
        }
    }
}

fn json_line(report: &ClosetReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("closet_score=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        );
    set_global_default(subscriber)?;

    let once = std::env::args().any(|a| a == "--once");
    let json = std::env::args().any(|a| a == "--json");

    let s = settings();
    let database_url = s.store.database_url.clone();
    let watch_enabled = s.monitor.watch_database && !once;
    let output = if json {
        Output::Json
    } else {
        Output::Console {
            top_items: s.monitor.report_top_items,
        }
    };

    output.status(|| log_startup(&database_url, watch_enabled));

    let pool = establish_pool(&database_url, s.store.pool_size, s.store.busy_timeout_ms)?;
    let store = ItemStore::open(pool)?;
    let snapshot = store.snapshot();
    output.status(|| log_store_ready(snapshot.len()));

    if once {
        let report = ClosetReport::evaluate(&snapshot);
        match output {
            Output::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            Output::Console { .. } => output.report(&report),
        }
        return Ok(());
    }

    let (_monitor, monitor_task) =
        ClosetMonitor::spawn_with(store.subscribe(), move |report| output.report(report));

    let _watcher = if watch_enabled {
        let debounce = Duration::from_millis(s.monitor.debounce_ms);
        match watch_database(store.clone(), Path::new(&database_url), debounce) {
            Ok(watcher) => {
                output.status(|| log_watching(&database_url));
                Some(watcher)
            }
            Err(e) => {
                warn!(error = %e, "cannot watch database");
                output.status(|| log_store_error(&format!("cannot watch database: {e}")));
                None
            }
        }
    } else {
        None
    };

    tokio::signal::ctrl_c().await?;
    output.status(log_shutdown);
    monitor_task.abort();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use closet_score::item::{ClosetSnapshot, Item, StoredItem};

    #[test]
    fn test_json_output_skips_banners() {
        let mut printed = false;
        Output::Json.status(|| printed = true);
        assert!(!printed);

        Output::Console { top_items: 3 }.status(|| printed = true);
        assert!(printed);
    }

    #[test]
    fn test_json_line_is_one_report_per_line() {
        let snapshot = ClosetSnapshot::new(vec![StoredItem {
            id: 1,
            name: "linen shirt".into(),
            item: Item::default(),
            created_at: 0,
            updated_at: 0,
        }]);
        let line = json_line(&ClosetReport::evaluate(&snapshot)).unwrap();

        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["score"], 45);
        assert_eq!(value["statistics"]["item_count"], 1);
    }
}
