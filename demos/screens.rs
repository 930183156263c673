//! Runs the clock and the emoji feed on a tokio `LocalSet` and logs every
//! change to their observed fields.
//!
//! ```sh
//! RUST_LOG=rxscreens=debug,screens=info cargo run --example screens -- [config.json]
//! ```

use std::error::Error;

use rxscreens::prelude::*;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).init();

  let config = match std::env::args().nth(1) {
    Some(path) => ScreenConfig::from_path(path)?,
    None => ScreenConfig::default(),
  }
  .with_env_overrides();
  let fetcher = HttpFetcher::new(config.http_timeout())?;

  LocalSet::new()
    .run_until(async move {
      let clock = ClockController::new(&config, LocalScheduler)?;
      let feed = EmojiFeedController::new(&config, fetcher, LocalScheduler)?;

      let _time = clock.current_time().watch(|time| info!(%time, "clock"));
      let _grid = feed.emojis().watch(|emojis| {
        let row: String = emojis.iter().map(|e| e.emoji.as_str()).collect();
        info!(count = emojis.len(), %row, "emoji grid");
      });

      tokio::time::sleep(Duration::from_secs(10)).await;
      clock.teardown();
      feed.teardown();
      Ok::<_, ConfigError>(())
    })
    .await?;
  Ok(())
}
