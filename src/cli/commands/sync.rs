//! Playlist sync commands.

use tokio::runtime::Runtime;

use super::{AppContext, prompt};
use crate::catalog::SpotifyClient;
use crate::feed::FeedClient;
use crate::settings::{self, PlaylistSettings};
use crate::sync::{HistoryPolicy, HistoryStore, Orchestrator, PlaylistJob, SyncOutcome};

/// Sync every configured playlist once
pub fn cmd_run(rt: &Runtime, ctx: &AppContext, reset: bool) -> anyhow::Result<bool> {
    let rows = load_rows(ctx)?;
    if rows.is_empty() {
        println!("No playlists in {}", ctx.settings_file.display());
        return Ok(true);
    }
    let jobs: Vec<PlaylistJob> = rows.iter().map(|row| row.to_job(false, reset)).collect();

    ctx.require_credentials()?;
    rt.block_on(async {
        let spotify = SpotifyClient::connect(&ctx.config.credentials, &ctx.data_dir).await?;
        let feed = FeedClient::new();
        let store = HistoryStore::new(&ctx.data_dir);

        let summary = Orchestrator::new(&spotify, &feed, &store)
            .sync_all(&jobs)
            .await?;

        println!(
            "\nDone: {} updated, {} unchanged, {} failed",
            summary.updated,
            summary.skipped,
            summary.failed.len()
        );
        for (name, error) in &summary.failed {
            println!("  ✗ {}: {}", name, error);
        }
        Ok(summary.is_success())
    })
}

/// Sync the designated test row using its test URL
pub fn cmd_test(rt: &Runtime, ctx: &AppContext, row: Option<usize>) -> anyhow::Result<bool> {
    let rows = load_rows(ctx)?;
    let index = row.unwrap_or(ctx.config.sync.test_row);
    let Some(settings) = rows.get(index) else {
        anyhow::bail!(
            "Settings row {} does not exist ({} has {} rows)",
            index,
            ctx.settings_file.display(),
            rows.len()
        );
    };
    if settings.test_url.is_empty() {
        anyhow::bail!("Row {} ({}) has no test_url", index, settings.playlist_name);
    }

    println!("Testing with {}", settings.playlist_name);
    sync_one(rt, ctx, settings.to_job(true, false))
}

/// Interactively build a one-off playlist from any feed URL
pub fn cmd_new(rt: &Runtime, ctx: &AppContext) -> anyhow::Result<bool> {
    let feed_url = prompt("Please tell me the feed URL where the music is...")?;
    let playlist_name = prompt("What would you like to call this playlist?")?;
    if feed_url.is_empty() || playlist_name.is_empty() {
        anyhow::bail!("Both a feed URL and a playlist name are needed");
    }

    let job = PlaylistJob {
        playlist_name,
        program_title: String::new(),
        feed_url,
        policy: HistoryPolicy::Flat { limit: 0 },
        reset_history: false,
    };
    sync_one(rt, ctx, job)
}

fn load_rows(ctx: &AppContext) -> anyhow::Result<Vec<PlaylistSettings>> {
    let rows = settings::load_settings(&ctx.settings_file)?;
    tracing::debug!("Loaded {} settings rows", rows.len());
    Ok(rows)
}

fn sync_one(rt: &Runtime, ctx: &AppContext, job: PlaylistJob) -> anyhow::Result<bool> {
    ctx.require_credentials()?;
    rt.block_on(async {
        let spotify = SpotifyClient::connect(&ctx.config.credentials, &ctx.data_dir).await?;
        let feed = FeedClient::new();
        let store = HistoryStore::new(&ctx.data_dir);

        match Orchestrator::new(&spotify, &feed, &store).sync(&job).await {
            Ok(SyncOutcome::Updated(report)) => {
                println!("✓ {} ({})", job.playlist_name, report.playlist_id);
                println!("  Added:     {}", report.added);
                println!("  Evicted:   {}", report.evicted);
                println!("  Unmatched: {}", report.dropped);
                println!("  Tracks:    {}", report.playlist_len);
                if report.repeated_url {
                    println!("  (feed URL had been processed before)");
                }
                Ok(true)
            }
            Ok(SyncOutcome::Skipped(reason)) => {
                println!("- {}: nothing changed, {}", job.playlist_name, reason);
                Ok(true)
            }
            Err(e) => {
                eprintln!("✗ {}: {}", job.playlist_name, e);
                Ok(false)
            }
        }
    })
}
