//! Stored history inspection.

use tokio::runtime::Runtime;

use super::AppContext;
use crate::catalog::SpotifyClient;
use crate::sync::{HistoryStore, TrackHistory};

/// Print what is remembered about a playlist
pub fn cmd_history(rt: &Runtime, ctx: &AppContext, playlist_name: &str) -> anyhow::Result<()> {
    ctx.require_credentials()?;
    let playlist = rt.block_on(async {
        let spotify = SpotifyClient::connect(&ctx.config.credentials, &ctx.data_dir).await?;
        let playlists = spotify.user_playlists().await?;
        anyhow::Ok(playlists.into_iter().find(|p| p.name == playlist_name))
    })?;

    let Some(playlist) = playlist else {
        anyhow::bail!("No playlist named {:?} for this user", playlist_name);
    };

    let store = HistoryStore::new(&ctx.data_dir);
    let Some(file) = store.read(&playlist.remote_id)? else {
        println!(
            "No history stored for {} yet in {}",
            playlist.name,
            store.dir().display()
        );
        return Ok(());
    };

    println!("{} ({})", playlist.name, playlist.remote_id);
    println!("Schema version: {}", file.version);
    println!("Feeds processed: {}", file.state.url_history.len());
    if let Some(url) = file.state.last_url() {
        println!("Last feed: {}", url);
    }
    println!();

    match &file.state.tracks {
        TrackHistory::DaySlots(days) => {
            println!("Day slots 0..={}:", days.capacity().saturating_sub(1));
            for (day, slot) in days.iter().enumerate() {
                if slot.tracks.is_empty() {
                    println!("Day {}: (empty)", day);
                    continue;
                }
                println!("Day {}: {} tracks from {}", day, slot.tracks.len(), slot.source_url);
                for track in &slot.tracks {
                    println!("  {}", track);
                }
            }
        }
        TrackHistory::Flat(flat) => {
            println!("{} tracks, newest first:", flat.tracks.len());
            for (i, track) in flat.tracks.iter().enumerate() {
                println!("  {:>4}. {}", i + 1, track);
            }
        }
    }
    Ok(())
}
