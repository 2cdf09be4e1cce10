//! Spotify authorization commands.

use tokio::runtime::Runtime;

use super::{AppContext, prompt};
use crate::catalog::{SpotifyAuth, SpotifyClient};
use crate::config;

/// Query used to prove the session can search
const CONNECTION_PROBE: &str = "black dog";

/// Run the interactive authorization-code flow and cache the token
pub fn cmd_authorize(rt: &Runtime, ctx: &AppContext) -> anyhow::Result<()> {
    ctx.require_credentials()?;
    let auth = SpotifyAuth::new(ctx.config.credentials.clone(), &ctx.data_dir);

    println!("Open this URL in a browser and approve access:\n");
    println!("  {}\n", auth.authorize_url());
    let redirected = prompt("Paste the URL you were redirected to")?;

    rt.block_on(auth.complete_authorization(&redirected))?;
    println!("✓ Token cached at {}", auth.cache_path().display());

    // First-time setup: keep the credentials for the next run
    if config::config_path().is_some_and(|p| !p.exists()) {
        config::save(&ctx.config)?;
        println!("✓ Credentials saved to config");
    }
    Ok(())
}

/// Authenticate and run one search
pub fn cmd_check_connection(rt: &Runtime, ctx: &AppContext) -> anyhow::Result<()> {
    ctx.require_credentials()?;
    rt.block_on(async {
        let spotify = SpotifyClient::connect(&ctx.config.credentials, &ctx.data_dir).await?;
        println!("✓ Connected as {}", spotify.username());

        let page = spotify.search_tracks(CONNECTION_PROBE).await?;
        match page.first_id() {
            Some(id) => println!(
                "✓ Search works: {} hits for {:?}, top https://open.spotify.com/track/{}",
                page.total, CONNECTION_PROBE, id
            ),
            None => println!("? Search for {:?} returned nothing", CONNECTION_PROBE),
        }
        Ok(())
    })
}
