//! Leaderboard HTTP server
//!
//! Reads `.env` if present, then serves `/leaderboard` until killed.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = coin_streak::server::run().await {
        log::error!("Leaderboard server stopped: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Native only
}
