//! Leaderboard requests over `fetch`

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::consts::LEADERBOARD_ENDPOINT;
use crate::leaderboard::{Leaderboard, ScoreSubmission};

async fn send(request: Request) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}

async fn post_score(submission: &ScoreSubmission) -> Result<Leaderboard, JsValue> {
    let body = serde_json::to_string(submission).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(LEADERBOARD_ENDPOINT, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let text = send(request).await?;
    let payload: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(payload
        .get("leaderboard")
        .map(|board| Leaderboard::from_json_lenient(&board.to_string()))
        .unwrap_or_default())
}

/// Post a score in the background and hand the updated board to `on_board`.
/// Failures are logged and otherwise ignored.
pub fn submit_score(submission: ScoreSubmission, on_board: impl FnOnce(Leaderboard) + 'static) {
    wasm_bindgen_futures::spawn_local(async move {
        match post_score(&submission).await {
            Ok(board) => {
                log::info!(
                    "Submitted {} for {} (rank {:?})",
                    submission.score(),
                    submission.username(),
                    board.rank_of(submission.username())
                );
                on_board(board);
            }
            Err(e) => log::warn!("Leaderboard submission failed: {e:?}"),
        }
    });
}

/// Current leaderboard, or empty when the service is unreachable
pub async fn fetch_leaderboard() -> Leaderboard {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let result = match Request::new_with_str_and_init(LEADERBOARD_ENDPOINT, &opts) {
        Ok(request) => send(request).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(text) => Leaderboard::from_json_lenient(&text),
        Err(e) => {
            log::warn!("Failed to fetch leaderboard: {e:?}");
            Leaderboard::new()
        }
    }
}
