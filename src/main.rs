//! Coin Streak entry point
//!
//! The browser build wires pointer input, the frame loop, HUD and audio.
//! Natively this runs a headless autoplay in the real physics world.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, PointerEvent};

    use coin_streak::audio::{AudioSession, WebAudioBackend};
    use coin_streak::leaderboard::ScoreSubmission;
    use coin_streak::platform;
    use coin_streak::sim::TossPhase;
    use coin_streak::{CoinGame, GameNotice, Leaderboard, PlayerProfile, Settings};

    // The render layer lives in JS; it only ever sees the coin transform
    #[wasm_bindgen(inline_js = "
        export function render_coin(px, py, pz, qx, qy, qz, qw, timeScale) {
            const hook = globalThis.renderCoin;
            if (typeof hook === 'function') {
                hook({ position: [px, py, pz], rotation: [qx, qy, qz, qw], timeScale });
            }
        }
    ")]
    extern "C" {
        #[allow(clippy::too_many_arguments)]
        fn render_coin(px: f32, py: f32, pz: f32, qx: f32, qy: f32, qz: f32, qw: f32, time_scale: f32);
    }

    struct App {
        game: CoinGame,
        audio: AudioSession<WebAudioBackend>,
        settings: Settings,
        last_time: f64,
        message: Option<String>,
        board: Leaderboard,
        /// Submissions raised this frame, sent once the app is released
        outbox: Vec<ScoreSubmission>,
    }

    impl App {
        fn new(seed: u64, settings: Settings) -> Self {
            let mut game = CoinGame::new(seed, PlayerProfile::load());
            game.set_reduced_motion(settings.reduced_motion);
            Self {
                game,
                audio: AudioSession::new(settings.master_volume),
                settings,
                last_time: 0.0,
                message: None,
                board: Leaderboard::new(),
                outbox: Vec::new(),
            }
        }

        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            for notice in self.game.update(dt, &mut self.audio) {
                self.handle(notice);
            }

            let coin = self.game.coin();
            let (p, q) = (coin.position, coin.rotation);
            render_coin(p.x, p.y, p.z, q.x, q.y, q.z, q.w, self.game.time_scale());
        }

        fn handle(&mut self, notice: GameNotice) {
            match notice {
                GameNotice::Launched(_) => self.message = None,
                GameNotice::Landed { side, verdict } => {
                    log::info!("{} ({verdict:?})", side.as_str());
                    self.update_hud();
                }
                GameNotice::Submit(submission) => self.outbox.push(submission),
                GameNotice::Ready => self.update_hud(),
            }
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let lang = self.settings.language;
            let streak = self.game.streak();

            set_text(
                &document,
                "#hud-streak .hud-label",
                lang.streak_label(),
            );
            set_text(&document, "#hud-streak .hud-value", &streak.streak().to_string());
            set_text(&document, "#hud-best .hud-label", lang.best_label());
            set_text(
                &document,
                "#hud-best .hud-value",
                &self.game.profile().high_score().to_string(),
            );

            let prompt = self
                .message
                .clone()
                .unwrap_or_else(|| lang.target_label(streak.target()));
            set_text(&document, "#hud-target", &prompt);

            if let Some(el) = document.get_element_by_id("hud-odds") {
                match self.game.odds(lang) {
                    Some(odds) => {
                        let _ = el.set_attribute("class", "hud-item");
                        set_text(
                            &document,
                            "#hud-odds .hud-value",
                            &format!("{}% ({})", odds.percent, odds.fraction),
                        );
                        set_text(&document, "#hud-odds .hud-example", odds.example);
                    }
                    None => {
                        let _ = el.set_attribute("class", "hud-item hidden");
                    }
                }
            }
        }

        /// Ranked rows, or the empty state
        fn render_leaderboard(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let lang = self.settings.language;
            set_text(&document, "#leaderboard-title", lang.leaderboard_title());

            let Some(list) = document.get_element_by_id("leaderboard-list") else {
                return;
            };
            list.set_inner_html("");

            if self.board.is_empty() {
                if let Ok(empty) = document.create_element("div") {
                    empty.set_class_name("leaderboard-empty");
                    empty.set_text_content(Some(lang.no_records()));
                    let _ = list.append_child(&empty);
                }
                return;
            }

            for entry in self.board.rows(self.game.profile().username()) {
                let Ok(row) = document.create_element("li") else {
                    continue;
                };
                if entry.is_me {
                    row.set_class_name("leaderboard-row me");
                } else {
                    row.set_class_name("leaderboard-row");
                }
                let cells = [
                    ("rank", entry.rank.to_string()),
                    ("name", entry.username.to_string()),
                    ("score", entry.score.to_string()),
                ];
                for (class, text) in cells {
                    if let Ok(cell) = document.create_element("span") {
                        cell.set_class_name(class);
                        cell.set_text_content(Some(&text));
                        let _ = row.append_child(&cell);
                    }
                }
                let _ = list.append_child(&row);
            }
        }
    }

    /// Fetch the board in the background; gameplay never waits on it
    fn refresh_leaderboard(app: &Rc<RefCell<App>>) {
        let app = app.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let board = platform::fetch_leaderboard().await;
            let mut a = app.borrow_mut();
            a.board = board;
            a.render_leaderboard();
        });
    }

    fn submit(app: &Rc<RefCell<App>>, submission: ScoreSubmission) {
        let app = app.clone();
        platform::submit_score(submission, move |board| {
            let mut a = app.borrow_mut();
            a.board = board;
            a.render_leaderboard();
        });
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger unavailable: {e}").into());
        }
        log::info!("Coin Streak starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, nothing to run");
            return;
        };

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
        {
            Some(canvas) => canvas,
            None => {
                log::error!("No #canvas element");
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed, Settings::load())));
        log::info!("Game initialized with seed: {}", seed);

        setup_pointer_handlers(&canvas, app.clone());
        setup_volume_slider(&document, app.clone());
        setup_username_input(&document, app.clone());
        setup_language_toggle(&document, app.clone());
        setup_leaderboard_panel(&document, app.clone());
        setup_unload(app.clone());

        app.borrow().update_hud();
        app.borrow().render_leaderboard();
        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(app.clone());
        log::info!("Coin Streak running!");

        refresh_leaderboard(&app);
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                app.borrow_mut()
                    .game
                    .pointer_down(pos, event.time_stamp());
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let pos = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let mut a = app.borrow_mut();
                if a.game.pointer_up(pos, event.time_stamp()).is_some() {
                    // Audio may only start inside a user gesture
                    a.audio.ensure_active(WebAudioBackend::open);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().game.pointer_cancel();
            });
            let _ = canvas.add_event_listener_with_callback(
                "pointercancel",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn setup_volume_slider(document: &Document, app: Rc<RefCell<App>>) {
        let Some(slider) = document
            .get_element_by_id("volume")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        slider.set_value(&app.borrow().settings.master_volume.to_string());

        let input = slider.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let volume = input.value().parse::<f32>().unwrap_or(0.0);
            let mut a = app.borrow_mut();
            a.settings.set_master_volume(volume);
            let volume = a.settings.master_volume;
            a.audio.set_master_volume(volume);
            a.settings.save();
        });
        let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_username_input(document: &Document, app: Rc<RefCell<App>>) {
        let Some(field) = document
            .get_element_by_id("username")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        if let Some(name) = app.borrow().game.profile().username() {
            field.set_value(name);
        }

        let input = field.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            let result = a.game.profile_mut().set_username(&input.value());
            a.message = match result {
                Ok(()) => None,
                Err(e) => Some(e.to_string()),
            };
            a.update_hud();
        });
        let _ = field.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_language_toggle(document: &Document, app: Rc<RefCell<App>>) {
        let Some(btn) = document.get_element_by_id("lang-btn") else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let mut a = app.borrow_mut();
            a.settings.language = a.settings.language.toggled();
            a.settings.save();
            a.update_hud();
            a.render_leaderboard();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_leaderboard_panel(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("leaderboard-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                show_panel(true);
                refresh_leaderboard(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("leaderboard-close") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                show_panel(false);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn show_panel(visible: bool) {
        let panel = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("leaderboard"));
        if let Some(panel) = panel {
            let _ = panel.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Cancel timers and close the audio context when the page goes away
    fn setup_unload(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            let App { game, audio, .. } = &mut *a;
            if matches!(game.phase(), TossPhase::InFlight(_)) {
                log::info!("Leaving mid-toss");
            }
            game.shutdown(audio);
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();

        *g.borrow_mut() = Some(Closure::new(move |time: f64| {
            let outbox = {
                let mut a = app.borrow_mut();
                a.frame(time);
                std::mem::take(&mut a.outbox)
            };
            for submission in outbox {
                submit(&app, submission);
            }

            if let (Some(window), Some(cb)) = (web_sys::window(), f.borrow().as_ref()) {
                let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }));

        if let (Some(window), Some(cb)) = (web_sys::window(), g.borrow().as_ref()) {
            let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Coin Streak (native) starting...");
    log::info!("The playable build is wasm - run with `trunk serve`");

    let tosses = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u32>().ok())
        .unwrap_or(20);
    autoplay(tosses);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Tap the coin `tosses` times in the real arena and log each result
#[cfg(not(target_arch = "wasm32"))]
fn autoplay(tosses: u32) {
    use coin_streak::audio::{AudioSession, SilentBackend};
    use coin_streak::consts::SIM_DT;
    use coin_streak::{CoinGame, GameNotice, PlayerProfile};
    use glam::Vec2;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    log::info!("Seed: {seed}");

    let mut game = CoinGame::new(seed, PlayerProfile::new());
    let mut audio: AudioSession<SilentBackend> = AudioSession::new(0.0);
    let frame_dt = 1.0 / 60.0;
    let max_frames = (10.0 / frame_dt) as usize;

    let mut mismatches = 0;
    for n in 0..tosses {
        let start = game.clock() * 1000.0;
        game.pointer_down(Vec2::new(200.0, 400.0), start);
        let Some(request) = game.pointer_up(Vec2::new(201.0, 399.0), start + 90.0) else {
            log::warn!("Toss {n} was not accepted");
            continue;
        };

        let mut ready = false;
        for _ in 0..max_frames {
            for notice in game.update(frame_dt, &mut audio) {
                match notice {
                    GameNotice::Landed { side, verdict } => {
                        if side != request.outcome {
                            mismatches += 1;
                        }
                        log::info!(
                            "#{n:>3} decided {:<5} landed {:<5} {verdict:?}",
                            request.outcome.as_str(),
                            side.as_str()
                        );
                    }
                    GameNotice::Ready => ready = true,
                    GameNotice::Launched(_) | GameNotice::Submit(_) => {}
                }
            }
            if ready {
                break;
            }
        }
        if !ready {
            log::error!("Toss {n} never reset");
            break;
        }
    }

    log::info!(
        "Done: streak {} best {} ({} of {tosses} landings diverged, {:.1}s simulated at {} Hz)",
        game.streak().streak(),
        game.profile().high_score(),
        mismatches,
        game.clock(),
        (1.0 / SIM_DT).round()
    );
}
