//! Shape Catcher entry point
//!
//! In the browser: Canvas 2D drawing, a requestAnimationFrame loop and DOM
//! input. Natively: a seeded autopilot session on a simulated clock.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use shape_catcher::audio::AudioManager;
    use shape_catcher::consts::*;
    use shape_catcher::engine::{RenderSnapshot, RenderSurface};
    use shape_catcher::persistence::{StoredRecorder, default_store};
    use shape_catcher::platform::{KeyBinding, gesture_action, key_binding};
    use shape_catcher::sim::{GameStatus, Shape, ShapeColor, ShapeKind, ShapeType, SpecialShape};
    use shape_catcher::{Engine, EngineError, HighScores, SessionStatistics, Settings};

    struct CanvasSurface<'a>(&'a HtmlCanvasElement);

    impl RenderSurface for CanvasSurface<'_> {
        fn dimensions(&self) -> Result<(f32, f32), EngineError> {
            Ok((self.0.width() as f32, self.0.height() as f32))
        }
    }

    /// Game instance shared by every DOM callback
    struct Game {
        engine: Engine,
        ctx: CanvasRenderingContext2d,
        canvas: HtmlCanvasElement,
        audio: Rc<RefCell<AudioManager>>,
        highscores: Rc<RefCell<StoredRecorder<HighScores>>>,
        settings: Settings,
        /// Level whose theme is applied to the canvas background
        themed_level: u32,
        touch_start: Option<(f32, f32)>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn frame(&mut self, time: f64) -> bool {
            let Game { engine, ctx, settings, .. } = self;
            let reschedule = engine.frame(time, |snapshot| draw_scene(ctx, snapshot, settings));

            let prev = self.frame_times[self.frame_index];
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % self.frame_times.len();
            if prev > 0.0 && time > prev {
                self.fps = (60_000.0 / (time - prev)).round() as u32;
            }

            self.apply_theme();
            self.update_hud();
            reschedule
        }

        fn apply_theme(&mut self) {
            let snapshot = self.engine.snapshot();
            if snapshot.level == self.themed_level {
                return;
            }
            self.themed_level = snapshot.level;
            let style = format!("background: {};", snapshot.theme.background);
            let _ = self.canvas.set_attribute("style", &style);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snapshot = self.engine.snapshot();
            let set_text = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            set_text("#hud-score .hud-value", &snapshot.score.to_string());
            set_text("#hud-lives .hud-value", &snapshot.lives.to_string());
            let level = if snapshot.endless {
                format!("{} ∞", snapshot.level)
            } else {
                snapshot.level.to_string()
            };
            set_text("#hud-level .hud-value", &level);
            set_text("#hud-progress .hud-value", &format!("{:.0}%", snapshot.level_progress * 100.0));

            match snapshot.time_remaining {
                Some(ms) => {
                    let secs = (ms.max(0.0) / 1000.0).ceil() as u64;
                    set_text("#hud-time .hud-value", &format!("{}:{:02}", secs / 60, secs % 60));
                    show("hud-time", true);
                }
                None => show("hud-time", false),
            }

            // Combo only shows once a tier is reached
            match snapshot.combo_tier {
                Some(tier) => {
                    set_text("#hud-combo .hud-value", &snapshot.combo.to_string());
                    set_text("#hud-combo .multiplier", &format!("x{:.1}", tier.multiplier));
                    set_text("#hud-combo .message", tier.message);
                    show("hud-combo", true);
                }
                None => show("hud-combo", false),
            }

            if snapshot.score_multiplier > 1.0 {
                set_text("#hud-powerup .hud-value", &format!("x{:.0}", snapshot.score_multiplier));
            }
            show("hud-powerup", snapshot.score_multiplier > 1.0);

            set_text("#hud-fps .hud-value", &self.fps.to_string());
            show("hud-fps", self.settings.show_fps);

            show("pause-menu", snapshot.status == GameStatus::Paused);
            show("level-complete", snapshot.status == GameStatus::LevelTransition);
            if let Some(grade) = self.engine.state().last_grade {
                set_text("#level-grade", grade.as_str());
            }

            show("game-over", snapshot.status == GameStatus::GameOver);
            if snapshot.status == GameStatus::GameOver {
                set_text("#final-score", &snapshot.score.to_string());
                set_text("#final-level", &snapshot.level.to_string());
                let best = self.highscores.borrow().data().top_score().unwrap_or(0);
                set_text("#best-score", &best.to_string());
            }
        }

        /// Enter from the menu or after game over
        fn start_or_restart(&mut self) {
            let now = now();
            self.audio.borrow().resume();
            let result = match self.engine.state().status {
                GameStatus::Menu => self.engine.start(now),
                GameStatus::GameOver => self.engine.restart(now),
                _ => Ok(()),
            };
            if let Err(e) = result {
                log::error!("Could not start session: {}", e);
            }
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or(0.0, |p| p.now())
    }

    fn color_hex(color: ShapeColor) -> &'static str {
        match color {
            ShapeColor::Red => "#ef4444",
            ShapeColor::Blue => "#3b82f6",
            ShapeColor::Green => "#22c55e",
            ShapeColor::Yellow => "#eab308",
            ShapeColor::Purple => "#a855f7",
            ShapeColor::Orange => "#f97316",
        }
    }

    /// Trace a shape outline centered on the origin
    fn trace(ctx: &CanvasRenderingContext2d, shape: ShapeType, size: f64) {
        let half = size / 2.0;
        ctx.begin_path();
        match shape {
            ShapeType::Square => ctx.rect(-half, -half, size, size),
            ShapeType::Circle => {
                let _ = ctx.arc(0.0, 0.0, half, 0.0, std::f64::consts::TAU);
            }
            ShapeType::Triangle => {
                ctx.move_to(0.0, -half);
                ctx.line_to(half, half);
                ctx.line_to(-half, half);
            }
            ShapeType::Star => {
                for i in 0..10 {
                    let radius = if i % 2 == 0 { half } else { half * 0.45 };
                    let angle = -std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
                    let (x, y) = (radius * angle.cos(), radius * angle.sin());
                    if i == 0 {
                        ctx.move_to(x, y);
                    } else {
                        ctx.line_to(x, y);
                    }
                }
            }
        }
        ctx.close_path();
    }

    fn draw_shape(ctx: &CanvasRenderingContext2d, snapshot: &RenderSnapshot<'_>, shape: &Shape, settings: &Settings) {
        let pos = snapshot.shape_position(shape);
        let size = f64::from(shape.size);
        ctx.save();
        let _ = ctx.translate(f64::from(pos.x), f64::from(pos.y));
        if !settings.reduced_motion {
            let _ = ctx.rotate(f64::from(shape.rotation));
        }

        match shape.kind {
            ShapeKind::Regular { shape, color } => {
                trace(ctx, shape, size);
                ctx.set_fill_style_str(color_hex(color));
                ctx.fill();
            }
            ShapeKind::Special(SpecialShape::Diamond { color }) => {
                let half = size / 2.0;
                ctx.begin_path();
                ctx.move_to(0.0, -half);
                ctx.line_to(half * 0.7, 0.0);
                ctx.line_to(0.0, half);
                ctx.line_to(-half * 0.7, 0.0);
                ctx.close_path();
                ctx.set_fill_style_str(color_hex(color));
                ctx.fill();
                ctx.set_stroke_style_str("#ffffff");
                ctx.set_line_width(2.0);
                ctx.stroke();
            }
            ShapeKind::Special(SpecialShape::Rainbow { shape }) => {
                trace(ctx, shape, size);
                ctx.set_fill_style_str("#ffffff");
                ctx.fill();
                ctx.set_line_width(4.0);
                for (i, color) in ShapeColor::ALL.iter().enumerate() {
                    ctx.set_stroke_style_str(color_hex(*color));
                    trace(ctx, shape, size - i as f64 * 4.0);
                    ctx.stroke();
                }
            }
            ShapeKind::Special(SpecialShape::GoldenStar { color }) => {
                trace(ctx, ShapeType::Star, size * 1.2);
                ctx.set_fill_style_str("#ffd700");
                ctx.fill();
                ctx.set_stroke_style_str(color_hex(color));
                ctx.set_line_width(3.0);
                ctx.stroke();
            }
            ShapeKind::Special(SpecialShape::Bomb) => {
                trace(ctx, ShapeType::Circle, size);
                ctx.set_fill_style_str("#111827");
                ctx.fill();
                ctx.set_stroke_style_str("#ef4444");
                ctx.set_line_width(3.0);
                ctx.stroke();
            }
            ShapeKind::Special(special @ (SpecialShape::TimeBonus | SpecialShape::Multiplier)) => {
                trace(ctx, ShapeType::Circle, size);
                ctx.set_fill_style_str("#0ea5e9");
                ctx.fill();
                let label = if special == SpecialShape::TimeBonus { "+10s" } else { "x2" };
                ctx.set_fill_style_str("#ffffff");
                ctx.set_font("bold 14px sans-serif");
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                let _ = ctx.fill_text(label, 0.0, 0.0);
            }
        }
        ctx.restore();
    }

    fn draw_scene(ctx: &CanvasRenderingContext2d, snapshot: &RenderSnapshot<'_>, settings: &Settings) {
        ctx.clear_rect(0.0, 0.0, f64::from(CANVAS_WIDTH), f64::from(CANVAS_HEIGHT));

        for shape in snapshot.shapes {
            draw_shape(ctx, snapshot, shape, settings);
        }

        let catcher = snapshot.catcher;
        ctx.save();
        let _ = ctx.translate(f64::from(catcher.pos.x), f64::from(catcher.pos.y));
        if catcher.is_stunned() {
            ctx.set_global_alpha(0.5);
        }
        trace(ctx, catcher.current_shape, f64::from(catcher.width));
        ctx.set_fill_style_str(color_hex(catcher.current_color));
        ctx.fill();
        ctx.set_stroke_style_str(if settings.high_contrast { "#000000" } else { "#ffffff" });
        ctx.set_line_width(3.0);
        ctx.stroke();
        ctx.restore();
    }

    pub fn run() -> Result<(), EngineError> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Shape Catcher starting...");

        let window = web_sys::window().ok_or_else(|| EngineError::SurfaceUnavailable("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| EngineError::SurfaceUnavailable("no document".into()))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| EngineError::SurfaceUnavailable("no #canvas element".into()))?
            .dyn_into()
            .map_err(|_| EngineError::SurfaceUnavailable("#canvas is not a canvas".into()))?;

        // Logical playfield scaled to the device pixel ratio
        let dpr = window.device_pixel_ratio();
        canvas.set_width((f64::from(CANVAS_WIDTH) * dpr) as u32);
        canvas.set_height((f64::from(CANVAS_HEIGHT) * dpr) as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| EngineError::SurfaceUnavailable(format!("{e:?}")))?
            .ok_or_else(|| EngineError::SurfaceUnavailable("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| EngineError::SurfaceUnavailable("unexpected context type".into()))?;
        let _ = ctx.scale(dpr, dpr);

        let settings = Settings::load(default_store().as_ref());
        let audio = Rc::new(RefCell::new(AudioManager::new()));
        audio.borrow_mut().set_volume(settings.volume());

        let seed = js_sys::Date::now() as u64;
        let mut engine = Engine::new(settings.session_config(seed)).with_audio(Box::new(Rc::clone(&audio)));
        engine.initialize(&CanvasSurface(&canvas))?;

        let highscores = Rc::new(RefCell::new(StoredRecorder::<HighScores>::load(default_store())));
        engine.add_recorder(Box::new(Rc::clone(&highscores)));
        engine.add_recorder(Box::new(StoredRecorder::<SessionStatistics>::load(default_store())));

        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            engine,
            ctx,
            canvas: canvas.clone(),
            audio,
            highscores,
            settings,
            themed_level: 0,
            touch_start: None,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_auto_pause(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        game.borrow_mut().start_or_restart();
        request_animation_frame(game);

        log::info!("Shape Catcher running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if key == "Enter" {
                    g.start_or_restart();
                    return;
                }
                match key_binding(&key) {
                    Some(KeyBinding::Hold(held)) => {
                        event.prevent_default();
                        g.engine.set_key(held, true);
                    }
                    Some(KeyBinding::Action(action)) if !event.repeat() => {
                        event.prevent_default();
                        g.audio.borrow().resume();
                        g.engine.dispatch(action);
                    }
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(KeyBinding::Hold(held)) = key_binding(&event.key()) {
                    game.borrow_mut().engine.set_key(held, false);
                }
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: swipes move and cycle, taps cycle shape
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().touch_start = Some((touch.client_x() as f32, touch.client_y() as f32));
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let (Some((x0, y0)), Some(touch)) = (g.touch_start.take(), event.changed_touches().get(0)) else {
                    return;
                };
                if g.engine.state().status == GameStatus::GameOver {
                    g.start_or_restart();
                    return;
                }
                let action = gesture_action(touch.client_x() as f32 - x0, touch.client_y() as f32 - y0);
                g.audio.borrow().resume();
                g.engine.dispatch(action);
            });
            let _ = canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let reschedule = game.borrow_mut().frame(time);
        // Stopped loops schedule nothing further
        if reschedule {
            request_animation_frame(game);
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.engine.pause();
                    g.engine.suspend();
                    log::info!("Suspended (tab hidden)");
                } else {
                    g.engine.wake(now());
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.engine.pause();
                if g.settings.mute_on_blur {
                    let mut volume = g.settings.volume();
                    volume.muted = true;
                    g.audio.borrow_mut().set_volume(volume);
                }
                log::info!("Auto-paused (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let g = game.borrow();
                g.audio.borrow_mut().set_volume(g.settings.volume());
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Failed to start: {}", e);
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("error"))
        {
            el.set_text_content(Some(&e.to_string()));
            let _ = el.set_attribute("class", "");
        }
    }
}

/// Simulated minutes before a headless session gives up
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_LIMIT_MS: f64 = 10.0 * 60_000.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use shape_catcher::audio::LogAudio;
    use shape_catcher::consts::FRAME_TIME;
    use shape_catcher::engine::Headless;
    use shape_catcher::persistence::{MemoryStore, StoredRecorder};
    use shape_catcher::sim::{GameMode, GameStatus, SessionConfig};
    use shape_catcher::{Engine, SessionStatistics};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let mut config = SessionConfig::new(seed);
    if args.next().as_deref() == Some("time-attack") {
        config.mode = GameMode::time_attack();
    }

    log::info!("Shape Catcher (native) starting headless autopilot, seed {}", seed);

    let stats = Rc::new(RefCell::new(StoredRecorder::<SessionStatistics>::load(Box::new(
        MemoryStore::default(),
    ))));
    let mut engine = Engine::new(config).with_audio(Box::new(LogAudio));
    engine.add_recorder(Box::new(Rc::clone(&stats)));
    engine.set_autopilot(true);

    if let Err(e) = engine.initialize(&Headless::default()).and_then(|()| engine.start(0.0)) {
        log::error!("Failed to start: {}", e);
        std::process::exit(1);
    }

    // Two steps per host frame, like a 30 Hz display
    let mut now = 0.0;
    while now < HEADLESS_LIMIT_MS && engine.state().status != GameStatus::GameOver {
        now += FRAME_TIME * 2.0;
        engine.frame(now, |_| {});
    }
    engine.stop();

    let state = engine.state();
    let stats = stats.borrow();
    let summary = stats.data();
    println!(
        "score {} | level {} | caught {} | missed {} | bombs {} | best combo {} | accuracy {:.0}%",
        state.score,
        state.level(),
        summary.shapes_caught,
        summary.shapes_missed,
        summary.bombs_hit,
        summary.max_combo,
        summary.accuracy() * 100.0
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
