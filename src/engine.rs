//! Game engine
//!
//! Owns the session state and the fixed-timestep loop. Input arrives as
//! [`InputAction`]s and held-key changes, outcomes leave through the audio and
//! recorder collaborators, and the renderer only ever sees a [`RenderSnapshot`].

use std::collections::VecDeque;

use glam::Vec2;

use crate::audio::{AudioSink, SilentAudio};
use crate::error::EngineError;
use crate::game_loop::GameLoop;
use crate::persistence::OutcomeRecorder;
use crate::platform::{HeldKey, InputAction, KeyState};
use crate::sim::{
    Catcher, ComboTier, GameEvent, GameState, GameStatus, LevelTheme, SessionConfig, Shape, TickInput, tick,
};

/// Something the game draws into
pub trait RenderSurface {
    /// Drawable size in pixels
    fn dimensions(&self) -> Result<(f32, f32), EngineError>;
}

/// Offscreen surface for native runs and tests
#[derive(Debug, Clone, Copy)]
pub struct Headless {
    pub width: f32,
    pub height: f32,
}

impl Default for Headless {
    fn default() -> Self {
        Self {
            width: crate::consts::CANVAS_WIDTH,
            height: crate::consts::CANVAS_HEIGHT,
        }
    }
}

impl RenderSurface for Headless {
    fn dimensions(&self) -> Result<(f32, f32), EngineError> {
        Ok((self.width, self.height))
    }
}

/// Read-only view of the session for one render pass
#[derive(Debug, Clone, Copy)]
pub struct RenderSnapshot<'a> {
    pub shapes: &'a [Shape],
    pub catcher: &'a Catcher,
    pub score: u64,
    pub lives: u32,
    pub combo: u32,
    pub combo_tier: Option<&'static ComboTier>,
    /// Fraction of the combo timeout left (0-1)
    pub combo_timer_percent: f64,
    pub level: u32,
    pub endless: bool,
    pub status: GameStatus,
    /// Progress between the last simulation step and the next (0-1)
    pub interpolation: f64,
    pub time_remaining: Option<f64>,
    /// Catches toward the level target (0-1)
    pub level_progress: f64,
    pub score_multiplier: f64,
    pub theme: &'a LevelTheme,
}

impl RenderSnapshot<'_> {
    /// Where to draw a shape, extrapolated by the interpolation factor
    pub fn shape_position(&self, shape: &Shape) -> Vec2 {
        if self.status == GameStatus::Playing {
            shape.pos + shape.vel * self.interpolation as f32
        } else {
            shape.pos
        }
    }
}

/// The orchestrator. Single writer of [`GameState`].
pub struct Engine {
    state: GameState,
    game_loop: GameLoop,
    /// Discrete actions waiting for the next simulation step
    pending: VecDeque<InputAction>,
    keys: KeyState,
    autopilot: bool,
    audio: Box<dyn AudioSink>,
    recorders: Vec<Box<dyn OutcomeRecorder>>,
    initialized: bool,
    interpolation: f64,
}

impl Engine {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            state: GameState::new(config),
            game_loop: GameLoop::new(),
            pending: VecDeque::new(),
            keys: KeyState::default(),
            autopilot: false,
            audio: Box::new(SilentAudio),
            recorders: Vec::new(),
            initialized: false,
            interpolation: 0.0,
        }
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    /// Register a statistics/leaderboard collaborator
    pub fn add_recorder(&mut self, recorder: Box<dyn OutcomeRecorder>) {
        self.recorders.push(recorder);
    }

    /// Check the render surface. Must succeed before [`start`](Self::start).
    pub fn initialize(&mut self, surface: &impl RenderSurface) -> Result<(), EngineError> {
        let (width, height) = surface.dimensions()?;
        if width <= 0.0 || height <= 0.0 {
            return Err(EngineError::SurfaceUnavailable(format!(
                "surface has no area ({}x{})",
                width, height
            )));
        }
        self.initialized = true;
        log::info!("Engine initialized on {}x{} surface", width, height);
        Ok(())
    }

    /// Begin the session and the loop
    pub fn start(&mut self, now: f64) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }
        let event = self.state.start();
        self.notify(event.into_iter().collect());
        self.game_loop.start(now);
        Ok(())
    }

    /// Cancel the loop and flush recorders. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.game_loop.stop();
        self.pending.clear();
        self.keys.release_all();
        for recorder in &mut self.recorders {
            if let Err(e) = recorder.flush() {
                log::warn!("Recorder flush failed: {}", e);
            }
        }
    }

    /// Player pause
    pub fn pause(&mut self) {
        if self.state.status == GameStatus::Playing {
            self.state.toggle_pause();
        }
    }

    pub fn resume(&mut self) {
        if self.state.status == GameStatus::Paused {
            self.state.toggle_pause();
        }
    }

    /// Freeze the loop itself (page hidden). No callbacks fire until [`wake`](Self::wake).
    pub fn suspend(&mut self) {
        self.game_loop.pause();
        self.keys.release_all();
    }

    pub fn wake(&mut self, now: f64) {
        self.game_loop.resume(now);
    }

    /// Feed a discrete action. Pause applies immediately, the rest on the next step.
    pub fn dispatch(&mut self, action: InputAction) {
        if action == InputAction::Pause {
            self.state.toggle_pause();
            return;
        }
        if self.state.status == GameStatus::Playing {
            self.pending.push_back(action);
        }
    }

    pub fn set_key(&mut self, key: HeldKey, held: bool) {
        self.keys.set(key, held);
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    /// Run one host frame: drain whole steps, then render once.
    /// Returns whether the host should schedule another frame.
    pub fn frame<R>(&mut self, now: f64, mut render: R) -> bool
    where
        R: FnMut(&RenderSnapshot<'_>),
    {
        let Self {
            state,
            game_loop,
            pending,
            keys,
            autopilot,
            audio,
            recorders,
            ..
        } = self;

        let mut rendered = None;
        let reschedule = game_loop.frame(
            now,
            |dt| {
                let input = next_input(pending, keys, *autopilot);
                let events = tick(state, &input, dt);
                dispatch_events(audio.as_mut(), recorders, events);
            },
            |alpha| rendered = Some(alpha),
        );

        if let Some(alpha) = rendered {
            self.interpolation = alpha;
            render(&self.snapshot());
        }
        reschedule
    }

    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        let state = &self.state;
        RenderSnapshot {
            shapes: &state.shapes,
            catcher: &state.catcher,
            score: state.score,
            lives: state.lives,
            combo: state.combo.count(),
            combo_tier: state.combo.current_tier(),
            combo_timer_percent: state.combo.timer_percent(),
            level: state.level(),
            endless: state.levels.is_endless_mode(),
            status: state.status,
            interpolation: self.interpolation,
            time_remaining: state.time_remaining,
            level_progress: state.levels.level_progress(state.level_stats.catches),
            score_multiplier: state.powerups.score_multiplier(),
            theme: &state.levels.current_config().theme,
        }
    }

    /// Skip the rest of a level transition
    pub fn proceed_to_next_level(&mut self) {
        let event = self.state.advance_level();
        self.notify(event.into_iter().collect());
    }

    /// Fresh session with the same config
    pub fn restart(&mut self, now: f64) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }
        self.pending.clear();
        let event = self.state.restart();
        self.notify(event.into_iter().collect());
        if !self.game_loop.is_running() {
            self.game_loop.start(now);
        }
        Ok(())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.game_loop.is_running()
    }

    /// Host frames that arrived too late to simulate in full
    pub fn dropped_steps(&self) -> u64 {
        self.game_loop.dropped_steps()
    }

    fn notify(&mut self, events: Vec<GameEvent>) {
        dispatch_events(self.audio.as_mut(), &mut self.recorders, events);
    }
}

/// Build the input for one step: held keys plus at most one queued action of each kind
fn next_input(pending: &mut VecDeque<InputAction>, keys: &KeyState, autopilot: bool) -> TickInput {
    let mut input = TickInput {
        move_left: keys.is_held(HeldKey::Left),
        move_right: keys.is_held(HeldKey::Right),
        autopilot,
        ..TickInput::default()
    };
    while let Some(&action) = pending.front() {
        let flag = match action {
            InputAction::MoveLeft => &mut input.step_left,
            InputAction::MoveRight => &mut input.step_right,
            InputAction::ChangeShape => &mut input.change_shape,
            InputAction::ChangeColor => &mut input.change_color,
            InputAction::Pause => &mut input.pause,
        };
        if *flag {
            break;
        }
        *flag = true;
        pending.pop_front();
    }
    input
}

/// Route outcomes to the collaborators. Their failures are logged, never raised.
fn dispatch_events(audio: &mut dyn AudioSink, recorders: &mut [Box<dyn OutcomeRecorder>], events: Vec<GameEvent>) {
    for event in events {
        match &event {
            GameEvent::Caught { kind, .. } => match kind.special_kind() {
                Some(special) => audio.on_special_caught(special),
                None => audio.on_success(),
            },
            GameEvent::Missed { .. } => audio.on_miss(),
            GameEvent::BombHit { .. } => audio.on_bomb_hit(),
            GameEvent::ComboTierReached(tier) => audio.on_combo_tier_reached(tier),
            GameEvent::LevelComplete { level, .. } => audio.on_level_complete(*level),
            GameEvent::GameOver { .. } => audio.on_game_over(),
            GameEvent::PowerUpActivated { .. }
            | GameEvent::PowerUpExpired
            | GameEvent::TimeExtended { .. }
            | GameEvent::LevelStarted { .. } => {}
        }

        for recorder in recorders.iter_mut() {
            if let Err(e) = recorder.record(&event) {
                log::warn!("Recorder failed on {:?}: {}", event, e);
            }
        }
    }
}
