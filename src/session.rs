//! The session: owns the world, the score, the turn machine, and the
//! timer queue, and drives them on a fixed timestep. Adapters are plugged
//! in at construction and never block a tick.

use glam::Vec2;
use instant::Instant;

use crate::adapters::{
    EventSink, NetAdapter, RenderAdapter, ScoreUpdate, SoundKey, SpeechAdapter, SpeechResult,
};
use crate::config::{
    Difficulty, SessionSettings, ANNOUNCE_TICKS, ASK_DELAY_TICKS, CELEBRATION_TICKS,
    CLICK_COOLDOWN_TICKS, COUNTDOWN_STEP_TICKS,
};
use crate::ecs::components::{
    Agent, Facing, Growth, Position, ScenePhase, Species, Sway, Velocity, Visual,
};
use crate::ecs::systems::{self, flocking::FlockBuffers};
use crate::error::{Result, SessionError};
use crate::quiz::questions::{self, Question};
use crate::quiz::turn::{TurnMachine, TurnPhase};
use crate::score::ScoreBoard;
use crate::spatial::{AgentSnapshot, SpatialHash};
use crate::spawn;
use crate::timer::{TimerAction, TimerQueue};

/// Fixed simulation timestep.
const TICK_RATE: f32 = 1.0 / 60.0;
/// Cap on accumulated frame time, so a long stall never triggers a
/// catch-up spiral.
const MAX_ACCUMULATOR: f32 = 0.25;

/// Pointer hits count within this distance of an agent's center, scaled
/// by growth for plants.
const HIT_HALF_EXTENT: f32 = 24.0;

pub struct Session {
    world: hecs::World,
    score: ScoreBoard,
    turn: TurnMachine,
    timers: TimerQueue,
    fired: Vec<TimerAction>,

    grid: SpatialHash,
    snapshots: Vec<AgentSnapshot>,
    flock_bufs: FlockBuffers,

    rng: fastrand::Rng,
    difficulty: Difficulty,
    settings: SessionSettings,

    render: Box<dyn RenderAdapter>,
    events: Box<dyn EventSink>,
    speech: Option<Box<dyn SpeechAdapter>>,
    net: Option<Box<dyn NetAdapter>>,

    tick_count: u64,
    elapsed: f32,
    accumulator: f32,
    last_frame: Instant,

    can_click: bool,
    current_question: Option<Question>,
    previous_question: Option<Question>,
    awaiting_question: bool,
    scene: hecs::Entity,
    game_over_message: Option<String>,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        difficulty: Difficulty,
        settings: SessionSettings,
        teacher: impl Into<String>,
        students: Vec<String>,
        mut render: Box<dyn RenderAdapter>,
        events: Box<dyn EventSink>,
        speech: Option<Box<dyn SpeechAdapter>>,
        net: Option<Box<dyn NetAdapter>>,
        rng: fastrand::Rng,
    ) -> Result<Session> {
        difficulty.validate()?;
        if settings.speech_enabled && speech.is_none() {
            return Err(SessionError::Adapter(
                "speech is enabled but no speech adapter was supplied".into(),
            ));
        }
        if settings.networked && net.is_none() {
            return Err(SessionError::Adapter(
                "networked mode without a net adapter".into(),
            ));
        }

        let mut world = hecs::World::new();
        let mut rng = rng;
        let scene = spawn::populate(&mut world, &mut rng, &difficulty, render.as_mut());

        let turn = TurnMachine::new(settings.mode, teacher, students);
        let agent_estimate = world.len() as usize;

        let mut session = Session {
            world,
            score: ScoreBoard::new(),
            turn,
            timers: TimerQueue::new(),
            fired: Vec::new(),
            grid: SpatialHash::new(64.0, 1024),
            snapshots: Vec::with_capacity(agent_estimate),
            flock_bufs: FlockBuffers::new(agent_estimate),
            rng,
            difficulty,
            settings,
            render,
            events,
            speech,
            net,
            tick_count: 0,
            elapsed: 0.0,
            accumulator: 0.0,
            last_frame: Instant::now(),
            can_click: true,
            current_question: None,
            previous_question: None,
            awaiting_question: false,
            scene,
            game_over_message: None,
        };

        session.set_scene_phase(ScenePhase::Gameplay);
        session.kick_turn();
        log::info!(
            "session started: {:?} mode, {} agents",
            session.settings.mode,
            session.world.len()
        );
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    /// Advance by wall-clock time since the previous call, running zero or
    /// more fixed-rate ticks.
    pub fn update(&mut self) {
        let now = Instant::now();
        let frame = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.accumulator = (self.accumulator + frame).min(MAX_ACCUMULATOR);
        while self.accumulator >= TICK_RATE {
            self.accumulator -= TICK_RATE;
            self.step();
        }
    }

    /// One fixed simulation tick. Public so headless drivers can step
    /// without wall-clock pacing.
    pub fn step(&mut self) {
        self.tick_count += 1;
        self.elapsed += TICK_RATE;

        systems::tick(
            &mut self.world,
            TICK_RATE,
            self.elapsed,
            &mut self.grid,
            &mut self.snapshots,
            &mut self.flock_bufs,
        );

        let mut fired = std::mem::take(&mut self.fired);
        self.timers.drain_due(self.tick_count, &mut fired);
        for action in fired.drain(..) {
            self.dispatch(action);
        }
        self.fired = fired;

        self.poll_speech();
        self.poll_net();

        if self.score.has_won(&self.difficulty) && self.turn.phase != TurnPhase::Celebrate {
            self.win();
        }

        self.sync_render();
    }

    fn dispatch(&mut self, action: TimerAction) {
        match action {
            TimerAction::EnableCollision(entity) => {
                if let Ok(mut vel) = self.world.get::<&mut Velocity>(entity) {
                    vel.disabled = false;
                }
            }
            TimerAction::ClickCooldownOver => self.can_click = true,
            TimerAction::AnnounceDone => {
                self.turn.announce_done();
                self.choose_question();
            }
            TimerAction::AskDelayDone => {
                self.turn.question_shown();
                match self.turn.phase {
                    TurnPhase::Countdown { .. } => {
                        // The first displayed count is audible too, so a
                        // five-step countdown is five ticks.
                        self.events.play_sound(SoundKey::CountdownTick);
                        self.timers.schedule(
                            self.tick_count + COUNTDOWN_STEP_TICKS,
                            TimerAction::CountdownStep,
                        );
                    }
                    TurnPhase::AnswerWindow => self.open_window(),
                    _ => {}
                }
            }
            TimerAction::CountdownStep => match self.turn.countdown_step() {
                Some(remaining) => {
                    log::debug!("countdown: {remaining}");
                    self.events.play_sound(SoundKey::CountdownTick);
                    self.timers.schedule(
                        self.tick_count + COUNTDOWN_STEP_TICKS,
                        TimerAction::CountdownStep,
                    );
                }
                None => self.open_window(),
            },
            TimerAction::CelebrationOver => self.restart(),
        }
    }

    // -----------------------------------------------------------------------
    // Turn flow
    // -----------------------------------------------------------------------

    /// Schedule whatever the current turn phase needs next.
    fn kick_turn(&mut self) {
        match self.turn.phase {
            TurnPhase::Announce => {
                log::info!("{}'s turn", self.turn.roster.current_name());
                self.timers.schedule(
                    self.tick_count + ANNOUNCE_TICKS,
                    TimerAction::AnnounceDone,
                );
            }
            TurnPhase::AskQuestion => self.choose_question(),
            _ => {}
        }
    }

    fn choose_question(&mut self) {
        if self.settings.networked {
            if let Some(net) = self.net.as_mut() {
                net.request_question();
                self.awaiting_question = true;
            }
            return;
        }
        let picked =
            questions::generate_valid_question(&self.world, &mut self.rng, self.previous_question.as_ref());
        match picked {
            Some(q) => self.show_question(q),
            None => log::warn!("no question available; session idles"),
        }
    }

    fn show_question(&mut self, question: Question) {
        log::info!("question {}: {}", question.id, question.prompt);
        self.previous_question = Some(question.clone());
        self.current_question = Some(question);
        self.timers
            .schedule(self.tick_count + ASK_DELAY_TICKS, TimerAction::AskDelayDone);
    }

    fn open_window(&mut self) {
        self.events.play_sound(SoundKey::Woosh);
        if self.settings.speech_enabled {
            if let (Some(speech), Some(q)) = (self.speech.as_mut(), self.current_question.as_ref())
            {
                speech.start_listening(q.speech_answer);
            }
        }
    }

    fn poll_speech(&mut self) {
        if !self.settings.speech_enabled || !self.turn.input_open() {
            return;
        }
        let Some(result) = self.speech.as_mut().and_then(|s| s.poll()) else {
            return;
        };
        match result {
            SpeechResult::Transcript(text) => {
                let Some(expected) = self
                    .current_question
                    .as_ref()
                    .map(|q| q.speech_answer)
                else {
                    return;
                };
                crate::ecs::systems::interaction::handle_speech(
                    &mut self.world,
                    &mut self.score,
                    &self.settings,
                    &text,
                    expected,
                    &mut self.rng,
                    self.events.as_mut(),
                );
                self.push_scores();
            }
            SpeechResult::Unavailable => {
                log::warn!("speech recognition unavailable; window continues without it");
            }
        }
    }

    fn poll_net(&mut self) {
        let Some(net) = self.net.as_mut() else {
            return;
        };

        if let Some(message) = net.poll_game_over() {
            log::info!("relay ended the game: {message}");
            self.game_over_message = Some(message);
            if self.turn.phase != TurnPhase::Celebrate {
                self.turn.celebrate();
                self.can_click = false;
                if !self.settings.networked {
                    self.timers.schedule(
                        self.tick_count + CELEBRATION_TICKS,
                        TimerAction::CelebrationOver,
                    );
                }
            }
            return;
        }

        if self.awaiting_question {
            if let Some(question) = net.poll_validated_question() {
                self.awaiting_question = false;
                if questions::is_feasible(&self.world, &question) {
                    self.show_question(question);
                } else {
                    // The relay does not know our scene; fall back to a
                    // locally feasible pick.
                    log::warn!("relay question {} infeasible here", question.id);
                    self.choose_question_locally();
                }
            }
        }
    }

    fn choose_question_locally(&mut self) {
        let picked =
            questions::generate_valid_question(&self.world, &mut self.rng, self.previous_question.as_ref());
        match picked {
            Some(q) => self.show_question(q),
            None => log::warn!("no question available; session idles"),
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Resolve a pointer press. Returns whether the answer was correct;
    /// presses outside the answer window or during the click debounce are
    /// ignored entirely.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if !self.turn.input_open() || !self.can_click {
            return false;
        }
        let Some(expected) = self.current_question.as_ref().map(|q| q.answer) else {
            return false;
        };

        self.can_click = false;
        self.timers.schedule(
            self.tick_count + CLICK_COOLDOWN_TICKS,
            TimerAction::ClickCooldownOver,
        );

        let hit = self.hit_test(Vec2::new(x, y));
        let correct = crate::ecs::systems::interaction::handle_click(
            &mut self.world,
            &mut self.score,
            &self.settings,
            hit,
            expected,
            &mut self.rng,
            self.events.as_mut(),
            &mut self.timers,
            self.tick_count,
        );
        self.push_scores();

        if correct {
            if let Some(speech) = self.speech.as_mut() {
                speech.stop();
            }
            self.current_question = None;
            if self.score.has_won(&self.difficulty) {
                self.win();
            } else {
                self.turn.resolve();
                self.kick_turn();
            }
        }
        correct
    }

    /// Closest agent whose hit box contains the point. Plants scale their
    /// hit box with growth.
    fn hit_test(&self, point: Vec2) -> Option<hecs::Entity> {
        let mut best: Option<(hecs::Entity, f32)> = None;
        for (entity, (pos, agent, growth)) in self
            .world
            .query::<(&Position, &Agent, Option<&Growth>)>()
            .iter()
        {
            let extent = match growth {
                Some(g) if agent.species.is_plant() => HIT_HALF_EXTENT * g.scale,
                _ => HIT_HALF_EXTENT,
            };
            let dist = (pos.0 - point).length();
            if dist <= extent && best.map_or(true, |(_, d)| dist < d) {
                best = Some((entity, dist));
            }
        }
        best.map(|(e, _)| e)
    }

    // -----------------------------------------------------------------------
    // Win / restart
    // -----------------------------------------------------------------------

    fn win(&mut self) {
        let winner = self.turn.roster.current_name().to_string();
        let message = format!("{winner} wins!");
        log::info!("{message}");

        self.turn.celebrate();
        self.can_click = false;
        self.events.play_sound(SoundKey::Fanfare);
        self.events.show_achievement(&message);
        if let Some(net) = self.net.as_mut() {
            net.send_game_end(&message);
        }
        self.game_over_message = Some(message);
        // Networked games are terminal: the relay keeps its ended state,
        // so only local sessions loop back around.
        if !self.settings.networked {
            self.timers.schedule(
                self.tick_count + CELEBRATION_TICKS,
                TimerAction::CelebrationOver,
            );
        }
    }

    /// Tear the scene down and start over with the same difficulty and
    /// roster. Pending timers are invalidated wholesale.
    fn restart(&mut self) {
        log::info!("restarting session");
        spawn::clear(&mut self.world, self.render.as_mut());
        self.timers.bump_generation();
        self.score.reset();
        self.turn.reset();
        self.current_question = None;
        self.previous_question = None;
        self.awaiting_question = false;
        self.game_over_message = None;
        self.can_click = true;

        self.scene = spawn::populate(
            &mut self.world,
            &mut self.rng,
            &self.difficulty,
            self.render.as_mut(),
        );
        self.set_scene_phase(ScenePhase::Gameplay);
        self.kick_turn();
    }

    fn push_scores(&mut self) {
        if let Some(net) = self.net.as_mut() {
            net.send_score_update(&ScoreUpdate {
                player: self.turn.roster.current_name().to_string(),
                interaction_score: self.score.interaction_points,
                speech_score: self.score.speech_points,
            });
        }
    }

    // -----------------------------------------------------------------------
    // Render sync
    // -----------------------------------------------------------------------

    /// Push authoritative state to the visual layer once per tick.
    fn sync_render(&mut self) {
        for (_, (pos, visual, facing, growth, sway)) in self
            .world
            .query::<(
                &Position,
                &Visual,
                Option<&Facing>,
                Option<&Growth>,
                Option<&Sway>,
            )>()
            .iter()
        {
            self.render.set_position(visual.0, pos.0.x, pos.0.y);
            if let Some(facing) = facing {
                self.render.set_flip(visual.0, facing.flipped);
            }
            if let Some(growth) = growth {
                self.render.set_scale(visual.0, growth.scale);
            }
            if let Some(sway) = sway {
                self.render.set_rotation(visual.0, sway.angle);
            }
        }
    }

    fn set_scene_phase(&mut self, phase: ScenePhase) {
        if let Ok(mut current) = self.world.get::<&mut ScenePhase>(self.scene) {
            *current = phase;
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn turn(&self) -> &TurnMachine {
        &self.turn
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn scene_phase(&self) -> ScenePhase {
        self.world
            .get::<&ScenePhase>(self.scene)
            .map(|p| *p)
            .unwrap_or(ScenePhase::Intro)
    }

    pub fn game_over_message(&self) -> Option<&str> {
        self.game_over_message.as_deref()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current position of any agent of the given species, if one exists.
    /// Lets a headless driver aim its pointer.
    pub fn agent_position(&self, species: Species) -> Option<Vec2> {
        self.world
            .query::<(&Position, &Agent)>()
            .iter()
            .find(|(_, (_, a))| a.species == species)
            .map(|(_, (p, _))| p.0)
    }
}
