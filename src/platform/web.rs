//! Browser bindings
//!
//! The host page owns the animation loop and passes `performance.now()` into
//! every call; the handle never reads the clock itself.

use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::session::{FrameOutcome, SessionMode, SessionState, update};
use crate::settings::Settings;
use crate::sim::{CourseState, level};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_settings(settings_json: Option<String>) -> Result<Settings, JsValue> {
    match settings_json {
        Some(json) => Settings::from_json(&json).map_err(to_js),
        None => Ok(Settings::default()),
    }
}

/// One playable course plus its session and audio output
#[wasm_bindgen]
pub struct CourseHandle {
    course: CourseState,
    session: SessionState,
    audio: AudioManager,
}

#[wasm_bindgen]
impl CourseHandle {
    /// Demo course, with optional settings JSON
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<CourseHandle, JsValue> {
        super::init_logging();
        let settings = parse_settings(settings_json)?;
        let course = level::demo_course(&settings).map_err(to_js)?;
        log::info!("Demo course loaded ({} bpm)", settings.bpm());
        Ok(Self::with_course(course, &settings))
    }

    /// Demo board with the full reference tune as its answer
    #[wasm_bindgen(js_name = withSong)]
    pub fn with_song(settings_json: Option<String>) -> Result<CourseHandle, JsValue> {
        super::init_logging();
        let settings = parse_settings(settings_json)?;
        let course = level::song_course(&settings).map_err(to_js)?;
        log::info!("Song course loaded ({} bpm)", settings.bpm());
        Ok(Self::with_course(course, &settings))
    }

    /// Release the pulse
    pub fn start(&mut self, now_ms: f64) {
        self.audio.resume();
        self.session.start_run(&mut self.course, now_ms);
    }

    /// Play the answer melody on the board
    pub fn preview(&mut self, now_ms: f64) {
        self.audio.resume();
        self.session.start_preview(&mut self.course, now_ms);
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Advance one animation frame; true when the run completed this frame
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let outcome = update(&mut self.session, &mut self.course, now_ms, &mut self.audio);
        if outcome == FrameOutcome::RunCompleted {
            log::info!(
                "Run complete, full score: {}",
                self.course.score().is_full_score()
            );
        }
        outcome == FrameOutcome::RunCompleted
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.session.mode != SessionMode::Editing
    }

    /// Course snapshot as JSON for the renderer
    pub fn snapshot(&self, now_ms: f64) -> Result<String, JsValue> {
        self.course
            .view(self.session.elapsed(now_ms))
            .to_json()
            .map_err(to_js)
    }
}

impl CourseHandle {
    fn with_course(course: CourseState, settings: &Settings) -> Self {
        Self {
            course,
            session: SessionState::new(),
            audio: AudioManager::new(settings),
        }
    }
}
