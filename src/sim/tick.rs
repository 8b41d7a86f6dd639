//! Per-frame pulse advance
//!
//! The host calls `advance` once per animation frame with the session time.
//! The engine consumes every half-beat tick up to that time, one at a
//! time, so the outcome depends only on the ticks reached and never on how
//! the frames were spaced.

use super::pulse::{PulsePhase, Step};
use super::state::{CourseState, Cue};
use super::wave::NoteWave;

/// Advance the run to session time `elapsed_ms`
///
/// Returns true exactly once, on the frame the run completes.
pub fn advance(state: &mut CourseState, elapsed_ms: f64) -> bool {
    match state.pulse.phase {
        PulsePhase::Finished => return false,
        PulsePhase::Idle => {
            state.pulse.phase = PulsePhase::Running;
            log::info!("Run started at {:.0}ms", elapsed_ms);
        }
        PulsePhase::Running => {
            // Time went backwards: nothing to do
            if elapsed_ms < state.pulse.last_timestep {
                return false;
            }
        }
    }
    state.pulse.last_timestep = elapsed_ms;

    let ms_per_tile = state.ms_per_tile;
    let course_ms = state.course_time(elapsed_ms);

    while state.tracker.tick(course_ms) {
        let tick = state.tracker.current_tick();
        let step = state.pulse.step(&state.grid, tick);
        if step == Step::Holding {
            break;
        }
        if state.click_track && state.tracker.is_click_frame() {
            state.outbox.push(Cue::ClickBeat);
        }
        judge_tick(state, tick, step);
    }

    state.pulse.update_draw_position(&state.grid, course_ms, ms_per_tile);
    state.note_waves.prune(elapsed_ms);

    if !state.completion_reported && state.pulse.run_over(course_ms, ms_per_tile) {
        state.completion_reported = true;
        state.pulse.phase = PulsePhase::Finished;
        state.outbox.push(Cue::RunCompleted);
        log::info!(
            "Run complete at beat {:.1}: {}/{} bells{}",
            state.pulse.beat_count,
            state.score.entries().iter().filter(|e| **e == Some(true)).count(),
            state.score.size(),
            if state.score.is_full_score() { " (full score)" } else { "" }
        );
        return true;
    }
    false
}

/// Compare what the pulse did on `tick` with the answer slot for it
///
/// At most one move happens per tick (the cheapest tile costs exactly one
/// tick), so each tick yields at most one score entry.
fn judge_tick(state: &mut CourseState, tick: i64, step: Step) {
    let expected = state.expected_bell(tick);
    match step {
        Step::Moved {
            position,
            bell: Some(bell),
            ..
        } => {
            let correct = expected == Some(bell);
            if correct {
                log::debug!("Tick {}: bell {} on time at {}", tick, bell, position);
            } else {
                log::warn!(
                    "Tick {}: bell {} struck, expected {:?}",
                    tick,
                    bell,
                    expected
                );
            }
            state.outbox.push(Cue::BellRung { bell });
            let wave = NoteWave::new(position, correct, state.course_tick_start_ms(tick));
            state.note_waves.push(wave);
            state.outbox.push(Cue::NoteWave(wave));
            state.score.mark_score(correct);
            if !correct {
                state.outbox.push(Cue::Boing);
            }
        }
        Step::Lost => {
            log::warn!(
                "Tick {}: pulse left the board from {}",
                tick,
                state.pulse.logical_position
            );
            state.score.mark_score(false);
            state.outbox.push(Cue::Boing);
        }
        Step::Moved { bell: None, .. } | Step::Waiting => {
            if let Some(bell) = expected {
                log::warn!("Tick {}: missed bell {}", tick, bell);
                state.score.mark_score(false);
                state.outbox.push(Cue::Boing);
            }
        }
        Step::Holding => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::direction::{Direction, Mirror};
    use crate::sim::grid::Grid;
    use crate::sim::level;
    use glam::{IVec2, Vec2};
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// Generator on the left border, terminal bell `len` tiles to the right
    fn corridor(len: i32, boosts: &[i32]) -> Grid {
        let mut grid = Grid::new(3, len as usize + 2);
        grid.set_generator(IVec2::new(0, 1), Direction::Right);
        for &col in boosts {
            grid.set_boost(IVec2::new(col, 1), true);
        }
        grid.set_bell(IVec2::new(len, 1), Some(0));
        grid.set_terminal(IVec2::new(len, 1));
        grid
    }

    fn answer_at(tick: usize, bell: u8) -> Vec<Option<u8>> {
        let mut answer = vec![None; tick + 1];
        answer[tick] = Some(bell);
        answer
    }

    #[test]
    fn test_four_tile_corridor_timing() {
        let mut course =
            CourseState::new(corridor(4, &[]), answer_at(6, 0), &Settings::default())
                .expect("valid course");

        let mut moves = Vec::new();
        let mut completions = Vec::new();
        let mut last = course.logical_position();
        let mut t = 0.0;
        while t <= 3600.0 {
            if advance(&mut course, t) {
                completions.push(t);
            }
            if course.logical_position() != last {
                moves.push(t);
                last = course.logical_position();
            }
            t += 100.0;
        }

        assert_eq!(moves, vec![600.0, 1200.0, 1800.0, 2400.0]);
        assert_eq!(completions, vec![3000.0]);
        assert_eq!(course.logical_position(), IVec2::new(4, 1));
        assert_eq!(course.phase(), PulsePhase::Finished);
        assert!(course.score().is_full_score());
    }

    #[test]
    fn test_boost_halves_tile_cost() {
        // Path [normal, boost, normal] then the terminal
        let settings = Settings::default();
        let mut plain = CourseState::new(corridor(4, &[]), answer_at(6, 0), &settings)
            .expect("valid course");
        let mut boosted = CourseState::new(corridor(4, &[2]), answer_at(5, 0), &settings)
            .expect("valid course");

        advance(&mut plain, 10_000.0);
        advance(&mut boosted, 10_000.0);

        // Arrival beat on the terminal = beats spent crossing the three tiles
        assert_eq!(plain.pulse().beat_count, 3.0);
        assert_eq!(boosted.pulse().beat_count, 2.5);
        assert!(boosted.score().is_full_score());
    }

    #[test]
    fn test_completion_reported_once() {
        let mut course =
            CourseState::new(corridor(2, &[]), answer_at(2, 0), &Settings::default())
                .expect("valid course");
        assert!(advance(&mut course, 5000.0));
        assert!(!advance(&mut course, 5000.0));
        assert!(!advance(&mut course, 9000.0));
        let completions = course
            .drain_cues()
            .into_iter()
            .filter(|c| *c == Cue::RunCompleted)
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_time_regression_is_noop() {
        let mut course =
            CourseState::new(corridor(4, &[]), answer_at(6, 0), &Settings::default())
                .expect("valid course");
        advance(&mut course, 1300.0);
        let pos = course.logical_position();
        let draw = course.draw_position();
        assert!(!advance(&mut course, 200.0));
        assert_eq!(course.logical_position(), pos);
        assert_eq!(course.draw_position(), draw);
        assert_eq!(course.pulse().last_timestep, 1300.0);
    }

    #[test]
    fn test_demo_course_full_score_cues() {
        let mut course = level::demo_course(&Settings::default()).expect("demo course");
        let mut t = 0.0;
        while !advance(&mut course, t) {
            t += 16.0;
        }
        assert!(course.score().is_full_score());
        assert_eq!(course.logical_position(), IVec2::new(1, 4));

        let bells: Vec<_> = course
            .drain_cues()
            .into_iter()
            .filter_map(|c| match c {
                Cue::BellRung { bell } => Some(bell),
                _ => None,
            })
            .collect();
        assert_eq!(bells, vec![1, 2, 3]);
    }

    #[test]
    fn test_missed_bell_freezes_score() {
        let mut grid = level::demo_grid();
        // Without the first mirror the pulse runs straight off the board
        grid.set_mirror(IVec2::new(2, 1), None);
        let mut course =
            CourseState::new(grid, level::DEMO_ANSWER.to_vec(), &Settings::default())
                .expect("valid course");

        let mut t = 0.0;
        while !advance(&mut course, t) {
            t += 50.0;
            assert!(t < 20_000.0, "run never completed");
        }
        assert_eq!(course.score().entries(), &[Some(true), Some(false), None]);
        assert!(course.drain_cues().contains(&Cue::Boing));
    }

    #[test]
    fn test_wrong_bell_scores_false_with_wave() {
        let mut grid = corridor(3, &[]);
        grid.set_bell(IVec2::new(1, 1), Some(2));
        // Answer wants bell 1 where bell 2 sits
        grid.set_bell(IVec2::new(2, 1), Some(1));
        let mut course = CourseState::new(grid, vec![Some(1), None, Some(1), None, Some(0)], &Settings::default())
            .expect("valid course");

        advance(&mut course, 600.0);
        let cues = course.drain_cues();
        assert!(cues.contains(&Cue::BellRung { bell: 2 }));
        assert!(cues.contains(&Cue::Boing));
        assert!(cues.contains(&Cue::NoteWave(NoteWave::new(IVec2::new(1, 1), false, 600.0))));
        assert_eq!(course.score().entries(), &[Some(false), None, None]);
    }

    #[test]
    fn test_wrong_bell_after_full_bar_keeps_score() {
        let mut grid = corridor(2, &[]);
        grid.set_bell(IVec2::new(1, 1), Some(1));
        let mut course = CourseState::new(grid, vec![Some(1)], &Settings::default())
            .expect("valid course");

        // Bell 1 fills the bar, then the terminal rings bell 0 unasked
        advance(&mut course, 5000.0);
        let cues = course.drain_cues();
        assert!(cues.contains(&Cue::BellRung { bell: 0 }));
        assert!(cues.contains(&Cue::Boing));
        assert!(cues.contains(&Cue::NoteWave(NoteWave::new(IVec2::new(2, 1), false, 1200.0))));
        assert_eq!(course.score().entries(), &[Some(true)]);
        assert!(course.score().is_full_score());

        course.reset();
        assert!(course.score().is_full_score());
    }

    #[test]
    fn test_clicks_on_even_course_ticks() {
        let mut course =
            CourseState::new(corridor(4, &[]), answer_at(6, 0), &Settings::default())
                .expect("valid course");
        // Course ticks 0..=3
        advance(&mut course, 1500.0);
        let clicks = course
            .drain_cues()
            .into_iter()
            .filter(|c| *c == Cue::ClickBeat)
            .count();
        assert_eq!(clicks, 2);
    }

    #[test]
    fn test_draw_position_interpolates_between_moves() {
        let mut course =
            CourseState::new(corridor(4, &[]), answer_at(6, 0), &Settings::default())
                .expect("valid course");
        advance(&mut course, 0.0);
        assert_eq!(course.draw_position(), Vec2::new(0.0, 1.0));
        advance(&mut course, 900.0);
        assert_eq!(course.logical_position(), IVec2::new(1, 1));
        assert_eq!(course.draw_position(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_reset_restarts_run() {
        let mut course =
            CourseState::new(corridor(2, &[]), answer_at(1, 0), &Settings::default())
                .expect("valid course");
        // The bell arrives on tick 2 but the answer wants it on tick 1
        advance(&mut course, 5000.0);
        assert_eq!(course.score().entries(), &[Some(false)]);

        course.reset();
        assert_eq!(course.phase(), PulsePhase::Idle);
        assert_eq!(course.logical_position(), IVec2::new(0, 1));
        assert_eq!(course.score().bar_index(), 0);
        assert!(course.note_waves().is_empty());
        assert!(course.drain_cues().is_empty());

        advance(&mut course, 600.0);
        assert_eq!(course.logical_position(), IVec2::new(1, 1));
    }

    #[test]
    fn test_reset_keeps_full_score() {
        let mut course =
            CourseState::new(corridor(2, &[]), answer_at(2, 0), &Settings::default())
                .expect("valid course");
        advance(&mut course, 5000.0);
        assert!(course.score().is_full_score());
        course.reset();
        assert!(course.score().is_full_score());
    }

    #[test]
    fn test_note_waves_pruned_after_lifetime() {
        let mut course = level::demo_course(&Settings::default()).expect("demo course");
        // First bell lands on course tick 0 (session 600ms)
        advance(&mut course, 700.0);
        assert_eq!(course.note_waves().len(), 1);
        advance(&mut course, 999.0);
        assert_eq!(course.note_waves().len(), 1);
        advance(&mut course, 1000.0);
        assert!(course.note_waves().is_empty());
    }

    #[test]
    fn test_mirror_corridor_turns() {
        let mut grid = Grid::new(5, 5);
        grid.set_generator(IVec2::new(0, 1), Direction::Right);
        grid.set_mirror(IVec2::new(2, 1), Some(Mirror::UpLeft));
        grid.set_bell(IVec2::new(2, 3), Some(3));
        grid.set_terminal(IVec2::new(2, 3));
        let mut course = CourseState::new(grid, answer_at(6, 3), &Settings::default())
            .expect("valid course");
        advance(&mut course, 10_000.0);
        assert_eq!(course.direction(), Direction::Down);
        assert_eq!(course.logical_position(), IVec2::new(2, 3));
        assert!(course.score().is_full_score());
    }

    #[test]
    fn test_jittered_frames_match_single_jump() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut jittered = level::demo_course(&settings).expect("demo course");
        let mut t = 0.0;
        while t < 4000.0 {
            advance(&mut jittered, t);
            t += rng.random_range(4.0..48.0);
        }
        advance(&mut jittered, 4000.0);

        let mut single = level::demo_course(&settings).expect("demo course");
        advance(&mut single, 4000.0);

        assert_eq!(jittered.logical_position(), single.logical_position());
        assert_eq!(jittered.pulse().beat_count, single.pulse().beat_count);
        assert_eq!(jittered.score(), single.score());
    }

    /// Boards covering each judging branch
    fn judged_course(kind: usize) -> CourseState {
        let settings = Settings::default();
        let course = match kind {
            // Perfect run
            0 => level::demo_course(&settings),
            // Wrong bell on the first tile
            1 => {
                let mut grid = corridor(3, &[]);
                grid.set_bell(IVec2::new(1, 1), Some(2));
                grid.set_bell(IVec2::new(2, 1), Some(1));
                CourseState::new(grid, vec![Some(1), None, Some(1), None, Some(0)], &settings)
            }
            // Bell expected a tick before the pulse arrives
            2 => CourseState::new(corridor(2, &[]), answer_at(1, 0), &settings),
            // Pulse leaves the board
            _ => {
                let mut grid = level::demo_grid();
                grid.set_mirror(IVec2::new(2, 1), None);
                CourseState::new(grid, level::DEMO_ANSWER.to_vec(), &settings)
            }
        };
        course.expect("valid course")
    }

    proptest! {
        #[test]
        fn prop_advance_is_order_invariant(
            kind in 0usize..4,
            gaps in prop::collection::vec(1.0f64..400.0, 1..40),
        ) {
            let mut stepped = judged_course(kind);
            let mut t = 0.0;
            for gap in &gaps {
                t += gap;
                advance(&mut stepped, t);
            }
            let mut single = judged_course(kind);
            advance(&mut single, t);

            prop_assert_eq!(stepped.logical_position(), single.logical_position());
            prop_assert_eq!(stepped.pulse().beat_count, single.pulse().beat_count);
            prop_assert_eq!(stepped.pulse().beat_count_end, single.pulse().beat_count_end);
            prop_assert_eq!(stepped.draw_position(), single.draw_position());
            prop_assert_eq!(stepped.score(), single.score());
            prop_assert_eq!(stepped.drain_cues(), single.drain_cues());
        }
    }
}
