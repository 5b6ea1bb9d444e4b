use std::time::{Duration, Instant};

use eartle::runtime::{EventSource, GameEvent, Input, Runner};
use eartle::session::{GameResult, GameSession, SessionEvent, MAX_ATTEMPTS};

fn key(input: Input) -> GameEvent {
    GameEvent::Input(input)
}

/// Minimal loop in the shape of the binary's: one event per step, focus
/// flushed after the event is handled.
fn drive(session: &mut GameSession, runner: &Runner) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    for _ in 0..200u32 {
        let now = Instant::now();
        let events = match runner.step() {
            GameEvent::Tick => {
                session.poll_tick(now);
                vec![]
            }
            GameEvent::Resize => vec![],
            GameEvent::Input(Input::Quit) => break,
            GameEvent::Input(input) => session.handle_input(input, now),
        };
        session.flush_focus();
        seen.extend(events);
    }
    seen
}

fn finished(events: &[SessionEvent]) -> Option<GameResult> {
    events.iter().find_map(|e| match e {
        SessionEvent::Finished(result) => Some(result.clone()),
        _ => None,
    })
}

fn runner_with(keys: &[GameEvent]) -> Runner {
    let (tx, source) = EventSource::channel();
    for k in keys {
        tx.send(k.clone()).unwrap();
    }
    tx.send(key(Input::Quit)).unwrap();
    Runner::new(source, Duration::from_millis(5))
}

fn letters(word: &str) -> Vec<GameEvent> {
    Input::typed(word)
}

#[test]
fn headless_win_on_second_row() {
    let mut session = GameSession::new("crane");
    let mut keys = letters("crate");
    keys.extend(letters("crane"));
    let runner = runner_with(&keys);

    let events = drive(&mut session, &runner);

    let result = finished(&events).expect("game should finish");
    assert!(result.has_won);
    assert_eq!(result.total_guesses, 2);
    assert_eq!(result.target_word, "CRANE");
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::TimerStarted(_)))
            .count(),
        1
    );
}

#[test]
fn headless_six_misses_lose() {
    let mut session = GameSession::new("CRANE");
    let keys: Vec<GameEvent> = (0..MAX_ATTEMPTS).flat_map(|_| letters("sloth")).collect();
    let runner = runner_with(&keys);

    let events = drive(&mut session, &runner);

    let result = finished(&events).expect("game should finish");
    assert!(!result.has_won);
    assert_eq!(result.total_guesses, MAX_ATTEMPTS);
    assert!(session.is_finished());
}

#[test]
fn headless_correction_then_win() {
    let mut session = GameSession::new("PLANT");
    let mut keys = letters("PLX");
    keys.push(key(Input::Backspace));
    keys.extend(letters("ANT"));
    let runner = runner_with(&keys);

    let events = drive(&mut session, &runner);

    let result = finished(&events).expect("game should finish");
    assert!(result.has_won);
    assert_eq!(result.total_guesses, 1);
}

#[test]
fn headless_symbols_are_ignored() {
    let mut session = GameSession::new("PLANT");
    let mut keys = letters("P1L-A");
    keys.push(key(Input::Char(' ')));
    keys.extend(letters("NT"));
    let runner = runner_with(&keys);

    let events = drive(&mut session, &runner);

    assert!(finished(&events).is_some_and(|r| r.has_won));
}

#[test]
fn headless_keys_after_finish_change_nothing() {
    let mut session = GameSession::new("CRANE");
    let mut keys = letters("CRANE");
    keys.extend(letters("SLOTH"));
    keys.push(key(Input::Enter));
    let runner = runner_with(&keys);

    let events = drive(&mut session, &runner);

    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Finished(_)))
            .count(),
        1
    );
    assert_eq!(session.total_guesses(), 1);
    assert!(session.rows()[1].values().iter().all(Option::is_none));
}
