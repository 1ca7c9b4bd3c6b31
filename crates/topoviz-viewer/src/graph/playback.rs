use serde_json::Value;
use std::time::Duration;
use topoviz_core::Step;

pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Started { steps: usize },
    NoSteps,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub step: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
struct IntervalTimer {
    interval: Duration,
    until_next: Duration,
}

/// Replays a list of snapshots on a fixed interval.
///
/// Time only moves through [`PlaybackController::advance`]; each due tick
/// either hands the next step to the caller or, past the last step, stops the
/// timer.
pub struct PlaybackController {
    interval: Duration,
    timer: Option<IntervalTimer>,
    steps: Vec<Step>,
    cursor: usize,
    log: Vec<LogEntry>,
    runs: u64,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_INTERVAL)
    }
}

impl PlaybackController {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            timer: None,
            steps: Vec::new(),
            cursor: 0,
            log: Vec::new(),
            runs: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect from the next `play`.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.timer.is_some() {
            PlaybackPhase::Running
        } else {
            PlaybackPhase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Number of `play` calls that started a timer.
    #[cfg(test)]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn play(&mut self, steps: Option<Vec<Step>>) -> PlayOutcome {
        self.stop();
        self.clear_log();

        let steps = steps.unwrap_or_default();
        if steps.is_empty() {
            tracing::info!("no steps to play");
            return PlayOutcome::NoSteps;
        }

        let count = steps.len();
        self.steps = steps;
        self.cursor = 0;
        self.runs += 1;
        self.timer = Some(IntervalTimer {
            interval: self.interval,
            until_next: self.interval,
        });
        tracing::info!(
            steps = count,
            interval_ms = self.interval.as_millis() as u64,
            "playback started"
        );
        PlayOutcome::Started { steps: count }
    }

    /// Cancels the active run. Safe to call when idle.
    pub fn stop(&mut self) {
        if self.timer.take().is_some() {
            tracing::debug!(cursor = self.cursor, total = self.steps.len(), "playback stopped");
        }
        self.steps.clear();
        self.cursor = 0;
    }

    /// Moves the clock by `dt` and runs every tick that falls due, in order.
    /// Returns the number of steps handed to `on_step`.
    pub fn advance(&mut self, dt: Duration, mut on_step: impl FnMut(&Step)) -> usize {
        let mut fired = 0;
        let mut remaining = dt;
        while let Some(timer) = self.timer.as_mut() {
            if remaining < timer.until_next {
                timer.until_next -= remaining;
                break;
            }
            remaining -= timer.until_next;
            timer.until_next = timer.interval;

            if self.cursor >= self.steps.len() {
                tracing::info!(steps = self.steps.len(), "playback finished");
                self.stop();
                break;
            }

            let step = &self.steps[self.cursor];
            on_step(step);
            let entry = LogEntry {
                step: self.cursor + 1,
                text: format!(
                    "Step {}: {}",
                    self.cursor + 1,
                    describe_update(step.update.as_ref())
                ),
            };
            tracing::info!(step = entry.step, "{}", entry.text);
            self.log.push(entry);
            self.cursor += 1;
            fired += 1;
        }
        fired
    }
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Compact JSON of the update payload, or of `"Update"` when there is none.
pub fn describe_update(update: Option<&Value>) -> String {
    let fallback = Value::String("Update".to_string());
    let v = match update {
        Some(v) if !is_falsy(v) => v,
        _ => &fallback,
    };
    serde_json::to_string(v).unwrap_or_else(|_| "\"Update\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T: Duration = Duration::from_millis(1200);

    fn step(update: Value) -> Step {
        Step {
            update: Some(update),
            ..Default::default()
        }
    }

    fn texts(p: &PlaybackController) -> Vec<String> {
        p.log().iter().map(|e| e.text.clone()).collect()
    }

    #[test]
    fn plays_every_step_in_order_then_stops() {
        let mut p = PlaybackController::new(T);
        let outcome = p.play(Some(vec![step(json!("s1")), step(json!("s2")), step(json!("s3"))]));
        assert_eq!(outcome, PlayOutcome::Started { steps: 3 });

        let mut rendered = Vec::new();
        for _ in 0..3 {
            p.advance(T, |s| rendered.push(s.update.clone()));
        }
        assert_eq!(texts(&p), vec![r#"Step 1: "s1""#, r#"Step 2: "s2""#, r#"Step 3: "s3""#]);
        assert_eq!(rendered.len(), 3);
        // the tick after the last step ends the run
        assert!(p.is_running());
        p.advance(T, |_| {});
        assert_eq!(p.phase(), PlaybackPhase::Idle);

        p.advance(T * 10, |_| panic!("tick after completion"));
        assert_eq!(p.log().len(), 3);
    }

    #[test]
    fn one_large_advance_fires_due_ticks_in_order() {
        let mut p = PlaybackController::new(T);
        p.play(Some(vec![step(json!(1)), step(json!(2)), step(json!(3))]));

        let mut seen = Vec::new();
        let fired = p.advance(T * 10, |s| seen.push(s.update.clone()));
        assert_eq!(fired, 3);
        assert_eq!(seen, vec![Some(json!(1)), Some(json!(2)), Some(json!(3))]);
        assert!(!p.is_running());
    }

    #[test]
    fn nothing_fires_before_the_first_interval() {
        let mut p = PlaybackController::new(T);
        p.play(Some(vec![step(json!("a"))]));
        assert_eq!(p.advance(T - Duration::from_millis(1), |_| {}), 0);
        assert_eq!(p.advance(Duration::from_millis(1), |_| {}), 1);
    }

    #[test]
    fn new_play_supersedes_the_running_one() {
        let mut p = PlaybackController::new(T);
        p.play(Some(vec![step(json!("a1")), step(json!("a2"))]));
        p.play(Some(vec![step(json!("b1")), step(json!("b2"))]));

        p.advance(T * 10, |_| {});
        assert_eq!(texts(&p), vec![r#"Step 1: "b1""#, r#"Step 2: "b2""#]);
        assert_eq!(p.runs(), 2);
    }

    #[test]
    fn superseding_mid_run_clears_log() {
        let mut p = PlaybackController::new(T);
        p.play(Some(vec![step(json!("a1")), step(json!("a2"))]));
        p.advance(T, |_| {});
        assert_eq!(p.log().len(), 1);

        p.play(Some(vec![step(json!("b1"))]));
        assert!(p.log().is_empty());
        p.advance(T * 5, |_| {});
        assert_eq!(texts(&p), vec![r#"Step 1: "b1""#]);
    }

    #[test]
    fn empty_or_missing_steps_do_not_start() {
        let mut p = PlaybackController::new(T);
        assert_eq!(p.play(Some(vec![])), PlayOutcome::NoSteps);
        assert!(!p.is_running());
        assert_eq!(p.play(None), PlayOutcome::NoSteps);
        assert!(!p.is_running());
        p.advance(T * 5, |_| panic!("no timer expected"));
        assert!(p.log().is_empty());
        assert_eq!(p.runs(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut p = PlaybackController::new(T);
        p.stop();
        p.play(Some(vec![step(json!("a"))]));
        p.stop();
        p.stop();
        assert_eq!(p.phase(), PlaybackPhase::Idle);
        assert_eq!(p.advance(T * 3, |_| {}), 0);
    }

    #[test]
    fn missing_or_falsy_update_uses_placeholder() {
        assert_eq!(describe_update(None), r#""Update""#);
        assert_eq!(describe_update(Some(&json!(null))), r#""Update""#);
        assert_eq!(describe_update(Some(&json!(""))), r#""Update""#);
        assert_eq!(describe_update(Some(&json!(0))), r#""Update""#);
        assert_eq!(
            describe_update(Some(&json!({ "dist": 3, "node": "A" }))),
            r#"{"dist":3,"node":"A"}"#
        );
    }
}
