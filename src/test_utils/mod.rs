//! Test utilities
//! Session builders, key typing and a hand-driven clock

use crate::dispatcher::Outcome;
use crate::key::parse_keys;
use crate::mode::Mode;
use crate::session::{Engine, Session};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Clock advanced only by the test
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: Instant,
}

impl FixedClock {
    pub fn new() -> Self {
        FixedClock {
            now: Instant::now(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self, ms: u64) -> Instant {
        self.now += Duration::from_millis(ms);
        self.now
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A session plus its clock
pub struct Harness {
    pub session: Session,
    pub clock: FixedClock,
}

impl Harness {
    /// Session over `text` with a fresh engine
    pub fn new(text: &str) -> Self {
        Self::with_engine(Arc::new(Engine::new()), text)
    }

    pub fn with_engine(engine: Arc<Engine>, text: &str) -> Self {
        Harness {
            session: Session::with_text(engine, text),
            clock: FixedClock::new(),
        }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        self.session.engine()
    }

    /// Type keys in notation without letting time pass
    pub fn keys(&mut self, notation: &str) -> Vec<Outcome> {
        let now = self.clock.now();
        parse_keys(notation)
            .into_iter()
            .map(|key| self.session.handle_at(key, now))
            .collect()
    }

    /// Type keys and fail the test on any error outcome
    pub fn feed(&mut self, notation: &str) -> &mut Self {
        for outcome in self.keys(notation) {
            if let Outcome::Error(message) = outcome {
                panic!("typing {notation:?} failed: {message}");
            }
        }
        self
    }

    /// Last outcome of typing `notation`
    pub fn last(&mut self, notation: &str) -> Outcome {
        self.keys(notation).pop().unwrap_or(Outcome::Consumed)
    }

    /// Let `ms` pass and run due work
    pub fn wait(&mut self, ms: u64) -> Outcome {
        let now = self.clock.advance(ms);
        self.session.tick(now)
    }

    pub fn ex(&mut self, line: &str) {
        if let Err(err) = self.session.execute_ex(line) {
            panic!(":{line} failed: {err}");
        }
    }

    pub fn text(&self) -> String {
        self.session.text()
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn caret(&self) -> usize {
        self.session.caret()
    }

    /// Text of the newest message
    pub fn last_message(&self) -> Option<String> {
        self.session.messages().last().map(|m| m.text.clone())
    }
}
