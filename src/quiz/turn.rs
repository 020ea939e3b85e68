//! Turn sequencing: who is announced, when the countdown runs, and when
//! the answer window is open. Classroom sessions alternate a teacher with
//! a round-robin roster of students; solo sessions collapse to a plain
//! ask → answer loop. All delays are driven by the session's timer queue;
//! this module only holds phases and transitions.

use crate::config::{SessionMode, COUNTDOWN_STEPS};

/// Whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Teacher,
    Student(usize),
}

/// Teacher plus a rotating list of student identities. After the last
/// student the turn wraps back to the teacher.
#[derive(Debug, Clone)]
pub struct Roster {
    pub teacher: String,
    pub students: Vec<String>,
    current: Role,
}

impl Roster {
    pub fn new(teacher: impl Into<String>, students: Vec<String>) -> Self {
        Self {
            teacher: teacher.into(),
            students,
            current: Role::Teacher,
        }
    }

    pub fn current(&self) -> Role {
        self.current
    }

    pub fn current_name(&self) -> &str {
        match self.current {
            Role::Teacher => &self.teacher,
            Role::Student(i) => &self.students[i],
        }
    }

    /// Advance teacher → student 0 → … → last student → teacher.
    pub fn advance(&mut self) {
        self.current = match self.current {
            Role::Teacher if self.students.is_empty() => Role::Teacher,
            Role::Teacher => Role::Student(0),
            Role::Student(i) => {
                let next = i + 1;
                if next >= self.students.len() {
                    Role::Teacher
                } else {
                    Role::Student(next)
                }
            }
        };
    }

    pub fn reset(&mut self) {
        self.current = Role::Teacher;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// "X's turn" banner is showing.
    Announce,
    /// Question is being chosen / displayed.
    AskQuestion,
    /// Visible countdown before the answer window opens.
    Countdown { remaining: u8 },
    /// Pointer/speech input is accepted and resolved.
    AnswerWindow,
    /// Session won; input frozen until restart.
    Celebrate,
}

pub struct TurnMachine {
    pub phase: TurnPhase,
    pub roster: Roster,
    solo: bool,
}

impl TurnMachine {
    pub fn new(mode: SessionMode, teacher: impl Into<String>, students: Vec<String>) -> Self {
        let solo = mode == SessionMode::Solo;
        let mut machine = Self {
            phase: TurnPhase::AskQuestion,
            roster: Roster::new(teacher, students),
            solo,
        };
        machine.begin_turn();
        machine
    }

    pub fn solo(&self) -> bool {
        self.solo
    }

    /// Interaction is accepted only while the answer window is open; the
    /// session disables input capture outside it.
    pub fn input_open(&self) -> bool {
        self.phase == TurnPhase::AnswerWindow
    }

    /// Enter the first phase of a turn. Solo sessions skip announcements.
    pub fn begin_turn(&mut self) {
        self.phase = if self.solo {
            TurnPhase::AskQuestion
        } else {
            TurnPhase::Announce
        };
    }

    pub fn announce_done(&mut self) {
        if self.phase == TurnPhase::Announce {
            self.phase = TurnPhase::AskQuestion;
        }
    }

    /// The question has been shown; solo play opens the window directly,
    /// classroom play runs the visible countdown first.
    pub fn question_shown(&mut self) {
        if self.phase != TurnPhase::AskQuestion {
            return;
        }
        self.phase = if self.solo {
            TurnPhase::AnswerWindow
        } else {
            TurnPhase::Countdown {
                remaining: COUNTDOWN_STEPS,
            }
        };
    }

    /// One countdown decrement. Returns the value to display, or `None`
    /// once the window has opened (expiry auto-opens regardless of input).
    pub fn countdown_step(&mut self) -> Option<u8> {
        match self.phase {
            TurnPhase::Countdown { remaining } if remaining > 1 => {
                let next = remaining - 1;
                self.phase = TurnPhase::Countdown { remaining: next };
                Some(next)
            }
            TurnPhase::Countdown { .. } => {
                self.phase = TurnPhase::AnswerWindow;
                None
            }
            _ => None,
        }
    }

    /// A correct answer closes the window and hands the turn on.
    pub fn resolve(&mut self) {
        if self.phase == TurnPhase::AnswerWindow {
            if !self.solo {
                self.roster.advance();
            }
            self.begin_turn();
        }
    }

    pub fn celebrate(&mut self) {
        self.phase = TurnPhase::Celebrate;
    }

    pub fn reset(&mut self) {
        self.roster.reset();
        self.begin_turn();
    }
}
