// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage sequencing.

use sw_core::{Stage, StagePlan};

use crate::error::StageError;

/// What the driver does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// Publish progress for the stage and run it.
    Enter(Stage),
    /// Every stage succeeded.
    Complete,
    /// The stage failed; nothing further runs.
    Fail { stage: Stage, error: StageError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    NotStarted,
    In(Stage),
    Done,
}

/// Strictly ordered walk over the stages of a [`StagePlan`].
///
/// The only way forward is [`advance`](Self::advance) with the current
/// stage's result, so stages cannot be reordered or skipped beyond what
/// the plan leaves out.
#[derive(Debug, Clone)]
pub struct StageMachine {
    plan: StagePlan,
    position: Position,
}

impl StageMachine {
    pub fn new(plan: StagePlan) -> Self {
        Self { plan, position: Position::NotStarted }
    }

    /// Stage currently being run, if any.
    pub fn current(&self) -> Option<Stage> {
        match self.position {
            Position::In(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.position == Position::Done
    }

    /// Feed the result of the current stage and get the next action.
    ///
    /// Before the first stage the result is ignored and `Init` is entered.
    /// Once done, the machine keeps answering `Complete`.
    pub fn advance(&mut self, result: Result<(), StageError>) -> NextAction {
        let current = match self.position {
            Position::NotStarted => {
                self.position = Position::In(Stage::Init);
                return NextAction::Enter(Stage::Init);
            }
            Position::Done => return NextAction::Complete,
            Position::In(stage) => stage,
        };

        if let Err(error) = result {
            self.position = Position::Done;
            return NextAction::Fail { stage: current, error };
        }

        match current.next(self.plan) {
            Some(next) if !next.is_terminal() => {
                self.position = Position::In(next);
                NextAction::Enter(next)
            }
            _ => {
                self.position = Position::Done;
                NextAction::Complete
            }
        }
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
