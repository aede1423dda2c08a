//! Decision points a driver (terminal, network, test harness) must answer.
use crate::character::Character;
use crate::combat::ActionChoice;
use crate::enemy::Enemy;
use crate::event::GameEvent;
use crate::items::Inventory;
use crate::stats::Job;
use std::collections::VecDeque;
use thiserror::Error;

/// The driver went away (EOF, disconnect) before answering.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("front end closed before answering")]
pub struct FrontendClosed;

/// Everything a driver may show when asking for one character's action.
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    pub character: &'a Character,
    pub enemy: &'a Enemy,
    pub escape_chance: f64,
    pub inventory: &'a Inventory,
    pub party: &'a [Character],
}

/// Synchronous driver interface. Each request returns exactly one decision.
pub trait Frontend {
    /// Ordered `(name, job)` roster for a new party of `size` members.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` if the driver can no longer answer.
    fn request_party_creation(&mut self, size: usize) -> Result<Vec<(String, Job)>, FrontendClosed>;

    /// Next action for the character in `view`. Rejected choices are
    /// reported through `notify` and asked again.
    ///
    /// # Errors
    ///
    /// Returns `FrontendClosed` if the driver can no longer answer.
    fn request_character_action(
        &mut self,
        view: &BattleView<'_>,
    ) -> Result<ActionChoice, FrontendClosed>;

    /// Best-effort narrative sink. Must not block.
    fn notify(&mut self, event: &GameEvent);
}

impl<F: Frontend + ?Sized> Frontend for &mut F {
    fn request_party_creation(&mut self, size: usize) -> Result<Vec<(String, Job)>, FrontendClosed> {
        (**self).request_party_creation(size)
    }

    fn request_character_action(
        &mut self,
        view: &BattleView<'_>,
    ) -> Result<ActionChoice, FrontendClosed> {
        (**self).request_character_action(view)
    }

    fn notify(&mut self, event: &GameEvent) {
        (**self).notify(event);
    }
}

/// Driver that replays queued answers and records everything it is told.
///
/// Once the queued actions run out it repeats the fallback action, or reports
/// `FrontendClosed` when none is set.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrontend {
    rosters: VecDeque<Vec<(String, Job)>>,
    actions: VecDeque<ActionChoice>,
    fallback: Option<ActionChoice>,
    events: Vec<GameEvent>,
    prompts: Vec<(String, f64)>,
}

impl ScriptedFrontend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn roster(mut self, roster: Vec<(String, Job)>) -> Self {
        self.rosters.push_back(roster);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = ActionChoice>) -> Self {
        self.actions.extend(actions);
        self
    }

    #[must_use]
    pub fn always(mut self, action: ActionChoice) -> Self {
        self.fallback = Some(action);
        self
    }

    /// Events received so far, in order.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// `(character name, escape chance)` for every action request, in order.
    #[must_use]
    pub fn prompts(&self) -> &[(String, f64)] {
        &self.prompts
    }
}

impl Frontend for ScriptedFrontend {
    fn request_party_creation(&mut self, _size: usize) -> Result<Vec<(String, Job)>, FrontendClosed> {
        self.rosters.pop_front().ok_or(FrontendClosed)
    }

    fn request_character_action(
        &mut self,
        view: &BattleView<'_>,
    ) -> Result<ActionChoice, FrontendClosed> {
        self.prompts
            .push((view.character.name.clone(), view.escape_chance));
        self.actions
            .pop_front()
            .or(self.fallback)
            .ok_or(FrontendClosed)
    }

    fn notify(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}
