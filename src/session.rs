//! Explicit state for one interactive session: the current deal, the
//! player's selection, and the last good score and crib results.
//!
//! Every network-bound step is split into `begin_*`, which issues a
//! [`Ticket`], and `complete_*`, which applies the outcome only if that
//! ticket is still the latest one issued. Anything older is dropped, so a
//! slow response can never overwrite the display for a newer action.
//! Failures move the session to [`Phase::Error`] but keep the previous deal
//! and stats on screen.

use log::{debug, info, warn};

use crate::api::{CribRequest, CribResponse, ScoreRequest, ScoreResponse, KEEP_SIZE};
use crate::cards::{sort_by_rank, Card};
use crate::chart::{layout, ChartKind, Geometry, Viewport};
use crate::error::{CribError, CribResult};
use crate::reconcile::{reconcile, Reconciliation};

pub const STATUS_DEALING: &str = "Dealing six cards\u{2026}";
pub const STATUS_PICK: &str = "Pick any four cards, then score the hand.";
pub const STATUS_SELECT_FOUR: &str = "Please select exactly four cards before scoring.";
pub const STATUS_SCORING: &str = "Scoring hand\u{2026}";
pub const STATUS_CRIB: &str = "Computing crib stats\u{2026}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dealing,
    Ready,
    Scoring,
    Scored,
    ComputingCrib,
    Done,
    Error,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Dealing | Phase::Scoring | Phase::ComputingCrib)
    }
}

/// Which network call a ticket was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Deal,
    Score,
    Crib,
}

/// Sequence number of an issued request, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    seq: u64,
    kind: RequestKind,
}

impl Ticket {
    pub fn seq(self) -> u64 {
        self.seq
    }

    pub fn kind(self) -> RequestKind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feedback {
    Optimal,
    Suboptimal { best_avg_total: f64 },
}

impl Feedback {
    pub fn message(&self) -> String {
        match self {
            Feedback::Optimal => "Perfect! This is the optimal keep".to_string(),
            Feedback::Suboptimal { best_avg_total } => format!(
                "Optimal keep shown below (expected {:.1} points)",
                best_avg_total
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Feedback::Optimal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Highlight,
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub label: &'static str,
    pub value: String,
    pub description: &'static str,
    pub tone: Tone,
}

impl StatRow {
    fn new(label: &'static str, value: String, description: &'static str, tone: Tone) -> StatRow {
        StatRow {
            label,
            value,
            description,
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandStats {
    pub base_score: f64,
    pub avg_total: f64,
    pub avg_delta: f64,
    pub min_total: f64,
    pub max_total: f64,
    pub distribution: Vec<f64>,
    pub best_keep: Vec<Card>,
    pub is_optimal: bool,
    pub best_avg_total: f64,
}

impl HandStats {
    pub fn from_response(response: &ScoreResponse) -> CribResult<HandStats> {
        Ok(HandStats {
            base_score: response.base_score,
            avg_total: response.avg_total,
            avg_delta: response.avg_delta,
            min_total: response.min_total,
            max_total: response.max_total,
            distribution: response.distribution(),
            best_keep: response.best_keep_cards()?,
            is_optimal: response.is_optimal,
            best_avg_total: response.best_avg_total,
        })
    }

    pub fn feedback(&self) -> Feedback {
        if self.is_optimal {
            Feedback::Optimal
        } else {
            Feedback::Suboptimal {
                best_avg_total: self.best_avg_total,
            }
        }
    }

    pub fn rows(&self) -> Vec<StatRow> {
        vec![
            StatRow::new(
                "Hand Value",
                format!("{:.0}", self.base_score),
                "Your 4 cards without flipped card",
                Tone::Plain,
            ),
            StatRow::new(
                "Expected Score",
                format!("{:.1}", self.avg_total),
                "Average across all possible flipped cards",
                Tone::Highlight,
            ),
            StatRow::new(
                "Flipped Card Bonus",
                signed(self.avg_delta),
                "Average points added by flipped card",
                Tone::Positive,
            ),
            StatRow::new(
                "Best Case",
                format!("{:.0}", self.max_total),
                "Highest possible score",
                Tone::Positive,
            ),
            StatRow::new(
                "Worst Case",
                format!("{:.0}", self.min_total),
                "Lowest possible score",
                Tone::Negative,
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CribStats {
    pub avg_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub distribution: Vec<f64>,
}

impl CribStats {
    pub fn from_response(response: &CribResponse) -> CribStats {
        CribStats {
            avg_score: response.crib_stats.avg_score,
            min_score: response.crib_stats.min_score,
            max_score: response.crib_stats.max_score,
            distribution: response.distribution(),
        }
    }

    pub fn rows(&self) -> Vec<StatRow> {
        vec![
            StatRow::new(
                "Expected Crib",
                format!("{:.1}", self.avg_score),
                "Average score from your discards",
                Tone::Highlight,
            ),
            StatRow::new(
                "Minimum",
                format!("{:.0}", self.min_score),
                "Lowest possible crib score",
                Tone::Negative,
            ),
            StatRow::new(
                "Maximum",
                format!("{:.0}", self.max_score),
                "Highest possible crib score",
                Tone::Positive,
            ),
        ]
    }
}

fn signed(v: f64) -> String {
    if v >= 0.0 {
        format!("+{:.1}", v)
    } else {
        format!("{:.1}", v)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    deal: Vec<Card>,
    selected: Vec<Card>,
    submitted: Vec<Card>,
    scored_hand: Option<Vec<Card>>,
    hand_stats: Option<HandStats>,
    crib_stats: Option<CribStats>,
    status: String,
    my_crib: bool,
    issued: u64,
    pending: Option<Ticket>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(true)
    }
}

impl Session {
    pub fn new(my_crib: bool) -> Session {
        Session {
            phase: Phase::Idle,
            deal: Vec::new(),
            selected: Vec::new(),
            submitted: Vec::new(),
            scored_hand: None,
            hand_stats: None,
            crib_stats: None,
            status: String::new(),
            my_crib,
            issued: 0,
            pending: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deal(&self) -> &[Card] {
        &self.deal
    }

    pub fn selected(&self) -> &[Card] {
        &self.selected
    }

    pub fn scored_hand(&self) -> Option<&[Card]> {
        self.scored_hand.as_deref()
    }

    pub fn hand_stats(&self) -> Option<&HandStats> {
        self.hand_stats.as_ref()
    }

    pub fn crib_stats(&self) -> Option<&CribStats> {
        self.crib_stats.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn my_crib(&self) -> bool {
        self.my_crib
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    // -- Selection --

    /// Toggles a dealt card in or out of the selection. Returns whether the
    /// selection changed; adding a fifth card is ignored.
    pub fn toggle(&mut self, card: Card) -> CribResult<bool> {
        if !self.deal.contains(&card) {
            return Err(CribError::CardNotDealt(card.code()));
        }
        if let Some(pos) = self.selected.iter().position(|c| *c == card) {
            self.selected.remove(pos);
            return Ok(true);
        }
        if self.selected.len() >= KEEP_SIZE {
            return Ok(false);
        }
        self.selected.push(card);
        Ok(true)
    }

    /// Toggles the dealt card at a 1-based position.
    pub fn toggle_position(&mut self, position: usize) -> CribResult<bool> {
        let card = position
            .checked_sub(1)
            .and_then(|i| self.deal.get(i))
            .copied()
            .ok_or_else(|| {
                CribError::InvalidValue(format!(
                    "no card at position {} (1-{})",
                    position,
                    self.deal.len()
                ))
            })?;
        self.toggle(card)
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // -- Deal --

    pub fn begin_deal(&mut self) -> Ticket {
        self.issue(RequestKind::Deal, Phase::Dealing, STATUS_DEALING)
    }

    pub fn complete_deal(&mut self, ticket: Ticket, result: CribResult<Vec<Card>>) -> Delivery {
        if !self.settle(ticket, RequestKind::Deal) {
            return Delivery::Stale;
        }
        match result {
            Ok(mut cards) => {
                sort_by_rank(&mut cards);
                self.deal = cards;
                self.selected.clear();
                self.submitted.clear();
                self.scored_hand = None;
                self.hand_stats = None;
                self.crib_stats = None;
                self.enter(Phase::Ready, STATUS_PICK);
            }
            Err(e) => self.fail(format!("Could not deal cards: {}", e)),
        }
        Delivery::Applied
    }

    // -- Score --

    /// Validates the selection and issues a score request. A selection that
    /// is not exactly four cards is rejected without issuing a ticket.
    pub fn begin_score(&mut self, is_crib: bool) -> CribResult<(Ticket, ScoreRequest)> {
        if self.selected.len() != KEEP_SIZE {
            self.status = STATUS_SELECT_FOUR.to_string();
            return Err(CribError::InvalidHandSize {
                what: "hand",
                expected: KEEP_SIZE,
                got: self.selected.len(),
            });
        }
        let request = ScoreRequest::new(&self.selected, &self.deal, is_crib, self.my_crib)?;
        self.submitted = self.selected.clone();
        let ticket = self.issue(RequestKind::Score, Phase::Scoring, STATUS_SCORING);
        Ok((ticket, request))
    }

    pub fn complete_score(
        &mut self,
        ticket: Ticket,
        result: CribResult<ScoreResponse>,
    ) -> Delivery {
        if !self.settle(ticket, RequestKind::Score) {
            return Delivery::Stale;
        }
        match result.and_then(|r| HandStats::from_response(&r)) {
            Ok(stats) => {
                self.hand_stats = Some(stats);
                self.crib_stats = None;
                self.scored_hand = Some(self.submitted.clone());
                self.enter(Phase::Scored, "");
            }
            Err(e) => self.fail(format!("Error while scoring hand: {}", e)),
        }
        Delivery::Applied
    }

    // -- Crib --

    pub fn begin_crib(&mut self) -> CribResult<(Ticket, CribRequest)> {
        let hand = self.scored_hand.as_deref().ok_or_else(|| {
            CribError::InvalidValue("score a hand before computing crib stats".to_string())
        })?;
        let request = CribRequest::new(hand, &self.deal)?;
        let ticket = self.issue(RequestKind::Crib, Phase::ComputingCrib, STATUS_CRIB);
        Ok((ticket, request))
    }

    pub fn complete_crib(&mut self, ticket: Ticket, result: CribResult<CribResponse>) -> Delivery {
        if !self.settle(ticket, RequestKind::Crib) {
            return Delivery::Stale;
        }
        match result {
            Ok(response) => {
                self.crib_stats = Some(CribStats::from_response(&response));
                self.enter(Phase::Done, "");
            }
            Err(e) => self.fail(format!("Could not compute crib stats: {}", e)),
        }
        Delivery::Applied
    }

    // -- Derived views, recomputed on every call --

    pub fn feedback(&self) -> Option<Feedback> {
        self.hand_stats.as_ref().map(HandStats::feedback)
    }

    pub fn reconciliation(&self) -> Option<Reconciliation> {
        let stats = self.hand_stats.as_ref()?;
        let hand = self.scored_hand.as_ref()?;
        Some(reconcile(hand, &stats.best_keep))
    }

    pub fn hand_chart(&self, kind: ChartKind, viewport: &Viewport) -> Option<Geometry> {
        let stats = self.hand_stats.as_ref()?;
        layout(&stats.distribution, Some(stats.avg_total), kind, viewport)
    }

    pub fn crib_chart(&self, kind: ChartKind, viewport: &Viewport) -> Option<Geometry> {
        let stats = self.crib_stats.as_ref()?;
        layout(&stats.distribution, Some(stats.avg_score), kind, viewport)
    }

    // -- Internals --

    fn issue(&mut self, kind: RequestKind, phase: Phase, status: &str) -> Ticket {
        self.issued += 1;
        let ticket = Ticket {
            seq: self.issued,
            kind,
        };
        self.pending = Some(ticket);
        self.enter(phase, status);
        ticket
    }

    /// Accepts a completion only for the latest outstanding ticket, and only
    /// when it was issued for the same kind of request.
    fn settle(&mut self, ticket: Ticket, kind: RequestKind) -> bool {
        if ticket.kind != kind || self.pending != Some(ticket) {
            info!(
                "discarding stale {:?} response #{} ({:?} ticket, latest #{})",
                kind, ticket.seq, ticket.kind, self.issued
            );
            return false;
        }
        self.pending = None;
        true
    }

    fn enter(&mut self, phase: Phase, status: &str) {
        debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.status = status.to_string();
    }

    fn fail(&mut self, message: String) {
        warn!("{}", message);
        self.phase = Phase::Error;
        self.status = message;
    }
}
