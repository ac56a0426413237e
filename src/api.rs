//! Wire contract with the scoring service and the trait the shell talks to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cards::{parse_codes, to_codes, Card};
use crate::chart::coerce_values;
use crate::error::{CribError, CribResult};

pub const KEEP_SIZE: usize = 4;
pub const DEAL_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealResponse {
    #[serde(default)]
    pub cards: Vec<String>,
}

impl DealResponse {
    pub fn into_cards(self) -> CribResult<Vec<Card>> {
        let cards = parse_codes(&self.cards)
            .map_err(|e| CribError::MalformedResponse(format!("deal: {}", e)))?;
        if cards.len() != DEAL_SIZE {
            return Err(CribError::MalformedResponse(format!(
                "deal returned {} cards, expected {}",
                cards.len(),
                DEAL_SIZE
            )));
        }
        Ok(cards)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub hand: Vec<String>,
    pub six_cards: Vec<String>,
    pub is_crib: bool,
    pub my_crib: bool,
}

impl ScoreRequest {
    pub fn new(hand: &[Card], six_cards: &[Card], is_crib: bool, my_crib: bool) -> CribResult<Self> {
        check_sizes(hand, six_cards)?;
        Ok(ScoreRequest {
            hand: to_codes(hand),
            six_cards: to_codes(six_cards),
            is_crib,
            my_crib,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub base_score: f64,
    pub avg_total: f64,
    pub avg_delta: f64,
    pub min_total: f64,
    pub max_total: f64,
    pub hand_distribution: Vec<Value>,
    pub best_keep: Vec<String>,
    pub is_optimal: bool,
    pub best_avg_total: f64,
    #[serde(default)]
    pub discard: Vec<String>,
}

impl ScoreResponse {
    pub fn distribution(&self) -> Vec<f64> {
        coerce_values(&self.hand_distribution)
    }

    pub fn best_keep_cards(&self) -> CribResult<Vec<Card>> {
        parse_codes(&self.best_keep)
            .map_err(|e| CribError::MalformedResponse(format!("best_keep: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CribRequest {
    pub hand: Vec<String>,
    pub six_cards: Vec<String>,
}

impl CribRequest {
    pub fn new(hand: &[Card], six_cards: &[Card]) -> CribResult<Self> {
        check_sizes(hand, six_cards)?;
        Ok(CribRequest {
            hand: to_codes(hand),
            six_cards: to_codes(six_cards),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CribStatsBody {
    pub avg_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub distribution: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CribResponse {
    pub crib_stats: CribStatsBody,
}

impl CribResponse {
    pub fn distribution(&self) -> Vec<f64> {
        coerce_values(&self.crib_stats.distribution)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Body the service sends alongside a non-2xx status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

pub trait ScoringService {
    fn deal(&self) -> CribResult<Vec<Card>>;
    fn score(&self, request: &ScoreRequest) -> CribResult<ScoreResponse>;
    fn score_crib(&self, request: &CribRequest) -> CribResult<CribResponse>;
    fn health(&self) -> CribResult<HealthResponse>;
}

fn check_sizes(hand: &[Card], six_cards: &[Card]) -> CribResult<()> {
    if hand.len() != KEEP_SIZE {
        return Err(CribError::InvalidHandSize {
            what: "hand",
            expected: KEEP_SIZE,
            got: hand.len(),
        });
    }
    if six_cards.len() != DEAL_SIZE {
        return Err(CribError::InvalidHandSize {
            what: "six_cards",
            expected: DEAL_SIZE,
            got: six_cards.len(),
        });
    }
    Ok(())
}
