use std::cell::{Cell, RefCell};
use std::io::Cursor;

use serde_json::json;

use cribbdle::api::*;
use cribbdle::cards::{parse_cards, Card};
use cribbdle::chart::ChartKind;
use cribbdle::error::{CribError, CribResult};
use cribbdle::play::{run_interactive_session, PlayOptions};
use cribbdle::session::STATUS_SELECT_FOUR;

/// Scripted stand-in for the scoring service.
struct FakeService {
    failing_deals: Cell<usize>,
    score_fails: bool,
    crib_fails: bool,
    optimal: bool,
    score_requests: RefCell<Vec<ScoreRequest>>,
    crib_requests: RefCell<Vec<CribRequest>>,
}

impl FakeService {
    fn new() -> FakeService {
        FakeService {
            failing_deals: Cell::new(0),
            score_fails: false,
            crib_fails: false,
            optimal: true,
            score_requests: RefCell::new(Vec::new()),
            crib_requests: RefCell::new(Vec::new()),
        }
    }
}

impl ScoringService for FakeService {
    fn deal(&self) -> CribResult<Vec<Card>> {
        if self.failing_deals.get() > 0 {
            self.failing_deals.set(self.failing_deals.get() - 1);
            return Err(CribError::Transport("connection refused".into()));
        }
        parse_cards("KS 5H 9C 5D QC 2H")
    }

    fn score(&self, request: &ScoreRequest) -> CribResult<ScoreResponse> {
        self.score_requests.borrow_mut().push(request.clone());
        if self.score_fails {
            return Err(CribError::Status {
                status: 400,
                message: "Request must include 'hand' as a list of 4 card codes.".into(),
            });
        }
        let body = json!({
            "base_score": 8,
            "min_total": 8,
            "max_total": 14,
            "avg_total": 9.4,
            "avg_delta": 1.4,
            "hand_distribution": [8, 8, 9, 10, 10, 10, 12, 14],
            "is_optimal": self.optimal,
            "best_keep": ["5H", "5D", "QC", "KS"],
            "best_avg_total": 10.63,
            "discard": ["2H", "9C"]
        });
        serde_json::from_value(body).map_err(|e| CribError::MalformedResponse(e.to_string()))
    }

    fn score_crib(&self, request: &CribRequest) -> CribResult<CribResponse> {
        self.crib_requests.borrow_mut().push(request.clone());
        if self.crib_fails {
            return Err(CribError::Transport("timed out".into()));
        }
        let body = json!({
            "crib_stats": {
                "avg_score": 4.2,
                "min_score": 0,
                "max_score": 16,
                "distribution": [0, 2, 2, 4, 4, 6, 8, 16]
            }
        });
        serde_json::from_value(body).map_err(|e| CribError::MalformedResponse(e.to_string()))
    }

    fn health(&self) -> CribResult<HealthResponse> {
        Ok(HealthResponse {
            status: "ok".into(),
            message: "Cribbdle API is running".into(),
        })
    }
}

fn play(service: &FakeService, options: PlayOptions, script: &str) -> String {
    colored::control::set_override(false);
    let mut reader = Cursor::new(script.as_bytes().to_vec());
    let mut out: Vec<u8> = Vec::new();
    run_interactive_session(service, options, &mut reader, &mut out);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_score_by_position_runs_hand_then_crib() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "3 4 5 6\ns\nq\n");

    let requests = service.score_requests.borrow();
    assert_eq!(requests.len(), 1);
    // deal is shown sorted: 2H 5H 5D 9C QC KS
    assert_eq!(requests[0].hand, vec!["5D", "9C", "QC", "KS"]);
    assert_eq!(requests[0].six_cards.len(), 6);
    assert!(!requests[0].is_crib);
    assert!(requests[0].my_crib);

    let cribs = service.crib_requests.borrow();
    assert_eq!(cribs.len(), 1);
    assert_eq!(cribs[0].hand, requests[0].hand);

    assert!(out.contains("Perfect! This is the optimal keep"));
    assert!(out.contains("Hand Analysis"));
    assert!(out.contains("EXPECTED SCORE"));
    assert!(out.contains("Crib Analysis"));
    assert!(out.contains("EXPECTED CRIB"));
    assert!(out.contains("Thanks for playing."));
}

#[test]
fn test_suboptimal_feedback() {
    let mut service = FakeService::new();
    service.optimal = false;
    let out = play(&service, PlayOptions::default(), "1 2 3 4\ns\nq\n");
    assert!(out.contains("Optimal keep shown below (expected 10.6 points)"));
    assert!(out.contains("Optimal keep:"));
}

#[test]
fn test_score_needs_four_cards() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "1 2\ns\nq\n");
    assert!(out.contains(STATUS_SELECT_FOUR));
    assert!(service.score_requests.borrow().is_empty());
    assert!(!out.contains("Hand Analysis"));
}

#[test]
fn test_select_by_card_code() {
    let service = FakeService::new();
    play(&service, PlayOptions::default(), "5h ks 2h 9c\ns\nq\n");
    let requests = service.score_requests.borrow();
    assert_eq!(requests[0].hand, vec!["5H", "KS", "2H", "9C"]);
}

#[test]
fn test_fifth_card_ignored() {
    let service = FakeService::new();
    play(&service, PlayOptions::default(), "1 2 3 4 5\ns\nq\n");
    let requests = service.score_requests.borrow();
    assert_eq!(requests[0].hand.len(), 4);
    assert!(!requests[0].hand.contains(&"QC".to_string()));
}

#[test]
fn test_bad_input_reported() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "9\nAX\nq\n");
    assert!(out.contains("no card at position 9"));
    assert!(out.contains("Invalid"));
}

#[test]
fn test_failed_deal_then_redeal() {
    let service = FakeService::new();
    service.failing_deals.set(1);
    let out = play(&service, PlayOptions::default(), "d\n1 2 3 4\ns\nq\n");
    assert!(out.contains("Could not deal cards"));
    assert!(out.contains("connection refused"));
    assert_eq!(service.score_requests.borrow().len(), 1);
}

#[test]
fn test_score_failure_skips_crib() {
    let mut service = FakeService::new();
    service.score_fails = true;
    let out = play(&service, PlayOptions::default(), "1 2 3 4\ns\nq\n");
    assert!(out.contains("Error while scoring hand"));
    assert!(service.crib_requests.borrow().is_empty());
    assert!(!out.contains("Hand Analysis"));
}

#[test]
fn test_crib_failure_keeps_hand_results() {
    let mut service = FakeService::new();
    service.crib_fails = true;
    let out = play(&service, PlayOptions::default(), "1 2 3 4\ns\nq\n");
    assert!(out.contains("Hand Analysis"));
    assert!(out.contains("Could not compute crib stats"));
    assert!(!out.contains("Crib Analysis"));
}

#[test]
fn test_opponent_crib_flag_is_sent() {
    let service = FakeService::new();
    let options = PlayOptions {
        my_crib: false,
        is_crib: true,
        chart: ChartKind::Histogram,
    };
    play(&service, options, "1 2 3 4\ns\nq\n");
    let requests = service.score_requests.borrow();
    assert!(!requests[0].my_crib);
    assert!(requests[0].is_crib);
}

#[test]
fn test_chart_cycle_before_scoring() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "c\nq\n");
    assert!(out.contains("Hand chart: Box Plot"));
    assert!(out.contains("Score a hand to see charts."));
}

#[test]
fn test_crib_chart_cycles_on_its_own() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "1 2 3 4\ns\ncc\nq\n");
    let (_, after) = out.split_once("Crib chart: Box Plot").unwrap();
    // only the crib section is redrawn, as a box plot
    assert!(after.contains("Crib Analysis"));
    assert!(after.contains("whiskers"));
    assert!(!after.contains("Hand Analysis"));
    assert!(!out.contains("Hand chart:"));
}

#[test]
fn test_hand_chart_toggle_leaves_crib_alone() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "1 2 3 4\ns\nc\nq\n");
    let (_, after) = out.split_once("Hand chart: Box Plot").unwrap();
    assert!(after.contains("Hand Analysis"));
    assert!(after.contains("whiskers"));
    assert!(!after.contains("Crib Analysis"));
}

#[test]
fn test_rules_guide_in_game() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "rules\nq\n");
    assert!(out.contains("How Cribbage Hands Are Scored"));
    assert!(out.contains("6. His Nobs"));
    assert!(out.contains("7. 15s"));
    assert!(out.contains("Face cards (J, Q, K) are worth 10 points for 15s"));
    assert!(out.contains("Aces are worth 1 point for 15s"));
    // example rows are drawn as cards
    assert!(out.contains("J\u{2665} A\u{2665} 5\u{2665} 9\u{2665}"));
    assert!(service.score_requests.borrow().is_empty());
}

#[test]
fn test_end_of_input_exits() {
    let service = FakeService::new();
    let out = play(&service, PlayOptions::default(), "h\n");
    assert!(out.contains("score the selected four"));
    assert!(out.contains("Thanks for playing."));
}
