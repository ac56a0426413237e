//! How cribbage hands are scored, as shown by `rules` in the shell and CLI.

use crate::cards::{parse_codes, Card};

pub const RULES_TITLE: &str = "How Cribbage Hands Are Scored";

pub const RULES_INTRO: &str = "In cribbage, you score points by finding combinations in your \
4-card hand plus the starter card (5 cards total).";

pub struct RuleExample {
    pub cards: &'static [&'static str],
    pub caption: &'static str,
}

pub struct RuleSection {
    pub title: &'static str,
    pub lines: &'static [&'static str],
    pub examples: &'static [RuleExample],
}

pub const RULE_SECTIONS: &[RuleSection] = &[
    RuleSection {
        title: "1. Pairs",
        lines: &["Two cards of the same rank = 2 points"],
        examples: &[RuleExample {
            cards: &["5H", "5D"],
            caption: "Two 5s = 2 points",
        }],
    },
    RuleSection {
        title: "2. Three of a Kind",
        lines: &["Three cards of the same rank = 6 points"],
        examples: &[RuleExample {
            cards: &["7C", "7D", "7S"],
            caption: "Three 7s = 6 points",
        }],
    },
    RuleSection {
        title: "3. Four of a Kind",
        lines: &["Four cards of the same rank = 12 points"],
        examples: &[RuleExample {
            cards: &["JC", "JD", "JH", "JS"],
            caption: "Four Jacks = 12 points",
        }],
    },
    RuleSection {
        title: "4. Runs",
        lines: &["Three or more consecutive ranks = 1 point per card"],
        examples: &[
            RuleExample {
                cards: &["5C", "6D", "7H"],
                caption: "5-6-7 = 3 points",
            },
            RuleExample {
                cards: &["4C", "5D", "6H", "7S"],
                caption: "4-5-6-7 = 4 points",
            },
            RuleExample {
                cards: &["3C", "4D", "5H", "6S", "7C"],
                caption: "3-4-5-6-7 = 5 points",
            },
        ],
    },
    RuleSection {
        title: "5. Flushes",
        lines: &[
            "Four cards of the same suit (in hand) = 4 points",
            "Five cards of the same suit (hand + starter) = 5 points",
        ],
        examples: &[RuleExample {
            cards: &["2H", "5H", "8H", "KH"],
            caption: "Four hearts in hand = 4 points",
        }],
    },
    RuleSection {
        title: "6. His Nobs",
        lines: &["Jack of the same suit as the starter card = 1 point"],
        examples: &[RuleExample {
            cards: &["JH", "AH", "5H", "9H"],
            caption: "Hand has Jack of hearts, starter is Queen of hearts = 1 point",
        }],
    },
    RuleSection {
        title: "7. 15s",
        lines: &["Any combination of cards that add up to 15 = 2 points"],
        examples: &[RuleExample {
            cards: &["5C", "KD", "7H", "8S"],
            caption: "5 + King = 15 (2 points), or 7 + 8 = 15 (2 points). Multiple 15s can be scored!",
        }],
    },
];

pub const RULES_NOTES: &[&str] = &[
    "Cards can be used in multiple combinations (e.g., a pair can also be part of a run)",
    "Face cards (J, Q, K) are worth 10 points for 15s",
    "Aces are worth 1 point for 15s",
    "All combinations are counted, so a hand can score many points!",
];

impl RuleExample {
    /// The example's cards. The codes are fixed, so a bad one is dropped
    /// rather than reported.
    pub fn cards(&self) -> Vec<Card> {
        parse_codes(self.cards).unwrap_or_default()
    }
}
