//! The fixed roster of ten Malaysian bank equities, in ranking order.
//!
//! Rank drives the column order of the chart dataset and therefore the legend
//! order of the rendered page. The roster is compiled in, not configured.

use serde::Serialize;

/// One listed bank on Bursa Malaysia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bank {
    /// 1-based display rank.
    pub rank: u8,
    /// Yahoo Finance ticker (`<stock code>.KL`).
    pub ticker: &'static str,
    /// Short legend label.
    pub abbreviation: &'static str,
    /// Full registered name.
    pub name: &'static str,
}

pub const BANKS: [Bank; 10] = [
    Bank {
        rank: 1,
        ticker: "1155.KL",
        abbreviation: "Maybank",
        name: "Malayan Banking Berhad (Maybank)",
    },
    Bank {
        rank: 2,
        ticker: "1295.KL",
        abbreviation: "PBBANK",
        name: "Public Bank Berhad",
    },
    Bank {
        rank: 3,
        ticker: "1023.KL",
        abbreviation: "CIMB",
        name: "CIMB Group Holdings Berhad",
    },
    Bank {
        rank: 4,
        ticker: "5819.KL",
        abbreviation: "HLBANK",
        name: "Hong Leong Bank Berhad",
    },
    Bank {
        rank: 5,
        ticker: "1066.KL",
        abbreviation: "RHBBANK",
        name: "RHB Bank Berhad",
    },
    Bank {
        rank: 6,
        ticker: "1015.KL",
        abbreviation: "AMBANK",
        name: "AMMB Holdings Berhad (AmBank)",
    },
    Bank {
        rank: 7,
        ticker: "1082.KL",
        abbreviation: "HLFG",
        name: "Hong Leong Financial Group Berhad",
    },
    Bank {
        rank: 8,
        ticker: "2488.KL",
        abbreviation: "ABMB",
        name: "Alliance Bank Malaysia Berhad",
    },
    Bank {
        rank: 9,
        ticker: "1171.KL",
        abbreviation: "MBSB",
        name: "Malaysia Building Society Berhad (MBSB)",
    },
    Bank {
        rank: 10,
        ticker: "5185.KL",
        abbreviation: "AFFIN",
        name: "Affin Bank Berhad",
    },
];

impl Bank {
    /// Look up a bank in the roster by its ticker.
    pub fn by_ticker(ticker: &str) -> Option<&'static Bank> {
        BANKS.iter().find(|b| b.ticker == ticker)
    }
}

/// Tickers of a roster, in the roster's order.
pub fn tickers(roster: &[Bank]) -> Vec<&'static str> {
    roster.iter().map(|b| b.ticker).collect()
}

/// Legend labels of a roster, in the roster's order.
pub fn labels(roster: &[Bank]) -> Vec<String> {
    roster.iter().map(|b| b.abbreviation.to_string()).collect()
}
