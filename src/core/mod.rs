//! Runtime: history, clue ledger, keywords, presentation and the session itself.

pub mod history;
pub mod keywords;
pub mod ledger;
pub mod library;
pub mod presentation;
pub mod session;
