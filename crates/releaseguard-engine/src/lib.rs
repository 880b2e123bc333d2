#![forbid(unsafe_code)]

pub mod decision;
pub mod gates;
pub mod ledger;
pub mod resolve;
pub mod scoring;
