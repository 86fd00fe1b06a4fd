//! `salonstock-sales` — pure sale model.
//!
//! A sale is one checkout event spanning one or more services, each of which
//! needs volumes of one or more products. This crate aggregates those
//! requirements, checks them against stock snapshots, and describes the
//! outcome. It performs no IO and holds no locks; orchestration lives in
//! `salonstock-infra`.

pub mod feasibility;
pub mod sale;

pub use feasibility::{Shortfall, check_feasibility};
pub use sale::{
    ConsumptionLogEntry, LineRequirement, SaleLine, SaleReceipt, SaleRequest,
};
