// Valuation engine: catalog, replacement levels, VOR, lineups, scarcity and
// the composite recommendation score.

pub mod lineup;
pub mod projections;
pub mod recommend;
pub mod scarcity;
pub mod vor;
