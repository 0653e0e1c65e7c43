//! Upstream feed normalization: record extraction from arbitrary envelope
//! shapes, field resolution across vendor naming schemes, and the report
//! mappings built on top.

pub mod aggregate;
pub mod dates;
pub mod kpi;
pub mod normalize;
pub mod paginate;
pub mod ppc;
pub mod resolve;
