pub mod binning;
pub mod cleaner;
pub mod columns;
pub mod config;
pub mod correlation;
pub mod dates;
pub mod enricher;
pub mod error;
pub mod filter;
pub mod group;
pub mod loader;
pub mod movie;
pub mod multivalue;
pub mod pipeline;
pub mod q1;
pub mod q2;
pub mod q3;
pub mod q4;
pub mod report;
pub mod share;
pub mod table;
pub mod top_n;
