//! Code for working with structural variants.

pub mod landscape;
pub mod pheno;
pub mod prioritize;
pub mod schema;
