pub mod disjoint_set;
pub mod sequence;
