mod disjointness;
mod queries;
