//! Map construction, merging and sampling.

mod building;
mod sampling;
