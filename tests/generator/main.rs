#![allow(clippy::cast_possible_wrap)]

mod differential_evolution;
mod nelder_mead;
mod protocol;
mod random;
mod support;
