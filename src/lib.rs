//! Crossway
//!
//! A discrete-event simulation of vehicular traffic through a fixed
//! network of one-way roads meeting at signalized intersections.

pub mod simulation;
