//! Transit arrivals server for Galician operators.
//!
//! Answers "what is arriving at this stop, and when?" by taking a stop's
//! scheduled departures from the trip planner and enriching them with each
//! operator's live estimates, vehicle positions and display formatting.

pub mod cache;
pub mod config;
pub mod consolidated;
pub mod domain;
pub mod fares;
pub mod feeds;
pub mod geometry;
pub mod otp;
pub mod pipeline;
pub mod realtime;
pub mod ridership;
pub mod web;
