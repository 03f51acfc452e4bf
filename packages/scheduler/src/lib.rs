// Content Pipeline - Scheduling Core
//
// This crate is the job scheduling and dispatch engine for the social-media
// content pipeline. It owns the jobs table (the ground truth of pipeline
// state), pre-plans the weekly workload from calendar rules, and polls for
// due jobs, routing each to the downstream service that performs the work.
//
// Downstream services (scraping, media generation, Instagram/WhatsApp
// posting) are external collaborators reached over HTTP.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
