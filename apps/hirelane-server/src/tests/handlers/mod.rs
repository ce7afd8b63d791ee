//! Handler tests organized by domain.

mod applications;
mod auth;
mod billing;
mod companies;
mod jobs;
mod notifications;
