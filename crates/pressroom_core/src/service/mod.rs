//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Hold the installed-component configuration and external collaborator
//!   seams (feed notifier).

pub mod blog_service;
pub mod feed;
pub mod post_service;
