//! The library code for `autopilot`, which keeps a small static site supplied
//! with a daily post. It is two independent steps, run one after the other by
//! an external scheduler:
//!
//! 1. Fetching and writing today's post ([`crate::fetch`])
//! 2. Rebuilding the index page's listing of recent posts ([`crate::build`])
//!
//! The first step is the more involved. It asks the Wikipedia REST API
//! ([`crate::wikipedia`]) for today's featured content, falls back to
//! yesterday's and then to a canned post, converts the HTML extract to
//! Markdown ([`crate::markdown`]), and writes a date-prefixed post file
//! ([`crate::post`]) with an optional house ad ([`crate::ads`]). Afterwards
//! the project tree is checked for oversized files ([`crate::guard`]).
//!
//! The second step reads the newest posts back, converts each to an HTML
//! fragment with a deliberately tiny converter, and splices them into the
//! `<section id="latest">` element of the index page.
//!
//! Both steps take their paths from a [`crate::config::Config`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod ads;
pub mod build;
pub mod config;
pub mod fetch;
pub mod guard;
pub mod markdown;
pub mod post;
pub mod wikipedia;
