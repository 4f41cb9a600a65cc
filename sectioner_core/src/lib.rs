//! `sectioner_core` rewrites marked-up content by applying an ordered list of
//! block rules. Each rule finds an opening match, optionally a closing match,
//! and inserts or substitutes text around them. A single search cursor is
//! shared between rules so one rule can pick up exactly where the previous one
//! stopped.
//!
//! ## Processing Pipeline
//!
//! ```text
//! RuleConfig
//!   → Matcher (tag name, raw pattern, or none)
//!   → SearchPattern (compiled once, at registration)
//!   → Sectioner::go (runs rules in registration order, threading the cursor)
//!   → replace_block (opening insert, closing insert, new cursor)
//! ```
//!
//! ## Modes
//!
//! - [`Mode::First`]: restart at the top, apply once.
//! - [`Mode::Next`]: continue from the previous rule, apply once.
//! - [`Mode::All`]: restart at the top, apply to every occurrence.
//! - [`Mode::Remaining`]: continue from the previous rule, apply to every
//!   remaining occurrence.
//!
//! Inserts may contain `{{i}}`, which expands to the 1-based occurrence index.
//!
//! ## Quick Start
//!
//! ```rust
//! use sectioner_core::Policy;
//! use sectioner_core::RuleConfig;
//! use sectioner_core::Sectioner;
//!
//! let mut sectioner = Sectioner::new();
//! sectioner.replace_all(
//! 	RuleConfig::tag("h2")
//! 		.open_insert("<section id=\"s-{{i}}\">")
//! 		.open_policy(Policy::Before)
//! 		.close_tag("h2")
//! 		.close_insert("</section>")
//! 		.close_policy(Policy::Before),
//! )?;
//!
//! let output = sectioner.go("<h2>A</h2>a<h2>B</h2>b")?;
//! assert_eq!(
//! 	output,
//! 	"<section id=\"s-1\"><h2>A</h2>a</section><section id=\"s-2\"><h2>B</h2>b</section>"
//! );
//! # Ok::<(), sectioner_core::SectionerError>(())
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use pattern::*;
pub use replacer::*;
pub use rule::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod pattern;
mod replacer;
mod rule;
