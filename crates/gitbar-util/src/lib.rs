//! Shared utility primitives for Gitbar's editor-extension hosts.
//!
//! This crate owns the small, independent helpers that host integrations
//! lean on everywhere: event plumbing, subscription handles, and a few
//! formatting and collection utilities. There is no shared state between
//! them -- each piece is a self-contained transformation:
//!
//! - **[`Event`] / [`EventEmitter`]** — "subscribe a listener, get back a
//!   disposable" with synchronous delivery, plus the [`any_event`],
//!   [`filter`](Event::filter), [`map`](Event::map) and
//!   [`once`](Event::once) combinators.
//!
//! - **[`Disposable`] / [`DisposeGuard`]** — explicit, idempotent release
//!   of subscription handles; [`combined`] and [`dispose_all`] for handle
//!   lists.
//!
//! - **[`wait_for`] / [`wait_with`]** — bridge an event into a future: an
//!   adapter inspects emissions and settles the wait via [`Settle`].
//!
//! - **Collection helpers** ([`uniq_by`], [`group_by`]) — keyed
//!   deduplication and insertion-ordered grouping.
//!
//! - **Formatting** ([`format_error`], [`date_from_now`]) and textual path
//!   containment ([`is_descendant`]).

pub mod collections;
pub mod dispose;
pub mod error_fmt;
pub mod event;
pub mod paths;
pub mod time_fmt;
pub mod wait;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collections::{group_by, uniq_by};
pub use dispose::{Disposable, DisposeGuard, combined, dispose_all, to_disposable};
pub use error_fmt::{RawFailure, format_error};
pub use event::{Event, EventEmitter, any_event};
pub use paths::is_descendant;
pub use time_fmt::{date_from, date_from_now};
pub use wait::{Settle, WaitError, wait_for, wait_with};
