//! # Typer
//!
//! `typer` is a small typing-practice server. Users register, log in, answer
//! questions drawn from a fixed question set and compare their results on a
//! leaderboard.
//!
//! ## Sessions
//!
//! Session state lives in a signed, expiring token (`HS256`/`HS384`/`HS512`)
//! stored in the `token` cookie. Every quiz step re-issues the token so that it
//! also carries the moment the current question was shown. Any token that
//! fails to decode is treated as "logged out".
//!
//! ## Persistence
//!
//! Credentials and the `(correct, incorrect, skipped)` stats triple are kept
//! behind the [`typer::store::UserStore`] contract. Production uses Postgres;
//! tests use the in-memory store.

pub mod cli;
pub mod typer;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
