use crate::{
    cli::actions::{server::Args, Action},
    typer::token::Algorithm,
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Turn parsed arguments into an [`Action`].
/// # Errors
/// Returns an error if a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server(Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one::<String>("dsn")
            .cloned()
            .ok_or_else(|| anyhow!("missing required argument: --dsn"))?,
        secret: matches
            .get_one::<String>("secret")
            .map(|s| SecretString::from(s.as_str()))
            .ok_or_else(|| anyhow!("missing required argument: --secret"))?,
        algorithm: matches
            .get_one::<Algorithm>("algorithm")
            .copied()
            .unwrap_or_default(),
        questions: matches
            .get_one::<PathBuf>("questions")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("questions.json")),
    }))
}
