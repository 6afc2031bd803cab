use crate::typer::{
    self,
    questions::QuestionSet,
    token::{Algorithm, TokenCodec},
};
use anyhow::Result;
use secrecy::SecretString;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub secret: SecretString,
    pub algorithm: Algorithm,
    pub questions: PathBuf,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the question set cannot be loaded or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        "Starting server on port {} with {} tokens",
        args.port, args.algorithm
    );

    let questions = QuestionSet::load(&args.questions)?;

    let codec = TokenCodec::new(args.secret, args.algorithm);

    typer::new(args.port, &args.dsn, codec, questions).await
}
