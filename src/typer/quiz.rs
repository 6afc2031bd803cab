//! Quiz session flow.
//!
//! Each `/type` request is one step: either the first question of a run, or
//! an answer to the question shown last time followed by the next question.
//! The moment a question was shown travels in the session token, so the
//! server keeps no per-user state between steps.

use crate::typer::{
    error::{Error, Result},
    questions::QuestionSet,
    store::{Stats, UserStore},
    token::{Claims, TokenCodec},
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    Skip,
}

impl Outcome {
    /// Empty or missing answers are skips; answers compare case-insensitively.
    #[must_use]
    pub fn classify(answer: Option<&str>, expected: &str) -> Self {
        match answer {
            None | Some("") => Self::Skip,
            Some(answer) if answer.to_lowercase() == expected.to_lowercase() => Self::Correct,
            Some(_) => Self::Incorrect,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "true",
            Self::Incorrect => "false",
            Self::Skip => "skip",
        }
    }
}

impl Stats {
    /// Count one more answer with the given outcome.
    #[must_use]
    pub const fn record(self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => Self {
                correct: self.correct.saturating_add(1),
                ..self
            },
            Outcome::Incorrect => Self {
                incorrect: self.incorrect.saturating_add(1),
                ..self
            },
            Outcome::Skip => Self {
                skipped: self.skipped.saturating_add(1),
                ..self
            },
        }
    }
}

/// Form fields posted to the quiz endpoint.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub question: Option<String>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState<'a> {
    Anonymous,
    AwaitingFirstQuestion {
        identity: &'a str,
    },
    AwaitingAnswer {
        identity: &'a str,
        question: &'a str,
        answer: Option<&'a str>,
        started_at_ms: i64,
    },
}

impl<'a> QuizState<'a> {
    #[must_use]
    pub fn from_request(claims: Option<&'a Claims>, submission: &'a Submission) -> Self {
        let Some(claims) = claims else {
            return Self::Anonymous;
        };

        match (claims.qst, submission.question.as_deref()) {
            (Some(started_at_ms), Some(question)) if !question.is_empty() => {
                Self::AwaitingAnswer {
                    identity: &claims.sub,
                    question,
                    answer: submission.answer.as_deref(),
                    started_at_ms,
                }
            }
            _ => Self::AwaitingFirstQuestion {
                identity: &claims.sub,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answered {
    pub outcome: Outcome,
    pub feedback: String,
}

/// Result of one quiz step: the next question and the token to set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub question: String,
    pub answered: Option<Answered>,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct QuizFlow {
    questions: Arc<QuestionSet>,
    codec: Arc<TokenCodec>,
}

/// `S.mmm` seconds between two unix-millisecond instants, never negative.
#[must_use]
pub fn format_elapsed(started_at_ms: i64, now_ms: i64) -> String {
    let elapsed = now_ms.saturating_sub(started_at_ms).max(0);
    format!("{}.{:03}", elapsed / 1000, elapsed % 1000)
}

/// First letter upper case, the rest lower case.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

impl QuizFlow {
    #[must_use]
    pub fn new(questions: Arc<QuestionSet>, codec: Arc<TokenCodec>) -> Self {
        Self { questions, codec }
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Run one quiz step.
    ///
    /// # Errors
    /// - [`Error::AuthenticationFailed`] without a valid session,
    /// - [`Error::NotFound`] if the user's stats vanished,
    /// - [`Error::Store`] / [`Error::Token`] on backend failures.
    #[instrument(skip(self, store, claims), fields(user = claims.map(|c| c.sub.as_str())))]
    pub async fn advance(
        &self,
        store: &dyn UserStore,
        claims: Option<&Claims>,
        submission: &Submission,
        now_ms: i64,
    ) -> Result<Turn> {
        match QuizState::from_request(claims, submission) {
            QuizState::Anonymous => Err(Error::AuthenticationFailed),

            QuizState::AwaitingFirstQuestion { identity } => self.next_turn(identity, None, now_ms),

            QuizState::AwaitingAnswer {
                identity,
                question,
                answer,
                started_at_ms,
            } => {
                let Some(expected) = self.questions.answer(question) else {
                    debug!("Unknown question submitted, starting over");
                    return self.next_turn(identity, None, now_ms);
                };

                let outcome = Outcome::classify(answer, expected);

                let stats = store.get_stats(identity).await?.ok_or(Error::NotFound)?;
                store.update_stats(identity, stats.record(outcome)).await?;

                debug!("Answer recorded: {}", outcome.as_str());

                let feedback = if outcome == Outcome::Correct {
                    format!(
                        "Time elapsed: {} seconds",
                        format_elapsed(started_at_ms, now_ms)
                    )
                } else {
                    format!("Answer was: {}", capitalize(expected))
                };

                self.next_turn(identity, Some(Answered { outcome, feedback }), now_ms)
            }
        }
    }

    fn next_turn(&self, identity: &str, answered: Option<Answered>, now_ms: i64) -> Result<Turn> {
        let question = self.questions.draw().text.clone();
        let token = self
            .codec
            .encode(identity, Some(now_ms), now_ms.div_euclid(1000))?;

        Ok(Turn {
            question,
            answered,
            token,
        })
    }
}
