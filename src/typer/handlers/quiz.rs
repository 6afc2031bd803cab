use super::{now_unix_millis, redirect, session_claims, with_session};
use crate::typer::{
    error::Error,
    pages,
    quiz::{QuizFlow, Submission},
    store::UserStore,
};
use axum::{
    extract::{Extension, Form},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[derive(Deserialize, Debug, Default)]
pub struct QuizForm {
    question: Option<String>,
    answer: Option<String>,
}

// axum handler for the question/answer cycle
#[instrument(skip_all)]
pub async fn quiz(
    headers: HeaderMap,
    store: Extension<Arc<dyn UserStore>>,
    flow: Extension<Arc<QuizFlow>>,
    payload: Option<Form<QuizForm>>,
) -> Response {
    let form = payload.map(|Form(form)| form).unwrap_or_default();
    let submission = Submission {
        question: form.question,
        answer: form.answer,
    };

    let claims = session_claims(&headers, flow.codec());

    match flow
        .advance(store.0.as_ref(), claims.as_ref(), &submission, now_unix_millis())
        .await
    {
        Ok(turn) => {
            let page = match &turn.answered {
                Some(answered) => pages::question(&turn.question, answered),
                None => pages::first_question(&turn.question),
            };
            with_session(&turn.token, page)
        }

        Err(Error::AuthenticationFailed | Error::NotFound) => {
            debug!("No usable session, redirecting to login");
            redirect("/login")
        }

        Err(e) => {
            error!("Quiz step failed: {e}");
            redirect("/login")
        }
    }
}
