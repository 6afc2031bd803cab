//! Server-rendered pages.

use crate::typer::{
    quiz::Answered,
    store::{Stats, UserRecord},
};
use axum::response::Html;

/// Escape text for use in HTML bodies and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Typer</title>\n</head>\n<body>\n\
         <nav><a href=\"/\">Typer</a> | <a href=\"/top\">Top</a> | <a href=\"/user\">Profile</a></nav>\n\
         <main>\n{body}</main>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

fn messages(feedback: &str, errors: &[String]) -> String {
    let mut html = String::new();
    if !feedback.is_empty() {
        html.push_str(&format!(
            "<p class=\"feedback\">{}</p>\n",
            escape(feedback)
        ));
    }
    if !errors.is_empty() {
        html.push_str("<ul class=\"errors\">\n");
        for error in errors {
            html.push_str(&format!("<li>{}</li>\n", escape(error)));
        }
        html.push_str("</ul>\n");
    }
    html
}

fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\">\n\
         <input name=\"username\" placeholder=\"Username\" required>\n\
         <input name=\"password\" type=\"password\" placeholder=\"Password\" required>\n\
         <button type=\"submit\">{submit}</button>\n</form>\n"
    )
}

#[must_use]
pub fn start() -> Html<String> {
    layout(
        "Welcome",
        "<h1>Typer</h1>\n<p>Practice typing and climb the leaderboard.</p>\n\
         <p><a href=\"/login\">Log in</a> or <a href=\"/register\">register</a>.</p>\n",
    )
}

#[must_use]
pub fn login(feedback: &str, errors: &[String]) -> Html<String> {
    let body = format!(
        "<h1>Log in</h1>\n{}{}<p>No account? <a href=\"/register\">Register</a></p>\n",
        messages(feedback, errors),
        credentials_form("/user-login", "Log in"),
    );
    layout("Log in", &body)
}

#[must_use]
pub fn register(feedback: &str, errors: &[String]) -> Html<String> {
    let body = format!(
        "<h1>Register</h1>\n{}{}<p>Already registered? <a href=\"/login\">Log in</a></p>\n",
        messages(feedback, errors),
        credentials_form("/user-register", "Register"),
    );
    layout("Register", &body)
}

#[must_use]
pub fn user(username: &str, stats: Stats) -> Html<String> {
    let body = format!(
        "<h1>{username}</h1>\n<table class=\"stats\">\n\
         <tr><th>Correct</th><td>{}</td></tr>\n\
         <tr><th>Incorrect</th><td>{}</td></tr>\n\
         <tr><th>Skipped</th><td>{}</td></tr>\n</table>\n\
         <form method=\"post\" action=\"/type\"><button type=\"submit\">Start typing</button></form>\n\
         <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>\n",
        stats.correct,
        stats.incorrect,
        stats.skipped,
        username = escape(username),
    );
    layout("Profile", &body)
}

#[must_use]
pub fn top(users: &[UserRecord]) -> Html<String> {
    let rows: String = users
        .iter()
        .enumerate()
        .map(|(place, user)| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                place + 1,
                escape(&user.username),
                user.stats.correct,
                user.stats.incorrect,
                user.stats.skipped,
            )
        })
        .collect();
    let body = format!(
        "<h1>Top {}</h1>\n<table class=\"top\">\n\
         <tr><th>#</th><th>User</th><th>Correct</th><th>Incorrect</th><th>Skipped</th></tr>\n\
         {rows}</table>\n",
        users.len()
    );
    layout("Top", &body)
}

fn question_form(question: &str) -> String {
    let question = escape(question);
    format!(
        "<p class=\"question\">{question}</p>\n\
         <form method=\"post\" action=\"/type\">\n\
         <input type=\"hidden\" name=\"question\" value=\"{question}\">\n\
         <input name=\"answer\" autofocus autocomplete=\"off\">\n\
         <button type=\"submit\">Submit</button>\n</form>\n"
    )
}

#[must_use]
pub fn first_question(question: &str) -> Html<String> {
    layout("Type", &format!("<h1>Type it!</h1>\n{}", question_form(question)))
}

#[must_use]
pub fn question(question: &str, answered: &Answered) -> Html<String> {
    let body = format!(
        "<h1>Type it!</h1>\n<p class=\"result\" data-result=\"{result}\">{result}</p>\n\
         <p class=\"feedback\">{feedback}</p>\n{form}",
        result = answered.outcome.as_str(),
        feedback = escape(&answered.feedback),
        form = question_form(question),
    );
    layout("Type", &body)
}
