//! Registration and log-in.

use crate::typer::{
    error::{Error, Result},
    password,
    store::{RecordId, UserStore},
    token::TokenCodec,
    validate::validate,
};
use tracing::{debug, instrument};

/// Register a new user with zeroed stats.
///
/// # Errors
/// - [`Error::AlreadyRegistered`] if the username is taken, checked before the
///   input rules and again on insert,
/// - [`Error::ValidationFailed`] with the violated rules,
/// - [`Error::Store`] / [`Error::PasswordHash`] on backend failures.
#[instrument(skip(store, password))]
pub async fn register(store: &dyn UserStore, username: &str, password: &str) -> Result<RecordId> {
    if store.find(username).await?.is_some() {
        debug!("User already exists");
        return Err(Error::AlreadyRegistered);
    }

    let violations = validate(username, password);
    if !violations.is_empty() {
        debug!("Registration rejected: {violations:?}");
        return Err(Error::ValidationFailed(violations));
    }

    let password_hash = password::hash(password)?;
    let id = store.create(username, &password_hash).await?;

    debug!("User registered");

    Ok(id)
}

/// Check credentials and issue a session token without a question in flight.
///
/// # Errors
/// - [`Error::NotFound`] if the username is unknown,
/// - [`Error::AuthenticationFailed`] if the password does not match,
/// - [`Error::Store`] / [`Error::Token`] on backend failures.
#[instrument(skip(store, codec, password))]
pub async fn login(
    store: &dyn UserStore,
    codec: &TokenCodec,
    username: &str,
    password: &str,
    now_unix_seconds: i64,
) -> Result<String> {
    let Some(user) = store.find(username).await? else {
        debug!("User not found");
        return Err(Error::NotFound);
    };

    if !password::verify(password, &user.password_hash) {
        debug!("Unauthorized");
        return Err(Error::AuthenticationFailed);
    }

    debug!("Login successful");

    Ok(codec.encode(&user.username, None, now_unix_seconds)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typer::{
        store::{MemoryStore, Stats},
        token::Algorithm,
        validate::Violation,
    };
    use secrecy::SecretString;

    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new(SecretString::from("secret".to_string()), Algorithm::HS256)
    }

    #[tokio::test]
    async fn register_creates_user_with_zero_stats() {
        let store = MemoryStore::new();
        assert!(register(&store, "alice", "Passw0rd!").await.is_ok());

        let user = store.find("alice").await.ok().flatten();
        assert_eq!(user.as_ref().map(|u| u.stats), Some(Stats::new(0, 0, 0)));
        assert_ne!(
            user.map(|u| u.password_hash),
            Some("Passw0rd!".to_string())
        );
    }

    #[tokio::test]
    async fn duplicate_is_reported_before_validation() {
        let store = MemoryStore::new();
        store.create("alice", "hash").await.ok();
        assert!(matches!(
            register(&store, "alice", "").await,
            Err(Error::AlreadyRegistered)
        ));
    }

    #[tokio::test]
    async fn invalid_input_is_not_stored() {
        let store = MemoryStore::new();
        let result = register(&store, "al", "Passw0rd!").await;
        assert!(matches!(
            result,
            Err(Error::ValidationFailed(ref v)) if v == &vec![Violation::UsernameTooShort]
        ));
        assert_eq!(store.find("al").await.ok().flatten(), None);
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() {
        let store = MemoryStore::new();
        register(&store, "alice", "Passw0rd!").await.ok();

        let codec = codec();
        let token = login(&store, &codec, "alice", "Passw0rd!", NOW).await;
        let claims = token.ok().and_then(|t| codec.decode(&t, NOW));
        assert_eq!(claims.as_ref().map(|c| c.sub.as_str()), Some("alice"));
        assert_eq!(claims.and_then(|c| c.qst), None);
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_user_and_wrong_password() {
        let store = MemoryStore::new();
        register(&store, "alice", "Passw0rd!").await.ok();
        let codec = codec();

        assert!(matches!(
            login(&store, &codec, "alice", "wrong-pass", NOW).await,
            Err(Error::AuthenticationFailed)
        ));
        assert!(matches!(
            login(&store, &codec, "bobby", "Passw0rd!", NOW).await,
            Err(Error::NotFound)
        ));
    }
}
