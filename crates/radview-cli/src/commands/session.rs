use std::path::Path;

use anyhow::anyhow;
use radview_core::CredentialStore;

use crate::cli::{LoginArgs, OutputFormat, SignupArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_session;

pub(crate) async fn handle_login<S: CredentialStore>(
    ctx: &mut AppContext<S>,
    args: LoginArgs,
) -> CliResult<()> {
    let email = args.email.trim();
    if email.is_empty() {
        return Err(CliError::validation("email must not be empty"));
    }
    let password = resolve_password(args.password)?;

    ctx.session.login(&ctx.api, email, &password).await;
    auth_outcome(ctx)?;
    println!("Logged in as {email}.");
    Ok(())
}

pub(crate) async fn handle_signup<S: CredentialStore>(
    ctx: &mut AppContext<S>,
    args: SignupArgs,
) -> CliResult<()> {
    let username = args.username.trim();
    if username.is_empty() {
        return Err(CliError::validation("username must not be empty"));
    }
    let password = resolve_password(args.password)?;

    ctx.session.signup(&ctx.api, username, &password).await;
    auth_outcome(ctx)?;
    println!("Account created for {username}.");
    Ok(())
}

pub(crate) fn handle_logout<S: CredentialStore>(ctx: &mut AppContext<S>) {
    ctx.session.logout();
    println!("Logged out.");
}

pub(crate) fn handle_status<S: CredentialStore>(
    ctx: &AppContext<S>,
    credential_path: &Path,
    format: OutputFormat,
) -> CliResult<()> {
    render_session(ctx.session.session(), credential_path, format)
}

fn auth_outcome<S: CredentialStore>(ctx: &AppContext<S>) -> CliResult<()> {
    let session = ctx.session.session();
    match session.last_error() {
        Some(message) => Err(CliError::failure(anyhow!(message.to_string()))),
        None if session.is_authenticated() => Ok(()),
        None => Err(CliError::failure(anyhow!("no token was issued"))),
    }
}

fn resolve_password(flag: Option<String>) -> CliResult<String> {
    let password = match flag {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")
            .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))?,
    };
    if password.is_empty() {
        return Err(CliError::validation("password must not be empty"));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use radview_config::ClientSettings;
    use radview_core::{ApiClient, MemoryCredentialStore};
    use serde_json::json;

    fn context_with(
        server: &MockServer,
        credentials: MemoryCredentialStore,
    ) -> AppContext<MemoryCredentialStore> {
        let config = ClientSettings {
            api_url: Some(server.base_url()),
            credential_path: Some("unused.json".into()),
            ..ClientSettings::default()
        }
        .validate()
        .expect("settings validate");
        let api = ApiClient::new(&config, Some("trace-cli")).expect("client builds");
        AppContext::with_store(api, &config, credentials)
    }

    #[tokio::test]
    async fn login_stores_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/login")
                .header("x-request-id", "trace-cli")
                .json_body(json!({"email": "admin@clinic.io", "password": "pw"}));
            then.status(200).json_body(json!({"token": "jwt-1"}));
        });

        let credentials = MemoryCredentialStore::default();
        let mut ctx = context_with(&server, credentials.clone());
        handle_login(
            &mut ctx,
            LoginArgs {
                email: " admin@clinic.io ".into(),
                password: Some("pw".into()),
            },
        )
        .await
        .expect("login succeeds");

        mock.assert();
        assert_eq!(credentials.stored().as_deref(), Some("jwt-1"));
    }

    #[tokio::test]
    async fn rejected_login_reports_server_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/login");
            then.status(401).json_body(json!({"message": "Invalid credentials"}));
        });

        let mut ctx = context_with(&server, MemoryCredentialStore::default());
        let err = handle_login(
            &mut ctx,
            LoginArgs {
                email: "admin@clinic.io".into(),
                password: Some("wrong".into()),
            },
        )
        .await
        .expect_err("login rejected");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn empty_username_is_rejected_before_any_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/signup");
            then.status(200).json_body(json!({"token": "jwt"}));
        });

        let mut ctx = context_with(&server, MemoryCredentialStore::default());
        let err = handle_signup(
            &mut ctx,
            SignupArgs {
                username: "  ".into(),
                password: Some("pw".into()),
            },
        )
        .await
        .expect_err("blank username");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn logout_clears_stored_token() {
        let server = MockServer::start_async().await;
        let credentials = MemoryCredentialStore::with_token("jwt-1");
        let mut ctx = context_with(&server, credentials.clone());

        handle_logout(&mut ctx);
        handle_logout(&mut ctx);
        assert_eq!(credentials.stored(), None);
        assert!(!ctx.session.session().is_authenticated());
        handle_status(&ctx, Path::new("unused.json"), OutputFormat::Json)
            .expect("status renders");
    }
}
