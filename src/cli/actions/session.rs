//! Run one guard operation against the identity service and print the result
//! as JSON on stdout.

use anyhow::{bail, Result};
use http::{header::AUTHORIZATION, request::Parts, Request};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::{
    client::{HttpIdentityClient, IdentityClient},
    config::IdentityConfig,
    events::TracingEventSink,
    guard::{AuthGuard, Credentials, Guard},
    identity::DefaultUserFactory,
    scopes::Scopes,
    source::ChainSource,
    token::Token,
};

#[derive(Debug)]
pub enum Operation {
    Validate {
        credentials: Credentials,
    },
    Login {
        credentials: Credentials,
        remember: bool,
    },
    WhoAmI {
        token: String,
    },
    Refresh {
        token: String,
        scopes: Option<Scopes>,
    },
    Logout {
        token: String,
    },
}

#[derive(Debug)]
pub struct Args {
    pub config: IdentityConfig,
    pub operation: Operation,
}

type CliGuard<C> = Guard<C, DefaultUserFactory, TracingEventSink>;

/// Execute a session operation.
/// # Errors
/// Returns an error if the client cannot be built or the operation fails.
pub async fn execute(args: Args) -> Result<()> {
    let client = Arc::new(HttpIdentityClient::new(&args.config)?);
    debug!("identity service: {}", client.base());

    let output = run(&args.config, client, args.operation).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// The request a caller holding `token` would send.
fn bearer_request(token: &str) -> Result<Parts> {
    let (parts, ()) = Request::builder()
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(())?
        .into_parts();
    Ok(parts)
}

fn request_guard<C: IdentityClient>(
    config: &IdentityConfig,
    client: Arc<C>,
    token: &str,
) -> Result<CliGuard<C>> {
    let request = bearer_request(token)?;
    let source = ChainSource::for_config(config, None);
    Ok(Guard::from_request(
        config,
        client,
        DefaultUserFactory,
        TracingEventSink,
        &source,
        &request,
    ))
}

async fn run<C: IdentityClient>(
    config: &IdentityConfig,
    client: Arc<C>,
    operation: Operation,
) -> Result<Value> {
    match operation {
        Operation::Validate { credentials } => {
            let guard: CliGuard<C> = Guard::new(
                config,
                client,
                DefaultUserFactory,
                TracingEventSink,
                Token::default(),
            );
            if !guard.validate(&credentials).await {
                bail!("invalid credentials");
            }
            Ok(json!({ "valid": true }))
        }
        Operation::Login {
            credentials,
            remember,
        } => {
            let mut guard: CliGuard<C> = Guard::new(
                config,
                client,
                DefaultUserFactory,
                TracingEventSink,
                Token::default(),
            );
            if !guard.attempt(&credentials, remember).await {
                bail!("login failed");
            }
            let token = guard.token().get().map(str::to_owned);
            let user = guard.user_or_fail().await?;
            Ok(json!({ "accessToken": token, "user": user }))
        }
        Operation::WhoAmI { token } => {
            let mut guard = request_guard(config, client, &token)?;
            match guard.user().await {
                Some(user) => Ok(json!({ "user": user })),
                None => bail!("token is not valid"),
            }
        }
        Operation::Refresh { token, scopes } => {
            let pair = client.refresh_token(&token, scopes.as_ref()).await?;
            Ok(serde_json::to_value(pair)?)
        }
        Operation::Logout { token } => {
            let mut guard = request_guard(config, client, &token)?;
            let user = guard.user().await.cloned();
            guard.logout().await?;
            Ok(json!({ "loggedOut": true, "user": user }))
        }
    }
}
