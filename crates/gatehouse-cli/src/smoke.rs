//! End-to-end check against a running gateway
//!
//! Registers a fresh account, logs in, and checks that the gate and the
//! self-access rule answer 200, 401 and 403 where they should.

use anyhow::{bail, Context, Result};
use gatehouse_core::wire::{LoginRequest, RegisterRequest};
use reqwest::StatusCode;
use uuid::Uuid;

use crate::client::{GatewayClient, Reply};

fn expect(step: &str, reply: &Reply, expected: StatusCode) -> Result<()> {
    if reply.status != expected {
        bail!(
            "{step}: expected {expected}, got {} with body {}",
            reply.status,
            reply.body
        );
    }
    println!("ok   {step} ({})", reply.status);
    Ok(())
}

pub async fn run(client: &GatewayClient) -> Result<()> {
    let email = format!("smoke-{}@example.com", Uuid::new_v4().simple());
    let password = "Secr3t!".to_string();

    let reply = client
        .register(&RegisterRequest {
            email: email.clone(),
            password: password.clone(),
            name: "Smoke Test".to_string(),
        })
        .await?;
    expect("register", &reply, StatusCode::CREATED)?;
    let user_id = reply.body["user_id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .context("register response has no user_id")?
        .to_string();

    let reply = client.login(&LoginRequest { email, password }).await?;
    expect("login", &reply, StatusCode::OK)?;
    let token = reply.body["token"]
        .as_str()
        .context("login response has no token")?
        .to_string();
    if token.split('.').count() != 3 {
        bail!("login: token does not have three segments");
    }

    let reply = client.profile(&user_id, Some(&token)).await?;
    expect("read own profile", &reply, StatusCode::OK)?;

    let reply = client.profile(&user_id, None).await?;
    expect("read without token", &reply, StatusCode::UNAUTHORIZED)?;

    let other = Uuid::new_v4().to_string();
    let reply = client.profile(&other, Some(&token)).await?;
    expect("read another profile", &reply, StatusCode::FORBIDDEN)?;

    println!("smoke test passed for {user_id}");
    Ok(())
}
