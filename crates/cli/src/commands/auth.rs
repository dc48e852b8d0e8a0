use anyhow::{Context, Result};
use serde_json::json;

use filmoteca_core::auth::Claims;

use crate::cli::{LoginArgs, RegisterArgs};
use crate::output::emit;
use crate::state::AppState;

fn describe(claims: &Claims) -> String {
    let who = claims
        .email
        .as_deref()
        .or(claims.sub.as_deref())
        .unwrap_or("unknown user");
    match claims.role.as_deref() {
        Some(role) => format!("{} ({})", who, role),
        None => who.to_string(),
    }
}

pub async fn login(state: &AppState, args: LoginArgs) -> Result<()> {
    let claims = state
        .auth()
        .login(&args.email, &args.password)
        .await
        .context("Login failed")?;
    emit(state.format(), &claims, || {
        println!("Signed in as {}", describe(&claims));
    })
}

pub async fn register(state: &AppState, args: RegisterArgs) -> Result<()> {
    let claims = state
        .auth()
        .register(&args.email, &args.password, &args.confirm)
        .await
        .context("Registration failed")?;
    emit(state.format(), &claims, || {
        println!("Account created, signed in as {}", describe(&claims));
    })
}

pub async fn logout(state: &AppState) -> Result<()> {
    state.auth().logout().await?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(state: &AppState) -> Result<()> {
    let claims = state.auth().claims()?;
    let profile = state.profiles().active()?;
    let value = json!({ "claims": claims, "profile": profile });

    emit(state.format(), &value, || {
        match &claims {
            Some(claims) => println!("Signed in as {}", describe(claims)),
            None => println!("Not signed in"),
        }
        match &profile {
            Some(profile) => println!("Profile: {} ({})", profile.name, profile.id),
            None => println!("No profile selected"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_prefers_email() {
        let claims = Claims {
            sub: Some("u1".to_string()),
            email: Some("ana@example.com".to_string()),
            role: Some("admin".to_string()),
            ..Default::default()
        };
        assert_eq!(describe(&claims), "ana@example.com (admin)");
        assert_eq!(describe(&Claims::default()), "unknown user");
    }
}
