//! Administrative command handlers.
//!
//! Account provisioning runs outside the HTTP server against the same store,
//! so operators can seed users before the portal goes live.

#![allow(
    clippy::shadow_reuse,
    reason = "intentional shadowing for config merging"
)]
#![allow(
    clippy::print_stdout,
    reason = "intentional user output for CLI commands"
)]

use anyhow::{Context, Result, anyhow, bail};
use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use ortho_config::load_and_merge_subcommand_for;

use super::{AppConfig, Commands, CreateUserArgs};
use crate::{
    db::{apply_migrations, connect, create_user, is_unique_violation},
    models,
    operations::{MIN_PASSWORD_LEN, is_valid_email},
    passwords::hash_password,
};

/// Execute an administrative command.
///
/// # Errors
///
/// Propagates failures from configuration merging or database operations.
pub async fn run_command(command: Commands, cfg: &AppConfig) -> Result<()> {
    match command {
        Commands::CreateUser(args) => {
            let args = load_and_merge_subcommand_for::<CreateUserArgs>(&args)?;
            run_create_user(args, cfg).await
        }
    }
}

/// Build an Argon2 instance using the supplied configuration parameters.
///
/// # Errors
///
/// Returns any error emitted while constructing the Argon2 parameter set.
pub fn argon2_from_config(cfg: &AppConfig) -> Result<Argon2<'static>> {
    let params = ParamsBuilder::new()
        .m_cost(cfg.argon2_m_cost)
        .t_cost(cfg.argon2_t_cost)
        .p_cost(cfg.argon2_p_cost)
        .build()
        .with_context(|| {
            format!(
                "invalid Argon2 params derived from config: m_cost={}, t_cost={}, p_cost={}",
                cfg.argon2_m_cost, cfg.argon2_t_cost, cfg.argon2_p_cost
            )
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

async fn run_create_user(args: CreateUserArgs, cfg: &AppConfig) -> Result<()> {
    let email = args.email.ok_or_else(|| anyhow!("missing email"))?;
    let password = args.password.ok_or_else(|| anyhow!("missing password"))?;
    if !is_valid_email(&email) {
        bail!("invalid email '{email}'");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("password must be at least {MIN_PASSWORD_LEN} characters long");
    }

    let argon2 = argon2_from_config(cfg)?;
    let hashed = hash_password(&argon2, &password).map_err(|e| anyhow!("hashing failed: {e}"))?;
    let new_user = models::NewUser {
        email: &email,
        password: Some(&hashed),
        first_name: args.first_name.as_deref(),
        last_name: args.last_name.as_deref(),
        given_name: args.first_name.as_deref(),
        ..models::NewUser::default()
    };
    let mut conn = connect(&cfg.database).await?;
    apply_migrations(&mut conn, &cfg.database).await?;
    match create_user(&mut conn, &new_user).await {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => bail!("user '{email}' already exists"),
        Err(e) => return Err(e).with_context(|| format!("failed to create user '{email}'")),
    }
    println!("User {email} created");
    Ok(())
}
