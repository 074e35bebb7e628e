//! Command-line interface definitions for the Healthhub server.
//!
//! Settings layer CLI flags over `HEALTHHUB_*` environment variables and a
//! `.healthhub.toml` dotfile.

#![expect(
    non_snake_case,
    reason = "Clap/OrthoConfig derive macros generate helper modules with uppercase names"
)]
#![allow(
    missing_docs,
    reason = "OrthoConfig and Clap derive macros generate items that cannot be documented"
)]
#![allow(
    unfulfilled_lint_expectations,
    reason = "derive macros conditionally generate items"
)]

use argon2::Params;
use clap::{Args, Parser, Subcommand};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::{
    chatbot::{DEFAULT_CHATBOT_HOST, DEFAULT_CHATBOT_URL},
    mail::{DEFAULT_MAIL_FROM, DEFAULT_SMTP_PORT},
};

/// Arguments for the `create-user` administrative subcommand.
#[expect(
    missing_docs,
    reason = "OrthoConfig derive macro generates items that cannot be documented"
)]
#[derive(Parser, OrthoConfig, Deserialize, Serialize, Default, Debug, Clone)]
#[ortho_config(prefix = "HEALTHHUB_")]
pub struct CreateUserArgs {
    /// Login email for the new account.
    pub email: Option<String>,
    /// Password for the new account.
    pub password: Option<String>,
    /// Optional first name.
    #[arg(long)]
    pub first_name: Option<String>,
    /// Optional last name.
    #[arg(long)]
    pub last_name: Option<String>,
}

/// CLI subcommands exposed by `healthhub`.
#[derive(Subcommand, Deserialize, Serialize, Debug, Clone)]
pub enum Commands {
    /// Create a new user account.
    #[command(name = "create-user")]
    CreateUser(CreateUserArgs),
}

/// Runtime configuration for the server and admin commands.
#[expect(
    missing_docs,
    reason = "OrthoConfig derive macro generates items that cannot be documented"
)]
#[derive(Args, OrthoConfig, Serialize, Deserialize, Default, Debug, Clone)]
#[ortho_config(prefix = "HEALTHHUB_")]
pub struct AppConfig {
    /// Server bind address.
    #[ortho_config(default = "0.0.0.0:3000".to_owned())]
    #[arg(long, default_value_t = String::from("0.0.0.0:3000"))]
    pub bind: String,
    /// Database connection string or path.
    #[ortho_config(default = "healthhub.db".to_owned())]
    #[arg(long, default_value_t = String::from("healthhub.db"))]
    pub database: String,
    /// Front-end origin allowed by CORS.
    #[ortho_config(default = "http://localhost:3000".to_owned())]
    #[arg(long, default_value_t = String::from("http://localhost:3000"))]
    pub cors_origin: String,
    /// Argon2 memory cost parameter.
    #[ortho_config(default = Params::DEFAULT_M_COST)]
    #[arg(long, default_value_t = Params::DEFAULT_M_COST)]
    pub argon2_m_cost: u32,
    /// Argon2 time cost parameter.
    #[ortho_config(default = Params::DEFAULT_T_COST)]
    #[arg(long, default_value_t = Params::DEFAULT_T_COST)]
    pub argon2_t_cost: u32,
    /// Argon2 parallelism cost parameter.
    #[ortho_config(default = Params::DEFAULT_P_COST)]
    #[arg(long, default_value_t = Params::DEFAULT_P_COST)]
    pub argon2_p_cost: u32,
    /// Chat-completion endpoint.
    #[ortho_config(default = DEFAULT_CHATBOT_URL.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_CHATBOT_URL))]
    pub chatbot_url: String,
    /// Value of the `x-rapidapi-host` header.
    #[ortho_config(default = DEFAULT_CHATBOT_HOST.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_CHATBOT_HOST))]
    pub chatbot_host: String,
    /// Value of the `x-rapidapi-key` header.
    #[arg(long)]
    pub chatbot_api_key: Option<String>,
    /// Bot identifier sent with every request.
    #[arg(long)]
    pub chatbot_bot_id: Option<String>,
    /// SMTP relay for verification mail. Mail is only logged when unset.
    #[arg(long)]
    pub smtp_host: Option<String>,
    /// SMTP submission port; the session is upgraded with STARTTLS.
    #[ortho_config(default = DEFAULT_SMTP_PORT)]
    #[arg(long, default_value_t = DEFAULT_SMTP_PORT)]
    pub smtp_port: u16,
    /// SMTP login.
    #[arg(long)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[arg(long)]
    pub smtp_password: Option<String>,
    /// Sender mailbox for verification mail.
    #[ortho_config(default = DEFAULT_MAIL_FROM.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_MAIL_FROM))]
    pub mail_from: String,
}

/// Top-level CLI entry point consumed by the binary.
#[derive(Parser, Deserialize, Serialize, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Application configuration.
    #[command(flatten)]
    pub config: AppConfig,
    /// Optional subcommand.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
