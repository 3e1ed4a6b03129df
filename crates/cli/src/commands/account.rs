//! Login, registration and session inspection.
//!
//! # Usage
//!
//! ```bash
//! # Password from the environment keeps it out of shell history
//! TSIR_PASSWORD=... tsir login -e ana@correo.cr
//!
//! tsir register -n "Ana Mora" -e ana@correo.cr -p secreto
//! tsir whoami
//! tsir logout
//! ```

use std::io::Write;

use clap::Args;
use secrecy::SecretString;
use tsirushka_client::{AppState, Notice};
use tsirushka_storefront::Navbar;
use tsirushka_storefront::pages::AuthController;

use crate::error::CliError;
use crate::render;

#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Password
    #[arg(short, long, env = "TSIR_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Full name
    #[arg(short, long)]
    pub name: String,

    #[command(flatten)]
    pub login: LoginArgs,
}

pub async fn login(state: &AppState, args: LoginArgs, out: &mut impl Write) -> Result<(), CliError> {
    let password = SecretString::from(args.password);
    let claims = AuthController::new(state.clone())
        .login(&args.email, &password)
        .await?;
    let who = claims.sub.unwrap_or(args.email);
    render::notice(out, &Notice::success(format!("Sesión iniciada como {who}")))?;
    Ok(())
}

pub async fn register(
    state: &AppState,
    args: RegisterArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let password = SecretString::from(args.login.password);
    AuthController::new(state.clone())
        .register(&args.name, &args.login.email, &password)
        .await?;
    render::notice(out, &Notice::success("Cuenta creada. Sesión iniciada."))?;
    Ok(())
}

pub fn logout(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    AuthController::new(state.clone()).logout()?;
    render::notice(out, &Notice::info("Sesión cerrada"))?;
    Ok(())
}

/// Show who the saved token says we are and which links the navbar offers.
pub fn whoami(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    let tokens = state.tokens();
    if !tokens.is_logged_in() {
        writeln!(out, "Sin sesión")?;
    } else {
        let claims = tokens.claims().unwrap_or_default();
        writeln!(out, "Usuario: {}", claims.sub.as_deref().unwrap_or("(desconocido)"))?;
        let roles: Vec<String> = claims.role_names().collect();
        writeln!(out, "Roles:   {}", if roles.is_empty() { "-".to_string() } else { roles.join(", ") })?;
    }
    render::navbar(out, &Navbar::build(state))?;
    Ok(())
}
