//! The `dhakira login`, `signup`, `logout` and `profile` commands.

use anyhow::{bail, Result};

use dhakira_core::backend::Backend;
use dhakira_core::context::Action;
use dhakira_core::model::{Credentials, ProfileUpdate, Registration};
use dhakira_core::notice::{Toast, PROFILE_UPDATED};
use dhakira_core::router::Route;
use dhakira_core::stages::StageCatalog;
use dhakira_core::AppContext;

use super::{require_line, Env};

pub async fn login(mut env: Env, email: Option<String>, password: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => require_line("Email: ", "email")?,
    };
    let password = match password {
        Some(p) => p,
        None => require_line("Password: ", "password")?,
    };

    let profile = env
        .backend
        .login(&Credentials {
            email: email.trim().to_string(),
            password,
        })
        .await?;
    let name = profile.firstname.clone();

    let action = Action::LoggedIn(profile);
    let landing = AppContext::landing_after(&action);
    env.ctx.dispatch(action)?;

    println!("Welcome, {name}");
    println!("-> {landing}");
    Ok(())
}

pub async fn signup(
    mut env: Env,
    email: String,
    firstname: String,
    stage: String,
    password: Option<String>,
    confirm_password: Option<String>,
) -> Result<()> {
    let stage = StageCatalog::bundled().resolve(&stage)?.code.clone();
    let password = match password {
        Some(p) => p,
        None => require_line("Password: ", "password")?,
    };
    let confirm = match confirm_password {
        Some(p) => p,
        None => require_line("Confirm password: ", "password confirmation")?,
    };
    if password != confirm {
        bail!("Passwords do not match");
    }

    let registration = Registration {
        email,
        password,
        firstname,
        educational_level: stage,
    };
    let message = env.backend.signup(&registration).await?;
    if !message.is_empty() {
        println!("{message}");
    }

    let action = Action::LoggedIn(registration.profile());
    let landing = AppContext::landing_after(&action);
    env.ctx.dispatch(action)?;
    println!("-> {landing}");
    Ok(())
}

pub fn logout(mut env: Env) -> Result<()> {
    let action = Action::LoggedOut;
    let landing = AppContext::landing_after(&action);
    env.ctx.dispatch(action)?;
    println!("Logged out.");
    println!("-> {landing}");
    Ok(())
}

pub fn show(env: Env) -> Result<()> {
    let profile = env.enter(&Route::ProfileSettings)?;
    let catalog = StageCatalog::bundled();
    println!("Email:      {}", profile.email);
    println!("First name: {}", profile.firstname);
    println!(
        "Stage:      {} ({})",
        catalog.display_name(profile.educational_level.as_str()),
        profile.educational_level
    );
    Ok(())
}

pub async fn update(mut env: Env, firstname: Option<String>, stage: Option<String>) -> Result<()> {
    let profile = env.enter(&Route::ProfileSettings)?;
    if firstname.is_none() && stage.is_none() {
        bail!("nothing to update, pass --firstname or --stage");
    }

    let educational_level = match stage {
        Some(code) => StageCatalog::bundled().resolve(&code)?.code.clone(),
        None => profile.educational_level.clone(),
    };
    let update = ProfileUpdate {
        email: profile.email.clone(),
        firstname: firstname.unwrap_or_else(|| profile.firstname.clone()),
        educational_level,
    };

    let user = env.backend.update_profile(&update).await?;
    env.ctx.dispatch(Action::ProfileEdited {
        firstname: user.firstname,
        educational_level: user.educational_level,
    })?;

    env.toast(Toast::success(PROFILE_UPDATED));
    env.flush_toasts();
    Ok(())
}
