pub mod account;
pub mod chat;
pub mod init;
pub mod lessons;
pub mod levels;
pub mod open;
pub mod quiz;
pub mod report;
pub mod stages;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use dhakira_client::{load_config_from, DhakiraConfig, HttpBackend};
use dhakira_core::error::ClientError;
use dhakira_core::notice::{Toast, ToastKind, ToastQueue};
use dhakira_core::router::Route;
use dhakira_core::store::ProfileStore;
use dhakira_core::{AppContext, UserProfile};

/// Everything a page needs: configuration, the backend and the app context.
pub struct Env {
    pub config: DhakiraConfig,
    pub backend: Arc<HttpBackend>,
    pub ctx: AppContext,
    toasts: ToastQueue,
}

impl Env {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let backend = Arc::new(HttpBackend::from_config(&config)?);
        let ctx = AppContext::open(ProfileStore::new(config.profile_path.clone()))?;
        Ok(Self {
            config,
            backend,
            ctx,
            toasts: ToastQueue::default(),
        })
    }

    /// Navigate to `route` and return the signed-in profile.
    ///
    /// A redirect by the session guard ends the command.
    pub fn enter(&self, route: &Route) -> Result<UserProfile> {
        let landed = self.ctx.route(route.clone());
        if &landed != route {
            println!("{route} -> {landed}");
            return Err(ClientError::NotLoggedIn.into());
        }
        println!("{}\n", route.title());
        Ok(self.ctx.require_profile()?.clone())
    }

    pub fn toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    /// Print the toasts that have not expired yet.
    pub fn flush_toasts(&mut self) {
        for toast in self.toasts.visible(Instant::now()) {
            println!("{}", toast_line(toast));
        }
    }
}

fn toast_line(toast: &Toast) -> String {
    let mark = match toast.kind {
        ToastKind::Success => "+",
        ToastKind::Error => "!",
    };
    format!("[{mark}] {}", toast.message)
}

/// Print `prompt` and read one line from stdin, trimmed of the line ending.
///
/// `None` at end of input.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    if !prompt.is_empty() {
        print!("{prompt}");
        io::stdout().flush()?;
    }
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Like [`read_line`], but end of input is an error.
pub fn require_line(prompt: &str, what: &str) -> Result<String> {
    read_line(prompt)?.ok_or_else(|| anyhow::anyhow!("{what} is required"))
}
