use clap::Subcommand;
use judgekit_core::{AppContext, Database, Locale, Tab, Theme};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ContextAction {
    /// Print current preferences
    Show,
    /// Set the interface language (en, pt, es)
    Locale { code: String },
    /// Set the color scheme (light, dark)
    Theme { theme: String },
    /// Remember the last open tab (e.g. deck-check)
    Tab { tab: String },
    /// Mark onboarding as completed
    OnboardingDone,
}

/// System locale as reported by the usual POSIX variables.
fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
}

pub fn run(action: ContextAction) -> CmdResult {
    let db = Database::open()?;
    let mut ctx = AppContext::load(&db, system_locale().as_deref());

    match action {
        ContextAction::Show => print_json(&ctx),
        ContextAction::Locale { code } => {
            let locale: Locale = code.parse()?;
            print_json(&ctx.set_locale(&db, locale)?)
        }
        ContextAction::Theme { theme } => {
            let theme: Theme = theme.parse()?;
            print_json(&ctx.set_theme(&db, theme)?)
        }
        ContextAction::Tab { tab } => {
            let tab: Tab = tab.parse()?;
            print_json(&ctx.set_last_tab(&db, tab)?)
        }
        ContextAction::OnboardingDone => match ctx.complete_onboarding(&db)? {
            Some(event) => print_json(&event),
            None => print_json(&ctx),
        },
    }
}
