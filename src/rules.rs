use crate::error::Result;
use crate::model::CommitEntry;

/// A rule applied to every extracted commit: a predicate deciding
/// whether the entry is kept at all, and a mutator run on entries that
/// survive filtering and namespacing. An error from either aborts the
/// whole run.
pub trait Ruleset: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_entry_acceptable(&self, _entry: &CommitEntry) -> Result<bool> {
        Ok(true)
    }

    fn postprocess_entry(&self, _entry: &mut CommitEntry) -> Result<()> {
        Ok(())
    }
}

/// The rules registered for this process, in execution order.
pub fn registry() -> Vec<Box<dyn Ruleset>> {
    vec![Box::new(AutomationFilter), Box::new(IdentityAliases)]
}

const BOT_EMAILS: &[&str] = &[
    "scripty@kde.org",
    "actions@github.com",
    "noreply@github.com",
];

/// Rejects commits made by automation accounts so bot churn does not
/// register as contributor activity.
pub struct AutomationFilter;

impl Ruleset for AutomationFilter {
    fn name(&self) -> &'static str {
        "automation-filter"
    }

    fn is_entry_acceptable(&self, entry: &CommitEntry) -> Result<bool> {
        let email = entry.author_email.to_lowercase();
        if BOT_EMAILS.contains(&email.as_str()) {
            return Ok(false);
        }
        if entry.author_name.ends_with("[bot]") || email.starts_with("bot@") {
            return Ok(false);
        }
        Ok(true)
    }
}

// Name pairs seen in the wild for the same person; tenure windows are
// keyed by author name, so split identities would show up as two
// short-lived contributors.
const NAME_ALIASES: &[(&str, &str)] = &[("Montel Laurent", "Laurent Montel")];

/// Canonicalizes author names that changed spelling over a project's
/// history.
pub struct IdentityAliases;

impl Ruleset for IdentityAliases {
    fn name(&self) -> &'static str {
        "identity-aliases"
    }

    fn postprocess_entry(&self, entry: &mut CommitEntry) -> Result<()> {
        for (alias, canonical) in NAME_ALIASES {
            if entry.author_name == *alias {
                entry.author_name = (*canonical).to_string();
            }
        }
        Ok(())
    }
}
