//! Page markers used to tell authenticated pages from login pages
//!
//! The portal answers 200 for both outcomes of a login, so the only signal
//! is the markup itself.

use scraper::{Html, Selector};

use crate::domain::DomainError;

/// Lowercased phrases the portal shows next to a rejected login
const FAILURE_PHRASES: &[&str] = &[
    "invalid",
    "incorrect",
    "wrong password",
    "login failed",
    "authentication failed",
];

/// Lowercased fragment of the login form's action
const LOGIN_ACTION: &str = "loginauth.php";

/// Elements whose text is never shown to the user
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

pub(super) fn selector(css: &'static str) -> Result<Selector, DomainError> {
    Selector::parse(css)
        .map_err(|e| DomainError::internal(format!("Invalid selector '{}': {}", css, e)))
}

/// A form posting to the login endpoint with a password field
///
/// Password inputs elsewhere (e.g. a change-password widget on the
/// dashboard) do not count.
pub(super) fn has_login_form(document: &Html) -> Result<bool, DomainError> {
    let forms = selector("form[action]")?;
    let passwords = selector("input[type]")?;

    Ok(document.select(&forms).any(|form| {
        let posts_to_login = form
            .value()
            .attr("action")
            .is_some_and(|action| action.to_ascii_lowercase().contains(LOGIN_ACTION));

        posts_to_login
            && form.select(&passwords).any(|input| {
                input
                    .value()
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("password"))
            })
    }))
}

/// Only authenticated pages link to the logout endpoint
pub(super) fn has_logout_link(document: &Html) -> Result<bool, DomainError> {
    let links = selector("a[href]")?;

    Ok(document.select(&links).any(|link| {
        link.value()
            .attr("href")
            .is_some_and(|href| href.to_ascii_lowercase().contains("logout"))
    }))
}

/// First failure phrase found in the visible text, if any
pub(super) fn failure_phrase(document: &Html) -> Option<&'static str> {
    let text = visible_text(document).to_lowercase();

    FAILURE_PHRASES
        .iter()
        .copied()
        .find(|phrase| text.contains(phrase))
}

/// Page text outside script, style and similar non-rendered elements
fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
            });
            (!hidden).then(|| String::from(&**text))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
