//! Fixed portal addresses

use reqwest::Url;

/// Production portal host
pub const DEFAULT_PORTAL_BASE_URL: &str = "https://sis.nileuniversity.edu.ng";

const SESSION_PATH: &str = "/my/";
const LOGIN_PATH: &str = "/my/loginAuth.php";
const GRADES_PATH: &str = "/my/index.php";
const GRADES_QUERY: &str = "mod=grades";
const LOGOUT_PATH: &str = "/my/logout.php";

/// The four portal pages the scrape pipeline touches, under one base host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalEndpoints {
    base_url: String,
}

impl Default for PortalEndpoints {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_PORTAL_BASE_URL)
    }
}

impl PortalEndpoints {
    /// Points the same paths at another host (mock portals in tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_url(&self) -> String {
        format!("{}{}", self.base_url, SESSION_PATH)
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, LOGIN_PATH)
    }

    pub fn grades_url(&self) -> String {
        format!("{}{}?{}", self.base_url, GRADES_PATH, GRADES_QUERY)
    }

    pub fn logout_url(&self) -> String {
        format!("{}{}", self.base_url, LOGOUT_PATH)
    }

    /// Whether a response was sent back to the session landing page
    ///
    /// An unredirected login post ends on the login path, so only the
    /// landing page counts as a bounce.
    pub fn is_session_page(url: &Url) -> bool {
        let path = url.path();
        path.ends_with(SESSION_PATH) || path.ends_with("/my")
    }

    /// Whether a response's final URL is still the grades page
    pub fn is_grades_page(url: &Url) -> bool {
        url.path().ends_with(GRADES_PATH)
            && url
                .query_pairs()
                .any(|(key, value)| key == "mod" && value == "grades")
    }
}
