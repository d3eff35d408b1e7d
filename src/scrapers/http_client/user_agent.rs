//! User agent handling for HTTP requests.

pub const USER_AGENT: &str = "jobacquire/0.3 (job listing catalog; github.com/jobacquire/jobacquire)";

/// Browser-like identity for static fetches of the listings page.
///
/// The target site serves a reduced page to obvious bots, so the static
/// tier presents a mainstream browser user agent.
pub const STATIC_FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Resolve user agent from config value.
/// - None => browser-like static fetch user agent
/// - "plain" => the jobacquire user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => STATIC_FETCH_USER_AGENT.to_string(),
        Some("plain") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent_default() {
        let ua = resolve_user_agent(None);
        assert!(ua.contains("Mozilla"));
    }

    #[test]
    fn test_resolve_user_agent_plain() {
        let ua = resolve_user_agent(Some("plain"));
        assert!(ua.contains("jobacquire"));
    }

    #[test]
    fn test_resolve_user_agent_custom() {
        let ua = resolve_user_agent(Some("MyBot/1.0"));
        assert_eq!(ua, "MyBot/1.0");
    }
}
