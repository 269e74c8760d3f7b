//! Platform registry
//!
//! Each [`Platform`] bundles a profile-URL template and an ordered list of
//! display-name patterns. New platforms register here; the prober and
//! classifier never special-case a platform by name.

use regex::Regex;

/// The placeholder substituted with the identifier in templates/patterns
const IDENTIFIER_SLOT: &str = "{}";

/// One probeable platform
#[derive(Debug, Clone)]
pub struct Platform {
    /// Display name, unique within a registry
    pub name: String,

    /// Profile URL template with a `{}` identifier slot
    pub url_template: String,

    /// Ordered display-name regex patterns; `{}` expands to the
    /// identifier, first match wins, group 1 is the name
    pub display_name_patterns: Vec<String>,
}

impl Platform {
    /// Creates a platform with no display-name patterns
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            display_name_patterns: Vec::new(),
        }
    }

    /// Attaches display-name patterns
    pub fn with_display_patterns(mut self, patterns: Vec<String>) -> Self {
        self.display_name_patterns = patterns;
        self
    }

    /// Builds the profile URL for an identifier
    pub fn profile_url(&self, identifier: &str) -> String {
        self.url_template.replace(IDENTIFIER_SLOT, identifier)
    }

    /// Tries each display-name pattern in order against the page body
    ///
    /// Patterns that fail to compile after identifier substitution are
    /// skipped; a match without a capture group is ignored.
    pub fn extract_display_name(&self, body: &str, identifier: &str) -> Option<String> {
        for pattern in &self.display_name_patterns {
            let expanded = pattern.replace(IDENTIFIER_SLOT, &regex::escape(identifier));
            let re = match Regex::new(&expanded) {
                Ok(re) => re,
                Err(_) => continue,
            };
            if let Some(captures) = re.captures(body) {
                if let Some(m) = captures.get(1) {
                    let name = m.as_str().trim();
                    if !name.is_empty() {
                        return Some(name.to_string());
                    }
                }
            }
        }
        None
    }
}

/// A named collection of platforms
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
}

impl PlatformRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a platform, replacing any existing one with the same name
    pub fn register(&mut self, platform: Platform) {
        self.platforms.retain(|p| p.name != platform.name);
        self.platforms.push(platform);
    }

    /// Iterates over the registered platforms
    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    /// Number of registered platforms
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// The built-in registry of well-known platforms
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(
            Platform::new("Twitter", "https://twitter.com/{}").with_display_patterns(vec![
                r"<title>([^<]+) \(@[^)]+\)</title>".to_string(),
                r#"<meta name="description" content="([^"]+)""#.to_string(),
            ]),
        );
        registry.register(
            Platform::new("Instagram", "https://instagram.com/{}").with_display_patterns(vec![
                r"<title>@{} \(([^)]+)\)".to_string(),
                r#""full_name":"([^"]+)""#.to_string(),
            ]),
        );
        registry.register(
            Platform::new("GitHub", "https://github.com/{}").with_display_patterns(vec![
                r"<title>{} \(([^)]+)\)".to_string(),
                r#"<span class="p-name vcard-fullname"[^>]*>([^<]+)</span>"#.to_string(),
            ]),
        );
        registry.register(
            Platform::new("Reddit", "https://reddit.com/user/{}").with_display_patterns(vec![
                r"<title>([^<]+) \(u/{}\)".to_string(),
            ]),
        );
        registry.register(
            Platform::new("YouTube", "https://youtube.com/@{}").with_display_patterns(vec![
                r"<title>([^<]+) - YouTube</title>".to_string(),
                r#""author":"([^"]+)""#.to_string(),
            ]),
        );

        for (name, template) in [
            ("Linktree", "https://linktr.ee/{}"),
            ("TikTok", "https://tiktok.com/@{}"),
            ("Twitch", "https://twitch.tv/{}"),
            ("Steam", "https://steamcommunity.com/id/{}"),
            ("Pinterest", "https://pinterest.com/{}"),
            ("Medium", "https://medium.com/@{}"),
            ("Dev.to", "https://dev.to/{}"),
            ("Keybase", "https://keybase.io/{}"),
            ("Telegram", "https://t.me/{}"),
            ("SoundCloud", "https://soundcloud.com/{}"),
            ("Flickr", "https://flickr.com/people/{}"),
            ("Imgur", "https://imgur.com/user/{}"),
            ("DeviantArt", "https://deviantart.com/{}"),
            ("Behance", "https://behance.net/{}"),
            ("Dribbble", "https://dribbble.com/{}"),
            ("ArtStation", "https://artstation.com/{}"),
            ("Patreon", "https://patreon.com/{}"),
            ("Substack", "https://substack.com/profile/{}"),
            ("Letterboxd", "https://letterboxd.com/{}"),
            ("Lichess", "https://lichess.org/@/{}"),
            ("Replit", "https://replit.com/@{}"),
            ("CodePen", "https://codepen.io/{}"),
            ("NPM", "https://npmjs.com/~{}"),
            ("PyPI", "https://pypi.org/user/{}"),
            ("Docker", "https://hub.docker.com/u/{}"),
        ] {
            registry.register(Platform::new(name, template));
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url_substitution() {
        let platform = Platform::new("GitHub", "https://github.com/{}");
        assert_eq!(platform.profile_url("alice"), "https://github.com/alice");
    }

    #[test]
    fn test_display_name_first_match_wins() {
        let platform = Platform::new("X", "https://x.com/{}").with_display_patterns(vec![
            r"<h1>([^<]+)</h1>".to_string(),
            r"<title>([^<]+)</title>".to_string(),
        ]);
        let body = "<title>Title Name</title><h1>Header Name</h1>";
        assert_eq!(
            platform.extract_display_name(body, "alice"),
            Some("Header Name".to_string())
        );
    }

    #[test]
    fn test_display_name_identifier_substitution() {
        let platform = Platform::new("Instagram", "https://instagram.com/{}")
            .with_display_patterns(vec![r"<title>@{} \(([^)]+)\)".to_string()]);
        let body = "<title>@alice (Alice Liddell)</title>";
        assert_eq!(
            platform.extract_display_name(body, "alice"),
            Some("Alice Liddell".to_string())
        );
    }

    #[test]
    fn test_display_name_identifier_is_escaped() {
        // Regex metacharacters in the identifier must not break the pattern
        let platform = Platform::new("X", "https://x.com/{}")
            .with_display_patterns(vec![r"<title>@{} \(([^)]+)\)".to_string()]);
        assert_eq!(platform.extract_display_name("<title>@a.b (N)</title>", "a.b"), Some("N".to_string()));
        assert_eq!(platform.extract_display_name("<title>@aXb (N)</title>", "a.b"), None);
    }

    #[test]
    fn test_display_name_absent_on_no_match() {
        let platform = Platform::new("X", "https://x.com/{}")
            .with_display_patterns(vec![r"<h1>([^<]+)</h1>".to_string()]);
        assert_eq!(platform.extract_display_name("<p>nothing</p>", "alice"), None);
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = PlatformRegistry::new();
        registry.register(Platform::new("X", "https://x.com/{}"));
        registry.register(Platform::new("X", "https://x.org/{}"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.iter().next().unwrap().url_template,
            "https://x.org/{}"
        );
    }

    #[test]
    fn test_builtin_registry() {
        let registry = PlatformRegistry::builtin();
        assert!(registry.len() >= 25);
        let github = registry.iter().find(|p| p.name == "GitHub").unwrap();
        assert!(!github.display_name_patterns.is_empty());
    }
}
