/// Environment variable the credential is read from when `--token-env` is not given.
pub const DEFAULT_TOKEN_ENV: &str = "PAT";

/// Consulted when the primary variable is unset.
pub const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Where the credential came from, for startup logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Flag,
    Env(String),
}

/// Runtime settings resolved once at startup and passed into the server.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: Option<String>,
    pub token_source: Option<TokenSource>,
    pub api_url: String,
    pub extras: bool,
}

/// Resolve the credential: `--token` > `--token-env` (or `PAT`) > `GITHUB_TOKEN`.
///
/// Empty values count as unset. `lookup` reads a variable; `main` passes
/// `std::env::var`, tests pass a map.
pub fn resolve_token<F>(
    explicit: Option<String>,
    token_env: Option<&str>,
    lookup: F,
) -> Option<(String, TokenSource)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(t) = explicit.filter(|t| !t.is_empty()) {
        return Some((t, TokenSource::Flag));
    }

    let primary = token_env.unwrap_or(DEFAULT_TOKEN_ENV);
    let mut candidates = vec![primary];
    if token_env.is_none() {
        candidates.push(FALLBACK_TOKEN_ENV);
    }

    candidates.into_iter().find_map(|name| {
        lookup(name)
            .filter(|t| !t.is_empty())
            .map(|t| (t, TokenSource::Env(name.to_string())))
    })
}
