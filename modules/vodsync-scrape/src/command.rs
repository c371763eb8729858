//! Scraper argument construction and shell-style quoting.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::scrape::ScrapeOptions;

/// Build the full argument list for one scraper invocation. The target URL
/// is always the last positional argument.
pub fn build_args(options: &ScrapeOptions, url: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    if options.verbose {
        args.push("--verbose".to_string());
    }

    args.extend(
        [
            "--ignore-errors",
            "--no-warnings",
            "--dump-json",
            "--skip-download",
            "--yes-playlist",
        ]
        .map(String::from),
    );

    if let Some(max) = options.max_videos {
        args.push("--playlist-end".to_string());
        args.push(max.to_string());
    }

    args.extend(options.extra_args.iter().cloned());
    args.push(url.to_string());
    args
}

/// Split a shell-quoted string into arguments: double-quoted, single-quoted
/// or bare whitespace-separated tokens. Quotes are stripped, not unescaped.
pub fn split_args(raw: &str) -> Vec<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let token = TOKEN.get_or_init(|| {
        Regex::new(r#""([^"]*)"|'([^']*)'|(\S+)"#).expect("token regex is valid")
    });

    token
        .captures_iter(raw)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Render the command line the way a shell user could copy-paste it.
pub fn shell_join(executable: &Path, args: &[String]) -> String {
    std::iter::once(executable.display().to_string())
        .chain(args.iter().cloned())
        .map(|part| shell_quote(&part))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(value: &str) -> String {
    static SAFE: OnceLock<Regex> = OnceLock::new();
    let safe = SAFE.get_or_init(|| Regex::new(r"^[\w@%+=:,./-]+$").expect("safe regex is valid"));

    if safe.is_match(value) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
