// Copyright (c) 2022 John Ingve Olsen
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use std::{
    env,
    path::{Path, MAIN_SEPARATOR},
};

/// Picks the icon to send: `icon`, or `fallback` if `icon` is empty.
pub fn effective<'a>(icon: &'a str, fallback: &'a str) -> &'a str {
    if icon.is_empty() {
        fallback
    } else {
        icon
    }
}

/// Turns relative icon paths into absolute ones, as the server resolves
/// paths against its own working directory.
///
/// URIs and absolute paths are returned unchanged. A bare name without a
/// path separator that isn't a file in the current directory is an icon
/// theme name and is left alone.
pub fn resolve(icon: &str) -> String {
    if icon.is_empty() || icon.contains("://") {
        return icon.to_string();
    }

    let path = Path::new(icon);
    if path.is_absolute() || (is_bare_name(icon) && !path.exists()) {
        return icon.to_string();
    }

    match env::current_dir() {
        Ok(cwd) => cwd.join(path).to_string_lossy().into_owned(),
        Err(e) => {
            log::warn!("could not resolve icon path {}: {}", icon, e);
            icon.to_string()
        }
    }
}

fn is_bare_name(icon: &str) -> bool {
    !icon.contains('/') && !icon.contains(MAIN_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective() {
        assert_eq!(effective("", "app.png"), "app.png");
        assert_eq!(effective("dialog-information", "app.png"), "dialog-information");
        assert_eq!(effective("", ""), "");
    }

    #[test]
    fn test_resolve_passes_through() {
        assert_eq!(resolve(""), "");
        assert_eq!(resolve("file:///tmp/icon.png"), "file:///tmp/icon.png");
        assert_eq!(resolve("/usr/share/icons/icon.png"), "/usr/share/icons/icon.png");
        assert_eq!(resolve("dialog-information"), "dialog-information");
    }

    #[test]
    fn test_resolve_relative_path_that_does_not_exist() {
        let resolved = resolve("icons/not-yet-there.png");
        assert!(Path::new(&resolved).is_absolute());
        assert_eq!(
            resolved,
            env::current_dir()
                .unwrap()
                .join("icons/not-yet-there.png")
                .to_string_lossy()
        );

        assert!(Path::new(&resolve("./app.png")).is_absolute());
    }

    #[test]
    fn test_resolve_relative_file() {
        // cargo runs tests from the package root
        let resolved = resolve("Cargo.toml");
        assert!(Path::new(&resolved).is_absolute());
        assert!(resolved.ends_with("Cargo.toml"));
    }
}
