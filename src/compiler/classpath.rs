//! Backend classpath resolution.

use std::env;

use crate::config::CompilerConfig;

/// Platform separator of classpath entries.
pub const CLASS_PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Configured classpath, or the entries of `$CLASSPATH`.
pub fn resolve_class_path(config: &CompilerConfig) -> Vec<String> {
    if let Some(class_path) = &config.class_path {
        return class_path.clone();
    }

    env::var_os("CLASSPATH")
        .map(|value| {
            env::split_paths(&value)
                .map(|p| p.to_string_lossy().into_owned())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Join entries with the platform separator.
pub fn join_class_path(entries: &[String]) -> String {
    entries.join(CLASS_PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_class_path_wins() {
        let config = CompilerConfig {
            class_path: Some(vec!["lib/a.jar".into()]),
            ..CompilerConfig::default()
        };
        assert_eq!(resolve_class_path(&config), vec!["lib/a.jar"]);
    }

    #[test]
    fn test_join() {
        let joined = join_class_path(&["a".into(), "b".into()]);
        assert_eq!(joined, format!("a{CLASS_PATH_SEPARATOR}b"));
        assert_eq!(join_class_path(&[]), "");
    }
}
