#[cfg(test)]
mod tests {
    use super::super::*;
    use ciliai_miner::AnalysisMode;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_logging_filter() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.filter, "ciliai=debug,info");
        assert!(!logging.json);
    }

    #[test]
    fn test_resolve_path_precedence() {
        let explicit = PathBuf::from("/etc/ciliai/custom.toml");
        assert_eq!(
            Config::resolve_path(Some(&explicit), Some("/tmp/env.toml".into())),
            explicit
        );
        assert_eq!(
            Config::resolve_path(None, Some("/tmp/env.toml".into())),
            PathBuf::from("/tmp/env.toml")
        );
        assert_eq!(Config::resolve_path(None, Some("  ".into())), PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(Config::resolve_path(None, None), PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_missing_file_is_none() {
        let loaded = Config::load(Path::new("/nonexistent/ciliai.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[miner]
mode = "hybrid"
articles_per_gene = 5
pacing_ms = 500
email = "lab@example.org"

[logging]
json = true
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap().unwrap();
        assert_eq!(config.miner.mode, AnalysisMode::Hybrid);
        assert_eq!(config.miner.articles_per_gene, 5);
        assert_eq!(config.miner.pacing_ms, 500);
        assert_eq!(config.miner.email.as_deref(), Some("lab@example.org"));
        assert_eq!(config.miner.max_retries, 3);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "ciliai=debug,info");
        assert!(config.output.json_path.is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[miner\nmode = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_api_key_override() {
        let mut config = Config::default();
        config.miner.api_key = Some("from-file".into());

        config.apply_api_key(Some("  ".into()));
        assert_eq!(config.miner.api_key.as_deref(), Some("from-file"));

        config.apply_api_key(Some("from-env".into()));
        assert_eq!(config.miner.api_key.as_deref(), Some("from-env"));
    }
}
