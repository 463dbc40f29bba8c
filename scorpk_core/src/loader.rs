//! Scorpk program and configuration loader

use crate::config::InterpreterConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An immutable line sequence, shared by every evaluation level
#[derive(Debug, Clone)]
pub struct Program {
    lines: Arc<[String]>,
}

impl Program {
    /// Split source text into lines
    pub fn from_source(source: &str) -> Self {
        let lines: Vec<String> = source.lines().map(String::from).collect();
        Self {
            lines: lines.into(),
        }
    }

    /// All lines, in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the program has no lines at all
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line would reach the classifier
    pub fn has_statements(&self) -> bool {
        self.lines.iter().any(|l| !is_skipped(l))
    }
}

/// Blank lines and `//` comments never reach the classifier
pub fn is_skipped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("//")
}

/// Loads Scorpk source files and interpreter configuration
pub struct ScriptLoader {
    /// Base path for resolving relative paths
    base_path: Option<PathBuf>,
}

impl ScriptLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// Create a loader with a base path
    pub fn with_base_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            base_path: Some(path.as_ref().to_path_buf()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Load a program from a file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Program> {
        let path = self.resolve(path.as_ref());
        tracing::debug!("Loading program from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        Ok(self.load_string(&content))
    }

    /// Load a program from source text
    pub fn load_string(&self, content: &str) -> Program {
        let program = Program::from_source(content);
        if !program.has_statements() {
            tracing::warn!("Program has no statements");
        }
        program
    }

    /// Load interpreter configuration from a YAML file
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<InterpreterConfig> {
        let path = self.resolve(path.as_ref());
        tracing::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        self.load_config_string(&content)
    }

    /// Load interpreter configuration from a YAML string
    pub fn load_config_string(&self, content: &str) -> Result<InterpreterConfig> {
        if content.trim().is_empty() {
            return Ok(InterpreterConfig::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScorpkError;

    #[test]
    fn test_load_handles_crlf() {
        let loader = ScriptLoader::new();
        let program = loader.load_string("let a = 3;\r\nprint(a);\r\n");

        assert_eq!(program.len(), 2);
        assert_eq!(program.lines()[0], "let a = 3;");
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        assert!(is_skipped(""));
        assert!(is_skipped("   "));
        assert!(is_skipped("  // note"));
        assert!(!is_skipped("print(1); // trailing"));

        let program = Program::from_source("// only a comment\n\n");
        assert!(!program.has_statements());
    }

    #[test]
    fn test_missing_file() {
        let loader = ScriptLoader::with_base_path("/nonexistent-scorpk-dir");
        let result = loader.load_file("missing.scpk");
        assert!(matches!(result, Err(ScorpkError::IoError(_))));
    }

    #[test]
    fn test_load_config() {
        let loader = ScriptLoader::new();
        let config = loader
            .load_config_string("error_prefix: \"!! \"\nlog_filter: debug\n")
            .unwrap();
        assert_eq!(config.error_prefix, "!! ");
        assert_eq!(config.log_filter, "debug");

        assert_eq!(
            loader.load_config_string("").unwrap(),
            InterpreterConfig::default()
        );
        assert!(loader.load_config_string("announce_states: [1").is_err());
    }
}
