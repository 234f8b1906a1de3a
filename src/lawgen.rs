//! Law-file generation
//!
//! Discovered laws are materialized as generated source artifacts at a
//! deterministic path: `{base_path}/{domain}/{TitleCasedName}Law.rs`. This
//! is purely a code-generation side effect for external tooling; nothing
//! in the core consults the generated files at runtime.

use crate::error::{CrucibleError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Description of a discovered law
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawSpec {
    /// Law name; title-cased to form the generated type name
    pub name: String,
    /// Domain the law was discovered in
    pub domain: String,
    /// Optional formula describing the law
    pub formula: Option<String>,
}

impl LawSpec {
    /// Create a law description
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            formula: None,
        }
    }

    /// Attach a formula (builder style)
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }
}

/// Configuration for law-file generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawGenConfig {
    /// Root directory generated files are placed under
    pub base_path: PathBuf,
    /// Optional on-disk template overriding the built-in one
    pub template_path: Option<PathBuf>,
}

impl LawGenConfig {
    /// Create a configuration rooted at the given path
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            template_path: None,
        }
    }

    /// Use an on-disk template (builder style)
    pub fn with_template(mut self, template_path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(template_path.into());
        self
    }
}

const DEFAULT_TEMPLATE: &str = r#"//! Auto-generated law definition for the `{{domain}}` domain.

/// {{name}} law discovered during a research session.
pub struct {{name}}Law;

impl {{name}}Law {
    /// Human-readable formula for this law.
    pub const FORMULA: &'static str = "{{formula}}";

    /// Domain this law was discovered in.
    pub const DOMAIN: &'static str = "{{domain}}";
}
"#;

/// Title-case a law name: `"quantum gravity"` becomes `"QuantumGravity"`
///
/// Words are split on whitespace, hyphens and underscores; non-alphanumeric
/// characters are dropped so the result is a valid type-name fragment.
pub fn title_case(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
            let mut chars = cleaned.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Deterministic path of the artifact generated for a law
pub fn law_file_path(spec: &LawSpec, config: &LawGenConfig) -> PathBuf {
    config
        .base_path
        .join(&spec.domain)
        .join(format!("{}Law.rs", title_case(&spec.name)))
}

/// Generate the source artifact for a discovered law
///
/// Renders the template (built-in by default), creates the domain
/// directory and writes the file, returning its path. An existing file at
/// the target path is overwritten: regeneration is idempotent.
pub fn generate_law_file(spec: &LawSpec, config: &LawGenConfig) -> Result<PathBuf> {
    if spec.name.trim().is_empty() {
        return Err(CrucibleError::lawgen("law name must not be empty"));
    }
    if spec.domain.trim().is_empty() {
        return Err(CrucibleError::lawgen("law domain must not be empty"));
    }
    let type_name = title_case(&spec.name);
    if type_name.is_empty() {
        return Err(CrucibleError::lawgen(format!(
            "law name '{}' has no usable characters",
            spec.name
        )));
    }

    let template = match &config.template_path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CrucibleError::lawgen(format!("failed to read template: {}", e)))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let rendered = template
        .replace("{{name}}", &type_name)
        .replace("{{domain}}", &spec.domain)
        .replace("{{formula}}", spec.formula.as_deref().unwrap_or("unspecified"));

    let path = law_file_path(spec, config);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CrucibleError::lawgen(format!("failed to create dir: {}", e)))?;
    }
    std::fs::write(&path, rendered)
        .map_err(|e| CrucibleError::lawgen(format!("failed to write law file: {}", e)))?;

    info!(path = %path.display(), law = %spec.name, "generated law file");
    Ok(path)
}

/// Whether a law artifact already exists for the spec
pub fn law_file_exists(spec: &LawSpec, config: &LawGenConfig) -> bool {
    law_file_path(spec, config).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("quantum gravity"), "QuantumGravity");
        assert_eq!(title_case("thermo_dynamic-flux"), "ThermoDynamicFlux");
        assert_eq!(title_case("already"), "Already");
        assert_eq!(title_case("with  spaces"), "WithSpaces");
    }

    #[test]
    fn test_deterministic_path() {
        let spec = LawSpec::new("quantum gravity", "physics");
        let config = LawGenConfig::new("/tmp/laws");
        assert_eq!(
            law_file_path(&spec, &config),
            PathBuf::from("/tmp/laws/physics/QuantumGravityLaw.rs")
        );
    }

    #[test]
    fn test_generate_with_default_template() {
        let dir = tempfile::tempdir().unwrap();
        let spec = LawSpec::new("emergent stability", "systems")
            .with_formula("S = k * ln(W)");
        let config = LawGenConfig::new(dir.path());

        let path = generate_law_file(&spec, &config).unwrap();
        assert!(path.ends_with("systems/EmergentStabilityLaw.rs"));
        assert!(law_file_exists(&spec, &config));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("pub struct EmergentStabilityLaw;"));
        assert!(contents.contains("S = k * ln(W)"));
        assert!(contents.contains("\"systems\""));
    }

    #[test]
    fn test_generate_without_formula() {
        let dir = tempfile::tempdir().unwrap();
        let spec = LawSpec::new("drift", "metrics");
        let config = LawGenConfig::new(dir.path());

        let path = generate_law_file(&spec, &config).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("unspecified"));
    }

    #[test]
    fn test_template_override() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("law.tmpl");
        std::fs::write(&template_path, "law {{name}} in {{domain}}").unwrap();

        let spec = LawSpec::new("custom", "misc");
        let config = LawGenConfig::new(dir.path()).with_template(&template_path);

        let path = generate_law_file(&spec, &config).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "law Custom in misc");
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let config = LawGenConfig::new("/tmp/laws");
        assert!(generate_law_file(&LawSpec::new("", "physics"), &config).is_err());
        assert!(generate_law_file(&LawSpec::new("name", "  "), &config).is_err());
        assert!(generate_law_file(&LawSpec::new("???", "physics"), &config).is_err());
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let spec = LawSpec::new("x", "y");
        let config = LawGenConfig::new(dir.path()).with_template(dir.path().join("absent.tmpl"));
        assert!(generate_law_file(&spec, &config).is_err());
    }
}
