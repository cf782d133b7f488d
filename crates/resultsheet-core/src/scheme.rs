//! Scheme registry.
//!
//! Scheme weighting tables are deployment configuration: a versioned TOML
//! document parsed once at startup into an immutable [`SchemeRegistry`].
//! The built-in document ships with the crate; a deployment can replace it
//! with its own file.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{SchemeConfigError, SheetError};
use crate::model::{CompetencyUnit, Scheme};

/// Configuration format version understood by this build.
pub const SCHEME_CONFIG_VERSION: u32 = 1;

/// The scheme configuration shipped with the crate.
pub const BUILTIN_SCHEMES: &str = include_str!("../schemes.toml");

/// Intermediate TOML structure for scheme configuration files.
#[derive(Debug, Deserialize)]
struct TomlSchemeFile {
    version: u32,
    #[serde(default)]
    schemes: Vec<TomlScheme>,
}

#[derive(Debug, Deserialize)]
struct TomlScheme {
    id: String,
    pass_threshold: f64,
    #[serde(default)]
    units: Vec<TomlUnit>,
}

#[derive(Debug, Deserialize)]
struct TomlUnit {
    code: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    theory: f64,
    #[serde(default)]
    viva: f64,
    #[serde(default)]
    practical: f64,
    #[serde(default)]
    project: f64,
}

/// Read-only registry of schemes keyed by id, in configuration order.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    version: u32,
    schemes: Vec<Scheme>,
}

impl SchemeRegistry {
    /// The registry built from the configuration embedded in the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_SCHEMES, Path::new("<builtin schemes.toml>"))
    }

    /// Load a registry from a scheme configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scheme file: {}", path.display()))?;
        Self::from_toml_str(&content, path)
    }

    /// Parse a scheme configuration document (useful for testing).
    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self> {
        let parsed: TomlSchemeFile = toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

        if parsed.version != SCHEME_CONFIG_VERSION {
            return Err(SchemeConfigError::UnsupportedVersion {
                found: parsed.version,
                expected: SCHEME_CONFIG_VERSION,
            })
            .with_context(|| format!("invalid scheme file: {}", source_path.display()));
        }

        let schemes = parsed
            .schemes
            .into_iter()
            .map(|s| Scheme {
                id: s.id,
                pass_threshold: s.pass_threshold,
                units: s
                    .units
                    .into_iter()
                    .map(|u| CompetencyUnit {
                        name: u.name.unwrap_or_else(|| u.code.clone()),
                        code: u.code,
                        theory_weight: u.theory,
                        viva_weight: u.viva,
                        practical_weight: u.practical,
                        project_weight: u.project,
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        check_schemes(&schemes)
            .with_context(|| format!("invalid scheme file: {}", source_path.display()))?;

        tracing::debug!(
            "loaded {} scheme(s) from {}",
            schemes.len(),
            source_path.display()
        );

        Ok(Self {
            version: parsed.version,
            schemes,
        })
    }

    /// Resolve a scheme by id.
    pub fn get(&self, id: &str) -> Result<&Scheme, SheetError> {
        self.schemes
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SheetError::UnknownScheme(id.to_string()))
    }

    /// Resolve a scheme that can produce a result sheet (at least one unit).
    pub fn get_scoreable(&self, id: &str) -> Result<&Scheme, SheetError> {
        let scheme = self.get(id)?;
        if scheme.units.is_empty() {
            return Err(SheetError::EmptyModuleList(scheme.id.clone()));
        }
        Ok(scheme)
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemes.iter().map(|s| s.id.as_str())
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

/// Hard errors: anything that would make scoring meaningless.
fn check_schemes(schemes: &[Scheme]) -> Result<(), SchemeConfigError> {
    let mut seen_schemes = HashSet::new();
    for scheme in schemes {
        if scheme.id.trim().is_empty() {
            return Err(SchemeConfigError::EmptySchemeId);
        }
        if !seen_schemes.insert(scheme.id.as_str()) {
            return Err(SchemeConfigError::DuplicateScheme(scheme.id.clone()));
        }
        if !(0.0..=100.0).contains(&scheme.pass_threshold) {
            return Err(SchemeConfigError::InvalidThreshold {
                scheme: scheme.id.clone(),
                value: scheme.pass_threshold,
            });
        }

        let mut seen_units = HashSet::new();
        for unit in &scheme.units {
            if unit.code.trim().is_empty() {
                return Err(SchemeConfigError::EmptyUnitCode {
                    scheme: scheme.id.clone(),
                });
            }
            if !seen_units.insert(unit.code.as_str()) {
                return Err(SchemeConfigError::DuplicateUnit {
                    scheme: scheme.id.clone(),
                    code: unit.code.clone(),
                });
            }
            let weights = [
                ("theory", unit.theory_weight),
                ("viva", unit.viva_weight),
                ("practical", unit.practical_weight),
                ("project", unit.project_weight),
            ];
            for (field, value) in weights {
                if !value.is_finite() || value < 0.0 {
                    return Err(SchemeConfigError::InvalidWeight {
                        scheme: scheme.id.clone(),
                        code: unit.code.clone(),
                        field,
                        value,
                    });
                }
            }
        }
    }
    Ok(())
}

/// A warning from scheme validation.
#[derive(Debug, Clone)]
pub struct SchemeWarning {
    /// The scheme ID.
    pub scheme_id: String,
    /// Warning message.
    pub message: String,
}

/// Check a loaded registry for configurations that load but cannot score.
pub fn validate_registry(registry: &SchemeRegistry) -> Vec<SchemeWarning> {
    let mut warnings = Vec::new();

    for scheme in registry.schemes() {
        if scheme.units.is_empty() {
            warnings.push(SchemeWarning {
                scheme_id: scheme.id.clone(),
                message: "no competency units defined; result sheets cannot be generated".into(),
            });
            continue;
        }

        if scheme.max_totals().total == 0.0 {
            warnings.push(SchemeWarning {
                scheme_id: scheme.id.clone(),
                message: "all unit weights are zero; every percentage will be 0".into(),
            });
        }

        for unit in &scheme.units {
            if unit.project_weight > 0.0 {
                warnings.push(SchemeWarning {
                    scheme_id: scheme.id.clone(),
                    message: format!(
                        "unit '{}' has a project weight but project marks are never scored",
                        unit.code
                    ),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(toml: &str) -> Result<SchemeRegistry> {
        SchemeRegistry::from_toml_str(toml, &PathBuf::from("test.toml"))
    }

    #[test]
    fn builtin_registry_has_three_schemes() {
        let registry = SchemeRegistry::builtin().unwrap();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["mbjr", "pg", "sewage_treatment"]);
        assert_eq!(registry.version(), 1);

        let thresholds: Vec<f64> = registry
            .schemes()
            .iter()
            .map(|s| s.pass_threshold)
            .collect();
        assert_eq!(thresholds, vec![60.0, 60.0, 80.0]);
    }

    #[test]
    fn builtin_pg_units_in_order() {
        let registry = SchemeRegistry::builtin().unwrap();
        let pg = registry.get("pg").unwrap();
        assert_eq!(pg.units.len(), 7);
        assert_eq!(pg.units[0].code, "PSC/N0130");
        assert_eq!(pg.units[0].theory_weight, 15.0);
        assert_eq!(pg.units[5].practical_weight, 20.0);
        assert_eq!(pg.units[6].code, "DGT/VSQ/N0102");
        assert_eq!(pg.max_totals().total, 105.0 + 35.0 + 170.0);
    }

    #[test]
    fn builtin_sewage_treatment_totals() {
        let registry = SchemeRegistry::builtin().unwrap();
        let max = registry.get("sewage_treatment").unwrap().max_totals();
        assert_eq!(max.theory, 170.0);
        assert_eq!(max.viva, 50.0);
        assert_eq!(max.practical, 330.0);
        assert_eq!(max.total, 550.0);
    }

    #[test]
    fn unit_name_defaults_to_code() {
        let registry = SchemeRegistry::builtin().unwrap();
        let mbjr = registry.get("mbjr").unwrap();
        assert_eq!(mbjr.units[2].name, "Module 3");
    }

    #[test]
    fn unknown_scheme_is_error() {
        let registry = SchemeRegistry::builtin().unwrap();
        assert_eq!(
            registry.get("nope").unwrap_err(),
            SheetError::UnknownScheme("nope".into())
        );
    }

    #[test]
    fn empty_unit_list_loads_but_is_not_scoreable() {
        let registry = parse(
            r#"
version = 1

[[schemes]]
id = "empty"
pass_threshold = 50
"#,
        )
        .unwrap();
        assert!(registry.get("empty").is_ok());
        assert_eq!(
            registry.get_scoreable("empty").unwrap_err(),
            SheetError::EmptyModuleList("empty".into())
        );
        let warnings = validate_registry(&registry);
        assert!(warnings.iter().any(|w| w.message.contains("no competency units")));
    }

    #[test]
    fn rejects_duplicate_unit_codes() {
        let result = parse(
            r#"
version = 1

[[schemes]]
id = "dupes"
pass_threshold = 50

[[schemes.units]]
code = "A"
theory = 10

[[schemes.units]]
code = "A"
theory = 10
"#,
        );
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
    }

    #[test]
    fn rejects_negative_weight_and_bad_threshold() {
        let negative = parse(
            r#"
version = 1

[[schemes]]
id = "neg"
pass_threshold = 50

[[schemes.units]]
code = "A"
viva = -1
"#,
        );
        assert!(format!("{:#}", negative.unwrap_err()).contains("viva weight"));

        let threshold = parse(
            r#"
version = 1

[[schemes]]
id = "high"
pass_threshold = 120
"#,
        );
        assert!(format!("{:#}", threshold.unwrap_err()).contains("pass threshold"));
    }

    #[test]
    fn rejects_unknown_version() {
        let result = parse("version = 2\n");
        assert!(format!("{:#}", result.unwrap_err()).contains("version 2"));
    }

    #[test]
    fn parse_malformed_toml() {
        assert!(parse("this is not [valid toml }{").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemes.toml");
        std::fs::write(
            &path,
            r#"
version = 1

[[schemes]]
id = "custom"
pass_threshold = 40

[[schemes.units]]
code = "U1"
name = "Unit One"
theory = 50
practical = 50
"#,
        )
        .unwrap();

        let registry = SchemeRegistry::from_path(&path).unwrap();
        let custom = registry.get_scoreable("custom").unwrap();
        assert_eq!(custom.units[0].name, "Unit One");
        assert_eq!(custom.max_totals().total, 100.0);
        assert!(validate_registry(&registry).is_empty());
    }
}
