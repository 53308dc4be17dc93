//! Structural checks on catalog packages.
//!
//! Every problem in a package is reported, not just the first one.

use std::collections::HashSet;
use std::fmt;

use crate::model::{ConstraintSelection, Package};
use crate::version::{Range, range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    Invalid { value: String },
}

/// One problem at one field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub detail: String,
}

impl FieldError {
    fn required(field: String) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Required,
            detail: "cannot be empty".to_string(),
        }
    }

    fn invalid(field: String, value: &str, detail: impl Into<String>) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Invalid {
                value: value.to_string(),
            },
            detail: detail.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::Required => {
                write!(f, "{}: Required value: {}", self.field, self.detail)
            }
            FieldErrorKind::Invalid { value } => {
                write!(f, "{}: Invalid value: \"{}\": {}", self.field, value, self.detail)
            }
        }
    }
}

pub fn validate_package(package: &Package) -> Vec<FieldError> {
    let spec = &package.spec;
    let mut errors = Vec::new();

    if spec.ref_name.trim().is_empty() {
        errors.push(FieldError::required("spec.refName".into()));
    }
    if range::parse_relaxed(&spec.version).is_err() {
        errors.push(FieldError::invalid(
            "spec.version".into(),
            &spec.version,
            "must be valid semver",
        ));
    }

    let mut seen = HashSet::new();
    for (i, dependency) in spec.dependencies.iter().enumerate() {
        let field = format!("spec.dependencies[{}]", i);
        if dependency.name.is_empty() {
            errors.push(FieldError::required(format!("{}.name", field)));
        } else if !seen.insert(dependency.name.as_str()) {
            errors.push(FieldError::invalid(
                format!("{}.name", field),
                &dependency.name,
                "should be unique",
            ));
        }
        if let Some(package_ref) = &dependency.package {
            if package_ref.ref_name.is_empty() {
                errors.push(FieldError::required(format!("{}.package.refName", field)));
            }
        }
    }

    check_constraint(
        &mut errors,
        "spec.controllerVersionSelection.constraints",
        spec.controller_version_selection.as_ref(),
    );
    check_constraint(
        &mut errors,
        "spec.kubernetesVersionSelection.constraints",
        spec.kubernetes_version_selection.as_ref(),
    );

    errors
}

fn check_constraint(
    errors: &mut Vec<FieldError>,
    field: &str,
    selection: Option<&ConstraintSelection>,
) {
    let Some(selection) = selection else {
        return;
    };
    if let Err(e) = Range::parse(&selection.constraints) {
        errors.push(FieldError::invalid(
            field.to_string(),
            &selection.constraints,
            e.to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dependency;

    fn messages(package: &Package) -> Vec<String> {
        validate_package(package)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_valid_package() {
        let package = Package::new("default", "app", "1.0.0")
            .with_dependency(Dependency::bound("dep-1", "child", ">=1.0.0"))
            .with_dependency(Dependency::placeholder("dep-2"))
            .with_controller_constraint(">=0.40.0")
            .with_kubernetes_constraint(">=1.25.0 <1.31.0");
        assert!(validate_package(&package).is_empty());
    }

    #[test]
    fn test_dependency_problems_are_all_reported() {
        let package = Package::new("default", "app", "1.0.0")
            .with_dependency(Dependency::bound("", "child", "1.0.0"))
            .with_dependency(Dependency::bound("dep", "child", "1.0.0"))
            .with_dependency(Dependency::bound("dep", "other", "1.0.0"))
            .with_dependency(Dependency::bound("dep-3", "", "1.0.0"));

        assert_eq!(
            messages(&package),
            vec![
                "spec.dependencies[0].name: Required value: cannot be empty",
                "spec.dependencies[2].name: Invalid value: \"dep\": should be unique",
                "spec.dependencies[3].package.refName: Required value: cannot be empty",
            ]
        );
    }

    #[test]
    fn test_identity_fields() {
        let package = Package::new("default", "", "latest");
        assert_eq!(
            messages(&package),
            vec![
                "spec.refName: Required value: cannot be empty",
                "spec.version: Invalid value: \"latest\": must be valid semver",
            ]
        );
    }

    #[test]
    fn test_unparsable_constraints() {
        let package = Package::new("default", "app", "1.0.0")
            .with_controller_constraint(">=0.40.0 <")
            .with_kubernetes_constraint("!=1.x");

        let errors = validate_package(&package);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "spec.controllerVersionSelection.constraints");
        assert_eq!(
            errors[0].kind,
            FieldErrorKind::Invalid {
                value: ">=0.40.0 <".into()
            }
        );
        assert_eq!(errors[1].field, "spec.kubernetesVersionSelection.constraints");
    }
}
