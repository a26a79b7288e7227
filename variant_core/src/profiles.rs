//! Output profile catalog.
//!
//! A profile names one rendition of every source image: resize to
//! `target_width`, then keep lowering the encoder quality until the output
//! fits `max_size_kb`. The profile name doubles as the output subfolder name,
//! so every profile writes into its own disjoint subtree.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// One output rendition: target width in pixels and size budget in kilobytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub target_width: u32,
    pub max_size_kb: f64,
}

impl Profile {
    pub fn new(name: impl Into<String>, target_width: u32, max_size_kb: f64) -> Self {
        Self {
            name: name.into(),
            target_width,
            max_size_kb,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("invalid profile spec '{0}' (expected name=width:max_kb, e.g. mobile=800:100)")]
    Parse(String),

    #[error("duplicate profile name: {0}")]
    DuplicateName(String),

    #[error("profile '{0}': target width must be positive")]
    ZeroWidth(String),

    #[error("profile '{0}': size budget must be positive")]
    NonPositiveBudget(String),

    #[error("profile name '{0}' is not usable as a directory name")]
    BadName(String),

    #[error("profile catalog is empty")]
    EmptyCatalog,
}

impl FromStr for Profile {
    type Err = ProfileError;

    /// Parses `name=width:max_kb`, the CLI spelling of a profile.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ProfileError::Parse(s.to_string());

        let (name, rest) = s.split_once('=').ok_or_else(malformed)?;
        let (width, max_kb) = rest.split_once(':').ok_or_else(malformed)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(malformed());
        }

        let target_width: u32 = width.trim().parse().map_err(|_| malformed())?;
        let max_size_kb: f64 = max_kb.trim().parse().map_err(|_| malformed())?;
        if !max_size_kb.is_finite() {
            return Err(malformed());
        }

        Ok(Profile::new(name, target_width, max_size_kb))
    }
}

/// The built-in catalog: a small mobile rendition and a full-width web one.
pub fn default_profiles() -> Vec<Profile> {
    vec![
        Profile::new("mobile", 800, 100.0),
        Profile::new("web", 1920, 300.0),
    ]
}

/// Checks a catalog before a batch run: non-empty, unique names, positive
/// width and budget, names that work as a single path component.
pub fn validate_catalog(profiles: &[Profile]) -> Result<(), ProfileError> {
    if profiles.is_empty() {
        return Err(ProfileError::EmptyCatalog);
    }

    let mut seen: Vec<&str> = Vec::with_capacity(profiles.len());
    for profile in profiles {
        if profile.name.is_empty()
            || profile.name.contains(['/', '\\'])
            || profile.name == "."
            || profile.name == ".."
        {
            return Err(ProfileError::BadName(profile.name.clone()));
        }
        if seen.contains(&profile.name.as_str()) {
            return Err(ProfileError::DuplicateName(profile.name.clone()));
        }
        seen.push(&profile.name);

        if profile.target_width == 0 {
            return Err(ProfileError::ZeroWidth(profile.name.clone()));
        }
        if !(profile.max_size_kb > 0.0) {
            return Err(ProfileError::NonPositiveBudget(profile.name.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_spec() {
        let p: Profile = "mobile=800:100".parse().unwrap();
        assert_eq!(p, Profile::new("mobile", 800, 100.0));

        let p: Profile = " thumb = 320 : 24.5 ".parse().unwrap();
        assert_eq!(p.name, "thumb");
        assert_eq!(p.target_width, 320);
        assert!((p.max_size_kb - 24.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_malformed_specs() {
        for bad in [
            "mobile",
            "mobile=800",
            "=800:100",
            "mobile=eight:100",
            "mobile=800:lots",
            "mobile=800:inf",
            "",
        ] {
            assert!(
                bad.parse::<Profile>().is_err(),
                "'{}' should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_default_catalog_matches_shipped_values() {
        let catalog = default_profiles();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0], Profile::new("mobile", 800, 100.0));
        assert_eq!(catalog[1], Profile::new("web", 1920, 300.0));
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let catalog = vec![
            Profile::new("web", 1920, 300.0),
            Profile::new("web", 800, 100.0),
        ];
        assert_eq!(
            validate_catalog(&catalog),
            Err(ProfileError::DuplicateName("web".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        assert_eq!(
            validate_catalog(&[Profile::new("a", 0, 100.0)]),
            Err(ProfileError::ZeroWidth("a".to_string()))
        );
        assert_eq!(
            validate_catalog(&[Profile::new("a", 800, 0.0)]),
            Err(ProfileError::NonPositiveBudget("a".to_string()))
        );
        assert_eq!(
            validate_catalog(&[Profile::new("a", 800, -3.0)]),
            Err(ProfileError::NonPositiveBudget("a".to_string()))
        );
        assert_eq!(validate_catalog(&[]), Err(ProfileError::EmptyCatalog));
    }

    #[test]
    fn test_validate_rejects_path_like_names() {
        for bad in ["", "a/b", "a\\b", ".", ".."] {
            let catalog = vec![Profile::new(bad, 800, 100.0)];
            assert_eq!(
                validate_catalog(&catalog),
                Err(ProfileError::BadName(bad.to_string())),
                "'{}' should be rejected",
                bad
            );
        }
    }
}
