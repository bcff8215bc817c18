//! Core behavioral traits for dotagents components
//!
//! These traits sit at the seams where the reconciliation engine consumes
//! collaborators it does not own. Depending on the trait instead of a concrete
//! parser keeps the migration scanner testable with a stub validator.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata declared by a skill bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMeta {
    /// Declared skill name, unique within a skills directory
    pub name: String,
    /// One-line description used for discovery
    pub description: String,
    /// Tools the skill is allowed to use, if declared
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    /// Preferred model, if declared
    #[serde(default)]
    pub model: Option<String>,
}

/// Skill bundle validator interface
///
/// Accepts a skill directory and returns its declared metadata, or an
/// [`Error::InvalidSkill`](crate::Error::InvalidSkill) describing why the
/// bundle is unusable.
///
/// # Examples
///
/// ```ignore
/// fn skill_key(validator: &dyn SkillValidator, dir: &Path) -> String {
///     validator
///         .validate(dir)
///         .map(|meta| meta.name)
///         .unwrap_or_else(|_| dir_name(dir))
/// }
/// ```
pub trait SkillValidator {
    /// Validate the bundle rooted at `dir`
    fn validate(&self, dir: &Path) -> Result<SkillMeta>;
}
