//! Symlink value computation
//!
//! Links are stored relative to the link's parent whenever that reproduces the
//! source exactly, so a project keeps working after it is moved.

use crate::entry::SourceKind;
use dotagents_core::path::AbsPath;
use std::path::{Component, Path, PathBuf};

/// Value to store in a symlink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkValue {
    /// Raw symlink content
    pub value: PathBuf,
    /// Whether `value` is relative to the link's parent
    pub is_relative: bool,
}

impl LinkValue {
    fn absolute(source: &AbsPath) -> Self {
        Self {
            value: source.as_path().to_path_buf(),
            is_relative: false,
        }
    }
}

/// Windows directory links behave like junctions, which do not reliably
/// resolve relative values.
const ABSOLUTE_DIR_LINKS: bool = cfg!(windows);

/// Compute the value a link at `target` should store to reach `source`
pub fn link_value(source: &AbsPath, target: &AbsPath, kind: SourceKind) -> LinkValue {
    link_value_with(source, target, kind, ABSOLUTE_DIR_LINKS)
}

/// [`link_value`] with the platform rule made explicit
pub fn link_value_with(
    source: &AbsPath,
    target: &AbsPath,
    kind: SourceKind,
    absolute_dir_links: bool,
) -> LinkValue {
    let source = source.normalized();
    if absolute_dir_links && kind == SourceKind::Dir {
        return LinkValue::absolute(&source);
    }

    let Some(parent) = target.normalized().parent() else {
        return LinkValue::absolute(&source);
    };

    let Some(relative) = relative_path(parent.as_path(), source.as_path()) else {
        return LinkValue::absolute(&source);
    };
    if relative.as_os_str().is_empty() || relative.is_absolute() {
        return LinkValue::absolute(&source);
    }

    if parent.join_path(&relative).normalized() != source {
        return LinkValue::absolute(&source);
    }

    LinkValue {
        value: relative,
        is_relative: true,
    }
}

/// Lexical path from `from` to `to`, both normalized absolute paths
///
/// `None` when they sit under different roots (e.g. Windows drives).
fn relative_path(from: &Path, to: &Path) -> Option<PathBuf> {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let is_anchor = |c: &Component<'_>| matches!(c, Component::Prefix(_) | Component::RootDir);
    let anchors_from: Vec<_> = from.iter().take_while(|c| is_anchor(c)).collect();
    let anchors_to: Vec<_> = to.iter().take_while(|c| is_anchor(c)).collect();
    if anchors_from != anchors_to {
        return None;
    }

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in &to[common..] {
        out.push(component.as_os_str());
    }
    Some(out)
}
