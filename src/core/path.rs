//! Element path handling
//!
//! This module parses and builds the element paths used by the field
//! helpers. A path is a `/`-separated list of tag names relative to the
//! root element, each optionally followed by a 1-based position.

use crate::core::error::{MetaError, MetaResult};

/// Parse an element path expression
///
/// Supports formats like:
/// - `idinfo` - child of the root element
/// - `idinfo/citation/title` - nested path
/// - `keywords/theme[2]` - second `theme` child of `keywords`
/// - `*/title` - `title` under any child of the root
pub fn parse_path(path: &str) -> MetaResult<PathComponents> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    // A position closes its step; only '/' may follow
    let mut after_position = false;

    for ch in path.chars() {
        match ch {
            '[' => {
                if in_brackets || current.is_empty() {
                    return Err(MetaError::BadPath(format!(
                        "Position without a tag in '{}'",
                        path
                    )));
                }
                components.push(PathComponent::name(&current));
                current.clear();
                in_brackets = true;
            }
            ']' => {
                if !in_brackets {
                    return Err(MetaError::BadPath("Unexpected ']'".to_string()));
                }
                let position = current.parse::<usize>().map_err(|_| {
                    MetaError::BadPath(format!("Invalid position: {}", current))
                })?;
                if position == 0 {
                    return Err(MetaError::BadPath(
                        "Positions start at 1".to_string(),
                    ));
                }
                components.push(PathComponent::Index(position));
                current.clear();
                in_brackets = false;
                after_position = true;
            }
            '/' => {
                if in_brackets {
                    return Err(MetaError::BadPath("Unclosed bracket".to_string()));
                }
                if current.is_empty() && !after_position {
                    return Err(MetaError::BadPath(format!("Empty step in '{}'", path)));
                }
                if !current.is_empty() {
                    components.push(PathComponent::name(&current));
                    current.clear();
                }
                after_position = false;
            }
            _ if in_brackets => {
                if !ch.is_ascii_digit() {
                    return Err(MetaError::BadPath(format!(
                        "Invalid character in position: {}",
                        ch
                    )));
                }
                current.push(ch);
            }
            _ => {
                if after_position {
                    return Err(MetaError::BadPath(format!(
                        "Expected '/' after position in '{}'",
                        path
                    )));
                }
                current.push(ch);
            }
        }
    }

    if in_brackets {
        return Err(MetaError::BadPath("Unclosed bracket".to_string()));
    }

    if path.is_empty() {
        return Err(MetaError::BadPath("Empty path".to_string()));
    }

    if !current.is_empty() {
        components.push(PathComponent::name(&current));
    } else if !after_position {
        return Err(MetaError::BadPath(format!("Empty step in '{}'", path)));
    }

    Ok(PathComponents { components })
}

/// Build a path from components
pub fn build_path(components: &PathComponents) -> String {
    let mut result = String::new();
    for (i, comp) in components.components.iter().enumerate() {
        if i > 0 {
            match comp {
                PathComponent::Name(_) | PathComponent::Wildcard => result.push('/'),
                PathComponent::Index(_) => {}
            }
        }
        match comp {
            PathComponent::Name(name) => result.push_str(name),
            PathComponent::Wildcard => result.push('*'),
            PathComponent::Index(idx) => {
                result.push('[');
                result.push_str(&idx.to_string());
                result.push(']');
            }
        }
    }
    result
}

/// A component of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// A tag name
    Name(String),
    /// Any tag (`*`)
    Wildcard,
    /// A 1-based position among the matches of the preceding tag
    Index(usize),
}

impl PathComponent {
    fn name(text: &str) -> Self {
        if text == "*" {
            PathComponent::Wildcard
        } else {
            PathComponent::Name(text.to_string())
        }
    }
}

/// One selection step: a tag test plus an optional position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'a> {
    /// Tag to match, `None` for any tag
    pub tag: Option<&'a str>,
    /// 1-based position among the matching siblings
    pub position: Option<usize>,
}

impl Step<'_> {
    /// Check if an element tag passes the tag test
    pub fn matches(&self, tag: &str) -> bool {
        self.tag.map_or(true, |expected| expected == tag)
    }
}

/// Parsed path components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponents {
    pub components: Vec<PathComponent>,
}

impl PathComponents {
    /// Get the first component as a name
    pub fn first_name(&self) -> Option<&str> {
        self.components.first().and_then(|c| match c {
            PathComponent::Name(n) => Some(n.as_str()),
            _ => None,
        })
    }

    /// Get the last component
    pub fn last(&self) -> Option<&PathComponent> {
        self.components.last()
    }

    /// Get the last tag name
    pub fn last_name(&self) -> Option<&str> {
        self.components.iter().rev().find_map(|c| match c {
            PathComponent::Name(n) => Some(n.as_str()),
            _ => None,
        })
    }

    /// Group the components into selection steps
    pub fn steps(&self) -> Vec<Step<'_>> {
        let mut steps: Vec<Step<'_>> = Vec::new();
        for comp in &self.components {
            match comp {
                PathComponent::Name(name) => steps.push(Step {
                    tag: Some(name.as_str()),
                    position: None,
                }),
                PathComponent::Wildcard => steps.push(Step {
                    tag: None,
                    position: None,
                }),
                PathComponent::Index(position) => {
                    if let Some(step) = steps.last_mut() {
                        step.position = Some(*position);
                    }
                }
            }
        }
        steps
    }

    /// Split off the last step, returning the parent path (if any)
    ///
    /// Positions on the last step stay with the last step.
    pub fn split_last(&self) -> (Option<PathComponents>, Vec<PathComponent>) {
        let split_at = self
            .components
            .iter()
            .rposition(|c| !matches!(c, PathComponent::Index(_)))
            .unwrap_or(0);
        let (parent, last) = self.components.split_at(split_at);
        let parent = if parent.is_empty() {
            None
        } else {
            Some(PathComponents {
                components: parent.to_vec(),
            })
        };
        (parent, last.to_vec())
    }
}
