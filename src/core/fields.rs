//! Path-based field access on element trees
//!
//! Targeted reads and edits of an [`XmlNode`] tree without a round trip
//! through the dictionary codec. Paths are relative to the element the
//! method is called on; see [`parse_path`] for the syntax.

use crate::core::error::{MetaError, MetaResult};
use crate::core::node::{is_xml_name, XmlNode};
use crate::core::path::{parse_path, PathComponent, PathComponents};

/// Child-index chain from a starting element to a matched descendant
type Trail = Vec<usize>;

impl XmlNode {
    /// Find the first element matching `path`
    pub fn find(&self, path: &str) -> MetaResult<Option<&XmlNode>> {
        let path = parse_path(path)?;
        Ok(locate(self, &path)
            .first()
            .and_then(|trail| node_at(self, trail)))
    }

    /// Find every element matching `path`, in document order
    pub fn find_all(&self, path: &str) -> MetaResult<Vec<&XmlNode>> {
        let path = parse_path(path)?;
        Ok(locate(self, &path)
            .iter()
            .filter_map(|trail| node_at(self, trail))
            .collect())
    }

    /// Find the first element matching `path` for modification
    pub fn find_mut(&mut self, path: &str) -> MetaResult<Option<&mut XmlNode>> {
        let path = parse_path(path)?;
        let Some(trail) = locate(self, &path).into_iter().next() else {
            return Ok(None);
        };
        Ok(node_at_mut(self, &trail))
    }

    /// Text of the first element matching `path`
    ///
    /// Returns an empty string when nothing matches or the element has no
    /// text.
    pub fn text_at(&self, path: &str) -> MetaResult<String> {
        Ok(self
            .find(path)?
            .and_then(|node| node.text.clone())
            .unwrap_or_default())
    }

    /// Text of the first element matched by the first matching path
    pub fn first_text<S: AsRef<str>>(&self, paths: &[S]) -> MetaResult<String> {
        for path in paths {
            if let Some(node) = self.find(path.as_ref())? {
                return Ok(node.text.clone().unwrap_or_default());
            }
        }
        Ok(String::new())
    }

    /// Text of every element matching `path`
    pub fn all_text(&self, path: &str) -> MetaResult<Vec<String>> {
        Ok(self
            .find_all(path)?
            .into_iter()
            .map(|node| node.text.clone().unwrap_or_default())
            .collect())
    }

    /// Text of every element matching `path`, joined with `", "`
    pub fn list_text(&self, path: &str) -> MetaResult<String> {
        Ok(self.all_text(path)?.join(", "))
    }

    /// Attribute of the first element matching `path`
    pub fn attribute_at(&self, path: &str, name: &str) -> MetaResult<Option<&str>> {
        Ok(self.find(path)?.and_then(|node| node.attribute(name)))
    }

    /// Append a new text element
    ///
    /// The element is named after the last step of `path` and added under
    /// the first match of the preceding steps (or under `self` for a
    /// single-step path). Returns `false` when the parent does not exist.
    pub fn create_text(&mut self, path: &str, value: &str) -> MetaResult<bool> {
        let parsed = parse_path(path)?;
        let (parent_path, last) = parsed.split_last();
        let tag = match last.first() {
            Some(PathComponent::Name(tag)) if is_xml_name(tag) => tag.clone(),
            _ => {
                return Err(MetaError::BadPath(format!(
                    "'{}' does not end in a tag name",
                    path
                )))
            }
        };

        let parent = match parent_path {
            Some(parent_path) => match locate(self, &parent_path).into_iter().next() {
                Some(trail) => node_at_mut(self, &trail),
                None => None,
            },
            None => Some(self),
        };
        let Some(parent) = parent else {
            return Ok(false);
        };

        parent.push_child(XmlNode::new(tag).with_text(value));
        Ok(true)
    }

    /// Add an attribute to the first element matching `path`
    ///
    /// Returns `false` when no element matches or the attribute already
    /// exists.
    pub fn create_attribute(&mut self, path: &str, name: &str, value: &str) -> MetaResult<bool> {
        if !is_xml_name(name) {
            return Err(MetaError::BadPath(format!("Invalid attribute name '{}'", name)));
        }
        match self.find_mut(path)? {
            Some(node) if node.attribute(name).is_none() => {
                node.set_attribute(name, value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Replace the text of the first element matching `path`
    pub fn modify_text(&mut self, path: &str, value: &str) -> MetaResult<bool> {
        match self.find_mut(path)? {
            Some(node) => {
                node.text = Some(value.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace an existing attribute of the first element matching `path`
    pub fn modify_attribute(&mut self, path: &str, name: &str, value: &str) -> MetaResult<bool> {
        match self.find_mut(path)? {
            Some(node) if node.attribute(name).is_some() => {
                node.set_attribute(name, value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Remove the first element matching `path`
    pub fn delete(&mut self, path: &str) -> MetaResult<bool> {
        let parsed = parse_path(path)?;
        let Some(mut trail) = locate(self, &parsed).into_iter().next() else {
            return Ok(false);
        };
        let Some(index) = trail.pop() else {
            return Ok(false);
        };
        match node_at_mut(self, &trail) {
            Some(parent) if index < parent.children.len() => {
                parent.children.remove(index);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Trails of every element matched by `path`, in document order
fn locate(start: &XmlNode, path: &PathComponents) -> Vec<Trail> {
    let mut current: Vec<(Trail, &XmlNode)> = vec![(Vec::new(), start)];

    for step in path.steps() {
        let mut next = Vec::new();
        for (trail, node) in &current {
            let mut matches = node
                .children
                .iter()
                .enumerate()
                .filter(|(_, child)| step.matches(&child.tag));
            let selected: Vec<(usize, &XmlNode)> = match step.position {
                Some(position) => matches.nth(position - 1).into_iter().collect(),
                None => matches.collect(),
            };
            for (index, child) in selected {
                let mut child_trail = trail.clone();
                child_trail.push(index);
                next.push((child_trail, child));
            }
        }
        current = next;
    }

    current.into_iter().map(|(trail, _)| trail).collect()
}

fn node_at<'a>(start: &'a XmlNode, trail: &[usize]) -> Option<&'a XmlNode> {
    trail
        .iter()
        .try_fold(start, |node, &index| node.children.get(index))
}

fn node_at_mut<'a>(start: &'a mut XmlNode, trail: &[usize]) -> Option<&'a mut XmlNode> {
    let mut node = start;
    for &index in trail {
        node = node.children.get_mut(index)?;
    }
    Some(node)
}
