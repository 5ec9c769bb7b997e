//! Binds elements to the tag helpers in effect for a document.

use crate::conventions::{self, ELEMENT_CATCH_ALL_NAME};
use crate::descriptor::{TagHelperDescriptor, TagMatchingRuleDescriptor, TagStructure};
use log::trace;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::sync::Arc;

/// Finds the tag helpers that apply to an element.
///
/// Built once per document from the resolved prefix and descriptor set.
#[derive(Debug, Clone, Default)]
pub struct TagHelperBinder {
    prefix: Option<SmolStr>,
    descriptors: Vec<Arc<TagHelperDescriptor>>,
    /// Lower-cased tag name -> indices into `descriptors`.
    by_tag_name: FxHashMap<String, Vec<usize>>,
    catch_all: Vec<usize>,
}

/// The result of binding an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHelperBinding {
    /// Tag name as written, including any prefix.
    pub tag_name: SmolStr,
    pub parent_tag_name: Option<SmolStr>,
    pub tag_helper_prefix: Option<SmolStr>,
    /// Each matching descriptor with the rules it matched through, in
    /// descriptor registration order.
    pub mappings: Vec<(Arc<TagHelperDescriptor>, Vec<TagMatchingRuleDescriptor>)>,
}

impl TagHelperBinding {
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TagHelperDescriptor>> {
        self.mappings.iter().map(|(descriptor, _)| descriptor)
    }

    pub fn bound_rules(&self, descriptor: &TagHelperDescriptor) -> &[TagMatchingRuleDescriptor] {
        self.mappings
            .iter()
            .find(|(d, _)| d.as_ref() == descriptor)
            .map(|(_, rules)| rules.as_slice())
            .unwrap_or(&[])
    }

    /// `WithoutEndTag` if any matched rule requires it.
    pub fn tag_structure(&self) -> TagStructure {
        let without_end_tag = self
            .mappings
            .iter()
            .flat_map(|(_, rules)| rules)
            .any(|rule| rule.tag_structure == TagStructure::WithoutEndTag);
        if without_end_tag {
            TagStructure::WithoutEndTag
        } else {
            TagStructure::NormalOrSelfClosing
        }
    }

    /// Tag name with the prefix removed.
    pub fn tag_name_without_prefix(&self) -> &str {
        strip_prefix(&self.tag_name, self.tag_helper_prefix.as_deref()).unwrap_or(&self.tag_name)
    }
}

fn strip_prefix<'a>(name: &'a str, prefix: Option<&str>) -> Option<&'a str> {
    match prefix {
        None => Some(name),
        Some(prefix) => {
            let start = name.get(..prefix.len())?;
            if start.eq_ignore_ascii_case(prefix) {
                name.get(prefix.len()..)
            } else {
                None
            }
        }
    }
}

impl TagHelperBinder {
    pub fn new(
        prefix: Option<SmolStr>,
        descriptors: impl IntoIterator<Item = Arc<TagHelperDescriptor>>,
    ) -> Self {
        let descriptors: Vec<_> = descriptors.into_iter().collect();
        let mut by_tag_name: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut catch_all = Vec::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            for rule in &descriptor.tag_matching_rules {
                if rule.tag_name == ELEMENT_CATCH_ALL_NAME {
                    if !catch_all.contains(&index) {
                        catch_all.push(index);
                    }
                    continue;
                }
                let entry = by_tag_name.entry(rule.tag_name.to_ascii_lowercase()).or_default();
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }

        Self {
            prefix: prefix.filter(|p| !p.is_empty()),
            descriptors,
            by_tag_name,
            catch_all,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn descriptors(&self) -> &[Arc<TagHelperDescriptor>] {
        &self.descriptors
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Binds an element.
    ///
    /// `parent_tag_name` is the closest enclosing element; when that element
    /// is itself a tag helper its name has the prefix removed before it is
    /// compared against `require_parent_tag`.
    pub fn get_binding(
        &self,
        tag_name: &str,
        attributes: &[(&str, &str)],
        parent_tag_name: Option<&str>,
        parent_is_tag_helper: bool,
    ) -> Option<TagHelperBinding> {
        let unprefixed = strip_prefix(tag_name, self.prefix.as_deref())?;
        if unprefixed.is_empty() {
            return None;
        }
        let parent = match (parent_tag_name, parent_is_tag_helper) {
            (Some(parent), true) => Some(strip_prefix(parent, self.prefix.as_deref()).unwrap_or(parent)),
            (parent, _) => parent,
        };

        let mut candidates: Vec<usize> = self
            .by_tag_name
            .get(&unprefixed.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default();
        for index in &self.catch_all {
            if !candidates.contains(index) {
                candidates.push(*index);
            }
        }
        candidates.sort_unstable();

        let mappings: Vec<_> = candidates
            .into_iter()
            .filter_map(|index| {
                let descriptor = &self.descriptors[index];
                let rules: Vec<_> = descriptor
                    .tag_matching_rules
                    .iter()
                    .filter(|rule| conventions::satisfies_rule(unprefixed, parent, attributes, rule))
                    .cloned()
                    .collect();
                (!rules.is_empty()).then(|| (Arc::clone(descriptor), rules))
            })
            .collect();

        if mappings.is_empty() {
            return None;
        }
        trace!("bound <{}> to {} tag helper(s)", tag_name, mappings.len());

        Some(TagHelperBinding {
            tag_name: tag_name.into(),
            parent_tag_name: parent_tag_name.map(SmolStr::new),
            tag_helper_prefix: self.prefix.clone(),
            mappings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagHelperDescriptorBuilder;
    use pretty_assertions::assert_eq;

    fn helper(name: &str, configure: impl FnOnce(&mut crate::TagMatchingRuleBuilder)) -> Arc<TagHelperDescriptor> {
        Arc::new(
            TagHelperDescriptorBuilder::new(name, "TestAssembly")
                .tag_matching_rule(configure)
                .build()
                .unwrap(),
        )
    }

    fn names(binding: &TagHelperBinding) -> Vec<&str> {
        binding.descriptors().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_binds_by_tag_name_and_catch_all() {
        let binder = TagHelperBinder::new(
            None,
            vec![
                helper("Div", |r| {
                    r.require_tag_name("div");
                }),
                helper("Any", |r| {
                    r.require_tag_name("*").require_attribute(|a| {
                        a.name("class");
                    });
                }),
                helper("Span", |r| {
                    r.require_tag_name("span");
                }),
            ],
        );

        let binding = binder.get_binding("DIV", &[("class", "x")], None, false).unwrap();
        assert_eq!(names(&binding), vec!["Div", "Any"]);

        let binding = binder.get_binding("div", &[], None, false).unwrap();
        assert_eq!(names(&binding), vec!["Div"]);

        assert!(binder.get_binding("p", &[], None, false).is_none());
    }

    #[test]
    fn test_prefix_is_required() {
        let binder = TagHelperBinder::new(
            Some("th:".into()),
            vec![helper("P", |r| {
                r.require_tag_name("p");
            })],
        );
        assert!(binder.get_binding("p", &[], None, false).is_none());
        let binding = binder.get_binding("th:p", &[], None, false).unwrap();
        assert_eq!(binding.tag_name_without_prefix(), "p");
    }

    #[test]
    fn test_parent_tag_requirement() {
        let binder = TagHelperBinder::new(
            Some("th:".into()),
            vec![helper("Li", |r| {
                r.require_tag_name("li").require_parent_tag("ul");
            })],
        );
        assert!(binder.get_binding("th:li", &[], Some("ol"), false).is_none());
        assert!(binder.get_binding("th:li", &[], Some("th:ul"), true).is_some());
        assert!(binder.get_binding("th:li", &[], Some("ul"), false).is_some());
    }

    #[test]
    fn test_tag_structure() {
        let binder = TagHelperBinder::new(
            None,
            vec![helper("Input", |r| {
                r.require_tag_name("input")
                    .require_tag_structure(TagStructure::WithoutEndTag);
            })],
        );
        let binding = binder.get_binding("input", &[], None, false).unwrap();
        assert_eq!(binding.tag_structure(), TagStructure::WithoutEndTag);
    }
}
