//! Name and value comparison rules shared by the binder and the tree
//! rewriter.

use crate::descriptor::*;

/// Tag name matching `*`, which matches every tag.
pub const ELEMENT_CATCH_ALL_NAME: &str = "*";

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|start| start.eq_ignore_ascii_case(prefix))
}

/// Returns true if `tag_name` (already stripped of any prefix) satisfies the
/// rule's tag name.
pub fn satisfies_tag_name(tag_name: &str, rule: &TagMatchingRuleDescriptor) -> bool {
    if tag_name.is_empty() {
        return false;
    }
    rule.tag_name == ELEMENT_CATCH_ALL_NAME || rule.tag_name.eq_ignore_ascii_case(tag_name)
}

pub fn satisfies_parent_tag(parent_tag_name: Option<&str>, rule: &TagMatchingRuleDescriptor) -> bool {
    match &rule.parent_tag {
        None => true,
        Some(required) => parent_tag_name.is_some_and(|parent| required.eq_ignore_ascii_case(parent)),
    }
}

pub fn satisfies_attributes(attributes: &[(&str, &str)], rule: &TagMatchingRuleDescriptor) -> bool {
    rule.attributes.iter().all(|required| {
        attributes
            .iter()
            .any(|(name, value)| satisfies_required_attribute(name, value, required))
    })
}

pub fn satisfies_required_attribute(name: &str, value: &str, required: &RequiredAttributeDescriptor) -> bool {
    let name_matches = match required.name_comparison {
        NameComparisonMode::FullMatch => required.name.eq_ignore_ascii_case(name),
        NameComparisonMode::PrefixMatch => {
            // The prefix alone is not a match.
            name.len() != required.name.len() && starts_with_ignore_case(name, &required.name)
        }
    };
    if !name_matches {
        return false;
    }

    let expected = required.value.as_deref().unwrap_or("");
    match required.value_comparison {
        ValueComparisonMode::None => true,
        ValueComparisonMode::FullMatch => value == expected,
        ValueComparisonMode::PrefixMatch => value.starts_with(expected),
        ValueComparisonMode::SuffixMatch => value.ends_with(expected),
    }
}

/// Returns true if every part of `rule` is satisfied.
pub fn satisfies_rule(
    tag_name: &str,
    parent_tag_name: Option<&str>,
    attributes: &[(&str, &str)],
    rule: &TagMatchingRuleDescriptor,
) -> bool {
    satisfies_tag_name(tag_name, rule)
        && satisfies_parent_tag(parent_tag_name, rule)
        && satisfies_attributes(attributes, rule)
}

pub fn satisfies_bound_attribute_name(name: &str, descriptor: &BoundAttributeDescriptor) -> bool {
    !descriptor.name.is_empty() && descriptor.name.eq_ignore_ascii_case(name)
}

/// Returns true if `name` targets the attribute's dictionary. The bare prefix
/// counts, so callers can report the missing key.
pub fn satisfies_bound_attribute_indexer(name: &str, descriptor: &BoundAttributeDescriptor) -> bool {
    descriptor
        .indexer_name_prefix
        .as_deref()
        .is_some_and(|prefix| !satisfies_bound_attribute_name(name, descriptor) && starts_with_ignore_case(name, prefix))
}

/// Returns the descriptor's bound attributes that `name` sets, with whether
/// each match goes through the indexer.
pub fn get_attribute_matches<'a>(
    name: &str,
    descriptor: &'a TagHelperDescriptor,
) -> impl Iterator<Item = (&'a BoundAttributeDescriptor, bool)> + 'a {
    let name = name.to_string();
    descriptor.bound_attributes.iter().filter_map(move |attribute| {
        if satisfies_bound_attribute_name(&name, attribute) {
            Some((attribute, false))
        } else if satisfies_bound_attribute_indexer(&name, attribute) {
            Some((attribute, true))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagHelperDescriptorBuilder;
    use pretty_assertions::assert_eq;

    fn rule(configure: impl FnOnce(&mut crate::TagMatchingRuleBuilder)) -> TagMatchingRuleDescriptor {
        TagHelperDescriptorBuilder::new("T", "A")
            .tag_matching_rule(configure)
            .build()
            .unwrap()
            .tag_matching_rules
            .remove(0)
    }

    #[test]
    fn test_tag_name_is_case_insensitive() {
        let rule = rule(|r| {
            r.require_tag_name("Input");
        });
        assert!(satisfies_tag_name("input", &rule));
        assert!(!satisfies_tag_name("inputs", &rule));
    }

    #[test]
    fn test_value_comparisons() {
        let suffix = rule(|r| {
            r.require_tag_name("a").require_attribute(|a| {
                a.name("href")
                    .value(".pdf")
                    .value_comparison(ValueComparisonMode::SuffixMatch);
            });
        });
        assert!(satisfies_attributes(&[("HREF", "doc.pdf")], &suffix));
        assert!(!satisfies_attributes(&[("href", "doc.PDF")], &suffix));
        assert!(!satisfies_attributes(&[], &suffix));
    }

    #[test]
    fn test_prefix_attribute_requires_more_than_prefix() {
        let prefix = rule(|r| {
            r.require_tag_name("a").require_attribute(|a| {
                a.name("asp-route-")
                    .name_comparison(NameComparisonMode::PrefixMatch);
            });
        });
        assert!(satisfies_attributes(&[("asp-route-id", "1")], &prefix));
        assert!(!satisfies_attributes(&[("asp-route-", "1")], &prefix));
    }

    #[test]
    fn test_attribute_matches_include_indexer() {
        let descriptor = TagHelperDescriptorBuilder::new("T", "A")
            .tag_matching_rule(|r| {
                r.require_tag_name("a");
            })
            .bound_attribute(|a| {
                a.name("asp-all-route-data")
                    .property_name("RouteValues")
                    .type_name("System.Collections.Generic.IDictionary<string, string>")
                    .as_dictionary("asp-route-", "System.String");
            })
            .build()
            .unwrap();
        let matches: Vec<_> = get_attribute_matches("asp-route-id", &descriptor)
            .map(|(attribute, indexer)| (attribute.property_name.as_str(), indexer))
            .collect();
        assert_eq!(matches, vec![("RouteValues", true)]);
        assert_eq!(get_attribute_matches("ASP-ALL-ROUTE-DATA", &descriptor).count(), 1);
        assert_eq!(get_attribute_matches("href", &descriptor).count(), 0);
    }
}
