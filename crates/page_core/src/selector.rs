/// Compound selector: optional tag, optional `#id`, any number of `.class`.
/// Combinators and attribute selectors are not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Selector {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
}

impl Selector {
    pub(crate) fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Selector::default();
        let is_marker = |c: char| c == '.' || c == '#';

        let tag_end = input.find(is_marker).unwrap_or(input.len());
        let tag = &input[..tag_end];
        if !tag.is_empty() && tag != "*" {
            if !is_ident(tag) {
                return None;
            }
            selector.tag = Some(tag.to_ascii_lowercase());
        }

        let mut rest = &input[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(is_marker).unwrap_or(body.len());
            let name = &body[..end];
            if !is_ident(name) {
                return None;
            }
            match marker {
                '.' => selector.classes.push(name.to_string()),
                _ => match &selector.id {
                    Some(existing) if existing != name => return None,
                    _ => selector.id = Some(name.to_string()),
                },
            }
            rest = &body[end..];
        }

        Some(selector)
    }

    pub(crate) fn matches(&self, tag: &str, id: Option<&str>, classes: &[&str]) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if id != Some(expected.as_str()) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| classes.contains(&class.as_str()))
    }
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
