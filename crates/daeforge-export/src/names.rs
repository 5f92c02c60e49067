//! Collision-free name generation

use std::collections::HashSet;

/// Hands out unique names, suffixing repeats with `_1`, `_2`, ...
///
/// The counter lives with the instance, so two exports that build their own
/// `UniqueNames` produce identical names for identical input.
#[derive(Debug, Default, Clone)]
pub struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `name`, or the first free `name_N` if it is taken
    pub fn claim(&mut self, name: &str) -> String {
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }

        let mut n = 1usize;
        loop {
            let candidate = format!("{name}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Like [`claim`](Self::claim), after turning `name` into a valid XML id
    pub fn claim_id(&mut self, name: &str) -> String {
        self.claim(&xml_id(name))
    }
}

/// Replace characters that may not appear in an XML id with `_`.
///
/// Letters, digits, `_`, `-` and `.` are kept. Names that do not start with
/// a letter or `_` get a leading `_`.
pub fn xml_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !id.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        id.insert(0, '_');
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_suffixes_repeats() {
        let mut names = UniqueNames::new();
        assert_eq!(names.claim("Skin"), "Skin");
        assert_eq!(names.claim("Skin"), "Skin_1");
        assert_eq!(names.claim("Skin"), "Skin_2");
        assert_eq!(names.claim("Eye"), "Eye");
    }

    #[test]
    fn test_claim_skips_taken_suffix() {
        let mut names = UniqueNames::new();
        names.claim("Skin_1");
        names.claim("Skin");
        assert_eq!(names.claim("Skin"), "Skin_2");
    }

    #[test]
    fn test_xml_id() {
        assert_eq!(xml_id("Bip01 Pelvis"), "Bip01_Pelvis");
        assert_eq!(xml_id("hull-mesh"), "hull-mesh");
        assert_eq!(xml_id("a\tb#c"), "a_b_c");
        assert_eq!(xml_id("01_arm"), "_01_arm");
        assert_eq!(xml_id(""), "_");
    }

    #[test]
    fn test_claim_id_keeps_sanitized_names_unique() {
        let mut names = UniqueNames::new();
        assert_eq!(names.claim_id("Bip01 Spine"), "Bip01_Spine");
        assert_eq!(names.claim_id("Bip01_Spine"), "Bip01_Spine_1");
    }
}
