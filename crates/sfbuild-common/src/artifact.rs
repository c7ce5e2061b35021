// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// A symbolic artifact name, decomposed from its encoded form.
///
/// A trailing `?` marks the artifact optional for the declaring stage; the
/// marker is stripped and recorded as `required: false`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactName {
    pub name: String,
    pub required: bool,
}

impl ArtifactName {
    pub fn parse(encoded: &str) -> Self {
        match encoded.strip_suffix('?') {
            Some(name) => ArtifactName {
                name: name.to_owned(),
                required: false,
            },
            None => ArtifactName {
                name: encoded.to_owned(),
                required: true,
            },
        }
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}?", self.name)
        }
    }
}

#[cfg(test)]
mod artifact_test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::required("bitstream", "bitstream", true)]
    #[case::optional("warnings?", "warnings", false)]
    fn parses_name_and_required_flag(#[case] encoded: &str, #[case] name: &str, #[case] required: bool) {
        let a = ArtifactName::parse(encoded);
        assert_eq!(a.name, name);
        assert_eq!(a.required, required);
        assert_eq!(a.to_string(), encoded);
    }
}
