//! Penn treebank tag helpers.

/// Known Penn treebank tags (token and phrase level), lowercase.
pub const PENN_TAGS: &[&str] = &[
    "cc", "cd", "dt", "ex", "fw", "in", "jj", "jjr", "jjs", "ls", "md", "nn", "nns", "nnp",
    "nnps", "pdt", "pos", "prp", "prp$", "prps", "rb", "rbr", "rbs", "rp", "sym", "to", "intj",
    "uh", "vb", "vbd", "vbg", "vbn", "vbp", "vbz", "wdt", "wp", "wp$", "wps", "wrb", "rsb",
    "-rsb-", "rcb", "-rcb-", "rrb", "-rrb-", "-lsb-", "lsb", "-lcb-", "lcb", "lrb", "-lrb-",
    "np-tmp", "pun", "hyph", ".", "sqt", "eqt", "x", "xx", "sp", " ", "adjp", "advp", "conjp",
    "np", "vp", "pp", "qp", "s", "sq", "sbarq", "sbar", "sinv", "ucp", "whadjp", "whadvp", "whnp",
    "whpp", "root", "prn", "frag", "prt", "rrc", "nx", "nac", "lst", "add", "afx", "gw", "bes",
    "hvs", "nfp",
];

/// Case-insensitive membership test against [`PENN_TAGS`].
pub fn is_penn_tag(tag: &str) -> bool {
    let lower = tag.to_lowercase();
    PENN_TAGS.contains(&lower.as_str())
}

/// Coarse grammatical class used by topic ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoarseTag {
    Noun,
    Verb,
}

impl CoarseTag {
    /// Classify a Penn tag; only `NN*` and `VB*` tags have a coarse class.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.starts_with("NN") {
            Some(CoarseTag::Noun)
        } else if tag.starts_with("VB") {
            Some(CoarseTag::Verb)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoarseTag::Noun => "NN",
            CoarseTag::Verb => "VB",
        }
    }
}

impl std::fmt::Display for CoarseTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penn_tags_case_insensitive() {
        assert!(is_penn_tag("NNP"));
        assert!(is_penn_tag("nnp"));
        assert!(is_penn_tag("-LRB-"));
        assert!(!is_penn_tag("noun"));
        assert!(!is_penn_tag(""));
    }

    #[test]
    fn test_coarse_tag() {
        assert_eq!(CoarseTag::from_tag("NNS"), Some(CoarseTag::Noun));
        assert_eq!(CoarseTag::from_tag("VBD"), Some(CoarseTag::Verb));
        assert_eq!(CoarseTag::from_tag("JJ"), None);
        assert_eq!(CoarseTag::Verb.to_string(), "VB");
    }
}
