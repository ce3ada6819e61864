use super::Fragment;
use std::fmt::{self, Display, Formatter};

/// A Line is a sequence of Fragments joined only on `apply()`.
///
/// A *pinned* line was copied verbatim out of the source document. It already
/// carries whatever container prefixes (`> `, list indentation) it had in the
/// source, so region operations leave it alone.
#[derive(Clone, Debug, Default)]
pub struct Line {
    fragments: Vec<Fragment>,
    pinned: bool,
}

impl Line {
    pub fn new() -> Self {
        Line {
            fragments: Vec::new(),
            pinned: false,
        }
    }

    pub fn from_str(s: &str) -> Self {
        Line {
            fragments: vec![Fragment::from(s)],
            pinned: false,
        }
    }

    pub fn pinned(s: &str) -> Self {
        Line {
            fragments: vec![Fragment::from(s)],
            pinned: true,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn is_blank(&self) -> bool {
        self.fragments.iter().all(|f| f.as_str().trim().is_empty())
    }

    pub fn push<F: Into<Fragment>>(&mut self, f: F) -> &mut Self {
        self.fragments.push(f.into());
        self
    }

    pub fn prepend<F: Into<Fragment>>(&mut self, f: F) -> &mut Self {
        self.fragments.insert(0, f.into());
        self
    }

    pub fn apply(&self) -> String {
        let mut out = String::new();
        for frag in &self.fragments {
            out.push_str(frag.as_str());
        }
        out
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.apply())
    }
}
