use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use unicode_width::UnicodeWidthStr;

/// The smallest unit of output text. Backed by `Arc<str>` so that the same
/// prefix can be shared by every line of a region without reallocating.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Fragment(Arc<str>);

impl Fragment {
    pub fn from_str(s: &str) -> Self {
        Fragment(Arc::from(s))
    }

    pub fn from_string(s: String) -> Self {
        Fragment(Arc::from(s))
    }

    /// A run of `n` spaces, used for continuation indentation.
    pub fn spaces(n: usize) -> Self {
        Fragment::from_string(" ".repeat(n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display width in terminal columns. List markers are padded by this.
    pub fn width(&self) -> usize {
        UnicodeWidthStr::width(self.as_str())
    }

    /// The same fragment without trailing whitespace, for prefixing blank
    /// lines (`"> "` becomes `">"`).
    pub fn trimmed(&self) -> Fragment {
        Fragment::from_str(self.as_str().trim_end())
    }
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Fragment::from_str(s)
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Fragment::from_string(s)
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
