//! Parse HTTP response header lines into ResponseHeaders.

/// Response headers of the final response, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, String)>,
}

impl ResponseHeaders {
    /// Build from raw header lines as delivered by curl's header callback.
    ///
    /// Each `HTTP/..` status line starts a new header block, so interim
    /// responses (`100 Continue`, redirects) are discarded and only the last
    /// block is kept.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut entries = Vec::new();
        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("HTTP/") {
                entries.clear();
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                entries.push((name.trim().to_string(), value.trim().to_string()));
            }
        }
        Self { entries }
    }

    /// First value for `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
