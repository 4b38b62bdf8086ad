//! Dictionary lookups.
//!
//! Candidate words come from a [CandidateSource]. The default source queries the QAT word
//! service with a pattern of the form `{length}:*/{letters}`: any word of exactly `length`
//! letters that can be made from `letters`, where `.` in `letters` matches any letter.

use crate::Error;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// Word lists known to the dictionary service. The declaration order is the numeric selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dictionary {
    #[serde(rename = "UKACD")]
    Ukacd,
    #[serde(rename = "YAWL")]
    Yawl,
    #[serde(rename = "ABLE")]
    Able,
    Moby,
    #[serde(rename = "PDL")]
    Pdl,
    #[serde(rename = "BNC")]
    Bnc,
    Broda,
    Union,
}

impl Dictionary {
    pub const ALL: [Dictionary; 8] = [
        Dictionary::Ukacd,
        Dictionary::Yawl,
        Dictionary::Able,
        Dictionary::Moby,
        Dictionary::Pdl,
        Dictionary::Bnc,
        Dictionary::Broda,
        Dictionary::Union,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dictionary::Ukacd => "UKACD",
            Dictionary::Yawl => "YAWL",
            Dictionary::Able => "ABLE",
            Dictionary::Moby => "Moby",
            Dictionary::Pdl => "PDL",
            Dictionary::Bnc => "BNC",
            Dictionary::Broda => "Broda",
            Dictionary::Union => "Union",
        }
    }

    /// Numeric selector sent to the service
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Dictionary::Yawl
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dictionary {
    type Err = Error;

    /// Accepts a dictionary name or its numeric selector.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Dictionary::ALL
                .get(index)
                .copied()
                .ok_or_else(|| Error::UnknownDictionary(s.to_string()));
        }
        Dictionary::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| Error::UnknownDictionary(s.to_string()))
    }
}

/// Something that can list dictionary words.
pub trait CandidateSource {
    /// Words of exactly `length` letters made from `pattern` (lowercase letters, `.` for any
    /// letter). An empty list is a valid answer.
    fn lookup(
        &self,
        length: usize,
        pattern: &str,
        dictionary: Dictionary,
    ) -> Result<Vec<String>, Error>;
}

impl<S: CandidateSource + ?Sized> CandidateSource for &S {
    fn lookup(
        &self,
        length: usize,
        pattern: &str,
        dictionary: Dictionary,
    ) -> Result<Vec<String>, Error> {
        (**self).lookup(length, pattern, dictionary)
    }
}

/// The query sent to the service, before encoding
pub fn query_pattern(length: usize, letters: &str) -> String {
    format!("{}:*/{}", length, letters)
}

/// Percent-encode the characters of a query pattern that clash with the URL syntax.
pub fn encode_pattern(pattern: &str) -> String {
    pattern.replace(':', "%3A").replace('/', "%2F")
}

/// Retries a source on failure with a fixed pause between attempts.
pub struct Retry<S> {
    inner: S,
    attempts: u32,
    delay: Duration,
}

impl<S: CandidateSource> Retry<S> {
    pub fn new(inner: S, attempts: u32, delay: Duration) -> Retry<S> {
        Retry {
            inner,
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: CandidateSource> CandidateSource for Retry<S> {
    fn lookup(
        &self,
        length: usize,
        pattern: &str,
        dictionary: Dictionary,
    ) -> Result<Vec<String>, Error> {
        let mut last = None;
        for attempt in 1..=self.attempts {
            match self.inner.lookup(length, pattern, dictionary) {
                Ok(words) => return Ok(words),
                Err(err) => {
                    warn!(
                        "Lookup {} attempt {}/{} failed: {}",
                        query_pattern(length, pattern),
                        attempt,
                        self.attempts,
                        err
                    );
                    last = Some(err);
                    if attempt < self.attempts {
                        thread::sleep(self.delay);
                    }
                }
            }
        }
        Err(Error::FetchFailed {
            pattern: query_pattern(length, pattern),
            attempts: self.attempts,
            last: Box::new(last.unwrap_or_else(|| Error::Transport(String::from("no attempt made")))),
        })
    }
}

/// Extract the word lists from a service response page.
///
/// Each list is introduced by a bold `Length N` label; the first non-empty text after the label
/// holds the whitespace separated words.
pub fn parse_response(html: &str) -> BTreeMap<usize, Vec<String>> {
    let mut result = BTreeMap::new();
    let mut rest = html;
    while let Some(start) = rest.find("<b>") {
        rest = &rest[start + 3..];
        let end = match rest.find("</b>") {
            Some(end) => end,
            None => break,
        };
        let label = rest[..end].trim();
        rest = &rest[end + 4..];
        let length = match label.strip_prefix("Length ") {
            Some(n) => n
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse::<usize>()
                .ok(),
            None => None,
        };
        if let (Some(length), Some(text)) = (length, first_text(rest)) {
            result.insert(
                length,
                text.split_whitespace().map(String::from).collect(),
            );
        }
    }
    result
}

/// First non-empty text run, skipping tags, up to the next bold label.
fn first_text(mut s: &str) -> Option<&str> {
    loop {
        if s.is_empty() || s.starts_with("<b>") {
            return None;
        }
        if s.starts_with('<') {
            s = &s[s.find('>')? + 1..];
        } else {
            let end = s.find('<').unwrap_or_else(|| s.len());
            let text = s[..end].trim();
            if !text.is_empty() {
                return Some(text);
            }
            s = &s[end..];
        }
    }
}

#[cfg(feature = "qat")]
pub use self::qat::{QatClient, QAT_URL};

#[cfg(feature = "qat")]
mod qat {
    use super::{encode_pattern, parse_response, query_pattern, CandidateSource, Dictionary};
    use crate::Error;
    use log::debug;
    use std::time::Duration;

    pub const QAT_URL: &str = "https://www.quinapalus.com/cgi-bin/qat";

    /// Blocking client for the QAT word service
    #[derive(Debug, Clone)]
    pub struct QatClient {
        url: String,
        timeout: Duration,
    }

    impl Default for QatClient {
        fn default() -> Self {
            QatClient::new(QAT_URL)
        }
    }

    impl QatClient {
        pub fn new<S: Into<String>>(url: S) -> QatClient {
            QatClient {
                url: url.into(),
                timeout: Duration::from_secs(10),
            }
        }

        pub fn url(&self, length: usize, letters: &str, dictionary: Dictionary) -> String {
            format!(
                "{}?pat={}&dict={}",
                self.url,
                encode_pattern(&query_pattern(length, letters)),
                dictionary.index()
            )
        }
    }

    impl CandidateSource for QatClient {
        fn lookup(
            &self,
            length: usize,
            pattern: &str,
            dictionary: Dictionary,
        ) -> Result<Vec<String>, Error> {
            let url = self.url(length, pattern, dictionary);
            debug!("GET {}", url);
            let response = ureq::get(&url)
                .timeout(self.timeout)
                .call()
                .map_err(|e| Error::Transport(e.to_string()))?;
            if response.status() != 200 {
                return Err(Error::Transport(format!("status {}", response.status())));
            }
            let body = response
                .into_string()
                .map_err(|e| Error::Transport(e.to_string()))?;
            let mut words = parse_response(&body);
            Ok(words.remove(&length).unwrap_or_default())
        }
    }

}
