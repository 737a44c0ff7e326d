use crate::error::EvalError;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    /// Split on whitespace only, case preserved.
    Whitespace,
    /// Unicode word tokens, NFKC normalized and lowercased.
    Standard,
    /// Standard tokens, built-in English stop words removed, stemmed.
    English,
    /// Like `English`, with the stop words taken from a common-words list.
    EnglishCommonWords,
}

impl FromStr for AnalyzerKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whitespace" => Ok(Self::Whitespace),
            "standard" => Ok(Self::Standard),
            "english" => Ok(Self::English),
            "english-common-words" => Ok(Self::EnglishCommonWords),
            other => Err(EvalError::UnknownAnalyzer(other.to_string())),
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Whitespace => "WhitespaceAnalyzer",
            Self::Standard => "StandardAnalyzer",
            Self::English | Self::EnglishCommonWords => "EnglishAnalyzer",
        };
        f.write_str(name)
    }
}

/// Turns document and query text into index terms.
#[derive(Debug, Clone)]
pub struct Analyzer {
    kind: AnalyzerKind,
    /// Custom stop words for `EnglishCommonWords`, stored lowercased.
    common_words: HashSet<String>,
}

impl Analyzer {
    pub fn new(kind: AnalyzerKind) -> Self {
        Self { kind, common_words: HashSet::new() }
    }

    /// An English analyzer whose stop words are `words` instead of the built-in list.
    pub fn with_common_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let common_words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { kind: AnalyzerKind::EnglishCommonWords, common_words }
    }

    pub fn kind(&self) -> AnalyzerKind { self.kind }

    /// Number of stop words applied, `None` for analyzers without stop-word removal.
    pub fn stopword_count(&self) -> Option<usize> {
        match self.kind {
            AnalyzerKind::English => Some(STOPWORDS.len()),
            AnalyzerKind::EnglishCommonWords => Some(self.common_words.len()),
            AnalyzerKind::Whitespace | AnalyzerKind::Standard => None,
        }
    }

    /// Human-readable name, including the stop-word set size when there is one.
    pub fn describe(&self) -> String {
        match self.stopword_count() {
            Some(n) => format!("{} with set size {n}", self.kind),
            None => self.kind.to_string(),
        }
    }

    fn is_stopword(&self, token: &str) -> bool {
        match self.kind {
            AnalyzerKind::English => STOPWORDS.contains(token),
            AnalyzerKind::EnglishCommonWords => self.common_words.contains(token),
            AnalyzerKind::Whitespace | AnalyzerKind::Standard => false,
        }
    }

    /// Tokenize text into (term, position). Positions count every token seen,
    /// including removed stop words.
    pub fn tokenize(&self, text: &str) -> Vec<(String, usize)> {
        if self.kind == AnalyzerKind::Whitespace {
            return text.split_whitespace().enumerate().map(|(pos, t)| (t.to_string(), pos)).collect();
        }
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let stem = matches!(self.kind, AnalyzerKind::English | AnalyzerKind::EnglishCommonWords);
        let mut tokens = Vec::new();
        for (pos, mat) in RE.find_iter(&normalized).enumerate() {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            let term = if stem { STEMMER.stem(token).to_string() } else { token.to_string() };
            tokens.push((term, pos));
        }
        tokens
    }
}

impl Default for Analyzer {
    fn default() -> Self { Self::new(AnalyzerKind::Standard) }
}
