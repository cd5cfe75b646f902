use serde::{Deserialize, Serialize};

/// One `<page>` subtree as read from the dump, fields not yet validated.
#[derive(Debug, Clone, Default)]
pub struct DumpPage {
    pub id: Option<u32>,
    pub ns: Option<i32>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub redirect: bool, // the dump's <redirect/> element, not the #REDIRECT text marker
}

/// A mainspace article that passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub markup: String,
}

/// Output of the markup cleaner: markup-free text above the word threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedArticle {
    pub title: String,
    pub text: String,
}

/// The unit written to the corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub title: String,
    pub text: String,
}
