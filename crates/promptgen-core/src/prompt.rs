use serde::{Deserialize, Serialize};

use crate::template;

/// A named, taggable prompt template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompt {
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub content: String,
    /// Placeholder names used by `content`, in the order the fill form asks for them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
    /// Path to a file whose contents are appended on export.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,
}

impl Prompt {
    /// Build a prompt from the raw values of the creation form.
    pub fn from_form(title: &str, tag_input: &str, description: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            tags: parse_tags(tag_input),
            description: description.to_string(),
            content: content.to_string(),
            variables: Vec::new(),
            doc: String::new(),
        }
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    /// Placeholders used in the content but missing from `variables`.
    pub fn undeclared_variables(&self) -> Vec<String> {
        template::placeholders(&self.content)
            .into_iter()
            .filter(|name| !self.variables.contains(name))
            .collect()
    }

    pub fn has_doc(&self) -> bool {
        !self.doc.is_empty()
    }
}

/// The whole prompt file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCollection {
    #[serde(default)]
    pub prompts: Vec<Prompt>,
}

impl PromptCollection {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self { prompts }
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Stable sort by lowercase title.
    pub fn sort_by_title(&mut self) {
        self.prompts.sort_by_cached_key(|p| p.title.to_lowercase());
    }

    pub fn push(&mut self, prompt: Prompt) {
        self.prompts.push(prompt);
    }

    /// Look up a prompt by exact title. Titles are not unique; with duplicates
    /// any one of them may be returned.
    pub fn get_by_title(&self, title: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.title == title)
    }

    #[cfg(test)]
    pub fn is_sorted_by_title(&self) -> bool {
        self.prompts
            .windows(2)
            .all(|w| w[0].title.to_lowercase() <= w[1].title.to_lowercase())
    }
}

/// What the list browser needs from an entry.
pub trait ListEntry {
    /// First line of the list item.
    fn label(&self) -> &str;
    /// Second, dimmed line of the list item.
    fn detail(&self) -> String;
    /// Text matched by the filter.
    fn filter_value(&self) -> String;
}

impl ListEntry for Prompt {
    fn label(&self) -> &str {
        &self.title
    }

    fn detail(&self) -> String {
        self.tags.join(", ")
    }

    fn filter_value(&self) -> String {
        if self.tags.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.tags.join(" "))
        }
    }
}

/// Split a comma separated tag list, trimming and dropping empty pieces.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
