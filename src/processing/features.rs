//! Profile feature detection: contact details, links and an experience section

use regex::Regex;
use serde::{Deserialize, Serialize};

const EXPERIENCE_KEYWORDS: &[&str] = &[
    "experience",
    "work experience",
    "internship",
    "employment history",
    "professional experience",
    "roles and responsibilities",
    "career timeline",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFeatures {
    pub linkedin: bool,
    pub github: bool,
    pub email: bool,
    pub phone: bool,
    pub portfolio: bool,
    pub experience: bool,
    /// Addresses as written in the résumé, in order of appearance
    pub emails: Vec<String>,
}

impl ProfileFeatures {
    /// Count of detected features, e-mail list excluded
    pub fn present_count(&self) -> usize {
        [
            self.linkedin,
            self.github,
            self.email,
            self.phone,
            self.portfolio,
            self.experience,
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

pub struct FeatureDetector {
    linkedin_regex: Regex,
    github_regex: Regex,
    email_regex: Regex,
    phone_regex: Regex,
    url_regex: Regex,
}

impl Default for FeatureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureDetector {
    pub fn new() -> Self {
        let linkedin_regex = Regex::new(r"linkedin\.com/in/[\w-]+").expect("Invalid LinkedIn regex");

        let github_regex = Regex::new(r"github\.com/[\w-]+").expect("Invalid GitHub regex");

        let email_regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("Invalid email regex");

        let phone_regex = Regex::new(r"\+?\d[\d\s().-]{8,}\d").expect("Invalid phone regex");

        let url_regex = Regex::new(r#"https?://[^"\s]+"#).expect("Invalid URL regex");

        Self {
            linkedin_regex,
            github_regex,
            email_regex,
            phone_regex,
            url_regex,
        }
    }

    pub fn detect(&self, text: &str) -> ProfileFeatures {
        let lowered = text.to_lowercase();
        let emails = self.extract_emails(text);

        ProfileFeatures {
            linkedin: self.linkedin_regex.is_match(&lowered),
            github: self.github_regex.is_match(&lowered),
            email: !emails.is_empty(),
            phone: self.phone_regex.is_match(&lowered),
            portfolio: self.url_regex.is_match(&lowered),
            experience: EXPERIENCE_KEYWORDS
                .iter()
                .any(|keyword| lowered.contains(keyword)),
            emails,
        }
    }

    /// Distinct e-mail addresses in order of first appearance
    pub fn extract_emails(&self, text: &str) -> Vec<String> {
        let mut emails: Vec<String> = Vec::new();
        for m in self.email_regex.find_iter(text) {
            let email = m.as_str().trim_end_matches('.').to_string();
            if !emails.contains(&email) {
                emails.push(email);
            }
        }
        emails
    }
}
