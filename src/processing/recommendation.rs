//! Course recommendations for missing skills
//!
//! Each course is indexed as its title plus short intro in a TF-IDF space
//! fitted on the whole catalogue with English stop words removed. A skill is
//! projected into that space and the closest courses are recommended.

use crate::error::{CvMatcherError, Result};
use crate::processing::text_processor;
use crate::processing::tfidf::{SparseVector, TfIdfVectorizer};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub url: String,
    pub intro: String,
}

impl Course {
    pub fn new(title: impl Into<String>, url: impl Into<String>, intro: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            intro: intro.into(),
        }
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.title, self.intro)
    }
}

/// One recommended course for a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub title: String,
    pub url: String,
    pub similarity: f64,
}

/// Row of a course CSV; extra columns are ignored
#[derive(Debug, Deserialize)]
struct CourseRecord {
    #[serde(rename = "Course Title", alias = "title", default)]
    title: Option<String>,
    #[serde(rename = "Course URL", alias = "url", default)]
    url: Option<String>,
    #[serde(rename = "Course Short Intro", alias = "intro", default)]
    intro: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseCatalogue {
    courses: Vec<Course>,
}

impl CourseCatalogue {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// Load a CSV catalogue with `Course Title`, `Course URL` and
    /// `Course Short Intro` columns (or `title`, `url`, `intro`)
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            CvMatcherError::Catalogue(format!("Cannot open {}: {}", path.display(), e))
        })?;
        let catalogue = Self::from_reader(file)?;
        info!("Loaded {} courses from {}", catalogue.len(), path.display());
        Ok(catalogue)
    }

    /// Rows without a title or URL are skipped
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut courses = Vec::new();
        let mut skipped = 0usize;

        for record in reader.deserialize::<CourseRecord>() {
            let record = record.map_err(|e| CvMatcherError::Catalogue(format!("Malformed course row: {}", e)))?;

            let title = record.title.unwrap_or_default();
            let url = record.url.unwrap_or_default();
            if title.is_empty() || url.is_empty() {
                skipped += 1;
                continue;
            }

            courses.push(Course::new(title, url, record.intro.unwrap_or_default()));
        }

        if skipped > 0 {
            debug!("Skipped {} course rows without a title or URL", skipped);
        }

        Ok(Self::new(courses))
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

struct CourseIndex {
    vectorizer: TfIdfVectorizer,
    vectors: Vec<SparseVector>,
}

pub struct CourseRecommender {
    courses: Vec<Course>,
    index: Option<CourseIndex>,
}

impl CourseRecommender {
    pub fn new(catalogue: CourseCatalogue) -> Self {
        let courses = catalogue.courses;
        let texts: Vec<String> = courses.iter().map(Course::search_text).collect();

        let index = if texts.is_empty() {
            None
        } else {
            match TfIdfVectorizer::fit_with_stop_words(&texts, text_processor::stop_words()) {
                Ok(vectorizer) => {
                    debug!(
                        "Course index: {} courses, {} terms",
                        courses.len(),
                        vectorizer.vocabulary_size()
                    );
                    let vectors = texts.iter().map(|text| vectorizer.transform(text)).collect();
                    Some(CourseIndex { vectorizer, vectors })
                }
                Err(e) => {
                    warn!("Course catalogue has no searchable text: {}", e);
                    None
                }
            }
        };

        Self { courses, index }
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    /// Up to `limit` courses for one skill, most similar first.
    ///
    /// Courses sharing no term with the skill are never recommended.
    pub fn recommend(&self, skill: &str, limit: usize) -> Vec<CourseRecommendation> {
        let Some(index) = &self.index else {
            return Vec::new();
        };

        let query = index.vectorizer.transform(skill);
        if query.is_zero() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = index
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, query.cosine(vector)))
            .filter(|(_, similarity)| *similarity > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(position, similarity)| {
                let course = &self.courses[position];
                CourseRecommendation {
                    title: course.title.clone(),
                    url: course.url.clone(),
                    similarity,
                }
            })
            .collect()
    }

    /// Recommendations keyed by skill; skills without a match are left out
    pub fn recommend_all<'a, I>(&self, skills: I, limit: usize) -> BTreeMap<String, Vec<CourseRecommendation>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        skills
            .into_iter()
            .filter_map(|skill| {
                let courses = self.recommend(skill, limit);
                (!courses.is_empty()).then(|| (skill.clone(), courses))
            })
            .collect()
    }
}
