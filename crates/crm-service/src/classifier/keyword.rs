use async_trait::async_trait;

use super::{rank, Classifier, ClassifierError, LabelScore};

/// Rule-based classifier: each label scores by how many of its keywords
/// appear in the text. Labels without rules score zero.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<(String, Vec<String>)>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new([
            ("customer", &["customer", "client", "account"][..]),
            ("opportunity", &["opportunit", "deal"][..]),
            ("interaction", &["interaction", "call", "email", "meeting"][..]),
        ])
    }
}

impl KeywordClassifier {
    pub fn new<'a>(rules: impl IntoIterator<Item = (&'a str, &'a [&'a str])>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(label, words)| {
                    (
                        label.to_string(),
                        words.iter().map(|w| w.to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    fn hits(&self, label: &str, text: &str) -> usize {
        self.rules
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, words)| words.iter().filter(|w| text.contains(w.as_str())).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::Empty);
        }
        let text = text.to_lowercase();
        let hits: Vec<usize> = labels.iter().map(|label| self.hits(label, &text)).collect();
        let total: usize = hits.iter().sum();

        // No hits: uniform scores, candidate order preserved by the stable sort.
        let mut scores: Vec<LabelScore> = labels
            .iter()
            .zip(&hits)
            .map(|(label, &n)| LabelScore {
                label: label.to_string(),
                score: if total == 0 {
                    1.0 / labels.len() as f64
                } else {
                    n as f64 / total as f64
                },
            })
            .collect();
        rank(&mut scores);
        Ok(scores)
    }
}
