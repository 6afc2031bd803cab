use anyhow::{bail, Context, Result};
use rand::Rng;
use std::{collections::HashMap, fs, path::Path};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub answer: String,
}

/// Question → expected answer mapping, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
}

impl QuestionSet {
    /// Build a set from `(question, answer)` pairs. Duplicate questions keep
    /// the last answer.
    ///
    /// # Errors
    /// Returns an error if no pairs are given.
    pub fn from_pairs<I, Q, A>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        let mut questions: Vec<Question> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (text, answer) in pairs {
            let text = text.into();
            let answer = answer.into();
            if let Some(&position) = index.get(&text) {
                questions[position].answer = answer;
            } else {
                index.insert(text.clone(), questions.len());
                questions.push(Question { text, answer });
            }
        }

        if questions.is_empty() {
            bail!("question set is empty");
        }

        Ok(Self { questions, index })
    }

    /// Load a JSON object of `"question": "answer"` entries.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not a string→string
    /// object, or holds no questions.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read questions from {}", path.display()))?;
        let map: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse questions in {}", path.display()))?;

        let mut pairs: Vec<(String, String)> = map.into_iter().collect();
        pairs.sort();

        let set = Self::from_pairs(pairs)
            .with_context(|| format!("no questions in {}", path.display()))?;

        info!("Loaded {} questions from {}", set.len(), path.display());

        Ok(set)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn answer(&self, question: &str) -> Option<&str> {
        self.index
            .get(question)
            .map(|&position| self.questions[position].answer.as_str())
    }

    /// Pick a question uniformly at random.
    #[must_use]
    pub fn draw(&self) -> &Question {
        let position = rand::thread_rng().gen_range(0..self.questions.len());
        &self.questions[position]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}
