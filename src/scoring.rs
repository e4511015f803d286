use anyhow::{Context, Result};

use crate::inference::TextClassifier;
use crate::labels::{LabelMap, Sentiment};

/// One scored input item: original text, normalized label, model confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredText {
    pub text: String,
    pub sentiment: Sentiment,
    pub score: f32,
}

/// Classify every item in order and normalize its label.
///
/// Output length and order match the input exactly. The first classification
/// failure aborts the whole batch; nothing scored so far is kept.
pub fn score_all<C: TextClassifier>(
    classifier: &C,
    labels: &LabelMap,
    items: &[String],
) -> Result<Vec<ScoredText>> {
    let total = items.len();
    let progress_every = (total / 10).max(1);
    let mut out = Vec::with_capacity(total);

    for (idx, text) in items.iter().enumerate() {
        let result = classifier
            .classify(text)
            .with_context(|| format!("classification failed on row {}", idx + 1))?;
        out.push(ScoredText {
            text: text.clone(),
            sentiment: labels.normalize(&result.label),
            score: result.score,
        });

        if (idx + 1) % progress_every == 0 {
            println!("   {}/{} rows processed...", idx + 1, total);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Classification;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};

    /// Replays a scripted sequence of results and counts calls.
    struct ScriptedClassifier {
        results: RefCell<Vec<Result<Classification>>>,
        calls: Cell<usize>,
    }

    impl ScriptedClassifier {
        fn new(results: Vec<Result<Classification>>) -> Self {
            let mut results = results;
            results.reverse();
            Self {
                results: RefCell::new(results),
                calls: Cell::new(0),
            }
        }

        fn ok(label: &str, score: f32) -> Result<Classification> {
            Ok(Classification {
                label: label.to_string(),
                score,
            })
        }
    }

    impl TextClassifier for ScriptedClassifier {
        fn classify(&self, _text: &str) -> Result<Classification> {
            self.calls.set(self.calls.get() + 1);
            self.results
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(anyhow!("script exhausted")))
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let classifier = ScriptedClassifier::new(vec![]);
        let scored = score_all(&classifier, &LabelMap::three_class(), &[]).unwrap();
        assert!(scored.is_empty());
        assert_eq!(classifier.calls.get(), 0);
    }

    #[test]
    fn output_preserves_length_and_order() {
        let classifier = ScriptedClassifier::new(vec![
            ScriptedClassifier::ok("LABEL_2", 0.9),
            ScriptedClassifier::ok("LABEL_0", 0.8),
            ScriptedClassifier::ok("LABEL_1", 0.7),
        ]);
        let items = strings(&["great!", "terrible.", "fine"]);
        let scored = score_all(&classifier, &LabelMap::three_class(), &items).unwrap();

        assert_eq!(scored.len(), 3);
        assert_eq!(scored[0].text, "great!");
        assert_eq!(scored[0].sentiment, Sentiment::Positive);
        assert_eq!(scored[1].text, "terrible.");
        assert_eq!(scored[1].sentiment, Sentiment::Negative);
        assert_eq!(scored[2].text, "fine");
        assert_eq!(scored[2].sentiment, Sentiment::Neutral);
    }

    #[test]
    fn positive_review_end_to_end() {
        let classifier = ScriptedClassifier::new(vec![ScriptedClassifier::ok("LABEL_2", 0.95)]);
        let items = strings(&["I love this product!"]);
        let scored = score_all(&classifier, &LabelMap::three_class(), &items).unwrap();

        assert_eq!(
            scored,
            vec![ScoredText {
                text: "I love this product!".to_string(),
                sentiment: Sentiment::Positive,
                score: 0.95,
            }]
        );
    }

    #[test]
    fn first_failure_aborts_the_batch() {
        let classifier = ScriptedClassifier::new(vec![
            ScriptedClassifier::ok("LABEL_2", 0.9),
            Err(anyhow!("weights went missing")),
            ScriptedClassifier::ok("LABEL_0", 0.8),
        ]);
        let items = strings(&["a", "b", "c"]);
        let err = score_all(&classifier, &LabelMap::three_class(), &items).unwrap_err();

        assert!(err.to_string().contains("row 2"));
        // the third item is never attempted
        assert_eq!(classifier.calls.get(), 2);
    }

    #[test]
    fn missing_column_fails_before_any_classification() {
        use crate::tabular::Table;

        let classifier = ScriptedClassifier::new(vec![
            ScriptedClassifier::ok("LABEL_2", 0.9),
            ScriptedClassifier::ok("LABEL_0", 0.8),
        ]);
        let table = Table::from_reader("id,review\n1,great!\n2,terrible.\n".as_bytes()).unwrap();

        assert!(table.column("comment").is_err());
        assert_eq!(classifier.calls.get(), 0);
    }

    #[test]
    fn two_row_table_gains_sentiment_column_in_row_order() {
        use crate::tabular::Table;

        let classifier = ScriptedClassifier::new(vec![
            ScriptedClassifier::ok("LABEL_2", 0.9),
            ScriptedClassifier::ok("LABEL_0", 0.8),
        ]);
        let mut table =
            Table::from_reader("id,review\n1,great!\n2,terrible.\n".as_bytes()).unwrap();

        let texts = table.column("review").unwrap();
        let scored = score_all(&classifier, &LabelMap::three_class(), &texts).unwrap();
        table.append_column(
            "Sentiment",
            scored.iter().map(|s| s.sentiment.to_string()).collect(),
        );

        let out = String::from_utf8(table.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(
            out,
            "id,review,Sentiment\n1,great!,Positive\n2,terrible.,Negative\n"
        );
    }

    #[test]
    fn unknown_labels_flow_through_to_output() {
        let classifier = ScriptedClassifier::new(vec![ScriptedClassifier::ok("LABEL_9", 0.5)]);
        let items = strings(&["odd"]);
        let scored = score_all(&classifier, &LabelMap::three_class(), &items).unwrap();
        assert_eq!(scored[0].sentiment, Sentiment::Raw("LABEL_9".to_string()));
    }
}
