use std::fmt;

/// Human-readable sentiment category derived from a raw model label.
///
/// Labels outside the configured table pass through verbatim in `Raw` so a
/// differently-labeled checkpoint degrades to showing its own vocabulary
/// instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
    Raw(String),
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Negative => f.write_str("Negative"),
            Sentiment::Neutral => f.write_str("Neutral"),
            Sentiment::Positive => f.write_str("Positive"),
            Sentiment::Raw(label) => f.write_str(label),
        }
    }
}

/// Raw-label → sentiment lookup table.
///
/// The table is configuration tied to the backing checkpoint, not a universal
/// constant: the cardiffnlp 3-class models emit `LABEL_0/1/2`, star-rating
/// models emit `1 star`..`5 stars`.
#[derive(Debug, Clone)]
pub struct LabelMap {
    entries: Vec<(&'static str, Sentiment)>,
}

impl LabelMap {
    /// Table for 3-class checkpoints (`LABEL_0/1/2`). The default.
    pub fn three_class() -> Self {
        Self {
            entries: vec![
                ("LABEL_0", Sentiment::Negative),
                ("LABEL_1", Sentiment::Neutral),
                ("LABEL_2", Sentiment::Positive),
            ],
        }
    }

    /// Table for 5-star rating checkpoints, folded onto the same three
    /// categories.
    pub fn five_star() -> Self {
        Self {
            entries: vec![
                ("1 star", Sentiment::Negative),
                ("2 stars", Sentiment::Negative),
                ("3 stars", Sentiment::Neutral),
                ("4 stars", Sentiment::Positive),
                ("5 stars", Sentiment::Positive),
            ],
        }
    }

    /// Map a raw model label onto the taxonomy. Total: unknown labels come
    /// back unchanged as `Sentiment::Raw`.
    pub fn normalize(&self, raw: &str) -> Sentiment {
        self.entries
            .iter()
            .find(|(label, _)| *label == raw)
            .map(|(_, sentiment)| sentiment.clone())
            .unwrap_or_else(|| Sentiment::Raw(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_class_table_maps_all_entries() {
        let map = LabelMap::three_class();
        assert_eq!(map.normalize("LABEL_0"), Sentiment::Negative);
        assert_eq!(map.normalize("LABEL_1"), Sentiment::Neutral);
        assert_eq!(map.normalize("LABEL_2"), Sentiment::Positive);
    }

    #[test]
    fn unknown_label_passes_through_unchanged() {
        let map = LabelMap::three_class();
        assert_eq!(
            map.normalize("LABEL_7"),
            Sentiment::Raw("LABEL_7".to_string())
        );
        assert_eq!(map.normalize("LABEL_7").to_string(), "LABEL_7");
    }

    #[test]
    fn five_star_table_folds_onto_three_categories() {
        let map = LabelMap::five_star();
        assert_eq!(map.normalize("1 star"), Sentiment::Negative);
        assert_eq!(map.normalize("2 stars"), Sentiment::Negative);
        assert_eq!(map.normalize("3 stars"), Sentiment::Neutral);
        assert_eq!(map.normalize("4 stars"), Sentiment::Positive);
        assert_eq!(map.normalize("5 stars"), Sentiment::Positive);
    }

    #[test]
    fn display_matches_output_column_values() {
        assert_eq!(Sentiment::Positive.to_string(), "Positive");
        assert_eq!(Sentiment::Negative.to_string(), "Negative");
        assert_eq!(Sentiment::Neutral.to_string(), "Neutral");
    }
}
