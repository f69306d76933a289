//! Symptom catalog and backend vocabulary mapping

/// A selectable symptom with an optional follow-up question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symptom {
    pub id: &'static str,
    pub name: &'static str,
    pub follow_up_question: Option<&'static str>,
    pub options: &'static [&'static str],
}

impl Symptom {
    /// Whether selecting this symptom should prompt for a follow-up answer
    pub fn has_follow_up(&self) -> bool {
        self.follow_up_question.is_some() && !self.options.is_empty()
    }
}

const SEVERITY: &[&str] = &["Mild", "Moderate", "Severe"];

static CATALOG: &[Symptom] = &[
    Symptom {
        id: "cough",
        name: "Cough",
        follow_up_question: Some("How long have you had the cough?"),
        options: &["Less than a week", "1-2 weeks", "More than 2 weeks"],
    },
    Symptom {
        id: "fever",
        name: "Fever",
        follow_up_question: Some("What is your temperature?"),
        options: &["37.5-38.0°C", "38.1-39.0°C", "Above 39.0°C"],
    },
    Symptom {
        id: "breathing",
        name: "Difficulty Breathing",
        follow_up_question: Some("How severe is your breathing difficulty?"),
        options: SEVERITY,
    },
    Symptom {
        id: "fatigue",
        name: "Fatigue",
        follow_up_question: Some("How would you rate your fatigue level?"),
        options: SEVERITY,
    },
    Symptom {
        id: "taste_smell",
        name: "Loss of Taste/Smell",
        follow_up_question: Some("When did you notice this symptom?"),
        options: &["Today", "2-3 days ago", "More than 3 days"],
    },
    Symptom {
        id: "body_aches",
        name: "Body Aches",
        follow_up_question: Some("Where do you feel the most pain?"),
        options: &["Muscles", "Joints", "Both"],
    },
    Symptom {
        id: "headache",
        name: "Headache",
        follow_up_question: Some("How would you describe your headache?"),
        options: SEVERITY,
    },
    Symptom {
        id: "sore_throat",
        name: "Sore Throat",
        follow_up_question: Some("How long have you had the sore throat?"),
        options: &["1-2 days", "3-5 days", "More than 5 days"],
    },
];

/// Internal id -> string understood by the prediction service.
/// Ids missing here are not sent.
const BACKEND_VOCABULARY: &[(&str, &str)] = &[
    ("cough", "cough"),
    ("fever", "fever"),
    ("breathing", "shortness of breath"),
    ("fatigue", "fatigue"),
    ("taste_smell", "loss of taste or smell"),
    ("sore_throat", "cold"),
];

/// All symptoms in display order
pub fn symptom_catalog() -> &'static [Symptom] {
    CATALOG
}

/// Look up a symptom by id
pub fn find_symptom(id: &str) -> Option<&'static Symptom> {
    CATALOG.iter().find(|s| s.id == id)
}

/// Translate selected symptom ids into the backend's vocabulary.
///
/// Unmapped ids are dropped. The output follows the iteration order of
/// `selected`, which callers should not rely on.
pub fn to_backend_vocabulary<'a, I>(selected: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    selected
        .into_iter()
        .filter_map(|id| {
            BACKEND_VOCABULARY
                .iter()
                .find(|(internal, _)| *internal == id)
                .map(|(_, backend)| backend.to_string())
        })
        .collect()
}
