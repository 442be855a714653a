use serde::{Deserialize, Serialize};

use super::document::Document;
use super::ModelError;

/// Macro kept local: filter vocab enums share the str pattern used in enums.rs.
macro_rules! filter_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

filter_enum!(FilterField {
    Title => "title",
    Author => "author",
    Summary => "summary",
    Keywords => "keywords",
});

filter_enum!(FilterCondition {
    Contains => "contains",
    NotContains => "not-contains",
    Equals => "equals",
    NotEquals => "not-equals",
});

/// A single filter rule over document metadata. Matching is
/// case-insensitive; the keywords field matches against each keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    pub field: FilterField,
    pub condition: FilterCondition,
    pub value: String,
}

impl FilterRule {
    pub fn matches(&self, doc: &Document) -> bool {
        let needle = self.value.to_lowercase();
        let hit = match self.field {
            FilterField::Title => field_hit(&doc.title, &needle, self.condition),
            FilterField::Author => field_hit(&doc.author, &needle, self.condition),
            FilterField::Summary => field_hit(&doc.summary, &needle, self.condition),
            FilterField::Keywords => doc
                .keywords
                .iter()
                .any(|k| field_hit(k, &needle, positive(self.condition))),
        };
        match self.condition {
            FilterCondition::Contains | FilterCondition::Equals => hit,
            // For keywords the negative conditions mean "no keyword matches".
            FilterCondition::NotContains | FilterCondition::NotEquals => {
                if self.field == FilterField::Keywords {
                    !hit
                } else {
                    hit
                }
            }
        }
    }
}

/// The affirmative counterpart of a condition (used for per-keyword tests).
fn positive(condition: FilterCondition) -> FilterCondition {
    match condition {
        FilterCondition::NotContains => FilterCondition::Contains,
        FilterCondition::NotEquals => FilterCondition::Equals,
        other => other,
    }
}

fn field_hit(haystack: &str, needle: &str, condition: FilterCondition) -> bool {
    let haystack = haystack.to_lowercase();
    match condition {
        FilterCondition::Contains => haystack.contains(needle),
        FilterCondition::NotContains => !haystack.contains(needle),
        FilterCondition::Equals => haystack == needle,
        FilterCondition::NotEquals => haystack != needle,
    }
}
