use std::{fmt, str::FromStr};

use crate::error::SummarizeError;

/// Target length and level of detail of the summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Conciseness {
    #[default]
    Concise,
    Medium,
    Detailed,
}

impl Conciseness {
    pub const ALL: [Conciseness; 3] = [
        Conciseness::Concise,
        Conciseness::Medium,
        Conciseness::Detailed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Conciseness::Concise => "concise",
            Conciseness::Medium => "medium",
            Conciseness::Detailed => "detailed",
        }
    }

    /// Length instruction sent to the model as its own user message.
    pub fn detail(&self) -> &'static str {
        match self {
            Conciseness::Concise => {
                "The summary should be concise and easy to understand, and should not be longer than 100 words."
            }
            Conciseness::Medium => {
                "The summary should be easy to understand, and should not be longer than 250 words."
            }
            Conciseness::Detailed => {
                "The summary should be detailed, comprehensive and easy to understand, and should not be longer than 500 words."
            }
        }
    }
}

impl fmt::Display for Conciseness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Conciseness {
    type Err = SummarizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Conciseness::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| SummarizeError::UnknownOption {
                option: "conciseness",
                value: s.to_string(),
                expected: "concise, medium, detailed",
            })
    }
}
