use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed vocabulary of attack categories a submission can target.
///
/// Serialized with the human label, which is also the value sent in the
/// repeated `selectedCategories` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Prompt Injection")]
    PromptInjection,
    #[serde(rename = "Data Leakage")]
    DataLeakage,
    #[serde(rename = "Jailbreaking")]
    Jailbreaking,
    #[serde(rename = "Ethical Concerns")]
    EthicalConcerns,
    #[serde(rename = "Adversarial Examples")]
    AdversarialExamples,
    #[serde(rename = "Model Evasion")]
    ModelEvasion,
    #[serde(rename = "Privacy Violations")]
    PrivacyViolations,
    #[serde(rename = "Code Injection")]
    CodeInjection,
    #[serde(rename = "Logic Flaws")]
    LogicFlaws,
    #[serde(rename = "Unauthorized API Access")]
    UnauthorizedApiAccess,
    #[serde(rename = "Backdoor Triggers")]
    BackdoorTriggers,
    #[serde(rename = "Command Injection")]
    CommandInjection,
    #[serde(rename = "Information Disclosure")]
    InformationDisclosure,
    #[serde(rename = "Denial of Service (DoS)")]
    DenialOfService,
    #[serde(rename = "Unintended Feature Activation")]
    UnintendedFeatureActivation,
    #[serde(rename = "Identity Spoofing")]
    IdentitySpoofing,
    #[serde(rename = "Social Engineering Assistance")]
    SocialEngineeringAssistance,
    #[serde(rename = "Malicious File Upload")]
    MaliciousFileUpload,
    #[serde(rename = "Resource Exhaustion")]
    ResourceExhaustion,
}

impl Category {
    /// Picker order.
    pub const ALL: [Category; 19] = [
        Self::PromptInjection,
        Self::DataLeakage,
        Self::Jailbreaking,
        Self::EthicalConcerns,
        Self::AdversarialExamples,
        Self::ModelEvasion,
        Self::PrivacyViolations,
        Self::CodeInjection,
        Self::LogicFlaws,
        Self::UnauthorizedApiAccess,
        Self::BackdoorTriggers,
        Self::CommandInjection,
        Self::InformationDisclosure,
        Self::DenialOfService,
        Self::UnintendedFeatureActivation,
        Self::IdentitySpoofing,
        Self::SocialEngineeringAssistance,
        Self::MaliciousFileUpload,
        Self::ResourceExhaustion,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PromptInjection => "Prompt Injection",
            Self::DataLeakage => "Data Leakage",
            Self::Jailbreaking => "Jailbreaking",
            Self::EthicalConcerns => "Ethical Concerns",
            Self::AdversarialExamples => "Adversarial Examples",
            Self::ModelEvasion => "Model Evasion",
            Self::PrivacyViolations => "Privacy Violations",
            Self::CodeInjection => "Code Injection",
            Self::LogicFlaws => "Logic Flaws",
            Self::UnauthorizedApiAccess => "Unauthorized API Access",
            Self::BackdoorTriggers => "Backdoor Triggers",
            Self::CommandInjection => "Command Injection",
            Self::InformationDisclosure => "Information Disclosure",
            Self::DenialOfService => "Denial of Service (DoS)",
            Self::UnintendedFeatureActivation => "Unintended Feature Activation",
            Self::IdentitySpoofing => "Identity Spoofing",
            Self::SocialEngineeringAssistance => "Social Engineering Assistance",
            Self::MaliciousFileUpload => "Malicious File Upload",
            Self::ResourceExhaustion => "Resource Exhaustion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0:?}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    /// Matches labels exactly after trimming; case is ignored so shells can
    /// pass through user-typed values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}
