use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ComplianceStatus {
    Compliant => "compliant",
    NonCompliant => "non_compliant",
});

str_enum!(WorkflowState {
    Uploaded => "uploaded",
    Shared => "shared",
    Signed => "signed",
});

str_enum!(Role {
    FinanceManager => "finance_manager",
    Cfo => "cfo",
    Auditor => "auditor",
});

impl Role {
    /// Whether this role may route a document out for signature.
    pub fn can_share(&self) -> bool {
        matches!(self, Role::FinanceManager | Role::Cfo)
    }

    /// Whether this role may apply a signature. Only the CFO signs.
    pub fn can_sign(&self) -> bool {
        matches!(self, Role::Cfo)
    }

    /// Archival follows signing authority.
    pub fn can_archive(&self) -> bool {
        self.can_sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn compliance_status_round_trip() {
        for (variant, s) in [
            (ComplianceStatus::Compliant, "compliant"),
            (ComplianceStatus::NonCompliant, "non_compliant"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ComplianceStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn workflow_state_round_trip() {
        for (variant, s) in [
            (WorkflowState::Uploaded, "uploaded"),
            (WorkflowState::Shared, "shared"),
            (WorkflowState::Signed, "signed"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(WorkflowState::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn role_round_trip() {
        for (variant, s) in [
            (Role::FinanceManager, "finance_manager"),
            (Role::Cfo, "cfo"),
            (Role::Auditor, "auditor"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Role::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(ComplianceStatus::from_str("invalid").is_err());
        assert!(Role::from_str("ceo").is_err());
        assert!(WorkflowState::from_str("").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"non_compliant\"");
        let back: Role = serde_json::from_str("\"finance_manager\"").unwrap();
        assert_eq!(back, Role::FinanceManager);
    }

    #[test]
    fn permission_matrix() {
        assert!(Role::FinanceManager.can_share());
        assert!(!Role::FinanceManager.can_sign());
        assert!(Role::Cfo.can_share());
        assert!(Role::Cfo.can_sign());
        assert!(Role::Cfo.can_archive());
        assert!(!Role::Auditor.can_share());
        assert!(!Role::Auditor.can_sign());
        assert!(!Role::Auditor.can_archive());
    }
}
