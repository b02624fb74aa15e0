//! Worker capability tags.

use serde::{Deserialize, Serialize};

/// Domain tag routing a task to its worker.
///
/// Dispatch is always by tag; the keyword lists exist only as a heuristic
/// classifier for free text (and to pick prompt variants inside workers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Dev,
    Qa,
    Designer,
    Hr,
    Finance,
    Sales,
    Marketing,
    Support,
    Analyst,
}

impl Capability {
    /// All known capabilities, in catalog order.
    pub const ALL: [Capability; 9] = [
        Capability::Dev,
        Capability::Qa,
        Capability::Designer,
        Capability::Hr,
        Capability::Finance,
        Capability::Sales,
        Capability::Marketing,
        Capability::Support,
        Capability::Analyst,
    ];

    /// The general-analysis capability used when decomposition falls back.
    pub const DEFAULT: Capability = Capability::Analyst;

    /// Wire tag — matches the decomposition schema's `agent_type` values.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Qa => "qa",
            Self::Designer => "designer",
            Self::Hr => "hr",
            Self::Finance => "finance",
            Self::Sales => "sales",
            Self::Marketing => "marketing",
            Self::Support => "support",
            Self::Analyst => "analyst",
        }
    }

    /// One-line domain description for the capability catalog prompt.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Dev => "code development, feature implementation, unit tests, API endpoints",
            Self::Qa => "testing, quality assurance, test cases, regression analysis",
            Self::Designer => "UI/UX design, mockups, design systems, components",
            Self::Hr => "onboarding, employee management, policies",
            Self::Finance => "expenses, invoices, budgets, financial analysis",
            Self::Sales => "CRM, demos, lead follow-up",
            Self::Marketing => "content, marketing strategy, copywriting",
            Self::Support => "customer support, tickets, customer success",
            Self::Analyst => "data analysis, reports, metrics",
        }
    }

    /// Domain vocabulary for heuristic classification of free text.
    ///
    /// Bilingual where the workspaces this serves are — lowercase only.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Dev => &[
                "code",
                "development",
                "implementation",
                "endpoint",
                "api",
                "boilerplate",
                "debug",
                "pull request",
                "código",
                "desarrollo",
                "implementación",
            ],
            Self::Qa => &[
                "testing",
                "quality",
                "test case",
                "qa",
                "bug",
                "regression",
                "coverage",
                "calidad",
                "casos de prueba",
            ],
            Self::Designer => &[
                "design",
                "ui",
                "ux",
                "mockup",
                "wireframe",
                "component",
                "css",
                "diseño",
                "componente",
            ],
            Self::Hr => &[
                "onboarding",
                "employee",
                "policy",
                "hr",
                "welcome",
                "buddy",
                "empleado",
                "bienvenida",
                "políticas",
            ],
            Self::Finance => &[
                "finance",
                "expense",
                "invoice",
                "budget",
                "accounting",
                "reimbursement",
                "finanzas",
                "gasto",
                "factura",
                "presupuesto",
            ],
            Self::Sales => &[
                "sales",
                "crm",
                "lead",
                "demo",
                "follow-up",
                "briefing",
                "ventas",
                "seguimiento",
            ],
            Self::Marketing => &[
                "marketing",
                "content",
                "blog",
                "social media",
                "copywriting",
                "campaign",
                "contenido",
                "estrategia",
            ],
            Self::Support => &[
                "support",
                "ticket",
                "customer",
                "faq",
                "churn",
                "engagement",
                "soporte",
                "cliente",
            ],
            Self::Analyst => &[
                "analysis",
                "data",
                "report",
                "metric",
                "correlation",
                "trend",
                "insight",
                "análisis",
                "datos",
                "reporte",
                "métricas",
            ],
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_tags_roundtrip() {
        for capability in Capability::ALL {
            let json = serde_json::to_string(&capability).unwrap();
            assert_eq!(json, format!("\"{}\"", capability.tag()));
            let parsed: Capability = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, capability);
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        let parsed: Result<Capability, _> = serde_json::from_str("\"astrology\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn default_is_analyst() {
        assert_eq!(Capability::DEFAULT, Capability::Analyst);
    }

    #[test]
    fn keywords_are_lowercase() {
        for capability in Capability::ALL {
            for keyword in capability.keywords() {
                assert_eq!(*keyword, keyword.to_lowercase());
            }
        }
    }

    #[test]
    fn display_matches_tag() {
        assert_eq!(Capability::Dev.to_string(), "dev");
        assert_eq!(Capability::Analyst.to_string(), "analyst");
    }
}
