// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Feature model — which generation the user asked for.
//
// The feature determines the backend endpoint, which settings feed the
// request payload, and how stream deltas are rendered. A closed enum:
// adding a feature means adding a variant, and every match over it is
// exhaustive.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Feature enum
// ---------------------------------------------------------------------------

/// The logical operation behind one streaming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Generate test ideas for the selected element.
    TestIdeas,
    /// Generate automated tests for the selected element.
    AutomateTests,
    /// Generate automated tests from a set of previously selected ideas.
    AutomateFromIdeas,
    /// Run an accessibility check over the selected element.
    CheckAccessibility,
}

impl Feature {
    /// Backend endpoint path for this feature.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Feature::TestIdeas => "/api/generate-ideas",
            Feature::AutomateTests => "/api/automate-tests",
            Feature::AutomateFromIdeas => "/api/automate-tests-ideas",
            Feature::CheckAccessibility => "/api/check-accessibility",
        }
    }

    /// Whether the rendered output is source code (fence-stripped and
    /// accumulated into a code buffer) rather than prose.
    pub fn is_code_generation(&self) -> bool {
        matches!(self, Feature::AutomateTests | Feature::AutomateFromIdeas)
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Feature::TestIdeas => "test-ideas",
            Feature::AutomateTests => "automated-tests",
            Feature::AutomateFromIdeas => "automate-ideas",
            Feature::CheckAccessibility => "check-accessibility",
        };
        f.write_str(s)
    }
}

/// Health check endpoint, probed before generation is offered.
pub const PING_ENDPOINT: &str = "/api/ping";

/// Default backend when no custom server URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.testcraft.app";

// ---------------------------------------------------------------------------
// Request payload
// ---------------------------------------------------------------------------

/// JSON body POSTed to the feature endpoint.
///
/// Field names are camelCase on the wire. Optional fields are omitted
/// entirely when unset — the backend treats absence and null differently.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub source_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
