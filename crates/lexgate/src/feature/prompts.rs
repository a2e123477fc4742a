// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instruction templates sent with each feature call.

use crate::feature::Feature;

pub fn system_message(feature: Feature) -> &'static str {
    match feature {
        Feature::Chat => {
            "You are a knowledgeable legal assistant. Provide helpful, accurate legal information \
             while being clear that you're providing educational information, not legal advice. \
             Be conversational but professional."
        }
        Feature::DescribeProblem => {
            "You are a legal classification expert. Analyze legal problems and categorize them \
             accurately. Always respond with valid JSON."
        }
        Feature::RiskRadar => {
            "You are a legal document risk analyzer. Identify risks, unfair terms, and provide \
             actionable recommendations. Always respond with valid JSON."
        }
        Feature::Strategy => {
            "You are a legal strategy advisor. Provide multiple strategic approaches for legal \
             situations. Always respond with valid JSON."
        }
        Feature::Rights => {
            "You are a constitutional rights expert. Analyze scenarios for rights violations and \
             constitutional implications. Always respond with valid JSON."
        }
        Feature::Constitution => {
            "You are a constitutional law educator. Explain constitutional provisions in simple, \
             accessible language. Always respond with valid JSON."
        }
    }
}

/// Build the user message for `feature` around `input`.
pub fn user_prompt(feature: Feature, input: &str) -> String {
    match feature {
        Feature::Chat => input.to_owned(),
        Feature::DescribeProblem => format!(
            r#"Analyze the following legal problem and provide:
1. Case Category (e.g., Criminal, Civil, Family, Property, Constitutional, etc.)
2. Relevant Legal Sections (list applicable laws or sections)
3. Suggested Next Steps (practical advice)

Problem: {input}

Return your response in this JSON format:
{{
  "category": "category name",
  "sections": ["section 1", "section 2"],
  "nextSteps": ["step 1", "step 2", "step 3"]
}}"#
        ),
        Feature::RiskRadar => format!(
            r#"Analyze this legal document for risks and fairness:

{input}

Provide:
1. Summary (brief overview)
2. Risk Severity (Low/Medium/High)
3. Fairness Score (0-100, where 100 is most fair)
4. Flagged Clauses (list problematic clauses)
5. Clause Improvements (suggestions for each flagged clause)
6. Recommended Actions (what to do next)

Return as JSON:
{{
  "summary": "brief summary",
  "riskSeverity": "Low|Medium|High",
  "fairnessScore": 75,
  "flaggedClauses": ["clause 1", "clause 2"],
  "improvements": ["improvement 1", "improvement 2"],
  "actions": ["action 1", "action 2"]
}}"#
        ),
        Feature::Strategy => format!(
            r#"Given this legal situation, provide three strategic approaches:

Situation: {input}

Provide:
1. Conservative Strategy (low-risk, cautious approach)
2. Balanced Strategy (moderate approach)
3. Aggressive Strategy (assertive approach)

For each strategy include:
- Description
- Pros
- Cons
- Timeline

Return as JSON:
{{
  "conservative": {{
    "description": "...",
    "pros": ["pro 1", "pro 2"],
    "cons": ["con 1", "con 2"],
    "timeline": "..."
  }},
  "balanced": {{ ... }},
  "aggressive": {{ ... }}
}}"#
        ),
        Feature::Rights => format!(
            r#"Analyze this scenario for constitutional rights exposure:

Scenario: {input}

Identify:
1. Affected Constitutional Rights (e.g., Right to Equality, Freedom of Speech, Right to Life, etc.)
2. Relevant Articles (constitutional articles involved)
3. Severity Level (Low/Medium/High/Critical)
4. Explanation (how rights are affected)

Return as JSON:
{{
  "affectedRights": ["right 1", "right 2"],
  "articles": ["Article 14", "Article 19"],
  "severityLevel": "Medium",
  "explanation": "detailed explanation"
}}"#
        ),
        Feature::Constitution => format!(
            r#"Explain the following constitutional provision in simple language:

Query: {input}

Provide:
1. Simple Explanation (easy to understand)
2. Key Points (main takeaways)
3. Examples (real-world applications)
4. Related Provisions (connected articles)

Return as JSON:
{{
  "explanation": "simple explanation",
  "keyPoints": ["point 1", "point 2"],
  "examples": ["example 1", "example 2"],
  "relatedProvisions": ["provision 1", "provision 2"]
}}"#
        ),
    }
}
