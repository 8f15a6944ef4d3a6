//! Turtle serialization of learner entities
//!
//! Every encoder is a pure function returning a complete Turtle document that
//! starts with the same prefix header. Literals are always typed (`xsd:`) so
//! consumers never have to guess, and all free text goes through
//! [`escape_literal`] because reflection answers can contain anything.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::models::{
    EngagementSnapshot, JourneyProgressMap, ReflectionRow, SkillProfileSnapshot, UserIdentity,
};

/// Namespace of the domain vocabulary
pub const VOCAB_NS: &str = "https://w3id.org/lxp/vocab#";
pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

fn prefixes() -> String {
    format!(
        "@prefix lxp: <{}> .\n@prefix foaf: <{}> .\n@prefix xsd: <{}> .\n\n",
        VOCAB_NS, FOAF_NS, XSD_NS
    )
}

// ============================================================================
// Literal helpers
// ============================================================================

/// Escape a value for use inside a double-quoted Turtle string
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// `mailto:` IRI for an address, each side of the `@` percent-encoded
pub fn mailto_iri(address: &str) -> String {
    match address.rsplit_once('@') {
        Some((local, domain)) => format!(
            "<mailto:{}@{}>",
            urlencoding::encode(local),
            urlencoding::encode(domain)
        ),
        None => format!("<mailto:{}>", urlencoding::encode(address)),
    }
}

fn string(value: &str) -> String {
    format!("\"{}\"", escape_literal(value))
}

fn integer(value: i64) -> String {
    format!("\"{}\"^^xsd:integer", value)
}

fn decimal(value: f64) -> String {
    format!("\"{:.2}\"^^xsd:decimal", value)
}

fn boolean(value: bool) -> String {
    format!("\"{}\"^^xsd:boolean", value)
}

fn date_time(value: &DateTime<Utc>) -> String {
    format!(
        "\"{}\"^^xsd:dateTime",
        lxp_common::time::to_rfc3339(value)
    )
}

/// Writes `subject a type ; p o ; ... .` with one predicate per line
struct NodeWriter {
    out: String,
    predicates: Vec<String>,
}

impl NodeWriter {
    fn new(subject: &str, rdf_type: &str) -> Self {
        Self {
            out: prefixes(),
            predicates: vec![format!("{} a {}", subject, rdf_type)],
        }
    }

    /// Node without an `rdf:type`
    fn untyped(subject: &str, predicate: &str, object: String) -> Self {
        Self {
            out: prefixes(),
            predicates: vec![format!("{} {} {}", subject, predicate, object)],
        }
    }

    fn add(&mut self, predicate: &str, object: String) -> &mut Self {
        self.predicates.push(format!("    {} {}", predicate, object));
        self
    }

    fn finish(mut self) -> String {
        self.out.push_str(&self.predicates.join(" ;\n"));
        self.out.push_str(" .\n");
        self.out
    }
}

// ============================================================================
// Encoders
// ============================================================================

/// Minimal WebID card written when a Pod is provisioned
pub fn identity_card(owner_key: &str) -> String {
    let mut node = NodeWriter::new("<#me>", "foaf:Person");
    node.add("foaf:name", string(owner_key));
    node.finish()
}

/// Identity snapshot stored at `/profile/state`
pub fn user_profile(user: &UserIdentity, updated_at: &DateTime<Utc>) -> String {
    let mut node = NodeWriter::new("<>", "lxp:UserProfile");
    node.add("lxp:userId", string(&user.id))
        .add("foaf:name", string(&user.display_name))
        .add("foaf:mbox", mailto_iri(&user.email))
        .add("lxp:updatedAt", date_time(updated_at));
    node.finish()
}

/// Latest skill-profile snapshot, one blank node per category
pub fn skill_profile(profile: &SkillProfileSnapshot) -> String {
    let mut node = NodeWriter::new("<>", "lxp:SkillProfile");
    node.add("lxp:profileId", string(&profile.id))
        .add("lxp:userId", string(&profile.user_id));

    for (name, score) in &profile.categories {
        if !score.is_finite() {
            tracing::warn!(
                profile_id = %profile.id,
                category = %name,
                "Skipping non-finite skill score"
            );
            continue;
        }
        node.add(
            "lxp:category",
            format!("[ lxp:name {} ; lxp:score {} ]", string(name), decimal(*score)),
        );
    }

    node.add("lxp:createdAt", date_time(&profile.created_at));
    node.finish()
}

/// Engagement counters stored at `/profile/engagement`
pub fn engagement_state(state: &EngagementSnapshot, updated_at: &DateTime<Utc>) -> String {
    let mut node = NodeWriter::new("<>", "lxp:EngagementState");
    node.add("lxp:totalXP", integer(state.total_xp))
        .add("lxp:level", integer(state.level))
        .add("lxp:streak", integer(state.streak))
        .add("lxp:title", string(&state.title))
        .add("lxp:updatedAt", date_time(updated_at));
    node.finish()
}

/// Journey progress stored at `/journey/vuca-state`
///
/// An empty map still yields a valid document carrying only `lxp:updatedAt`.
pub fn journey_progress(journeys: &JourneyProgressMap, updated_at: &DateTime<Utc>) -> String {
    if journeys.is_empty() {
        return NodeWriter::untyped("<>", "lxp:updatedAt", date_time(updated_at)).finish();
    }

    let mut node = NodeWriter::new("<>", "lxp:JourneyProgress");
    for (journey_type, progress) in journeys {
        let mut block = format!(
            "[\n        lxp:journeyType {} ;\n        lxp:started {} ;\n        lxp:stationsCompleted {}",
            string(journey_type),
            boolean(progress.started),
            integer(progress.stations_completed)
        );
        for (dimension, score) in &progress.dimension_scores {
            let _ = write!(
                block,
                " ;\n        lxp:dimensionScore [ lxp:dimension {} ; lxp:score {} ]",
                string(dimension),
                decimal(*score)
            );
        }
        block.push_str("\n    ]");
        node.add("lxp:journey", block);
    }
    node.add("lxp:updatedAt", date_time(updated_at));
    node.finish()
}

/// One journal reflection
pub fn reflection(row: &ReflectionRow) -> String {
    let mut node = NodeWriter::new("<>", "lxp:Reflection");
    node.add("lxp:reflectionId", string(&row.id))
        .add("lxp:questionId", string(&row.question_id))
        .add("lxp:responseText", string(&row.response_text))
        .add("lxp:capabilityScores", string(&row.capability_scores))
        .add("lxp:createdAt", date_time(&row.created_at));
    node.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JourneyProgress;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_every_document_starts_with_prefixes() {
        let doc = identity_card("user-123");
        assert!(doc.starts_with("@prefix lxp: <https://w3id.org/lxp/vocab#> ."));
        assert!(doc.contains("@prefix foaf: <http://xmlns.com/foaf/0.1/> ."));
        assert!(doc.contains("@prefix xsd: <http://www.w3.org/2001/XMLSchema#> ."));
        assert!(doc.trim_end().ends_with('.'));
    }

    #[test]
    fn test_identity_card_declares_person() {
        let doc = identity_card("user-email-com");
        assert!(doc.contains("<#me> a foaf:Person ;"));
        assert!(doc.contains("foaf:name \"user-email-com\" ."));
    }

    #[test]
    fn test_engagement_state_literals() {
        let doc = engagement_state(
            &EngagementSnapshot {
                total_xp: 1500,
                level: 5,
                streak: 3,
                title: "Explorer".to_string(),
            },
            &fixed_time(),
        );

        assert!(doc.contains("lxp:totalXP \"1500\"^^xsd:integer"));
        assert!(doc.contains("lxp:level \"5\"^^xsd:integer"));
        assert!(doc.contains("lxp:streak \"3\"^^xsd:integer"));
        assert!(doc.contains("lxp:title \"Explorer\""));
        assert!(doc.contains("lxp:updatedAt \"2026-10-16T12:00:00Z\"^^xsd:dateTime"));
    }

    #[test]
    fn test_user_profile_fields() {
        let doc = user_profile(
            &UserIdentity {
                id: "u-1".to_string(),
                email: "ada@example.org".to_string(),
                display_name: "Ada".to_string(),
            },
            &fixed_time(),
        );

        assert!(doc.contains("<> a lxp:UserProfile ;"));
        assert!(doc.contains("lxp:userId \"u-1\""));
        assert!(doc.contains("foaf:name \"Ada\""));
        assert!(doc.contains("foaf:mbox <mailto:ada@example.org>"));
        assert!(doc.contains("lxp:updatedAt"));
    }

    #[test]
    fn test_mbox_iri_is_escaped() {
        let doc = user_profile(
            &UserIdentity {
                id: "u-1".to_string(),
                email: "a b>@x".to_string(),
                display_name: String::new(),
            },
            &fixed_time(),
        );
        assert!(doc.contains("<mailto:a%20b%3E@x>"));
    }

    #[test]
    fn test_mailto_keeps_at_sign_and_encodes_parts() {
        assert_eq!(mailto_iri("ada@example.org"), "<mailto:ada@example.org>");
        assert_eq!(mailto_iri("a+b@x y"), "<mailto:a%2Bb@x%20y>");
        assert_eq!(mailto_iri("no-at sign"), "<mailto:no-at%20sign>");
    }

    #[test]
    fn test_skill_profile_scores_use_two_decimals() {
        let mut categories = BTreeMap::new();
        categories.insert("collaboration".to_string(), 0.756);
        categories.insert("resilience".to_string(), 3.0);
        categories.insert("broken".to_string(), f64::NAN);

        let doc = skill_profile(&SkillProfileSnapshot {
            id: "sp-1".to_string(),
            user_id: "u-1".to_string(),
            categories,
            created_at: fixed_time(),
        });

        assert!(doc.contains("lxp:profileId \"sp-1\""));
        assert!(doc.contains(
            "lxp:category [ lxp:name \"collaboration\" ; lxp:score \"0.76\"^^xsd:decimal ]"
        ));
        assert!(doc.contains("lxp:score \"3.00\"^^xsd:decimal"));
        assert!(!doc.contains("broken"));
        assert!(!doc.contains("NaN"));
        assert!(doc.contains("lxp:createdAt \"2026-10-16T12:00:00Z\"^^xsd:dateTime"));
    }

    #[test]
    fn test_journey_progress_blocks() {
        let mut scores = BTreeMap::new();
        scores.insert("volatility".to_string(), 0.5);
        let mut journeys = BTreeMap::new();
        journeys.insert(
            "vuca".to_string(),
            JourneyProgress {
                started: true,
                stations_completed: 4,
                dimension_scores: scores,
            },
        );

        let doc = journey_progress(&journeys, &fixed_time());

        assert!(doc.contains("lxp:journeyType \"vuca\""));
        assert!(doc.contains("lxp:started \"true\"^^xsd:boolean"));
        assert!(doc.contains("lxp:stationsCompleted \"4\"^^xsd:integer"));
        assert!(doc.contains(
            "lxp:dimensionScore [ lxp:dimension \"volatility\" ; lxp:score \"0.50\"^^xsd:decimal ]"
        ));
        assert!(doc.trim_end().ends_with("^^xsd:dateTime ."));
    }

    #[test]
    fn test_empty_journey_map_has_only_updated_at() {
        let doc = journey_progress(&BTreeMap::new(), &fixed_time());
        let body: Vec<&str> = doc
            .lines()
            .filter(|line| !line.starts_with("@prefix") && !line.trim().is_empty())
            .collect();

        assert_eq!(
            body,
            vec!["<> lxp:updatedAt \"2026-10-16T12:00:00Z\"^^xsd:dateTime ."]
        );
    }

    #[test]
    fn test_reflection_free_text_is_escaped() {
        let doc = reflection(&ReflectionRow {
            id: "r-1".to_string(),
            question_id: "q-7".to_string(),
            response_text: "I said \"no\"\nthen C:\\tmp".to_string(),
            capability_scores: r#"{"focus":0.8}"#.to_string(),
            created_at: fixed_time(),
        });

        assert!(doc.contains(r#"lxp:responseText "I said \"no\"\nthen C:\\tmp""#));
        assert!(doc.contains(r#"lxp:capabilityScores "{\"focus\":0.8}""#));
        assert!(doc.contains("lxp:reflectionId \"r-1\""));
        assert!(doc.contains("lxp:questionId \"q-7\""));
        assert_eq!(doc.lines().filter(|l| l.contains("lxp:responseText")).count(), 1);
    }

    #[test]
    fn test_control_characters_become_unicode_escapes() {
        assert_eq!(escape_literal("a\u{0007}b"), "a\\u0007b");
    }
}
