//! Match evaluation: the conflict-resolution contract and the reference
//! greedy implementation.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::function::Match;

/// Errors from match evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// A proposal without a usable score is an input contract violation;
    /// the whole call fails fast instead of sorting incorrectly.
    #[error("match {id} has a missing or non-numeric score")]
    InvalidScore { id: Uuid },
}

/// Conflict-resolution strategy for one round's merged proposal pool.
///
/// Implementations must be pure: deterministic for identical input
/// ordering, no visible side effects. The barrier calls this exactly once
/// per round.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Return the conflict-free subset of `matches`, highest score first.
    async fn evaluate(&self, matches: Vec<Match>) -> Result<Vec<Match>, EvaluatorError>;
}

/// Greedy score-ordered de-collider.
///
/// Proposals are taken in descending score order; a proposal is accepted
/// unless one of its tickets was already claimed by an earlier acceptance.
/// Equal scores keep their submission order (the sort is stable).
#[derive(Debug, Default)]
pub struct ScoreEvaluator;

impl ScoreEvaluator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Evaluator for ScoreEvaluator {
    async fn evaluate(&self, matches: Vec<Match>) -> Result<Vec<Match>, EvaluatorError> {
        debug!(count = matches.len(), "matches to be evaluated");

        // Score every proposal up front so a bad one rejects the input
        // before any ordering happens.
        let mut scored = Vec::with_capacity(matches.len());
        for m in matches {
            let score = m.score().ok_or(EvaluatorError::InvalidScore { id: m.id })?;
            scored.push((score, m));
        }
        scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));

        let mut claimed: HashSet<Uuid> = HashSet::new();
        let mut accepted = Vec::new();
        for (_, m) in scored {
            if m.ticket_ids().any(|id| claimed.contains(&id)) {
                continue;
            }
            claimed.extend(m.ticket_ids());
            accepted.push(m);
        }

        debug!(
            accepted = accepted.len(),
            tickets_claimed = claimed.len(),
            "matches approved in evaluation"
        );
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use crate::ticket::Ticket;

    use super::*;

    fn ticket() -> Ticket {
        let mut attributes = HashMap::new();
        attributes.insert("skill".to_string(), 1.0);
        Ticket::new(attributes, serde_json::Value::Null)
    }

    fn proposal(score: f64, tickets: Vec<Ticket>) -> Match {
        Match::new(tickets, json!({ "score": score }))
    }

    #[tokio::test]
    async fn test_greedy_discards_overlapping_lower_scores() {
        let (a, b, c, d) = (ticket(), ticket(), ticket(), ticket());

        let p1 = proposal(10.0, vec![a.clone(), b.clone()]);
        let p2 = proposal(8.0, vec![b.clone(), c.clone()]);
        let p3 = proposal(5.0, vec![d.clone()]);

        let accepted = ScoreEvaluator::new()
            .evaluate(vec![p1.clone(), p2, p3.clone()])
            .await
            .unwrap();

        let ids: Vec<_> = accepted.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![p1.id, p3.id]);
    }

    #[tokio::test]
    async fn test_accepted_come_back_highest_score_first() {
        let low = proposal(1.0, vec![ticket()]);
        let high = proposal(9.0, vec![ticket()]);
        let mid = proposal(5.0, vec![ticket()]);

        let accepted = ScoreEvaluator::new()
            .evaluate(vec![low.clone(), high.clone(), mid.clone()])
            .await
            .unwrap();

        let ids: Vec<_> = accepted.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![high.id, mid.id, low.id]);
    }

    #[tokio::test]
    async fn test_tie_break_preserves_input_order() {
        let shared = ticket();
        let first = proposal(7.0, vec![shared.clone()]);
        let second = proposal(7.0, vec![shared.clone()]);

        let accepted = ScoreEvaluator::new()
            .evaluate(vec![first.clone(), second])
            .await
            .unwrap();

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, first.id);
    }

    #[tokio::test]
    async fn test_missing_score_fails_fast() {
        let bad = Match::new(vec![ticket()], json!({"quality": "great"}));
        let bad_id = bad.id;

        let err = ScoreEvaluator::new().evaluate(vec![bad]).await.unwrap_err();
        assert!(matches!(err, EvaluatorError::InvalidScore { id } if id == bad_id));
    }

    #[tokio::test]
    async fn test_empty_input_is_fine() {
        let accepted = ScoreEvaluator::new().evaluate(Vec::new()).await.unwrap();
        assert!(accepted.is_empty());
    }
}
