use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::rank::rank;
use super::types::{RankingCriterion, SearchResult};

/// Handed out when a query starts; only the newest ticket may install a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// One caller's view state: the latest batch, its current order, and the criterion.
#[derive(Debug, Default)]
pub struct SearchSession {
    latest: Option<QueryTicket>,
    batch: Vec<SearchResult>,
    ranked: Vec<SearchResult>,
    criterion: RankingCriterion,
}

impl SearchSession {
    pub fn new(criterion: RankingCriterion) -> Self {
        Self {
            criterion,
            ..Default::default()
        }
    }

    /// Record `ticket` as the newest query. Any ticket recorded earlier becomes stale.
    pub fn begin_query(&mut self, ticket: QueryTicket) {
        self.latest = Some(ticket);
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        self.latest == Some(ticket)
    }

    /// Replace the held batch with a freshly normalized one.
    ///
    /// Returns `false` (and keeps the current batch) when a newer query has
    /// started since `ticket` was issued.
    pub fn install(&mut self, ticket: QueryTicket, batch: Vec<SearchResult>) -> bool {
        if !self.is_current(ticket) {
            info!(
                ticket = ticket.0,
                current = ?self.latest.map(|t| t.0),
                "discarding stale search response"
            );
            return false;
        }
        self.ranked = rank(&batch, self.criterion);
        self.batch = batch;
        true
    }

    /// Re-rank the held batch without touching the backend.
    pub fn set_criterion(&mut self, criterion: RankingCriterion) -> &[SearchResult] {
        // ranked view is swapped in one assignment
        self.ranked = rank(&self.batch, criterion);
        self.criterion = criterion;
        &self.ranked
    }

    pub fn criterion(&self) -> RankingCriterion {
        self.criterion
    }
}

/// What happened to a response handed to [`SessionRegistry::install`].
#[derive(Debug, PartialEq)]
pub enum InstallOutcome {
    /// The batch is now held; `ranked` is ordered by `criterion`.
    Installed {
        ranked: Vec<SearchResult>,
        criterion: RankingCriterion,
    },
    /// A newer query started after this one.
    Superseded,
    /// The session was cleared while the query was in flight.
    Cleared,
}

/// Per-user search sessions.
#[derive(Default)]
pub struct SessionRegistry {
    /// Never reset, so tickets stay unique across cleared sessions.
    next_ticket: AtomicU64,
    sessions: RwLock<HashMap<u64, SearchSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query for `user`, creating the session with `criterion` if needed.
    /// Returns the ticket and the criterion the session currently ranks by.
    pub async fn begin_query(
        &self,
        user: u64,
        criterion: RankingCriterion,
    ) -> (QueryTicket, RankingCriterion) {
        let mut sessions = self.sessions.write().await;
        let ticket = QueryTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed));
        let session = sessions
            .entry(user)
            .or_insert_with(|| SearchSession::new(criterion));
        session.begin_query(ticket);
        (ticket, session.criterion())
    }

    /// Install a batch for `user`.
    ///
    /// An explicit `criterion` replaces the session's; otherwise the batch is
    /// ranked by whatever the session holds at install time, which may have
    /// changed while the query was in flight.
    pub async fn install(
        &self,
        user: u64,
        ticket: QueryTicket,
        batch: Vec<SearchResult>,
        criterion: Option<RankingCriterion>,
    ) -> InstallOutcome {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&user) else {
            debug!(user, "session cleared before search response arrived");
            return InstallOutcome::Cleared;
        };
        if let Some(criterion) = criterion.filter(|_| session.is_current(ticket)) {
            session.criterion = criterion;
        }
        if !session.install(ticket, batch) {
            return InstallOutcome::Superseded;
        }
        debug!(user, count = session.batch.len(), "search batch installed");
        InstallOutcome::Installed {
            ranked: session.ranked.clone(),
            criterion: session.criterion,
        }
    }

    /// Re-rank `user`'s held batch. `None` when there is nothing to rank.
    pub async fn rerank(&self, user: u64, criterion: RankingCriterion) -> Option<Vec<SearchResult>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&user)?;
        Some(session.set_criterion(criterion).to_vec())
    }

    /// Tear down `user`'s view. Returns whether a session existed.
    pub async fn clear(&self, user: u64) -> bool {
        self.sessions.write().await.remove(&user).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<SearchResult> {
        vec![
            SearchResult::new("a", "x", 0.5),
            SearchResult::new("b", "y", 0.9),
        ]
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    fn installed(outcome: InstallOutcome) -> (Vec<SearchResult>, RankingCriterion) {
        match outcome {
            InstallOutcome::Installed { ranked, criterion } => (ranked, criterion),
            other => panic!("expected an installed batch, got {:?}", other),
        }
    }

    #[test]
    fn test_install_ranks_with_current_criterion() {
        let mut session = SearchSession::new(RankingCriterion::SimilarityScore);
        session.begin_query(QueryTicket(1));
        assert!(session.install(QueryTicket(1), batch()));
        assert_eq!(ids(&session.ranked), vec!["b", "a"]);
        assert_eq!(ids(&session.batch), vec!["a", "b"]);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut session = SearchSession::default();
        session.begin_query(QueryTicket(1));
        session.begin_query(QueryTicket(2));
        assert!(session.install(QueryTicket(2), batch()));
        assert!(!session.install(QueryTicket(1), vec![SearchResult::new("stale", "z", 1.0)]));
        assert_eq!(ids(&session.batch), vec!["a", "b"]);
    }

    #[test]
    fn test_install_without_query_is_rejected() {
        let mut session = SearchSession::default();
        assert!(!session.install(QueryTicket(0), batch()));
        assert!(session.batch.is_empty());
    }

    #[test]
    fn test_set_criterion_reorders_held_batch() {
        let mut session = SearchSession::default();
        session.begin_query(QueryTicket(1));
        session.install(QueryTicket(1), batch());
        assert_eq!(ids(&session.ranked), vec!["a", "b"]);
        assert_eq!(
            ids(session.set_criterion(RankingCriterion::SimilarityScore)),
            vec!["b", "a"]
        );
        assert_eq!(ids(session.set_criterion(RankingCriterion::None)), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_registry_out_of_order_responses() {
        let registry = SessionRegistry::new();
        let (first, _) = registry.begin_query(7, RankingCriterion::None).await;
        let (second, _) = registry.begin_query(7, RankingCriterion::None).await;

        let (fresh, _) = installed(registry.install(7, second, batch(), None).await);
        assert_eq!(ids(&fresh), vec!["a", "b"]);

        let late = registry
            .install(7, first, vec![SearchResult::new("stale", "z", 1.0)], None)
            .await;
        assert_eq!(late, InstallOutcome::Superseded);

        let ranked = registry.rerank(7, RankingCriterion::SimilarityScore).await.unwrap();
        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_response_from_before_clear_cannot_overwrite_newer_batch() {
        let registry = SessionRegistry::new();
        let (before_clear, _) = registry.begin_query(9, RankingCriterion::None).await;
        assert!(registry.clear(9).await);
        let (after_clear, _) = registry.begin_query(9, RankingCriterion::None).await;
        assert_ne!(before_clear, after_clear);

        let (fresh, _) = installed(
            registry
                .install(9, after_clear, vec![SearchResult::new("fresh", "x", 0.1)], None)
                .await,
        );
        assert_eq!(ids(&fresh), vec!["fresh"]);

        let late = registry
            .install(9, before_clear, vec![SearchResult::new("stale", "y", 0.2)], None)
            .await;
        assert_eq!(late, InstallOutcome::Superseded);

        let held = registry.rerank(9, RankingCriterion::None).await.unwrap();
        assert_eq!(ids(&held), vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_install_reports_criterion_changed_in_flight() {
        let registry = SessionRegistry::new();
        let (ticket, started_with) = registry.begin_query(5, RankingCriterion::None).await;
        assert_eq!(started_with, RankingCriterion::None);

        // nothing held yet, but the session records the new choice
        registry.rerank(5, RankingCriterion::SimilarityScore).await.unwrap();

        let (ranked, criterion) = installed(registry.install(5, ticket, batch(), None).await);
        assert_eq!(criterion, RankingCriterion::SimilarityScore);
        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_registry_sessions_are_per_user() {
        let registry = SessionRegistry::new();
        let (ticket, criterion) = registry.begin_query(1, RankingCriterion::Voice).await;
        assert_eq!(criterion, RankingCriterion::Voice);
        installed(registry.install(1, ticket, batch(), None).await);

        assert!(registry.rerank(2, RankingCriterion::Voice).await.is_none());

        // an existing session keeps its own criterion
        let (_, criterion) = registry.begin_query(1, RankingCriterion::CreatedAt).await;
        assert_eq!(criterion, RankingCriterion::Voice);
    }

    #[tokio::test]
    async fn test_clear_while_in_flight_reports_cleared() {
        let registry = SessionRegistry::new();
        let (ticket, _) = registry.begin_query(3, RankingCriterion::None).await;
        assert!(registry.clear(3).await);
        assert_eq!(
            registry.install(3, ticket, batch(), None).await,
            InstallOutcome::Cleared
        );
        assert!(!registry.clear(3).await);
    }

    #[tokio::test]
    async fn test_install_with_explicit_criterion() {
        let registry = SessionRegistry::new();
        let (ticket, _) = registry.begin_query(4, RankingCriterion::None).await;
        let (ranked, criterion) = installed(
            registry
                .install(4, ticket, batch(), Some(RankingCriterion::SimilarityScore))
                .await,
        );
        assert_eq!(ids(&ranked), vec!["b", "a"]);
        assert_eq!(criterion, RankingCriterion::SimilarityScore);

        let (_, kept) = registry.begin_query(4, RankingCriterion::None).await;
        assert_eq!(kept, RankingCriterion::SimilarityScore);
    }

    #[tokio::test]
    async fn test_stale_install_keeps_session_criterion() {
        let registry = SessionRegistry::new();
        let (old, _) = registry.begin_query(6, RankingCriterion::None).await;
        let (_new, _) = registry.begin_query(6, RankingCriterion::None).await;
        let outcome = registry
            .install(6, old, batch(), Some(RankingCriterion::Voice))
            .await;
        assert_eq!(outcome, InstallOutcome::Superseded);
        let (_, criterion) = registry.begin_query(6, RankingCriterion::None).await;
        assert_eq!(criterion, RankingCriterion::None);
    }
}
