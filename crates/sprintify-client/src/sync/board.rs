//! Board state reconciled from optimistic moves and REST responses.

use sprintify_core::ServerEvent;
use uuid::Uuid;

use super::{MutationId, OptimisticStore};
use crate::api::{ApiClient, Issue, IssueFilter, IssuePatch, IssuesPage};
use crate::{Error, Result};

/// Tracing target for board reconciliation.
const TRACING_TARGET: &str = "sprintify_client::sync::board";

/// Issues of one project as shown on the board.
///
/// The REST response is authoritative for the issue it mutated. Socket events
/// never write issue state; a project broadcast only hints that a refetch is
/// worthwhile (see [`BoardSync::needs_refresh`]).
#[derive(Debug)]
pub struct BoardSync {
    project_id: Uuid,
    issues: OptimisticStore<Uuid, Issue>,
}

impl BoardSync {
    /// Creates an empty board for a project.
    pub fn new(project_id: Uuid) -> Self {
        Self {
            project_id,
            issues: OptimisticStore::new(),
        }
    }

    /// Returns the project this board belongs to.
    pub const fn project_id(&self) -> Uuid {
        self.project_id
    }

    /// Returns an issue as displayed.
    pub fn issue(&self, issue_id: Uuid) -> Option<&Issue> {
        self.issues.get(&issue_id)
    }

    /// Returns the issues of a column ordered by position.
    pub fn column(&self, column_id: Option<Uuid>) -> Vec<&Issue> {
        let mut issues: Vec<_> = self
            .issues
            .values()
            .filter(|issue| issue.column_id == column_id)
            .collect();
        issues.sort_by_key(|issue| (issue.position, issue.created_at));
        issues
    }

    /// Returns whether an update of the issue awaits its response.
    pub fn is_pending(&self, issue_id: Uuid) -> bool {
        self.issues.is_pending(&issue_id)
    }

    /// Replaces the board with a fetched page. In-flight issues keep their
    /// optimistic value.
    pub fn load(&mut self, page: IssuesPage) {
        let project_id = self.project_id;
        self.issues.replace_all(
            page.issues
                .into_iter()
                .filter(|issue| issue.project_id == project_id)
                .map(|issue| (issue.id, issue)),
        );
    }

    /// Applies `patch` locally before the request is sent.
    ///
    /// Returns `None` when the issue is not on this board.
    pub fn begin_update(&mut self, issue_id: Uuid, patch: &IssuePatch) -> Option<MutationId> {
        self.issues.apply(issue_id, |issue| patch.apply_to(issue))
    }

    /// Settles a mutation started with [`begin_update`] with the REST outcome.
    ///
    /// On success the stored row replaces the optimistic value; on failure the
    /// captured previous value is restored and the error is returned.
    ///
    /// [`begin_update`]: BoardSync::begin_update
    pub fn settle(&mut self, mutation: MutationId, outcome: Result<Issue>) -> Result<Issue> {
        match outcome {
            Ok(issue) => {
                self.issues.confirm(mutation, issue.clone());
                Ok(issue)
            }
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    project_id = %self.project_id,
                    error = %error,
                    "rolling back optimistic update"
                );
                self.issues.rollback(mutation);
                Err(error)
            }
        }
    }

    /// Performs an optimistic update against the API.
    pub async fn update(
        &mut self,
        api: &ApiClient,
        issue_id: Uuid,
        patch: &IssuePatch,
    ) -> Result<Issue> {
        let Some(mutation) = self.begin_update(issue_id, patch) else {
            return Err(Error::Api {
                status: reqwest::StatusCode::NOT_FOUND,
                name: "not_found".to_owned(),
                message: "issue not on this board".to_owned(),
                errors: Vec::new(),
            });
        };

        let outcome = api.update_issue(self.project_id, issue_id, patch).await;
        self.settle(mutation, outcome)
    }

    /// Refetches every issue of the board.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<()> {
        let filter = IssueFilter {
            limit: Some(100),
            ..IssueFilter::default()
        };
        let page = api.list_issues(self.project_id, &filter).await?;
        self.load(page);
        Ok(())
    }

    /// Returns whether a pushed event suggests the board changed elsewhere.
    pub fn needs_refresh(&self, event: &ServerEvent) -> bool {
        matches!(
            event,
            ServerEvent::ProjectNotification { project_id, .. } if *project_id == self.project_id
        )
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::api::{PageInfo, test_issue};

    fn board() -> BoardSync {
        let mut board = BoardSync::new(Uuid::from_u128(1000));
        board.load(IssuesPage {
            issues: vec![test_issue(1), test_issue(2)],
            pagination: PageInfo {
                limit: 100,
                offset: 0,
                total: 2,
                has_more: false,
            },
        });
        board
    }

    fn forbidden() -> Error {
        Error::Api {
            status: StatusCode::FORBIDDEN,
            name: "forbidden".into(),
            message: "Insufficient permissions".into(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn failed_move_restores_the_previous_column() {
        let mut board = board();
        let before = board.issue(Uuid::from_u128(1)).cloned();
        let target = Uuid::from_u128(50);

        let mutation = board
            .begin_update(Uuid::from_u128(1), &IssuePatch::move_to(Some(target), 0))
            .unwrap();
        assert_eq!(board.column(Some(target)).len(), 1);

        let result = board.settle(mutation, Err(forbidden()));
        assert!(result.is_err_and(|e| e.is_forbidden()));
        assert_eq!(board.issue(Uuid::from_u128(1)).cloned(), before);
        assert!(board.column(Some(target)).is_empty());
    }

    #[test]
    fn confirmed_move_keeps_the_server_row() {
        let mut board = board();
        let target = Uuid::from_u128(50);
        let mutation = board
            .begin_update(Uuid::from_u128(2), &IssuePatch::move_to(Some(target), 3))
            .unwrap();

        let mut stored = test_issue(2);
        stored.column_id = Some(target);
        stored.position = 1;
        board.settle(mutation, Ok(stored)).unwrap();

        assert_eq!(board.issue(Uuid::from_u128(2)).map(|i| i.position), Some(1));
        assert!(!board.is_pending(Uuid::from_u128(2)));
    }

    #[test]
    fn refetch_does_not_clobber_in_flight_moves() {
        let mut board = board();
        let target = Uuid::from_u128(50);
        board
            .begin_update(Uuid::from_u128(1), &IssuePatch::move_to(Some(target), 0))
            .unwrap();

        board.load(IssuesPage {
            issues: vec![test_issue(1), test_issue(2), test_issue(3)],
            pagination: PageInfo {
                limit: 100,
                offset: 0,
                total: 3,
                has_more: false,
            },
        });

        assert_eq!(
            board.issue(Uuid::from_u128(1)).and_then(|i| i.column_id),
            Some(target)
        );
        assert!(board.issue(Uuid::from_u128(3)).is_some());
    }

    #[test]
    fn only_own_project_broadcasts_trigger_refresh() {
        let board = board();
        let event = |project| ServerEvent::ProjectNotification {
            project_id: Uuid::from_u128(project),
            title: "Sprint started".into(),
            message: String::new(),
            notification_type: sprintify_core::NotificationType::SprintStarted,
            metadata: serde_json::Value::Null,
        };

        assert!(board.needs_refresh(&event(1000)));
        assert!(!board.needs_refresh(&event(1001)));
        assert!(!board.needs_refresh(&ServerEvent::NotificationsAllRead { unread_count: 0 }));
    }
}
