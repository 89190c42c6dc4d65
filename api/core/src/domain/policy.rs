// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Authorization Policy
//!
//! Pure allow/deny decisions over state the caller has already loaded:
//!
//! | Check | Inputs | Denial |
//! |-------|--------|--------|
//! | [`AuthPolicy::check_repo_permission`] | actor, repository, permission record, required level | `InsufficientAccess` |
//! | [`AuthPolicy::check_insights_access`] | actor, owner, membership role, site | `InsightsForbidden` |
//!
//! The deployment [`Site`] is injected at construction and only changes the
//! insights rule: on `org` every authenticated caller may read any owner's
//! metrics, on `com` only the user themselves or an organization admin may.

use thiserror::Error;

use crate::domain::actor::{Actor, MembershipRole, Owner};
use crate::domain::insights::Site;
use crate::domain::permission::{AccessLevel, Permission};
use crate::domain::repo::RepoId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("login required")]
    LoginRequired,

    #[error("operation requires {permission} access to {resource_type}")]
    InsufficientAccess {
        permission: AccessLevel,
        resource_type: &'static str,
    },

    #[error("repository {repository_id} has been migrated")]
    RepoMigrated { repository_id: RepoId },

    #[error("insights for {owner:?} are not accessible")]
    InsightsForbidden { owner: Owner },
}

#[derive(Debug, Clone, Copy)]
pub struct AuthPolicy {
    site: Site,
}

impl AuthPolicy {
    pub fn new(site: Site) -> Self {
        Self { site }
    }

    pub fn site(&self) -> Site {
        self.site
    }

    /// Decide whether `actor` holds `required` on a repository-scoped resource.
    ///
    /// `permission` is the actor's record for the repository, if any. A record
    /// belonging to another user or another repository never grants anything.
    pub fn check_repo_permission(
        &self,
        actor: &Actor,
        repository_id: RepoId,
        permission: Option<&Permission>,
        required: AccessLevel,
        resource_type: &'static str,
    ) -> Result<(), PolicyViolation> {
        let user_id = actor.user_id().ok_or(PolicyViolation::LoginRequired)?;

        let granted = permission
            .filter(|p| p.user_id == user_id && p.repository_id == repository_id)
            .map(|p| p.grants(required))
            .unwrap_or(false);

        if granted {
            Ok(())
        } else {
            Err(PolicyViolation::InsufficientAccess {
                permission: required,
                resource_type,
            })
        }
    }

    /// Decide whether `actor` may read the metrics of `owner`.
    ///
    /// `role` is the actor's membership role in the owning organization; it is
    /// ignored for user owners.
    pub fn check_insights_access(
        &self,
        actor: &Actor,
        owner: &Owner,
        role: Option<MembershipRole>,
    ) -> Result<(), PolicyViolation> {
        let user_id = actor.user_id().ok_or(PolicyViolation::LoginRequired)?;

        let allowed = match (self.site, owner) {
            (Site::Org, _) => true,
            (Site::Com, Owner::User(id)) => *id == user_id,
            (Site::Com, Owner::Organization(_)) => role == Some(MembershipRole::Admin),
        };

        if allowed {
            Ok(())
        } else {
            Err(PolicyViolation::InsightsForbidden { owner: *owner })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::{OrganizationId, User, UserId};

    fn actor(id: u64) -> Actor {
        Actor::User(User { id: UserId(id), login: format!("user{}", id) })
    }

    fn permission(user: u64, pull: bool, push: bool) -> Permission {
        Permission {
            repository_id: RepoId(1),
            user_id: UserId(user),
            pull,
            push,
            admin: false,
        }
    }

    #[test]
    fn test_push_permission_allows_write() {
        let policy = AuthPolicy::new(Site::Org);
        let p = permission(1, false, true);
        assert!(policy.check_repo_permission(&actor(1), RepoId(1), Some(&p), AccessLevel::Write, "env_var").is_ok());
        assert!(policy.check_repo_permission(&actor(1), RepoId(1), Some(&p), AccessLevel::Read, "env_var").is_ok());
    }

    #[test]
    fn test_pull_permission_denies_write_with_resource_type() {
        let policy = AuthPolicy::new(Site::Org);
        let p = permission(1, true, false);
        assert_eq!(
            policy.check_repo_permission(&actor(1), RepoId(1), Some(&p), AccessLevel::Write, "env_var"),
            Err(PolicyViolation::InsufficientAccess {
                permission: AccessLevel::Write,
                resource_type: "env_var",
            })
        );
    }

    #[test]
    fn test_missing_or_foreign_record_denies() {
        let policy = AuthPolicy::new(Site::Com);
        assert!(policy.check_repo_permission(&actor(1), RepoId(1), None, AccessLevel::Read, "env_var").is_err());

        let foreign = permission(2, true, true);
        assert!(policy.check_repo_permission(&actor(1), RepoId(1), Some(&foreign), AccessLevel::Read, "env_var").is_err());

        let other_repo = permission(1, true, true);
        assert!(policy.check_repo_permission(&actor(1), RepoId(2), Some(&other_repo), AccessLevel::Read, "env_var").is_err());
    }

    #[test]
    fn test_anonymous_needs_login() {
        let policy = AuthPolicy::new(Site::Org);
        assert_eq!(
            policy.check_repo_permission(&Actor::Anonymous, RepoId(1), None, AccessLevel::Read, "env_var"),
            Err(PolicyViolation::LoginRequired)
        );
        assert_eq!(
            policy.check_insights_access(&Actor::Anonymous, &Owner::User(UserId(1)), None),
            Err(PolicyViolation::LoginRequired)
        );
    }

    #[test]
    fn test_org_site_allows_every_owner() {
        let policy = AuthPolicy::new(Site::Org);
        let me = actor(1);
        assert!(policy.check_insights_access(&me, &Owner::User(UserId(1)), None).is_ok());
        assert!(policy.check_insights_access(&me, &Owner::User(UserId(2)), None).is_ok());
        for role in [None, Some(MembershipRole::Member), Some(MembershipRole::Admin)] {
            assert!(policy
                .check_insights_access(&me, &Owner::Organization(OrganizationId(9)), role)
                .is_ok());
        }
    }

    #[test]
    fn test_com_site_user_owner_must_be_self() {
        let policy = AuthPolicy::new(Site::Com);
        let me = actor(1);
        assert!(policy.check_insights_access(&me, &Owner::User(UserId(1)), None).is_ok());
        assert!(matches!(
            policy.check_insights_access(&me, &Owner::User(UserId(2)), None),
            Err(PolicyViolation::InsightsForbidden { .. })
        ));
    }

    #[test]
    fn test_com_site_organization_requires_admin() {
        let policy = AuthPolicy::new(Site::Com);
        let me = actor(1);
        let org = Owner::Organization(OrganizationId(9));
        assert!(policy.check_insights_access(&me, &org, Some(MembershipRole::Admin)).is_ok());
        assert!(policy.check_insights_access(&me, &org, Some(MembershipRole::Member)).is_err());
        assert!(policy.check_insights_access(&me, &org, None).is_err());
    }
}
