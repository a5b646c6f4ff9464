//! Maps intercepted call arguments to the roles shown in audit diagnostics

use std::fmt;

/// Rendered in place of a role nobody claimed
pub const UNKNOWN: &str = "Unknown";

/// An argument that identifies the authenticated caller
pub trait ActorIdentity: Send + Sync {
    fn actor_id(&self) -> i64;
}

/// An argument shaped as a request to register a subordinate user
pub trait SubjectRequest: Send + Sync {
    fn subject_id(&self) -> i64;
}

/// One argument of an intercepted call, tagged by kind
#[derive(Clone, Copy)]
pub enum AuditArg<'a> {
    Actor(&'a dyn ActorIdentity),
    Subject(&'a dyn SubjectRequest),
    /// A bare numeric id of the entity being acted on
    Target(i64),
    Other,
}

impl From<i64> for AuditArg<'_> {
    fn from(id: i64) -> Self {
        AuditArg::Target(id)
    }
}

impl fmt::Debug for AuditArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditArg::Actor(a) => f.debug_tuple("Actor").field(&a.actor_id()).finish(),
            AuditArg::Subject(s) => f.debug_tuple("Subject").field(&s.subject_id()).finish(),
            AuditArg::Target(id) => f.debug_tuple("Target").field(id).finish(),
            AuditArg::Other => f.write_str("Other"),
        }
    }
}

/// An optional role id that displays as [`UNKNOWN`] when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleId(pub Option<i64>);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => f.write_str(UNKNOWN),
        }
    }
}

/// Role ids resolved for one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditRoles {
    pub actor_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub target_id: Option<i64>,
}

impl AuditRoles {
    pub fn with_actor(mut self, id: i64) -> Self {
        self.actor_id = Some(id);
        self
    }

    pub fn with_subject(mut self, id: i64) -> Self {
        self.subject_id = Some(id);
        self
    }

    pub fn with_target(mut self, id: i64) -> Self {
        self.target_id = Some(id);
        self
    }

    pub fn actor(&self) -> RoleId {
        RoleId(self.actor_id)
    }

    pub fn subject(&self) -> RoleId {
        RoleId(self.subject_id)
    }

    pub fn target(&self) -> RoleId {
        RoleId(self.target_id)
    }
}

/// Resolve roles from `args` in a single pass.
///
/// When two arguments claim the same role the later one wins. Roles no
/// argument claims stay `None`.
pub fn classify(args: &[AuditArg<'_>]) -> AuditRoles {
    args.iter().fold(AuditRoles::default(), |roles, arg| match arg {
        AuditArg::Actor(actor) => roles.with_actor(actor.actor_id()),
        AuditArg::Subject(request) => roles.with_subject(request.subject_id()),
        AuditArg::Target(id) => roles.with_target(*id),
        AuditArg::Other => roles,
    })
}
