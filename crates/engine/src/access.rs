//! Who is calling and what they may touch.

use uuid::Uuid;

/// The authenticated principal of a request.
///
/// It is built from verified token claims; the engine never looks up
/// credentials itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Caller {
    pub fn new(id: Uuid, is_admin: bool) -> Self {
        Self { id, is_admin }
    }

    pub fn user(id: Uuid) -> Self {
        Self::new(id, false)
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, true)
    }
}

/// `true` when `caller` owns the resource or is an admin.
///
/// A resource without an owner (seeded defaults, orphaned items) can only be
/// acted upon by admins.
pub fn can_act(caller: &Caller, owner: Option<Uuid>) -> bool {
    caller.is_admin || owner == Some(caller.id)
}
