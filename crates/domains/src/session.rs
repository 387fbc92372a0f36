//! # Session
//!
//! The authenticated caller, passed explicitly to every mutating or
//! seller-scoped operation. There is no process-wide "current user".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
}

impl Session {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn owns(&self, seller_id: Uuid) -> bool {
        self.user_id == seller_id
    }
}
