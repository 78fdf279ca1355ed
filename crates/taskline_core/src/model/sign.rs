//! Signifier/signified pair model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SignId = Uuid;

/// A sign: the form (`signifier`) and the concept it stands for (`signified`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sign {
    pub id: SignId,
    pub signifier: String,
    pub signified: String,
}

impl Sign {
    pub fn new(signifier: impl Into<String>, signified: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            signifier: signifier.into(),
            signified: signified.into(),
        }
    }
}
