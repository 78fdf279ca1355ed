//! Sign use-case service: pass-through CRUD over `SignRepository`.

use crate::model::sign::{Sign, SignId};
use crate::repo::sign_repo::SignRepository;
use crate::repo::RepoResult;

pub struct SignService<R: SignRepository> {
    repo: R,
}

impl<R: SignRepository> SignService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_sign(&self, sign: &Sign) -> RepoResult<SignId> {
        self.repo.create_sign(sign)
    }

    pub fn get_sign(&self, id: SignId) -> RepoResult<Option<Sign>> {
        self.repo.get_sign(id)
    }

    pub fn list_signs(&self) -> RepoResult<Vec<Sign>> {
        self.repo.list_signs()
    }

    /// Returns `RepoError::NotFound` when no sign has `sign.id`.
    pub fn update_sign(&self, sign: &Sign) -> RepoResult<()> {
        self.repo.update_sign(sign)
    }

    pub fn delete_sign(&self, id: SignId) -> RepoResult<()> {
        self.repo.delete_sign(id)
    }
}
