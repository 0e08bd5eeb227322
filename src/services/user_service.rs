use std::sync::Arc;

use tracing::{debug, info};

use super::{paginate, require, where_contains, where_in, ServiceError, ServiceResult};
use crate::database::models::{Role, User, UserLanguage};
use crate::database::Repository;
use crate::dto::user::{CreateUserRequest, FilterUsersRequest, Op, UpdateUserRequest};
use crate::dto::{non_empty, PageRequest, PaginationResponse};
use crate::filter::{Condition, Locking};
use crate::ports::PasswordHasher;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn Repository<User>>,
    languages: Arc<dyn Repository<UserLanguage>>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn Repository<User>>,
        languages: Arc<dyn Repository<UserLanguage>>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self { repo, languages, hasher }
    }

    pub async fn get_one(&self, id: &str) -> ServiceResult<User> {
        Ok(self.repo.get(id, true).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> ServiceResult<User> {
        let filter = self.repo.query().where_clause(Condition::eq("email", email)).limit(1);
        self.repo
            .find(&filter, false)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("user with email {} not found", email)))
    }

    pub async fn filter_all(&self, req: FilterUsersRequest, page: PageRequest) -> ServiceResult<PaginationResponse<User>> {
        let mut filter = self.repo.query();
        filter = where_in(filter, "id", req.ids);
        filter = where_contains(filter, "name", req.name_query);
        filter = where_contains(filter, "email", req.email_query);

        paginate(self.repo.as_ref(), filter, page, false).await
    }

    /// New accounts always start as customers.
    pub async fn create_one(&self, req: CreateUserRequest) -> ServiceResult<User> {
        require(&req.name, "name")?;
        require(&req.password, "password")?;
        let email = req.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(ServiceError::Argument(format!("invalid email: {}", req.email)));
        }

        let taken = self.repo.query().where_clause(Condition::eq("email", email.as_str()));
        if self.repo.count(&taken).await? > 0 {
            return Err(ServiceError::Argument(format!("email {} is already registered", email)));
        }

        let user = self
            .repo
            .create(User {
                name: req.name,
                email,
                password_hash: self.hasher.hash(&req.password),
                role: Role::Customer,
                ..Default::default()
            })
            .await?;

        info!("Registered user {}", user.base.id);
        Ok(user)
    }

    pub fn verify_password(&self, user: &User, password: &str) -> bool {
        self.hasher.verify(&user.password_hash, password)
    }

    /// Renames under a row lock, then applies language membership changes.
    pub async fn update_one(&self, req: UpdateUserRequest) -> ServiceResult<User> {
        require(&req.id, "id")?;
        let name = non_empty(req.name);

        let filter = self.repo.query().clauses(Locking::ForUpdate);
        self.repo
            .modify(
                &filter,
                &req.id,
                Box::new(move |user: &mut User| {
                    if let Some(name) = name {
                        user.name = name;
                    }
                }),
            )
            .await?;

        for operation in req.language_ops {
            let links = self
                .languages
                .query()
                .where_clause(Condition::eq("user_id", req.id.as_str()))
                .where_clause(Condition::eq("language_id", operation.val.as_str()));
            let existing = self.languages.find(&links, false).await?;

            match operation.op {
                Op::Insert if existing.is_empty() => {
                    self.languages
                        .create(UserLanguage {
                            user_id: req.id.clone(),
                            language_id: operation.val,
                            ..Default::default()
                        })
                        .await?;
                }
                Op::Insert => {}
                Op::Delete => {
                    for link in existing {
                        self.languages.delete(&link.base.id).await?;
                    }
                }
            }
        }

        debug!("Updated user {}", req.id);
        self.get_one(&req.id).await
    }

    pub async fn delete_one(&self, id: &str) -> ServiceResult<()> {
        self.repo.delete(id).await?;
        info!("Deleted user {}", id);
        Ok(())
    }

    /// Language ids linked to the user.
    pub async fn language_ids(&self, id: &str) -> ServiceResult<Vec<String>> {
        let filter = self.languages.query().where_clause(Condition::eq("user_id", id));
        let links = self.languages.find(&filter, false).await?;
        Ok(links.into_iter().map(|link| link.language_id).collect())
    }

    pub async fn make_admin(&self, id: &str) -> ServiceResult<User> {
        let user = self.set_role(id, Role::Admin).await?;
        info!("Granted admin role to user {}", id);
        Ok(user)
    }

    /// Admin can only be granted through `make_admin`.
    pub async fn make_non_admin_role(&self, id: &str, role: u8) -> ServiceResult<User> {
        let role = Role::try_from(role).map_err(|e| ServiceError::Argument(e.to_string()))?;
        if role == Role::Admin {
            return Err(ServiceError::Argument("admin role cannot be granted through this path".to_string()));
        }
        self.set_role(id, role).await
    }

    async fn set_role(&self, id: &str, role: Role) -> ServiceResult<User> {
        let filter = self.repo.query().clauses(Locking::ForUpdate);
        Ok(self
            .repo
            .modify(&filter, id, Box::new(move |user: &mut User| user.role = role))
            .await?)
    }
}
