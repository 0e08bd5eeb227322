use std::sync::Arc;

use tracing::debug;

use super::{paginate, require, where_contains, where_eq, where_in, ServiceError, ServiceResult};
use crate::database::models::Language;
use crate::database::Repository;
use crate::dto::language::{CreateLanguageRequest, FilterLanguagesRequest, UpdateLanguageRequest};
use crate::dto::{non_empty, PageRequest, PaginationResponse};
use crate::filter::Locking;

#[derive(Clone)]
pub struct LanguageService {
    repo: Arc<dyn Repository<Language>>,
}

fn check_code(code: &str, len: usize, field: &str) -> ServiceResult<()> {
    if code.chars().count() != len || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ServiceError::Argument(format!("{} must be {} letters", field, len)));
    }
    Ok(())
}

impl LanguageService {
    pub fn new(repo: Arc<dyn Repository<Language>>) -> Self {
        Self { repo }
    }

    pub async fn get_one(&self, id: &str) -> ServiceResult<Language> {
        Ok(self.repo.get(id, true).await?)
    }

    pub async fn filter_all(
        &self,
        req: FilterLanguagesRequest,
        page: PageRequest,
    ) -> ServiceResult<PaginationResponse<Language>> {
        let mut filter = self.repo.query();
        filter = where_in(filter, "id", req.ids);
        filter = where_contains(filter, "name", req.name);
        filter = where_eq(filter, "alpha2_code", req.alpha2_code.map(|c| c.to_lowercase()));

        paginate(self.repo.as_ref(), filter, page, false).await
    }

    pub async fn create_one(&self, req: CreateLanguageRequest) -> ServiceResult<Language> {
        require(&req.name, "name")?;
        check_code(&req.alpha2_code, 2, "alpha2Code")?;
        check_code(&req.alpha3_code, 3, "alpha3Code")?;

        let language = self
            .repo
            .create(Language {
                name: req.name,
                alpha2_code: req.alpha2_code.to_lowercase(),
                alpha3_code: req.alpha3_code.to_lowercase(),
                icon: req.icon,
                ..Default::default()
            })
            .await?;

        debug!("Created language {} ({})", language.base.id, language.alpha2_code);
        Ok(language)
    }

    pub async fn update_one(&self, req: UpdateLanguageRequest) -> ServiceResult<Language> {
        require(&req.id, "id")?;
        let name = non_empty(req.name);
        let alpha2 = non_empty(req.alpha2_code);
        let alpha3 = non_empty(req.alpha3_code);
        let icon = non_empty(req.icon);
        if let Some(code) = &alpha2 {
            check_code(code, 2, "alpha2Code")?;
        }
        if let Some(code) = &alpha3 {
            check_code(code, 3, "alpha3Code")?;
        }

        let filter = self.repo.query().clauses(Locking::ForUpdate);
        let language = self
            .repo
            .modify(
                &filter,
                &req.id,
                Box::new(move |language: &mut Language| {
                    if let Some(name) = name {
                        language.name = name;
                    }
                    if let Some(code) = alpha2 {
                        language.alpha2_code = code.to_lowercase();
                    }
                    if let Some(code) = alpha3 {
                        language.alpha3_code = code.to_lowercase();
                    }
                    if let Some(icon) = icon {
                        language.icon = icon;
                    }
                }),
            )
            .await?;

        debug!("Updated language {}", language.base.id);
        Ok(language)
    }

    pub async fn delete_one(&self, id: &str) -> ServiceResult<()> {
        self.repo.delete(id).await?;
        debug!("Deleted language {}", id);
        Ok(())
    }
}
