use poem::Request;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    ApiResponse, OpenApi,
};
use std::sync::Arc;

use crate::business::ConsumerService;
use crate::domain::{
    Consumer, ConsumerOptions, ConsumerPage, CreateConsumer, DashboardStats, MessageResponse,
    UpdateConsumer,
};
use crate::security::{authenticate, TokenService};

pub struct ConsumersApi {
    service: Arc<ConsumerService>,
    tokens: Arc<TokenService>,
}

impl ConsumersApi {
    pub fn new(service: Arc<ConsumerService>, tokens: Arc<TokenService>) -> Self {
        Self { service, tokens }
    }
}

#[derive(ApiResponse)]
pub enum CreateConsumerResponse {
    #[oai(status = 201)]
    Created(Json<MessageResponse>),
}

#[derive(ApiResponse)]
pub enum ConsumerMessageResponse {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),
}

#[derive(ApiResponse)]
pub enum ListConsumersResponse {
    #[oai(status = 200)]
    Ok(Json<ConsumerPage>),
}

#[derive(ApiResponse)]
pub enum GetConsumerResponse {
    #[oai(status = 200)]
    Ok(Json<Consumer>),
}

#[derive(ApiResponse)]
pub enum ConsumerOptionsResponse {
    #[oai(status = 200)]
    Ok(Json<ConsumerOptions>),
}

#[derive(ApiResponse)]
pub enum DashboardResponse {
    #[oai(status = 200)]
    Ok(Json<DashboardStats>),
}

#[OpenApi]
impl ConsumersApi {
    #[oai(path = "/consumer/register", method = "post")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateConsumer>,
    ) -> Result<CreateConsumerResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let msg = self.service.create(&user_id, body.0).await?;
        Ok(CreateConsumerResponse::Created(Json(msg)))
    }

    /// Paginated consumers, optionally filtered by name or email
    #[oai(path = "/consumer/get-all", method = "get")]
    async fn list(
        &self,
        req: &Request,
        query: Query<Option<String>>,
        page: Query<Option<i64>>,
    ) -> Result<ListConsumersResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let page = self
            .service
            .list(&user_id, query.0.as_deref(), page.0)
            .await?;
        Ok(ListConsumersResponse::Ok(Json(page)))
    }

    #[oai(path = "/consumer/get/:id", method = "get")]
    async fn get(&self, req: &Request, id: Path<String>) -> Result<GetConsumerResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let consumer = self.service.get(&user_id, &id.0).await?;
        Ok(GetConsumerResponse::Ok(Json(consumer)))
    }

    #[oai(path = "/consumer/update/:id", method = "patch")]
    async fn update(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<UpdateConsumer>,
    ) -> Result<ConsumerMessageResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let msg = self.service.update(&user_id, &id.0, body.0).await?;
        Ok(ConsumerMessageResponse::Ok(Json(msg)))
    }

    /// Delete a consumer and every order placed for it
    #[oai(path = "/consumer/delete/:id", method = "delete")]
    async fn delete(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<ConsumerMessageResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let msg = self.service.delete(&user_id, &id.0).await?;
        Ok(ConsumerMessageResponse::Ok(Json(msg)))
    }

    #[oai(path = "/consumer/get-search", method = "get")]
    async fn options(&self, req: &Request) -> Result<ConsumerOptionsResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let options = self.service.options(&user_id).await?;
        Ok(ConsumerOptionsResponse::Ok(Json(options)))
    }

    /// Totals for the dashboard charts
    #[oai(path = "/consumer/dashboard", method = "get")]
    async fn dashboard(&self, req: &Request) -> Result<DashboardResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let stats = self.service.dashboard(&user_id).await?;
        Ok(DashboardResponse::Ok(Json(stats)))
    }
}
