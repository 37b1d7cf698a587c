use poem::Request;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    ApiResponse, OpenApi,
};
use std::sync::Arc;

use crate::business::OrderService;
use crate::domain::{CreateOrder, Invoice, MessageResponse, OrderPage, UpdateOrder};
use crate::security::{authenticate, TokenService};

pub struct OrdersApi {
    service: Arc<OrderService>,
    tokens: Arc<TokenService>,
}

impl OrdersApi {
    pub fn new(service: Arc<OrderService>, tokens: Arc<TokenService>) -> Self {
        Self { service, tokens }
    }
}

#[derive(ApiResponse)]
pub enum CreateOrderResponse {
    #[oai(status = 201)]
    Created(Json<MessageResponse>),
}

#[derive(ApiResponse)]
pub enum OrderMessageResponse {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),
}

#[derive(ApiResponse)]
pub enum ListOrdersResponse {
    #[oai(status = 200)]
    Ok(Json<OrderPage>),
}

#[derive(ApiResponse)]
pub enum InvoiceResponse {
    #[oai(status = 200)]
    Ok(Json<Invoice>),
}

#[OpenApi]
impl OrdersApi {
    #[oai(path = "/orders/create-order", method = "post")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateOrder>,
    ) -> Result<CreateOrderResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let msg = self.service.create(&user_id, body.0).await?;
        Ok(CreateOrderResponse::Created(Json(msg)))
    }

    /// Active orders, newest first
    #[oai(path = "/orders/get-orders", method = "get")]
    async fn list(
        &self,
        req: &Request,
        query: Query<Option<String>>,
        page: Query<Option<i64>>,
    ) -> Result<ListOrdersResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let page = self
            .service
            .list(&user_id, query.0.as_deref(), page.0)
            .await?;
        Ok(ListOrdersResponse::Ok(Json(page)))
    }

    #[oai(path = "/orders/get-invoice/:id", method = "get")]
    async fn invoice(&self, req: &Request, id: Path<String>) -> Result<InvoiceResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let invoice = self.service.invoice(&user_id, &id.0).await?;
        Ok(InvoiceResponse::Ok(Json(invoice)))
    }

    #[oai(path = "/orders/update/:id", method = "patch")]
    async fn update(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<UpdateOrder>,
    ) -> Result<OrderMessageResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let msg = self.service.update(&user_id, &id.0, body.0).await?;
        Ok(OrderMessageResponse::Ok(Json(msg)))
    }

    #[oai(path = "/orders/delete/:id", method = "delete")]
    async fn delete(&self, req: &Request, id: Path<String>) -> Result<OrderMessageResponse, poem::Error> {
        let user_id = authenticate(&self.tokens, req).await?;
        let msg = self.service.delete(&user_id, &id.0).await?;
        Ok(OrderMessageResponse::Ok(Json(msg)))
    }
}
