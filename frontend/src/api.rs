use crate::config::AppConfig;
use crate::web::{BrowserNavigator, BrowserSessionStorage, FetchTransport};
use martdesk_shared::catalog::CouponBatch;
use martdesk_shared::protocol::{
    ApproveOrderRequest, CancelOrderRequest, CreateRequest, DeleteRequest, ListCustomersRequest,
    ListOrdersRequest, ListRequest, OrderDetailRequest, UpdateRequest, UserAnalyticsRequest,
};
use martdesk_shared::{
    ApiRequest, ApiResult, Customer, GatewayClient, ModeratorDraft, Order, QueryKey, Resource,
    Session, SessionStore, UserAnalytics,
};

type BrowserGateway = GatewayClient<FetchTransport, BrowserNavigator>;

/// 后台管理接口
///
/// 所有请求都经过同一个 [`GatewayClient`]，共享同一份会话存储。
#[derive(Clone)]
pub struct MartDeskApi {
    client: BrowserGateway,
}

impl MartDeskApi {
    pub fn new(config: &AppConfig) -> Self {
        let session = SessionStore::new(BrowserSessionStorage);
        let client = GatewayClient::new(
            config.api_url.clone(),
            session,
            FetchTransport,
            BrowserNavigator,
        );
        Self { client }
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    // ---- 认证 ----

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        self.client.authenticate(email, password).await
    }

    pub fn logout(&self) {
        self.client.sign_out();
    }

    // ---- 订单 ----

    /// 获取订单列表
    pub async fn get_orders(&self) -> ApiResult<Vec<Order>> {
        self.client.call(&ListOrdersRequest).await
    }

    /// 获取订单详情
    pub async fn get_order(&self, order_id: String) -> ApiResult<Order> {
        self.client.call(&OrderDetailRequest { order_id }).await
    }

    /// 批准订单，返回需要失效的查询键
    pub async fn approve_order(&self, order_id: String) -> ApiResult<Vec<QueryKey>> {
        self.mutate(ApproveOrderRequest { order_id }).await
    }

    /// 取消订单，返回需要失效的查询键
    pub async fn cancel_order(&self, order_id: String) -> ApiResult<Vec<QueryKey>> {
        self.mutate(CancelOrderRequest { order_id }).await
    }

    // ---- 用户 ----

    pub async fn get_customers(&self) -> ApiResult<Vec<Customer>> {
        self.client.call(&ListCustomersRequest).await
    }

    pub async fn get_user_analytics(&self) -> ApiResult<UserAnalytics> {
        self.client.call(&UserAnalyticsRequest).await
    }

    pub async fn create_moderator(&self, draft: ModeratorDraft) -> ApiResult<Vec<QueryKey>> {
        self.mutate(draft).await
    }

    // ---- 目录资源 ----

    pub async fn list<R: Resource>(&self) -> ApiResult<Vec<R::Item>> {
        self.client.call(&ListRequest::<R>::new()).await
    }

    pub async fn create<R: Resource>(&self, draft: R::Draft) -> ApiResult<Vec<QueryKey>> {
        self.mutate(CreateRequest::<R> { draft }).await
    }

    pub async fn update<R: Resource>(
        &self,
        id: String,
        draft: R::Draft,
    ) -> ApiResult<Vec<QueryKey>> {
        self.mutate(UpdateRequest::<R> { id, draft }).await
    }

    pub async fn delete<R: Resource>(&self, id: String) -> ApiResult<Vec<QueryKey>> {
        self.mutate(DeleteRequest::<R>::new(id)).await
    }

    pub async fn generate_coupons(&self, batch: CouponBatch) -> ApiResult<Vec<QueryKey>> {
        self.mutate(batch).await
    }

    async fn mutate<R: ApiRequest<Response = ()>>(&self, request: R) -> ApiResult<Vec<QueryKey>> {
        self.client.call(&request).await?;
        Ok(request.invalidates())
    }
}
