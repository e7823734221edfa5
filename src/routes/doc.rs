use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        analytics::{AnalyticsBreakdowns, AnalyticsQuery, AnalyticsReport, AnalyticsSummary},
        inventory::{
            Availability, InventoryActionRequest, InventoryItem, InventoryList,
            InventoryListQuery,
        },
        orders::{
            CreateOrderRequest, CustomOrderRequest, OrderCreated, OrderList, OrderWithItems,
            UpdateOrderRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        users::{UpdateUserRequest, UserList, UserSummary},
    },
    models::{Inventory, Order, OrderItem, Product, User},
    response::{ApiResponse, Meta},
    routes::{
        analytics, auth, custom_order, health, inventory as inventory_routes, orders, params,
        products as product_routes, users as user_routes,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        inventory_routes::list_inventory,
        inventory_routes::get_availability,
        inventory_routes::apply_action,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        custom_order::submit,
        user_routes::list_users,
        user_routes::get_user,
        user_routes::update_user,
        analytics::get_analytics
    ),
    components(
        schemas(
            User,
            Product,
            Inventory,
            Order,
            OrderItem,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            InventoryActionRequest,
            InventoryItem,
            InventoryList,
            InventoryListQuery,
            Availability,
            CustomOrderRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderCreated,
            OrderList,
            OrderWithItems,
            UpdateUserRequest,
            UserList,
            UserSummary,
            AnalyticsQuery,
            AnalyticsSummary,
            AnalyticsBreakdowns,
            AnalyticsReport,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::UserListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Inventory>,
            ApiResponse<InventoryList>,
            ApiResponse<Availability>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<UserList>,
            ApiResponse<UserSummary>,
            ApiResponse<AnalyticsReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Inventory", description = "Stock bookkeeping endpoints"),
        (name = "Orders", description = "Lead-capture order endpoints"),
        (name = "Users", description = "User administration endpoints"),
        (name = "Analytics", description = "Back-office statistics"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
