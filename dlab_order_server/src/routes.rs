//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the storage traits, so the endpoint tests can swap the SQLite
//! backend for mocks. Since actix cannot register generic handlers directly, each route gets a
//! small factory struct via the `route!` macro, carrying its path, method guard, required roles
//! and trait bounds in one line.

use actix_web::{get, post, web, HttpResponse, Responder};
use dlab_common::INR_CURRENCY_CODE;
use dlab_order_engine::{
    db_types::{OrderDraft, OrderId, OrderStatus, PaymentMethod, PaymentReference},
    order_objects::{OrderPagination, DEFAULT_PAGE_SIZE},
    traits::{OrderDatabase, OrderManagement, ProductCatalog},
    OrderFlowApi,
    OrderFlowError,
    OrderQueryApi,
};
use log::*;
use razorpay_tools::{PaymentConfirmation, RazorpayApi, VerificationResult};

use crate::{
    auth::{JwtClaims, MaybeAuthenticated, Role},
    config::ServerOptions,
    data_objects::{
        CreateOrderRequest,
        IntentRequest,
        IntentResponse,
        JsonResponse,
        OrderListQuery,
        OrderListResponse,
        StatusUpdateRequest,
    },
    errors::{AuthError, ServerError},
};

// Web-actix cannot handle generics in handlers, so the registration plumbing is generated with
// the `route!` macro.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
            impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)* 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ident),+ requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)* 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(create_order => Post "/orders" impl OrderDatabase, OrderManagement, ProductCatalog);
/// Route handler for order creation.
///
/// Customers place orders here. Identity comes from the access token; when guest checkout is
/// enabled, anonymous callers may place cash-on-delivery orders by supplying a contact email.
/// Gateway orders must include the confirmation triple from the checkout widget, and the
/// signature is verified *before* the engine is invoked — a client-side "payment successful"
/// claim on its own never creates an order.
pub async fn create_order<B>(
    maybe_claims: MaybeAuthenticated,
    options: web::Data<ServerOptions>,
    gateway: web::Data<RazorpayApi>,
    api: web::Data<OrderFlowApi<B>>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderDatabase + OrderManagement + ProductCatalog,
{
    let request = body.into_inner();
    let (customer_id, email) = match maybe_claims.into_inner() {
        Some(claims) => (claims.sub, claims.email),
        None => {
            let guest_cod =
                options.allow_guest_checkout && request.payment_method == PaymentMethod::CashOnDelivery;
            if !guest_cod {
                debug!("💻️ Rejecting anonymous order creation (guest checkout not applicable)");
                return Err(ServerError::AuthenticationError(AuthError::MissingToken));
            }
            // Guest orders are keyed by the contact email so customers can still be looked up.
            let email = request
                .email
                .clone()
                .filter(|e| !e.trim().is_empty())
                .ok_or_else(|| ServerError::InvalidRequestBody("Guest checkout requires a contact email".into()))?;
            (email.clone(), email)
        },
    };
    debug!("💻️ POST create_order for customer {customer_id} via {}", request.payment_method);
    let payment = match request.payment_method {
        PaymentMethod::Gateway => {
            let confirmation =
                request.confirmation.ok_or(ServerError::OrderError(OrderFlowError::PaymentProofMissing))?;
            match gateway.verify_payment(&confirmation) {
                VerificationResult::Verified => Some(PaymentReference {
                    gateway_order_id: confirmation.razorpay_order_id,
                    gateway_payment_id: confirmation.razorpay_payment_id,
                    signature: confirmation.razorpay_signature,
                }),
                VerificationResult::SignatureMismatch => return Err(ServerError::PaymentNotVerified),
            }
        },
        PaymentMethod::CashOnDelivery => {
            if request.confirmation.is_some() {
                return Err(ServerError::OrderError(OrderFlowError::UnexpectedPaymentProof));
            }
            None
        },
    };
    let draft = OrderDraft {
        customer_id,
        email,
        items: request.items,
        delivery_address: request.delivery_address,
        payment_method: request.payment_method,
        payment,
    };
    let order = api.place_order(draft).await.map_err(|e| {
        debug!("💻️ Could not create order. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(order))
}

route!(my_orders => Get "/orders/{customer_id}" impl OrderManagement requires [Role::Customer]);
/// Route handler for a customer's own order history, most recent first.
///
/// Self-only: the customer id in the path must match the access token's subject. Admins may
/// fetch any customer's orders through the same route.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = path.into_inner();
    debug!("💻️ GET orders for customer {customer_id}");
    if claims.sub != customer_id && !claims.role.covers(Role::Admin) {
        debug!("💻️ {} asked for orders belonging to {customer_id}. Denied.", claims.sub);
        return Err(ServerError::InsufficientPermissions("You may only view your own orders".to_string()));
    }
    let orders = api.orders_for_customer(&customer_id).await.map_err(|e| {
        debug!("💻️ Could not fetch orders. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(list_orders => Get "/orders" impl OrderManagement requires [Role::Admin]);
/// Route handler for the staff order listing.
///
/// Returns one page of the order book, most recent first, as `{orders, total}` where `total` is
/// the page count. The status filter is matched case-insensitively; a blank filter returns all
/// statuses. Out-of-range pages return an empty `orders` array, not an error.
pub async fn list_orders<B: OrderManagement>(
    query: web::Query<OrderListQuery>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => {
            Some(s.parse::<OrderStatus>().map_err(|e| ServerError::InvalidRequestQuery(e.to_string()))?)
        },
        None => None,
    };
    let pagination =
        OrderPagination::new(query.page.unwrap_or(1), query.limit.unwrap_or(DEFAULT_PAGE_SIZE), status);
    debug!("💻️ GET orders [{pagination}]");
    let page = api.orders_paged(&pagination).await.map_err(|e| {
        debug!("💻️ Could not fetch orders. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(OrderListResponse { orders: page.orders, total: page.total_pages }))
}

route!(update_order => Patch "/orders/{order_id}" impl OrderDatabase, OrderManagement, ProductCatalog requires [Role::Admin]);
/// Route handler for fulfillment transitions.
///
/// Staff move `Pending` orders to `Completed` or `Cancelled` here. Anything else — including a
/// repeat of a transition that already happened — is rejected with 409 and the order is left
/// untouched.
pub async fn update_order<B>(
    path: web::Path<OrderId>,
    body: web::Json<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderDatabase + OrderManagement + ProductCatalog,
{
    let order_id = path.into_inner();
    let new_status = body
        .into_inner()
        .status
        .parse::<OrderStatus>()
        .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    info!("💻️ Status change request for order {order_id} to {new_status}");
    let order = api.update_status(&order_id, new_status).await.map_err(|e| {
        debug!("💻️ Could not update order status. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------

route!(create_payment_intent => Post "/payments/intent" requires [Role::Customer]);
/// Route handler for payment-intent creation.
///
/// Proxies the gateway's order-creation call and returns what the checkout widget needs. The
/// receipt in the body is the caller's idempotency reference; a failed or timed-out call is
/// surfaced as-is and the client retries with a fresh receipt.
pub async fn create_payment_intent(
    claims: JwtClaims,
    gateway: web::Data<RazorpayApi>,
    body: web::Json<IntentRequest>,
) -> Result<HttpResponse, ServerError> {
    let IntentRequest { amount, receipt, notes } = body.into_inner();
    debug!("💻️ Payment intent request from {} for {amount}", claims.sub);
    let intent = gateway.create_order(amount, INR_CURRENCY_CODE, &receipt, notes).await.map_err(|e| {
        debug!("💻️ Could not create payment intent. {e}");
        ServerError::from(e)
    })?;
    let response = IntentResponse {
        order_id: intent.id,
        amount: intent.amount,
        currency: intent.currency,
        key_id: gateway.key_id().to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}

/// Route handler for payment verification.
///
/// No authentication beyond the signature itself: the confirmation triple either proves a
/// settled payment or it does not. The verdict is returned to the caller; a mismatch is also
/// logged as a security event by the gateway client.
#[post("/payments/verify")]
pub async fn verify_payment(
    gateway: web::Data<RazorpayApi>,
    body: web::Json<PaymentConfirmation>,
) -> HttpResponse {
    let confirmation = body.into_inner();
    trace!("💻️ Received payment verification request for {}", confirmation.razorpay_order_id);
    match gateway.verify_payment(&confirmation) {
        VerificationResult::Verified => HttpResponse::Ok().json(JsonResponse::success("Payment verified.")),
        VerificationResult::SignatureMismatch => {
            HttpResponse::BadRequest().json(JsonResponse::failure("Payment verification failed."))
        },
    }
}
