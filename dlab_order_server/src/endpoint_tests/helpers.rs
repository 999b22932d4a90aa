use actix_web::{
    body::MessageBody,
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Days, Utc};
use dlab_common::{Rupees, Secret};
use dlab_order_engine::db_types::{
    CartLine,
    DeliveryAddress,
    NewOrder,
    Order,
    OrderId,
    OrderStatus,
    PaymentMethod,
    PriceBreakdown,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use razorpay_tools::{RazorpayApi, RazorpayConfig};

use crate::{
    auth::{JwtClaims, Role, TokenVerifier},
    config::AuthConfig,
};

// Secrets for issuing test tokens and signing test confirmations. DO NOT re-use these anywhere.
pub const TEST_JWT_SECRET: &str = "endpoint-test-jwt-secret";
pub const TEST_GATEWAY_SECRET: &str = "endpoint-test-gateway-secret";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()) }
}

pub fn get_gateway() -> RazorpayApi {
    let config = RazorpayConfig {
        key_id: "rzp_test_1234567890".to_string(),
        api_secret: Secret::new(TEST_GATEWAY_SECRET.to_string()),
        ..RazorpayConfig::default()
    };
    RazorpayApi::new(config).expect("Failed to build gateway client")
}

pub fn issue_token(claims: &JwtClaims) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()))
        .expect("Failed to sign token")
}

pub fn customer_claims(sub: &str) -> JwtClaims {
    JwtClaims {
        sub: sub.to_string(),
        email: format!("{sub}@example.com"),
        role: Role::Customer,
        exp: (Utc::now() + Days::new(1)).timestamp(),
    }
}

pub fn admin_claims() -> JwtClaims {
    JwtClaims { role: Role::Admin, ..customer_claims("staff-1") }
}

/// Run a single request against an app assembled from `configure`, returning the status and the
/// raw body. Errors raised before a handler runs (e.g. by the ACL middleware) are rendered
/// through their response mapping, so tests see the same status a client would.
pub async fn send_request(
    req: TestRequest,
    token: &str,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = req;
    if !token.is_empty() {
        req = req.insert_header((AUTHORIZATION, format!("Bearer {token}")));
    }
    let verifier = TokenVerifier::new(&get_auth_config().jwt_secret);
    let app = App::new().app_data(web::Data::new(verifier)).configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let (_, res) = res.into_parts();
            let status = res.status();
            let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
            (status, body)
        },
        Err(e) => {
            let status = e.as_response_error().status_code();
            (status, e.to_string())
        },
    }
}

pub fn sample_address() -> DeliveryAddress {
    DeliveryAddress {
        name: "Asha Pillai".to_string(),
        phone: "+91 98765 43210".to_string(),
        address: "14 Marine Drive".to_string(),
        city: "Mumbai".to_string(),
        state: "Maharashtra".to_string(),
        postal_code: "400001".to_string(),
        country: "India".to_string(),
    }
}

pub fn sample_line(price_paise: i64, qty: u32) -> CartLine {
    CartLine {
        product_id: "brownie".to_string(),
        product_name: "Fudge Brownie".to_string(),
        price: Rupees::from_paise(price_paise),
        qty,
    }
}

pub fn sample_order(id: i64, customer_id: &str, status: OrderStatus) -> Order {
    Order {
        id,
        order_id: OrderId(format!("ord-{id:016}")),
        customer_id: customer_id.to_string(),
        email: format!("{customer_id}@example.com"),
        items: vec![sample_line(10_000, 2)],
        pricing: PriceBreakdown {
            subtotal: Rupees::from_rupees(200),
            delivery_fee: Rupees::from_rupees(50),
            tax: Rupees::from_rupees(10),
            total: Rupees::from_rupees(260),
        },
        delivery_address: Some(sample_address()),
        payment_method: PaymentMethod::CashOnDelivery,
        payment: None,
        status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// What the store would hand back after persisting `new_order`.
pub fn persisted(new_order: NewOrder, id: i64) -> Order {
    let now = Utc::now();
    Order {
        id,
        order_id: new_order.order_id,
        customer_id: new_order.customer_id,
        email: new_order.email,
        items: new_order.items,
        pricing: new_order.pricing,
        delivery_address: new_order.delivery_address,
        payment_method: new_order.payment_method,
        payment: new_order.payment,
        status: new_order.status,
        created_at: now,
        updated_at: now,
    }
}
