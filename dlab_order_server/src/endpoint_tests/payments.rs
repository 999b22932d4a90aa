use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use razorpay_tools::{sign_confirmation, PaymentConfirmation};
use serde_json::{json, Value};

use super::helpers::{get_gateway, send_request, TEST_GATEWAY_SECRET};
use crate::routes::{verify_payment, CreatePaymentIntentRoute};

fn configure_verify(cfg: &mut ServiceConfig) {
    cfg.service(verify_payment).app_data(web::Data::new(get_gateway()));
}

fn configure_intent(cfg: &mut ServiceConfig) {
    cfg.service(CreatePaymentIntentRoute::new()).app_data(web::Data::new(get_gateway()));
}

fn confirmation() -> PaymentConfirmation {
    PaymentConfirmation {
        razorpay_order_id: "order_IluGWxBm9U8zJ8".to_string(),
        razorpay_payment_id: "pay_G8VQzjPLoAvm6D".to_string(),
        razorpay_signature: sign_confirmation(TEST_GATEWAY_SECRET, "order_IluGWxBm9U8zJ8", "pay_G8VQzjPLoAvm6D"),
    }
}

#[actix_web::test]
async fn valid_confirmations_verify() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/payments/verify").set_json(confirmation());
    let (status, body) = send_request(req, "", configure_verify).await;
    assert_eq!(status, StatusCode::OK);
    let verdict: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(verdict["success"], true);
}

#[actix_web::test]
async fn tampered_confirmations_fail_verification() {
    let _ = env_logger::try_init().ok();
    let mut tampered = confirmation();
    // Swap the first hex digit for a different one.
    let first = tampered.razorpay_signature.remove(0);
    tampered.razorpay_signature.insert(0, if first == '0' { '1' } else { '0' });
    let req = TestRequest::post().uri("/payments/verify").set_json(tampered);
    let (status, body) = send_request(req, "", configure_verify).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let verdict: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(verdict["success"], false);
}

#[actix_web::test]
async fn confirmations_for_a_different_payment_fail_verification() {
    let _ = env_logger::try_init().ok();
    let mut forged = confirmation();
    forged.razorpay_payment_id = "pay_SomebodyElse00".to_string();
    let req = TestRequest::post().uri("/payments/verify").set_json(forged);
    let (status, body) = send_request(req, "", configure_verify).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let verdict: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(verdict["success"], false);
}

#[actix_web::test]
async fn intent_creation_requires_a_customer_token() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/payments/intent")
        .set_json(json!({"amount": 260.0, "receipt": "rcpt-test-000001"}));
    let (status, _body) = send_request(req, "", configure_intent).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
