use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use dlab_order_engine::{OrderFlowApi, OrderQueryApi, SqliteDatabase};
use razorpay_tools::RazorpayApi;

use crate::{
    auth::TokenVerifier,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    routes::{
        health,
        verify_payment,
        CreateOrderRoute,
        CreatePaymentIntentRoute,
        ListOrdersRoute,
        MyOrdersRoute,
        UpdateOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    // The gateway client (and the secret inside it) is built once; worker factories clone it.
    let gateway = RazorpayApi::new(config.razorpay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let order_flow = OrderFlowApi::new(db.clone());
        let order_queries = OrderQueryApi::new(db.clone());
        let verifier = TokenVerifier::new(&config.auth.jwt_secret);
        let options = ServerOptions::from_config(&config);
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(ListOrdersRoute::<SqliteDatabase>::new())
            .service(UpdateOrderRoute::<SqliteDatabase>::new())
            .service(CreatePaymentIntentRoute::new())
            .service(verify_payment);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("dlab::access_log"))
            .app_data(web::Data::new(order_flow))
            .app_data(web::Data::new(order_queries))
            .app_data(web::Data::new(verifier))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(options))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
